use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use rapidpe::config::WorkflowConfigParser;
use rapidpe::errors::RapidpeError;
use rapidpe::observability::{init_logging, LogFormat};
use rapidpe::stages::{setup_rapidpe_followup_workflow, StageParams};
use rapidpe::workflow::{File, Workflow};

/// Plan the rapidpe follow-up stage of a workflow
#[derive(Parser)]
#[command(name = "rapidpe-plan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow configuration (JSON, section -> option -> value)
    #[arg(long)]
    config: PathBuf,

    /// Path to a JSON array of files produced by earlier stages
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Directory the stage writes its outputs to
    #[arg(long)]
    output_dir: PathBuf,

    /// Tag scoping configuration lookups and output names (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Extra stage parameter as key=value; values are parsed as JSON when possible
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Write the planned DAG as JSON to this path instead of stdout
    #[arg(long)]
    dag_out: Option<PathBuf>,

    /// Log line format
    #[arg(long, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Workflow name recorded in the DAG
    #[arg(long, default_value = "rapidpe")]
    name: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<RapidpeError>() {
                Some(stage_err) => eprintln!("{}", stage_err.error_info().to_json()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cp = WorkflowConfigParser::from_json_file(&cli.config)
        .with_context(|| format!("failed to load config: {}", cli.config.display()))?;
    let mut workflow = Workflow::new(cli.name, cp);

    if let Some(path) = &cli.inputs {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read inputs: {}", path.display()))?;
        let files: Vec<File> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse inputs: {}", path.display()))?;
        for file in files {
            workflow.add_input_file(file)?;
        }
    }

    let params: StageParams = cli.params.into_iter().collect();
    let tags = (!cli.tags.is_empty()).then_some(cli.tags.as_slice());

    let outputs = setup_rapidpe_followup_workflow(&mut workflow, &cli.output_dir, tags, &params)?;
    for file in &outputs {
        eprintln!("{}", file.name());
    }

    let dag = serde_json::to_string_pretty(&workflow.to_dag())?;
    match &cli.dag_out {
        Some(path) => std::fs::write(path, dag)
            .with_context(|| format!("failed to write DAG: {}", path.display()))?,
        None => println!("{dag}"),
    }

    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
