//! Observability utilities.

mod logging;
mod spans;

pub use logging::{init_logging, LogFormat, DEFAULT_DIRECTIVE};
pub use spans::{SpanTimer, StageSpanAttributes};
