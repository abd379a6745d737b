//! GPS time segments.

use crate::errors::{ConfigurationError, RapidpeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open `[start, end)` interval of integer GPS seconds.
///
/// Deserialization goes through [`Segment::new`], so every segment in the
/// workflow satisfies its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct Segment {
    start: i64,
    end: i64,
}

#[derive(Deserialize)]
struct RawSegment {
    start: i64,
    end: i64,
}

impl TryFrom<RawSegment> for Segment {
    type Error = RapidpeError;

    fn try_from(raw: RawSegment) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl Segment {
    /// Creates a segment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `end < start` or the duration does
    /// not fit in an `i64`.
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if end < start {
            return Err(ConfigurationError::section(
                "segment",
                format!("segment end {end} precedes start {start}"),
            )
            .into());
        }
        if end.checked_sub(start).is_none() {
            return Err(ConfigurationError::section(
                "segment",
                format!("segment [{start}, {end}) is too long"),
            )
            .into());
        }
        Ok(Self { start, end })
    }

    /// Start time.
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// End time.
    #[must_use]
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Length in seconds.
    #[must_use]
    pub const fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// True when `other` lies entirely inside this segment.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the segments overlap.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
