use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed interval of millisecond timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpan {
    start_ts: i64,
    end_ts: i64,
}

#[derive(Error, Debug, PartialEq)]
#[error("Provided timespan start_ts: {0} and end_ts: {1} is invalid. start_ts must not be after end_ts.")]
pub struct InvalidTimeSpanError(pub i64, pub i64);

impl TimeSpan {
    pub fn create(start_ts: i64, end_ts: i64) -> Result<Self, InvalidTimeSpanError> {
        if start_ts > end_ts {
            return Err(InvalidTimeSpanError(start_ts, end_ts));
        }
        Ok(Self { start_ts, end_ts })
    }

    /// The span `[center - radius, center + radius]`.
    /// A negative radius is treated as zero.
    pub fn around(center: i64, radius: i64) -> Self {
        let radius = radius.max(0);
        Self {
            start_ts: center.saturating_sub(radius),
            end_ts: center.saturating_add(radius),
        }
    }

    pub fn start(&self) -> i64 {
        self.start_ts
    }

    pub fn end(&self) -> i64 {
        self.end_ts
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.start_ts <= ts && ts <= self.end_ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reversed_spans() {
        assert!(TimeSpan::create(10, 5).is_err());
        assert!(TimeSpan::create(5, 5).is_ok());
    }

    #[test]
    fn around_is_inclusive_on_both_ends() {
        let span = TimeSpan::around(100, 10);
        assert_eq!(span.start(), 90);
        assert_eq!(span.end(), 110);
        assert!(span.contains(90));
        assert!(span.contains(110));
        assert!(!span.contains(111));
        assert_eq!(TimeSpan::around(100, -5), TimeSpan::around(100, 0));
    }
}
