//! Recording time limit value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Upper bound on the length of a take, in whole seconds.
///
/// Parsed from strings like `"45s"`, `"3m"`, or `"1m30s"`. A bare number
/// with no unit is rejected rather than guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordDuration {
    seconds: u64,
}

impl RecordDuration {
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_secs(self.seconds)
    }
}

/// A run of ASCII digits, or `None` for anything else (including signs).
fn digits(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for RecordDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || DurationParseError {
            input: s.to_string(),
        };
        let text = s.trim().to_ascii_lowercase();

        let (minute_part, rest) = match text.split_once('m') {
            Some((head, tail)) => (Some(head), tail),
            None => (None, text.as_str()),
        };

        let minutes = match minute_part {
            Some(head) => digits(head).ok_or_else(fail)?,
            None => 0,
        };

        let seconds = match rest {
            // Bare "<n>m"; an empty input has no minute part either.
            "" => {
                if minute_part.is_none() {
                    return Err(fail());
                }
                0
            }
            tail => {
                let head = tail.strip_suffix('s').ok_or_else(fail)?;
                digits(head).ok_or_else(fail)?
            }
        };

        let total = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(fail)?;
        if total == 0 {
            return Err(fail());
        }

        Ok(Self { seconds: total })
    }
}

impl fmt::Display for RecordDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.seconds / 60, self.seconds % 60) {
            (0, s) => write!(f, "{}s", s),
            (m, 0) => write!(f, "{}m", m),
            (m, s) => write!(f, "{}m{}s", m, s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<RecordDuration, DurationParseError> {
        s.parse()
    }

    #[test]
    fn accepts_plain_seconds() {
        assert_eq!(parse("45s").unwrap().as_secs(), 45);
    }

    #[test]
    fn accepts_plain_minutes() {
        assert_eq!(parse("3m").unwrap().as_secs(), 180);
    }

    #[test]
    fn accepts_minutes_with_seconds() {
        assert_eq!(parse("1m15s").unwrap().as_secs(), 75);
    }

    #[test]
    fn seconds_may_exceed_a_minute() {
        assert_eq!(parse("90s").unwrap().as_secs(), 90);
    }

    #[test]
    fn ignores_case_and_surrounding_whitespace() {
        assert_eq!(parse(" 2M10S ").unwrap().as_secs(), 130);
    }

    #[test]
    fn rejects_bare_numbers_and_garbage() {
        for input in ["", "30", "abc", "30x", "m30s", "1m30", "+5s", "5m5m"] {
            assert!(parse(input).is_err(), "{:?} should not parse", input);
        }
    }

    #[test]
    fn rejects_zero_length_limits() {
        assert!(parse("0s").is_err());
        assert!(parse("0m0s").is_err());
    }

    #[test]
    fn rejects_minute_counts_that_overflow() {
        assert!(parse("400000000000000000m").is_err());
    }

    #[test]
    fn formats_in_the_input_grammar() {
        assert_eq!(RecordDuration::from_secs(45).to_string(), "45s");
        assert_eq!(RecordDuration::from_secs(180).to_string(), "3m");
        assert_eq!(RecordDuration::from_secs(75).to_string(), "1m15s");
    }

    #[test]
    fn converts_to_std_duration() {
        let limit = RecordDuration::from_secs(30);
        assert_eq!(limit.as_std(), StdDuration::from_secs(30));
    }
}
