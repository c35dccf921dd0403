use super::{value::parse_num, Error};
use std::collections::BTreeSet;

/// Numeric domain a range is checked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumType {
    Int,
    Uint,
    Double,
}

/// Textual bounds at the edges of the 32 and 64-bit integer domains, for use with
/// [`Arg::range`](crate::Arg::range).
pub struct NumLimit;

impl NumLimit {
    pub const INT32_MAX: &'static str = "2147483647";
    pub const INT32_MIN: &'static str = "-2147483648";
    pub const UINT32_MAX: &'static str = "4294967295";

    pub const INT64_MAX: &'static str = "9223372036854775807";
    pub const INT64_MIN: &'static str = "-9223372036854775808";
    pub const UINT64_MAX: &'static str = "18446744073709551615";
}

/// Bounds are kept as text and only converted when a value is checked.
#[derive(Debug, Clone)]
pub(crate) struct Range {
    pub num: NumType,
    pub left: String,
    pub right: String,
    pub include_left: bool,
    pub include_right: bool,
}

impl Range {
    pub fn contains(&self, raw: &str) -> Result<bool, Error> {
        Ok(match self.num {
            NumType::Int => self.within(
                parse_num::<i64>(raw)?,
                parse_num(&self.left)?,
                parse_num(&self.right)?,
            ),
            NumType::Uint => self.within(
                parse_num::<u64>(raw)?,
                parse_num(&self.left)?,
                parse_num(&self.right)?,
            ),
            NumType::Double => self.within(
                parse_num::<f64>(raw)?,
                parse_num(&self.left)?,
                parse_num(&self.right)?,
            ),
        })
    }

    fn within<T: PartialOrd>(&self, value: T, left: T, right: T) -> bool {
        let above = if self.include_left {
            left <= value
        } else {
            left < value
        };
        let below = if self.include_right {
            value <= right
        } else {
            value < right
        };
        above && below
    }

    /// `[left, right]`, with parentheses on the excluded ends.
    pub fn describe(&self) -> String {
        format!(
            "{}{}, {}{}",
            if self.include_left { '[' } else { '(' },
            self.left,
            self.right,
            if self.include_right { ']' } else { ')' },
        )
    }
}

/// Exact text membership; `"1"` and `"01"` are different choices.
#[derive(Debug, Clone)]
pub(crate) struct Choices(pub BTreeSet<String>);

impl Choices {
    pub fn contains(&self, raw: &str) -> bool {
        self.0.contains(raw)
    }

    pub fn describe(&self) -> String {
        let items: Vec<&str> = self.0.iter().map(String::as_str).collect();
        format!("[{}]", items.join(", "))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Constraint {
    Range(Range),
    Choices(Choices),
}

/// A value that failed its constraint.
#[derive(Debug)]
pub(crate) enum Mismatch {
    Range { value: String, bounds: String },
    Choices { value: String, choices: String },
}

impl Mismatch {
    pub fn into_error(self, command: &str, arg: String) -> Error {
        let command = command.to_string();
        match self {
            Mismatch::Range { value, bounds } => Error::OutOfRange {
                command,
                arg,
                value,
                bounds,
            },
            Mismatch::Choices { value, choices } => Error::NotInChoices {
                command,
                arg,
                value,
                choices,
            },
        }
    }

    pub fn into_default_error(self) -> Error {
        match self {
            Mismatch::Range { value, bounds } => Error::InvalidDefault {
                value,
                expected: bounds,
            },
            Mismatch::Choices { value, choices } => Error::InvalidDefault {
                value,
                expected: choices,
            },
        }
    }
}

impl Constraint {
    /// `Ok(None)` if the value satisfies the constraint.
    pub fn check(&self, raw: &str) -> Result<Option<Mismatch>, Error> {
        match self {
            Constraint::Range(range) => Ok(if range.contains(raw)? {
                None
            } else {
                Some(Mismatch::Range {
                    value: raw.to_string(),
                    bounds: range.describe(),
                })
            }),
            Constraint::Choices(choices) => Ok(if choices.contains(raw) {
                None
            } else {
                Some(Mismatch::Choices {
                    value: raw.to_string(),
                    choices: choices.describe(),
                })
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(
        num: NumType,
        left: &str,
        right: &str,
        include_left: bool,
        include_right: bool,
    ) -> Range {
        Range {
            num,
            left: left.to_string(),
            right: right.to_string(),
            include_left,
            include_right,
        }
    }

    #[test]
    fn inclusive() {
        let r = range(NumType::Int, "5", "10", true, true);
        assert!(r.contains("5").unwrap());
        assert!(r.contains("10").unwrap());
        assert!(!r.contains("4").unwrap());
        assert!(!r.contains("11").unwrap());
        assert_eq!(r.describe(), "[5, 10]");
    }

    #[test]
    fn exclusive() {
        let r = range(NumType::Double, "0", "1", false, true);
        assert!(!r.contains("0").unwrap());
        assert!(r.contains("0.5").unwrap());
        assert!(r.contains("1").unwrap());
        assert_eq!(r.describe(), "(0, 1]");

        let r = range(NumType::Int, "0", "3", true, false);
        assert!(!r.contains("3").unwrap());
        assert_eq!(r.describe(), "[0, 3)");
    }

    #[test]
    fn wide_bounds() {
        let r = range(NumType::Int, NumLimit::INT64_MIN, NumLimit::INT64_MAX, true, true);
        assert!(r.contains("9223372036854775807").unwrap());
        assert!(r.contains("-9223372036854775808").unwrap());

        let r = range(NumType::Uint, "0", NumLimit::UINT64_MAX, true, true);
        assert!(r.contains("18446744073709551615").unwrap());
        assert!(matches!(r.contains("-1"), Err(Error::Value(..))));
    }

    #[test]
    fn choices() {
        let c = Choices(["1", "2", "3"].iter().map(|s| s.to_string()).collect());
        assert!(c.contains("2"));
        assert!(!c.contains("02"));
        assert_eq!(c.describe(), "[1, 2, 3]");
    }
}
