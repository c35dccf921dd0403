use super::Error;
use std::{error::Error as StdError, str::FromStr};

/// A type that an argument's raw text can be converted into.
///
/// `bool` is not supported: whether `"true"`, `"yes"` or `"2"` counts as
/// true is up to the caller. Convert to an integer first and apply your own rule.
pub trait Value<'a>: Sized {
    fn from_raw(raw: &'a str) -> Result<Self, Error>;
}

impl<'a> Value<'a> for &'a str {
    fn from_raw(raw: &'a str) -> Result<Self, Error> {
        Ok(raw)
    }
}

impl<'a> Value<'a> for String {
    fn from_raw(raw: &'a str) -> Result<Self, Error> {
        Ok(raw.to_string())
    }
}

pub(crate) fn parse_num<T: FromStr>(raw: &str) -> Result<T, Error>
where
    <T as FromStr>::Err: StdError + 'static,
{
    T::from_str(raw).map_err(|e| Error::Value(raw.to_string(), Box::new(e)))
}

macro_rules! num_value {
    ($num: ty) => {
        impl<'a> $crate::Value<'a> for $num {
            fn from_raw(raw: &'a str) -> Result<Self, Error> {
                parse_num(raw)
            }
        }
    };
}

num_value!(i32);
num_value!(u32);
num_value!(i64);
num_value!(u64);
num_value!(f32);
num_value!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(i32::from_raw("-12").unwrap(), -12);
        assert_eq!(u64::from_raw("18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(f64::from_raw("2.5").unwrap(), 2.5);
    }

    #[test]
    #[should_panic(expected = "Error parsing value `kevin`")]
    fn not_a_number() {
        i32::from_raw("kevin").unwrap();
    }

    #[test]
    fn negative_unsigned() {
        assert!(matches!(u32::from_raw("-1"), Err(Error::Value(..))));
    }

    #[test]
    fn text() {
        let raw = String::from("name");
        let view: &str = Value::from_raw(&raw).unwrap();
        assert_eq!(view, "name");
        assert_eq!(String::from_raw("01").unwrap(), "01");
    }
}
