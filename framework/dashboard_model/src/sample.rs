use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A history value, keeping the numeric type of the history class it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// Read from the unsigned integer history class
    Integer(u64),
    /// Read from the floating point history class
    Float(f64),
}

impl SampleValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            SampleValue::Integer(v) => *v as f64,
            SampleValue::Float(v) => *v,
        }
    }

    /// Turn a percentage into its complement, `100 - self`.
    ///
    /// Integer values stay integers unless they exceed 100.
    pub fn complement_percent(self) -> SampleValue {
        match self {
            SampleValue::Integer(v) if v <= 100 => SampleValue::Integer(100 - v),
            other => SampleValue::Float(100.0 - other.as_f64()),
        }
    }
}

impl Display for SampleValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleValue::Integer(v) => write!(f, "{v}"),
            SampleValue::Float(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_of_free_percent() {
        assert_eq!(
            SampleValue::Integer(63),
            SampleValue::Integer(37).complement_percent()
        );
        assert_eq!(
            SampleValue::Float(63.0),
            SampleValue::Float(37.0).complement_percent()
        );
        assert_eq!(
            SampleValue::Float(-20.0),
            SampleValue::Integer(120).complement_percent()
        );
    }

    #[test]
    fn json_keeps_the_numeric_type() {
        let values: Vec<SampleValue> = serde_json::from_str("[3, 0.25, 18446744073709551615]")
            .expect("valid sample values");
        assert_eq!(
            vec![
                SampleValue::Integer(3),
                SampleValue::Float(0.25),
                SampleValue::Integer(u64::MAX)
            ],
            values
        );
    }

    #[test]
    fn display_is_plain() {
        assert_eq!("42", SampleValue::Integer(42).to_string());
        assert_eq!("0.15", SampleValue::Float(0.15).to_string());
        assert_eq!("63", SampleValue::Float(63.0).to_string());
    }
}
