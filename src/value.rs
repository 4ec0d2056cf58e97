//! Runtime values stored in records and produced by expressions.

use crate::error::{DbError, DbResult};
use std::cmp::Ordering;
use std::fmt;

/// A runtime-tagged value: integer, floating, or string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Converts this value to a numeric one. Integers and floats pass
    /// through; strings are parsed with the same lexical rules as numeric
    /// literals (digits, optionally one decimal point with fraction digits).
    pub fn as_number(&self) -> DbResult<Value> {
        match self {
            Value::Int(_) | Value::Float(_) => Ok(self.clone()),
            Value::Str(s) => parse_number(s),
        }
    }

    /// True when this value is a string.
    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Numeric view as f64, for promoted arithmetic and comparisons.
    /// Callers must coerce with `as_number` first.
    fn as_f64(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Str(_) => f64::NAN,
        }
    }

    /// Total order over values, used for key sorting and min/max.
    /// Numerics compare numerically, strings lexicographically. The order
    /// between a number and a string is unspecified by the query semantics;
    /// here the variant tag decides, so the order is still total and
    /// deterministic.
    pub fn total_order(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64().total_cmp(&other.as_f64())
            }
            (Value::Str(_), _) => Ordering::Greater,
            (_, Value::Str(_)) => Ordering::Less,
        }
    }

    /// Equality as used by `=` and `<>`: when either side is a string both
    /// sides compare by their string rendering, otherwise numerically after
    /// coercion.
    pub fn query_eq(&self, other: &Value) -> DbResult<bool> {
        if self.is_str() || other.is_str() {
            return Ok(self.to_string() == other.to_string());
        }
        let l = self.as_number()?;
        let r = other.as_number()?;
        Ok(l.as_f64() == r.as_f64())
    }
}

/// Parses a numeric literal: one or more digits, optionally a single decimal
/// point followed by one or more digits. No sign, no exponent.
pub fn parse_number(text: &str) -> DbResult<Value> {
    let err = || DbError::NumberFormat {
        text: text.to_string(),
    };
    if text.is_empty() {
        return Err(err());
    }
    match text.split_once('.') {
        None => {
            if !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            text.parse::<i64>().map(Value::Int).map_err(|_| err())
        }
        Some((whole, frac)) => {
            if whole.is_empty()
                || frac.is_empty()
                || !whole.bytes().all(|b| b.is_ascii_digit())
                || !frac.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(err());
            }
            text.parse::<f64>().map(Value::Float).map_err(|_| err())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // keep the trailing .0 on integral floats so 2.0 stays distinct
            // from the integer 2 in printed records
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() -> DbResult<()> {
        assert_eq!(parse_number("42")?, Value::Int(42));
        assert_eq!(parse_number("3.5")?, Value::Float(3.5));
        assert_eq!(parse_number("1000000")?, Value::Int(1_000_000));
        assert!(parse_number("").is_err());
        assert!(parse_number("4.").is_err());
        assert!(parse_number(".5").is_err());
        assert!(parse_number("1e6").is_err());
        assert!(parse_number("-3").is_err());
        assert!(parse_number("abc").is_err());
        Ok(())
    }

    #[test]
    fn test_as_number_coerces_strings() -> DbResult<()> {
        assert_eq!(Value::from("17").as_number()?, Value::Int(17));
        assert_eq!(Value::from("2.25").as_number()?, Value::Float(2.25));
        assert_eq!(Value::Int(9).as_number()?, Value::Int(9));
        assert!(matches!(
            Value::from("E15").as_number(),
            Err(DbError::NumberFormat { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_total_order() {
        assert_eq!(Value::Int(1).total_order(&Value::Int(2)), Ordering::Less);
        assert_eq!(
            Value::Int(3).total_order(&Value::Float(3.0)),
            Ordering::Equal
        );
        assert_eq!(
            Value::Float(2.5).total_order(&Value::Int(2)),
            Ordering::Greater
        );
        assert_eq!(
            Value::from("E00").total_order(&Value::from("E15")),
            Ordering::Less
        );
    }

    #[test]
    fn test_query_eq() -> DbResult<()> {
        assert!(Value::from("E15").query_eq(&Value::from("E15"))?);
        assert!(!Value::from("E15").query_eq(&Value::from("E16"))?);
        assert!(Value::Int(5).query_eq(&Value::Float(5.0))?);
        assert!(Value::from("5").query_eq(&Value::Int(5))?);
        assert!(!Value::from("abc").query_eq(&Value::Int(5))?);
        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(12).to_string(), "12");
        assert_eq!(Value::Float(2_000_000.0).to_string(), "2000000.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from("P00").to_string(), "P00");
    }
}
