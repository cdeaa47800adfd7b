//! Result Set Values
//!
//! Rows come back from the store as heterogeneous scalars. Each one is copied
//! out of the statement into an owned `Value` so the connection can be closed
//! before encoding.
//!
//! ## Text Rendering
//!
//! | Store type | Text                                             |
//! |------------|--------------------------------------------------|
//! | NULL       | empty string                                     |
//! | INTEGER    | decimal, no decoration                           |
//! | REAL       | 15 significant digits, `%!.15g` style            |
//! | TEXT       | as stored                                        |
//! | BLOB       | lossy UTF-8                                      |
//!
//! REAL follows the store's own REAL to TEXT cast: trailing zeros are
//! dropped but `.0` is kept, and magnitudes outside `1e-4..1e15` switch to
//! exponent form with at least two exponent digits (`1.0e+20`, `1.0e-07`).

use rusqlite::types::ValueRef;
use std::fmt;

/// A single scalar read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => fmt_real(*r, f),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

/// Significant digits kept when rendering a REAL.
const REAL_PRECISION: i32 = 15;

fn fmt_real(r: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if r.is_nan() {
        return f.write_str("NaN");
    }
    if r.is_infinite() {
        return f.write_str(if r > 0.0 { "Inf" } else { "-Inf" });
    }

    // Round to the kept precision first; the exponent must reflect the rounding.
    let scientific = format!("{:.*e}", (REAL_PRECISION - 1) as usize, r);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= REAL_PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(
            f,
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (REAL_PRECISION - 1 - exponent) as usize;
        f.write_str(&trim_fraction(&format!("{:.*}", decimals, r)))
    }
}

/// Drops trailing fractional zeros, keeping at least one digit after the point.
fn trim_fraction(digits: &str) -> String {
    match digits.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", digits),
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

/// One row of a result set, in column order.
pub type Row = Vec<Value>;

/// The fully materialized output of a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_empty() {
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_integer() {
        assert_eq!(Value::Integer(5).to_string(), "5");
        assert_eq!(Value::Integer(-42).to_string(), "-42");
    }

    #[test]
    fn test_real() {
        assert_eq!(Value::Real(5.0).to_string(), "5.0");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(Value::Real(0.1).to_string(), "0.1");
        assert_eq!(Value::Real(-3.0).to_string(), "-3.0");
        assert_eq!(Value::Real(0.0).to_string(), "0.0");
        assert_eq!(Value::Real(1.0 / 3.0).to_string(), "0.333333333333333");
        assert_eq!(Value::Real(f64::INFINITY).to_string(), "Inf");
        assert_eq!(Value::Real(f64::NEG_INFINITY).to_string(), "-Inf");
    }

    #[test]
    fn test_real_exponent_form() {
        assert_eq!(Value::Real(1e20).to_string(), "1.0e+20");
        assert_eq!(Value::Real(1e-7).to_string(), "1.0e-07");
        assert_eq!(Value::Real(1e300).to_string(), "1.0e+300");
        assert_eq!(Value::Real(-2.5e-10).to_string(), "-2.5e-10");
        assert_eq!(Value::Real(1e15).to_string(), "1.0e+15");
    }

    #[test]
    fn test_real_fixed_range_edges() {
        assert_eq!(Value::Real(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Real(123456789012345.0).to_string(), "123456789012345.0");
        // Rounds up to 15 digits, which moves it into exponent form.
        assert_eq!(Value::Real(999999999999999.9).to_string(), "1.0e+15");
    }

    #[test]
    fn test_text_and_blob() {
        assert_eq!(Value::Text("alice".into()).to_string(), "alice");
        assert_eq!(Value::Blob(b"raw".to_vec()).to_string(), "raw");
        assert_eq!(Value::Blob(vec![0xff]).to_string(), "\u{FFFD}");
    }

    #[test]
    fn test_from_value_ref() {
        assert_eq!(Value::from(ValueRef::Null), Value::Null);
        assert_eq!(Value::from(ValueRef::Integer(7)), Value::Integer(7));
        assert_eq!(Value::from(ValueRef::Real(1.5)), Value::Real(1.5));
        assert_eq!(
            Value::from(ValueRef::Text(b"hi")),
            Value::Text("hi".into())
        );
        assert_eq!(
            Value::from(ValueRef::Blob(&[1, 2])),
            Value::Blob(vec![1, 2])
        );
    }
}
