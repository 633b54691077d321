// ww3nml/src/value.rs

//! Scalar values as they appear on the right-hand side of a WW3 namelist line.

use crate::validators::Ww3Date;
use std::fmt;

/// A value that can be assigned to a namelist variable.
#[derive(Debug, Clone, PartialEq)]
pub enum NmlValue {
    /// Integer literal
    Integer(i64),

    /// Real literal, always rendered with a decimal point
    Real(f64),

    /// Logical literal, rendered `T`/`F`
    Logical(bool),

    /// Character literal, rendered single-quoted
    Character(String),

    /// Canonical `'YYYYMMDD HHMMSS'` date
    Date(Ww3Date),

    /// Whitespace separated record, e.g. `INBND_POINT(1) = 1 1 F`
    Record(Vec<NmlValue>),
}

impl NmlValue {
    /// Format this value as it must appear in a WW3 namelist.
    pub fn to_fortran_string(&self) -> String {
        match self {
            NmlValue::Integer(i) => i.to_string(),
            NmlValue::Real(f) => format_real(*f),
            NmlValue::Logical(b) => if *b { "T" } else { "F" }.to_string(),
            NmlValue::Character(s) => quote(s),
            NmlValue::Date(d) => quote(&d.to_string()),
            NmlValue::Record(items) => items
                .iter()
                .map(NmlValue::to_fortran_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NmlValue::Integer(_) => "integer",
            NmlValue::Real(_) => "real",
            NmlValue::Logical(_) => "logical",
            NmlValue::Character(_) => "character",
            NmlValue::Date(_) => "date",
            NmlValue::Record(_) => "record",
        }
    }
}

impl fmt::Display for NmlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fortran_string())
    }
}

fn format_real(value: f64) -> String {
    // Reals must always carry a decimal point so Fortran reads them as REAL
    let s = value.to_string();
    if s.contains('.') || s.contains('e') || s.contains('E') || !value.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl From<bool> for NmlValue {
    fn from(value: bool) -> Self {
        NmlValue::Logical(value)
    }
}

impl From<f64> for NmlValue {
    fn from(value: f64) -> Self {
        NmlValue::Real(value)
    }
}

impl From<&str> for NmlValue {
    fn from(value: &str) -> Self {
        NmlValue::Character(value.to_string())
    }
}

impl From<String> for NmlValue {
    fn from(value: String) -> Self {
        NmlValue::Character(value)
    }
}

impl From<&String> for NmlValue {
    fn from(value: &String) -> Self {
        NmlValue::Character(value.clone())
    }
}

impl From<Ww3Date> for NmlValue {
    fn from(value: Ww3Date) -> Self {
        NmlValue::Date(value)
    }
}

impl From<&Ww3Date> for NmlValue {
    fn from(value: &Ww3Date) -> Self {
        NmlValue::Date(*value)
    }
}

macro_rules! integer_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for NmlValue {
                fn from(value: $ty) -> Self {
                    NmlValue::Integer(value as i64)
                }
            }
        )+
    };
}

integer_value!(i32, i64, u8, u32, u64, usize);

impl<T: Into<NmlValue>> From<Vec<T>> for NmlValue {
    fn from(values: Vec<T>) -> Self {
        NmlValue::Record(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_literals() {
        assert_eq!(NmlValue::from(true).to_fortran_string(), "T");
        assert_eq!(NmlValue::from(false).to_fortran_string(), "F");
    }

    #[test]
    fn test_reals_keep_decimal_point() {
        assert_eq!(NmlValue::from(240.0).to_fortran_string(), "240.0");
        assert_eq!(NmlValue::from(1.1).to_fortran_string(), "1.1");
        assert_eq!(NmlValue::from(-0.1).to_fortran_string(), "-0.1");
        assert_eq!(NmlValue::from(0.0).to_fortran_string(), "0.0");
    }

    #[test]
    fn test_strings_single_quoted_case_preserved() {
        assert_eq!(NmlValue::from("HS Dir").to_fortran_string(), "'HS Dir'");
        assert_eq!(NmlValue::from("it's").to_fortran_string(), "'it''s'");
    }

    #[test]
    fn test_record_joins_with_spaces() {
        let record = NmlValue::Record(vec![1u32.into(), 2u32.into(), false.into()]);
        assert_eq!(record.to_fortran_string(), "1 2 F");
    }

    #[test]
    fn test_integers() {
        assert_eq!(NmlValue::from(3u8).to_fortran_string(), "3");
        assert_eq!(NmlValue::from(-7i64).to_fortran_string(), "-7");
    }
}
