use std::fmt;

/// Resolved content of a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        Self::Real(f)
    }
}

impl From<&f64> for CellValue {
    fn from(f: &f64) -> Self {
        Self::Real(*f)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        Self::Integer(i.into())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<&i64> for CellValue {
    fn from(i: &i64) -> Self {
        Self::Integer(*i)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl CellValue {
    /// Classifies raw user input: whole integers first, then reals, then text.
    ///
    /// Formula input (leading `=`) is not handled here; the sheet routes it to
    /// the evaluator before it ever becomes a value.
    pub fn from_input(input: &str) -> Self {
        if input.is_empty() {
            return Self::Empty;
        }
        if let Ok(i) = input.parse::<i64>() {
            return Self::Integer(i);
        }
        match input.parse::<f64>() {
            Ok(f) if input.bytes().any(|b| b.is_ascii_digit()) => Self::Real(f),
            _ => Self::Text(input.to_string()),
        }
    }

    pub fn is_num(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Real(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(f) => Some(*f),
            Self::Empty | Self::Text(_) => None,
        }
    }

    /// Numeric view used by formulas. Text and empty cells read as zero.
    pub fn as_f64(&self) -> f64 {
        self.as_num().unwrap_or_default()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }
}
