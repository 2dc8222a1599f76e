//! Cell coordinates and their A1-style labels.
//!
//! Coordinates are zero based: `(0, 0)` is `A1`, `(2, 27)` is `AB3`.

use std::fmt;

/// A `(row, col)` pair. Orders row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Column index to letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn column_label(col: usize) -> String {
        let mut label = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            label.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        label
    }

    pub fn label(&self) -> String {
        format!("{}{}", Self::column_label(self.col), self.row as u128 + 1)
    }

    /// Parses an upper-case A1 label. Lower case, leading zeros in the row
    /// number, row `0` and surrounding characters are all rejected.
    pub fn parse_label(label: &str) -> Option<Self> {
        let split = label.find(|c: char| !c.is_ascii_uppercase())?;
        let (letters, digits) = label.split_at(split);
        if letters.is_empty()
            || digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut col = 0usize;
        for b in letters.bytes() {
            col = col.checked_mul(26)?.checked_add((b - b'A') as usize + 1)?;
        }
        let row = digits.parse::<usize>().ok()?;

        Some(Self::new(row - 1, col - 1))
    }

    /// The corners of the rectangle spanned by `self` and `other`.
    pub fn normalize(self, other: Self) -> (Self, Self) {
        (
            Self::new(self.row.min(other.row), self.col.min(other.col)),
            Self::new(self.row.max(other.row), self.col.max(other.col)),
        )
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
