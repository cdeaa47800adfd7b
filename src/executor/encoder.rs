//! Result Encoder
//!
//! Flattens a result set into one text blob:
//!
//! ```text
//! zero rows              ->  ""
//! one row, one column    ->  "42"
//! anything else          ->  "1|alice\n2|bob"
//! ```
//!
//! The encoding is lossy. A one-column row whose value contains no `|` looks
//! the same as a bare scalar, so clients cannot recover the original shape.

use crate::storage::Row;
use std::fmt::Write;

/// Column separator within a row.
pub const COLUMN_SEPARATOR: char = '|';

/// Row separator.
pub const ROW_SEPARATOR: char = '\n';

/// Encodes rows as text. See the module docs for the rules.
pub fn encode(rows: &[Row]) -> String {
    match rows {
        [] => String::new(),
        [row] if row.len() == 1 => row[0].to_string(),
        _ => {
            let mut out = String::new();
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    out.push(ROW_SEPARATOR);
                }
                for (j, value) in row.iter().enumerate() {
                    if j > 0 {
                        out.push(COLUMN_SEPARATOR);
                    }
                    // Writing into a String cannot fail.
                    let _ = write!(out, "{}", value);
                }
            }
            out
        }
    }
}
