//! Cell-level parsing of pivoted sheet values.

mod date;
mod numeric;

pub use date::{EXCEL_SERIAL_MAX, EXCEL_SERIAL_MIN, YEAR_RANGE, parse_date};
pub use numeric::{NumericCell, is_missing_token, parse_numeric};
