//! Decide whether a tabular column should be treated as text.
//!
//! - A column declared as `String` is text.
//! - A column of dynamically-typed values is text iff every value is null or a
//!   string (`is_text_values`). An untyped polars column (`Null` dtype) only
//!   holds nulls, so it is text too, as is an empty untyped column.
//! - Every other declared dtype (numeric, boolean, temporal, categorical,
//!   nested) is not text, whatever it holds.

use polars::prelude::{AnyValue, DataType, Series};

pub fn is_string_series(s: &Series) -> bool {
    matches!(s.dtype(), DataType::String | DataType::Null)
}

/// Object-column rule: every value is null or a string. Empty input is text.
pub fn is_text_values(values: &[AnyValue<'_>]) -> bool {
    values
        .iter()
        .all(|v| matches!(v, AnyValue::Null | AnyValue::String(_) | AnyValue::StringOwned(_)))
}
