//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize the
//! decoding of stored text (ids, dates, amounts) so every record type enforces
//! the same invariants.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, dates};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| EngineError::InvalidId(format!("invalid {label} id: {value}")))
}

/// Parse an optional UUID; empty strings count as absent.
pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_uuid(v, label).map(Some),
        None => Ok(None),
    }
}

/// Parse a stored date of any supported shape.
pub(crate) fn parse_date(value: &str, label: &str) -> ResultEngine<NaiveDate> {
    dates::parse_date_key(value)
        .ok_or_else(|| EngineError::InvalidDate(format!("invalid {label}: {value}")))
}

/// Parse an optional stored date; empty strings count as absent.
pub(crate) fn parse_optional_date(
    value: Option<&str>,
    label: &str,
) -> ResultEngine<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v, label).map(Some),
        None => Ok(None),
    }
}

/// Amounts of transactions, budgets and series are stored unsigned.
pub(crate) fn non_negative_amount(amount_minor: i64, label: &str) -> ResultEngine<MoneyCents> {
    if amount_minor < 0 {
        return Err(EngineError::InvalidAmount(format!(
            "{label} amount must be >= 0, got {amount_minor}"
        )));
    }
    Ok(MoneyCents::new(amount_minor))
}

/// Trimmed, non-empty user id.
pub(crate) fn normalize_user_id(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Decode rows, dropping (and logging) the ones that fail.
///
/// Reports favour a degraded result over a hard failure, so a single corrupt
/// row never aborts the computation.
pub(crate) fn decode_lenient<M, T, F>(rows: Vec<M>, label: &str, mut decode: F) -> Vec<T>
where
    F: FnMut(M) -> ResultEngine<T>,
{
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match decode(row) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("skipping malformed {label} row: {err}");
                None
            }
        })
        .collect();
    if decoded.len() != total {
        tracing::debug!("decoded {} of {total} {label} rows", decoded.len());
    }
    decoded
}
