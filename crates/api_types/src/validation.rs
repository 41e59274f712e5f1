//! Input normalization and validation helpers shared by the request bodies.
//!
//! Request bodies derive [`validator::Validate`]; [`field_errors`] flattens
//! the resulting error tree into one list so a client receives every failing
//! field at once.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::{Money, auth::Role, budget::BudgetStatus};

/// A single failing field, `field` uses the JSON (camelCase) path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Flattens nested validation errors (`items[0].description`) sorted by path.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            camel_case(field)
        } else {
            format!("{prefix}.{}", camel_case(field))
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|err| FieldError {
                    field: path.clone(),
                    message: message_for(err),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn message_for(err: &ValidationError) -> String {
    err.message
        .as_ref()
        .map(|message| message.to_string())
        .unwrap_or_else(|| format!("invalid value ({})", err.code))
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Deserializes a string and trims it. Missing values become empty strings
/// when combined with `#[serde(default)]`.
pub fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Trims an optional string; blank strings become `None`.
pub fn trimmed_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Like [`double_option`] for text: trimmed, and blank counts as `null`.
pub fn double_option_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error> {
    trimmed_opt(deserializer).map(Some)
}

pub(crate) fn non_negative(value: &Money) -> Result<(), ValidationError> {
    if value.is_negative() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some(Cow::Borrowed("must be a value greater than or equal to 0"));
        return Err(err);
    }
    Ok(())
}

pub(crate) fn valid_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<BudgetStatus>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("status");
        err.message = Some(Cow::Borrowed(
            "status must be one of EM_NEGOCIACAO, ACEITO, RECUSADO",
        ));
        err
    })
}

pub(crate) fn valid_role(value: &str) -> Result<(), ValidationError> {
    value.parse::<Role>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("role");
        err.message = Some(Cow::Borrowed("role must be one of ADMIN, FUNCIONARIA"));
        err
    })
}
