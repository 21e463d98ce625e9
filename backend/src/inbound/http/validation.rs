//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes an `invalid_request` error whose details name the
//! offending field and a stable machine-readable code.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Error, LoginValidationError, Price, RecipeValidationError, TaxonomyItemId,
    UserValidationError,
};

/// Minimum password length accepted on registration and password change.
pub(crate) const PASSWORD_MIN_CHARS: usize = 5;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    Blank,
    TooLong,
    TooShort,
    InvalidEmail,
    InvalidNumber,
    OutOfRange,
    TooPrecise,
    InvalidIdList,
    InvalidFlag,
    MissingField,
    ReadOnly,
    TooLarge,
    MalformedMultipart,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Blank => "blank",
            ErrorCode::TooLong => "too_long",
            ErrorCode::TooShort => "too_short",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::TooPrecise => "too_precise",
            ErrorCode::InvalidIdList => "invalid_id_list",
            ErrorCode::InvalidFlag => "invalid_flag",
            ErrorCode::MissingField => "missing_field",
            ErrorCode::ReadOnly => "read_only",
            ErrorCode::TooLarge => "too_large",
            ErrorCode::MalformedMultipart => "malformed_multipart",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyEmail => ("email", ErrorCode::Blank),
        UserValidationError::InvalidEmail => ("email", ErrorCode::InvalidEmail),
        UserValidationError::EmailTooLong { .. } => ("email", ErrorCode::TooLong),
        UserValidationError::NameTooLong { .. } => ("name", ErrorCode::TooLong),
        UserValidationError::EmptyPassword => ("password", ErrorCode::Blank),
    };
    field_error(FieldName::new(field), code, err.to_string())
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(FieldName::new(field), ErrorCode::Blank, err.to_string())
}

pub(crate) fn map_recipe_validation_error(err: RecipeValidationError) -> Error {
    let (field, code) = match err {
        RecipeValidationError::EmptyTitle => ("title", ErrorCode::Blank),
        RecipeValidationError::TitleTooLong { .. } => ("title", ErrorCode::TooLong),
        RecipeValidationError::NegativeTime | RecipeValidationError::TimeTooLarge => {
            ("time_minutes", ErrorCode::OutOfRange)
        }
        RecipeValidationError::InvalidPrice => ("price", ErrorCode::InvalidNumber),
        RecipeValidationError::PriceTooPrecise => ("price", ErrorCode::TooPrecise),
        RecipeValidationError::PriceOutOfRange => ("price", ErrorCode::OutOfRange),
        RecipeValidationError::LinkTooLong { .. } => ("link", ErrorCode::TooLong),
    };
    field_error(FieldName::new(field), code, err.to_string())
}

/// Enforce the wire-level password policy.
pub(crate) fn check_password_policy(password: &str) -> Result<(), Error> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(field_error(
            FieldName::new("password"),
            ErrorCode::TooShort,
            format!("password must be at least {PASSWORD_MIN_CHARS} characters"),
        ));
    }
    Ok(())
}

/// Parse a comma-separated id list such as `1,2,3`. Blank input is empty.
pub(crate) fn parse_id_list(
    raw: Option<&str>,
    field: FieldName,
) -> Result<BTreeSet<TaxonomyItemId>, Error> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(BTreeSet::new());
    };
    raw.split(',')
        .map(|part| {
            part.trim().parse::<i64>().map(TaxonomyItemId::new).map_err(|_| {
                field_error(
                    field,
                    ErrorCode::InvalidIdList,
                    format!("{} must be a comma-separated list of ids", field.as_str()),
                )
            })
        })
        .collect()
}

/// Parse a `1/0/true/false` query flag. Absent means false.
pub(crate) fn parse_flag(raw: Option<&str>, field: FieldName) -> Result<bool, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") => Ok(true),
        Some("0") => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(_) => Err(field_error(
            field,
            ErrorCode::InvalidFlag,
            format!("{} must be one of 1, 0, true, false", field.as_str()),
        )),
    }
}

/// Parse a numeric path id. Anything else addresses no resource.
pub(crate) fn parse_path_id(raw: &str, resource: &str) -> Result<i64, Error> {
    raw.parse::<i64>()
        .map_err(|_| Error::not_found(format!("{resource} {raw} not found")))
}

/// Price as sent by clients: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    pub(crate) fn parse(&self) -> Result<Price, Error> {
        let parsed = match self {
            Self::Number(number) => Price::parse(&number.to_string()),
            Self::Text(text) => Price::parse(text),
        };
        parsed.map_err(map_recipe_validation_error)
    }
}
