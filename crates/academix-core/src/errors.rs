//! Application error type returned by every handler and service.
//!
//! Errors render as `{ "error": "...", "field": "..." }`. The `field` key is
//! only present when the failure can be attributed to a single input field,
//! which lets forms show the message next to the offending input.

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub field: Option<String>,
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            field: None,
        }
    }

    /// Attributes the error to a single input field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, anyhow!(message.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    /// 422 attributed to `field`.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, anyhow!(message.into())).with_field(field)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, anyhow!(message.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// Builds a 422 from validator output, reporting the first failing field.
    ///
    /// Nested fields are reported as paths (`schedules[1].end_time`).
    /// Struct-level checks name their field through a `field` param.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        match first_failure(errors, "") {
            Some((field, message)) if field.is_empty() => Self::unprocessable(anyhow!(message)),
            Some((field, message)) => Self::unprocessable(anyhow!(message)).with_field(field),
            None => Self::unprocessable(anyhow!("Invalid input")),
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}.{}", prefix, name),
    }
}

fn first_failure(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut entries: Vec<_> = errors
        .errors()
        .iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, kind) in entries {
        match kind {
            ValidationErrorsKind::Field(list) => {
                let Some(err) = list.first() else { continue };
                let field = if name == "__all__" {
                    let named = err
                        .params
                        .get("field")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default();
                    join_path(prefix, named)
                } else {
                    join_path(prefix, &name)
                };
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                return Some((field, message));
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_failure(inner, &join_path(prefix, &name)) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let path = format!("{}[{}]", join_path(prefix, &name), index);
                    if let Some(found) = first_failure(inner, &path) {
                        return Some(found);
                    }
                }
            }
        }
    }

    None
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, status = %self.status.as_u16(), "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.error.to_string(),
            field: self.field,
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let err: Error = err.into();
        if let Some(validation) = err.downcast_ref::<ValidationErrors>() {
            return AppError::from_validation(validation);
        }
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_validation_error_keeps_field() {
        let form = Form {
            name: String::new(),
        };
        let err: AppError = form.validate().unwrap_err().into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field.as_deref(), Some("name"));
        assert_eq!(err.error.to_string(), "Name is required");
    }

    #[derive(Validate)]
    struct Slot {
        #[validate(length(min = 1, message = "Day is required"))]
        day: String,
    }

    #[derive(Validate)]
    #[validate(schema(function = "check_window"))]
    struct Package {
        #[validate(nested)]
        schedules: Vec<Slot>,
        start: i32,
        end: i32,
    }

    fn check_window(package: &Package) -> Result<(), validator::ValidationError> {
        if package.end < package.start {
            let mut err = validator::ValidationError::new("range")
                .with_message("End date must be on or after start date".into());
            err.add_param("field".into(), &"end_date");
            return Err(err);
        }
        Ok(())
    }

    #[test]
    fn test_nested_validation_reports_path() {
        let package = Package {
            schedules: vec![
                Slot {
                    day: "mon".to_string(),
                },
                Slot { day: String::new() },
            ],
            start: 1,
            end: 2,
        };
        let err = AppError::from_validation(&package.validate().unwrap_err());
        assert_eq!(err.field.as_deref(), Some("schedules[1].day"));
        assert_eq!(err.error.to_string(), "Day is required");
    }

    #[test]
    fn test_struct_level_validation_uses_field_param() {
        let package = Package {
            schedules: vec![],
            start: 5,
            end: 2,
        };
        let err = AppError::from_validation(&package.validate().unwrap_err());
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field.as_deref(), Some("end_date"));
    }

    #[test]
    fn test_generic_error_is_internal() {
        let err: AppError = anyhow!("boom").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.field.is_none());
    }

    #[test]
    fn test_with_field() {
        let err = AppError::conflict("Code already exists").with_field("code");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.field.as_deref(), Some("code"));
    }

    #[test]
    fn test_error_response_omits_missing_field() {
        let body = ErrorResponse {
            error: "Not found".to_string(),
            field: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"Not found"}"#);
    }
}
