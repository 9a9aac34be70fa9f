use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use academix_core::AppError;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// JSON body that has been deserialized and validated. Failures render as
/// `{ error, field }` so forms can point at the offending input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value
            .validate()
            .map_err(|errors| AppError::from_validation(&errors))?;

        Ok(ValidatedJson(value))
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        )),
        JsonRejection::JsonSyntaxError(_) => AppError::bad_request(anyhow!("Malformed JSON body")),
        JsonRejection::JsonDataError(err) => data_error(&err.body_text()),
        _ => AppError::bad_request(anyhow!("Invalid request body")),
    }
}

/// Turns a deserialization failure into a field-level error.
///
/// Messages look like `missing field `name`` for root fields and
/// `schedules[0]: invalid type: ...` for nested ones.
fn data_error(text: &str) -> AppError {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);

    let (path, reason) = match detail.split_once(": ") {
        Some((path, reason)) if !path.contains(' ') => (Some(path), reason),
        _ => (None, detail),
    };

    if let Some(missing) = reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        let field = match path {
            Some(path) => format!("{}.{}", path, missing),
            None => missing.to_string(),
        };
        return AppError::invalid_field(field.clone(), format!("{} is required", field));
    }

    match path {
        Some(path) => AppError::invalid_field(path, format!("{} has an invalid value", path)),
        None => AppError::unprocessable(anyhow!("Invalid request body")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_missing_root_field() {
        let err = data_error(&format!("{}missing field `name` at line 1 column 2", DATA_ERROR_PREFIX));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field.as_deref(), Some("name"));
        assert_eq!(err.error.to_string(), "name is required");
    }

    #[test]
    fn test_missing_nested_field() {
        let err = data_error(&format!(
            "{}schedules[1]: missing field `day` at line 1 column 80",
            DATA_ERROR_PREFIX
        ));
        assert_eq!(err.field.as_deref(), Some("schedules[1].day"));
    }

    #[test]
    fn test_invalid_value_names_the_path() {
        let err = data_error(&format!(
            "{}price: invalid type: string \"free\", expected f64 at line 1 column 20",
            DATA_ERROR_PREFIX
        ));
        assert_eq!(err.field.as_deref(), Some("price"));
        assert_eq!(err.error.to_string(), "price has an invalid value");
    }

    #[test]
    fn test_unrecognized_message() {
        let err = data_error("something else entirely");
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.field.is_none());
    }
}
