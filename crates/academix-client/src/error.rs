use serde::Deserialize;
use thiserror::Error;

/// Why a server action failed. API failures keep the `field` the server
/// attributed the error to, so forms can show it next to the input.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        field: Option<String>,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("No {resource} with id {id} in the store")]
    Missing { resource: &'static str, id: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    field: Option<String>,
}

impl ActionError {
    /// Decodes a non-2xx body. Bodies that are not `{ error, field? }` are
    /// kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => ActionError::Api {
                status,
                message: parsed.error,
                field: parsed.field,
            },
            Err(_) => ActionError::Api {
                status,
                message: if body.trim().is_empty() {
                    format!("Request failed with status {}", status)
                } else {
                    body.trim().to_string()
                },
                field: None,
            },
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ActionError::Api { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ActionError::Api { status, .. } => Some(*status),
            ActionError::Transport(e) => e.status().map(|s| s.as_u16()),
            ActionError::Missing { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_field_errors() {
        let err = ActionError::from_response(
            422,
            r#"{"error":"End date must be after the start date","field":"end_date"}"#,
        );
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.field(), Some("end_date"));
        assert_eq!(err.to_string(), "End date must be after the start date");
    }

    #[test]
    fn test_plain_text_body() {
        let err = ActionError::from_response(502, "Bad Gateway");
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "Bad Gateway");

        let err = ActionError::from_response(500, "");
        assert_eq!(err.to_string(), "Request failed with status 500");
    }
}
