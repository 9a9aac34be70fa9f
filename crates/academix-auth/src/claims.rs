//! JWT claim structures.

use academix_core::AppError;
use academix_models::ids::{AcademicId, UserId};
use academix_models::value_types::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Tenant the user administers (None for system admins)
    pub academic_id: Option<AcademicId>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }
}

/// Refresh token claims. `jti` keeps two tokens issued in the same second distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"9a4f6c64-7b4c-4c71-9d36-0d5f2f5d6c11","email":"owner@club.com","role":"academic_admin","academic_id":"5b1f1c8e-2f0c-4d4e-9a43-7f0f6fd7a001","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.role, Role::AcademicAdmin);
        assert!(claims.academic_id.is_some());
        assert!(claims.user_id().is_ok());
    }

    #[test]
    fn test_claims_invalid_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            email: "admin@academix.io".to_string(),
            role: Role::SystemAdmin,
            academic_id: None,
            exp: 0,
            iat: 0,
        };
        let err = claims.user_id().unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }
}
