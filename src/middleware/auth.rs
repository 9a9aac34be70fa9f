use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use academix_auth::{Claims, verify_token};
use academix_core::AppError;
use academix_models::{AcademicId, Role, UserId};

use crate::state::AppState;

/// Any caller holding a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0.user_id()
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn is_system_admin(&self) -> bool {
        self.0.role == Role::SystemAdmin
    }

    pub fn academic_id(&self) -> Option<AcademicId> {
        self.0.academic_id
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let claims = verify_token(token, &state.jwt_config)?;
        let user = AuthUser(claims);

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// A system administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_system_admin() {
            return Err(AppError::forbidden("System admin access required"));
        }
        Ok(AdminUser(user))
    }
}

/// An academy administrator, with the tenant every query is scoped to.
#[derive(Debug, Clone)]
pub struct AcademicUser {
    pub user: AuthUser,
    pub academic_id: AcademicId,
}

impl AcademicUser {
    pub fn from_user(user: AuthUser) -> Result<Self, AppError> {
        match (user.role(), user.academic_id()) {
            (Role::AcademicAdmin, Some(academic_id)) => Ok(Self { user, academic_id }),
            _ => Err(AppError::forbidden("Academy admin access required")),
        }
    }
}

impl FromRequestParts<AppState> for AcademicUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        AcademicUser::from_user(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn claims(role: Role, academic_id: Option<AcademicId>) -> Claims {
        Claims {
            sub: UserId::new().to_string(),
            email: "owner@club.com".to_string(),
            role,
            academic_id,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_academic_user_requires_tenant() {
        let academic_id = AcademicId::new();
        let user = AuthUser(claims(Role::AcademicAdmin, Some(academic_id)));
        assert_eq!(AcademicUser::from_user(user).unwrap().academic_id, academic_id);

        let orphan = AuthUser(claims(Role::AcademicAdmin, None));
        assert_eq!(AcademicUser::from_user(orphan).unwrap_err().status.as_u16(), 403);
    }

    #[test]
    fn test_system_admin_is_not_an_academic_user() {
        let admin = AuthUser(claims(Role::SystemAdmin, None));
        assert!(admin.is_system_admin());
        assert!(AcademicUser::from_user(admin).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let (parts, _) = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");

        let (parts, _) = Request::builder()
            .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts).unwrap_err().status.as_u16(), 401);

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(bearer_token(&parts).is_err());
    }
}
