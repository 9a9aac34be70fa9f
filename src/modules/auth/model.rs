pub use academix_models::auth::{
    LoginRequest, LoginResponse, RefreshTokenRequest, TokenPair, User,
};
