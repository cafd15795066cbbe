use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, ProfileResponseDto, RegisterRequestDto,
    RegisterResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<RegisterResponseDto>)> {
    dto.validate().map_err(AppError::from)?;

    let user = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponseDto {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = LoginResponseDto),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<LoginResponseDto>> {
    dto.validate().map_err(AppError::from)?;

    let (token, user) = service.login(dto).await?;
    Ok(Json(LoginResponseDto {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user profile", body = ProfileResponseDto),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn get_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ProfileResponseDto>> {
    let user = service.profile(user.id).await?;
    Ok(Json(ProfileResponseDto { user }))
}
