use actix_web::{post, web, HttpResponse};

use crate::models::user::{AuthResponse, LoginRequest, SignupRequest, User};
use crate::services::auth_service::{self, Claims};
use crate::state::AppState;
use crate::utils::error::AppResult;

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failed or email already registered")
    )
)]
#[post("/signup")]
pub async fn signup(state: web::Data<AppState>, body: web::Json<SignupRequest>) -> AppResult<HttpResponse> {
    log::info!("📝 POST /api/auth/signup - email: {}", body.email);

    let response =
        auth_service::signup(&state.repo::<User>(), &state.jwt, state.bcrypt_cost, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
#[post("/login")]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> AppResult<HttpResponse> {
    log::info!("🔐 POST /api/auth/login - email: {}", body.email);

    let response = auth_service::login(&state.repo::<User>(), &state.jwt, body.into_inner()).await?;
    log::info!("✅ Login successful: {}", response.user.email);
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid", body = Claims),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = []))
)]
/// Mounted as a resource wrapped in `AuthMiddleware`; the rest of the scope is public.
pub async fn verify_token(claims: web::ReqData<Claims>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "valid": true,
        "user": claims.into_inner()
    }))
}
