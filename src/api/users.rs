use actix_web::{delete, post, web, HttpResponse};

use crate::models::user::{DefaultPasswordRequest, ResetPasswordRequest, User};
use crate::services::auth_service::{self, Claims};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::validation::{parse_id, validate};

#[utoipa::path(
    post,
    path = "/api/users/{userId}/reset-password",
    tag = "Users",
    params(("userId" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Temporary password generated"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/{user_id}/reset-password")]
pub async fn reset_to_temporary(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user_id = parse_id(&path, "User")?;
    log::info!("🔑 POST /api/users/{}/reset-password", user_id);
    auth_service::require_admin(&state.repo::<User>(), &claims).await?;

    let temporary = auth_service::generate_temporary_password();
    let user = auth_service::set_password(&state.repo::<User>(), state.bcrypt_cost, &user_id, temporary.clone()).await?;

    // no mail transport is configured, so the admin relays the password to the owner
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password reset successfully. A temporary password has been generated.",
        "userEmail": user.email,
        "temporaryPassword": temporary,
    })))
}

#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    tag = "Users",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    validate(&body)?;
    let user_id = parse_id(&body.user_id, "User")?;
    auth_service::require_self_or_admin(&state.repo::<User>(), &claims, &user_id).await?;

    let user = auth_service::set_password(&state.repo::<User>(), state.bcrypt_cost, &user_id, body.new_password).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password reset successfully",
        "userEmail": user.email,
    })))
}

#[post("/reset-default-password")]
pub async fn reset_default_password(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<DefaultPasswordRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    validate(&body)?;
    let user_id = parse_id(&body.user_id, "User")?;
    auth_service::require_self_or_admin(&state.repo::<User>(), &claims, &user_id).await?;

    let user =
        auth_service::set_password(&state.repo::<User>(), state.bcrypt_cost, &user_id, body.default_password).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password reset to default successfully",
        "userEmail": user.email,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/users/{userId}",
    tag = "Users",
    params(("userId" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{user_id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user_id = parse_id(&path, "User")?;
    log::info!("🗑️ DELETE /api/users/{}", user_id);
    auth_service::require_self_or_admin(&state.repo::<User>(), &claims, &user_id).await?;

    let deleted = state.repo::<User>().delete(&user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User deleted successfully",
        "deletedUser": { "id": deleted.id, "email": deleted.email }
    })))
}
