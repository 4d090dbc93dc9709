use actix_web::{get, post, put, web, HttpResponse};

use crate::database::{Filter, FindOptions, SortOrder};
use crate::models::payment::{CreatePaymentRequest, Payment, PaymentStatus, PaymentType, UpdatePaymentStatusRequest};
use crate::models::user::User;
use crate::services::auth_service::Claims;
use crate::services::notification_service::notify_user;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::validation::{non_empty, parse_id, validate};

/// GET /api/payments - Caller's payments, newest first
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    responses((status = 200, description = "Caller's payments", body = [Payment])),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_payments(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> AppResult<HttpResponse> {
    let payments = state
        .repo::<Payment>()
        .find(
            &Filter::eq("userId", claims.user_id.as_str()),
            &FindOptions::sorted("date", SortOrder::Descending),
        )
        .await?;
    Ok(HttpResponse::Ok().json(payments))
}

/// POST /api/payments - Records a pending payment for the caller
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded as pending", body = Payment),
        (status = 400, description = "Invalid type or amount")
    ),
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_payment(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<CreatePaymentRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let payment_type: PaymentType = body.payment_type.parse()?;
    validate(&body)?;

    let payment = Payment::new(
        &claims.user_id,
        body.amount,
        payment_type,
        non_empty(body.description),
        non_empty(body.transaction_id),
    );
    state.repo::<Payment>().create(&payment).await?;

    let users = state.repo::<User>();
    if users.find_by_id(&claims.user_id).await?.is_some() {
        let message = format!("New {} of ₹{} recorded. Status: {}", payment.payment_type, payment.amount, payment.status);
        notify_user(&users, &claims.user_id, &message).await?;
    }

    log::info!("💰 Payment {} recorded: {} {}", payment.id, payment.payment_type, payment.amount);
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Payment record created successfully",
        "payment": payment,
    })))
}

/// PUT /api/payments/{id}/status - Moves a payment to pending, completed or failed
#[utoipa::path(
    put,
    path = "/api/payments/{id}/status",
    tag = "Payments",
    params(("id" = String, Path, description = "Payment id")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Payment),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = []))
)]
#[put("/{id}/status")]
pub async fn update_payment_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePaymentStatusRequest>,
) -> AppResult<HttpResponse> {
    let status: PaymentStatus = body.status.parse()?;
    let id = parse_id(&path, "Payment")?;

    let payment = state
        .repo::<Payment>()
        .update(&id, |payment| {
            payment.status = status;
            Ok(())
        })
        .await?;

    let users = state.repo::<User>();
    if users.find_by_id(&payment.user_id).await?.is_some() {
        let message = format!("Your {} of ₹{} has been {}", payment.payment_type, payment.amount, status);
        notify_user(&users, &payment.user_id, &message).await?;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Payment status updated successfully",
        "payment": payment,
    })))
}
