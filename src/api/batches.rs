use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::database::{Filter, FindOptions};
use crate::models::batch::{AddStudentRequest, Batch, BatchDetail, CreateBatchRequest, StudentRef, UpdateBatchRequest};
use crate::models::user::User;
use crate::services::enrollment_service;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{merge_text, non_empty, parse_id, validate};

/// GET /api/batches - Every batch, student ids unresolved
#[utoipa::path(
    get,
    path = "/api/batches",
    tag = "Batches",
    responses((status = 200, description = "All batches", body = [Batch])),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_batches(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let batches = state.repo::<Batch>().find(&Filter::All, &FindOptions::default()).await?;
    Ok(HttpResponse::Ok().json(batches))
}

/// GET /api/batches/{id} - Batch with its students resolved
#[utoipa::path(
    get,
    path = "/api/batches/{id}",
    tag = "Batches",
    params(("id" = String, Path, description = "Batch id")),
    responses(
        (status = 200, description = "Batch detail", body = BatchDetail),
        (status = 404, description = "Batch not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/{id}")]
pub async fn get_batch(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Batch")?;
    let batch = state.repo::<Batch>().get(&id).await?;
    let students = state
        .repo::<User>()
        .find_by_ids(&batch.students)
        .await?
        .iter()
        .map(StudentRef::from)
        .collect();

    Ok(HttpResponse::Ok().json(BatchDetail {
        id: batch.id,
        name: batch.name,
        batch_id: batch.batch_id,
        description: batch.description,
        students,
    }))
}

/// POST /api/batches - Creates a batch with a unique batchId
#[utoipa::path(
    post,
    path = "/api/batches",
    tag = "Batches",
    request_body = CreateBatchRequest,
    responses(
        (status = 201, description = "Batch created"),
        (status = 400, description = "Validation failed or batchId taken")
    ),
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_batch(state: web::Data<AppState>, body: web::Json<CreateBatchRequest>) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    validate(&body)?;

    let batches = state.repo::<Batch>();
    let batch_id = body.batch_id.trim().to_string();
    if batches.find_one(&Filter::eq("batchId", batch_id.as_str())).await?.is_some() {
        return Err(AppError::BadRequest("Batch with this ID already exists".to_string()));
    }

    let batch = Batch::new(body.name.trim().to_string(), batch_id, non_empty(body.description));
    batches.create(&batch).await?;

    log::info!("✅ Batch created: {} ({})", batch.name, batch.batch_id);
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Batch created successfully",
        "batch": batch,
    })))
}

/// PUT /api/batches/{id} - Renames or re-describes a batch
#[put("/{id}")]
pub async fn update_batch(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateBatchRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Batch")?;
    let body = body.into_inner();

    let batch = state
        .repo::<Batch>()
        .update(&id, |batch| {
            if let Some(name) = non_empty(body.name) {
                batch.name = name;
            }
            merge_text(&mut batch.description, body.description);
            Ok(())
        })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Batch updated successfully",
        "batch": batch,
    })))
}

/// DELETE /api/batches/{id}
#[delete("/{id}")]
pub async fn delete_batch(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Batch")?;
    let batch = state.repo::<Batch>().delete(&id).await?;

    log::info!("🗑️ Batch deleted: {}", batch.batch_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Batch deleted successfully",
        "batch": batch,
    })))
}

/// POST /api/batches/{id}/students - Adds a student to a batch and notifies them
#[utoipa::path(
    post,
    path = "/api/batches/{id}/students",
    tag = "Batches",
    params(("id" = String, Path, description = "Batch id")),
    request_body = AddStudentRequest,
    responses(
        (status = 200, description = "Student added"),
        (status = 400, description = "Already a member"),
        (status = 404, description = "Batch or user not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/{id}/students")]
pub async fn add_student(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AddStudentRequest>,
) -> AppResult<HttpResponse> {
    let batch_id = parse_id(&path, "Batch")?;
    validate(&*body)?;
    let user_id = parse_id(&body.user_id, "User")?;

    let batch =
        enrollment_service::add_student_to_batch(&state.repo(), &state.repo(), &batch_id, &user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Student added to batch successfully",
        "batchId": batch.id,
        "userId": user_id,
    })))
}

/// DELETE /api/batches/{batchId}/students/{userId}
#[delete("/{batch_id}/students/{user_id}")]
pub async fn remove_student(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (raw_batch, raw_user) = path.into_inner();
    let batch_id = parse_id(&raw_batch, "Batch")?;
    let user_id = parse_id(&raw_user, "User")?;

    enrollment_service::remove_student_from_batch(&state.repo(), &state.repo(), &batch_id, &user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Student removed from batch successfully",
    })))
}
