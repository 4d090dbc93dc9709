use actix_multipart::Multipart;
use actix_web::{get, post, put, web, HttpResponse};
use chrono::Utc;

use crate::database::{Filter, FindOptions, SortOrder};
use crate::models::assignment::{Assignment, AssignmentView, CreateAssignmentRequest, GradeSubmissionRequest};
use crate::models::batch::Batch;
use crate::models::course::Course;
use crate::models::user::User;
use crate::services::auth_service::Claims;
use crate::services::notification_service::{notify_user, notify_users};
use crate::services::reference_service::ReferenceIndex;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::multipart::read_form;
use crate::utils::validation::{merge_text, merge_value, non_empty, parse_date, parse_id, validate};

/// GET /api/assignments - Assignments of the caller's batches and courses, by deadline
#[utoipa::path(
    get,
    path = "/api/assignments",
    tag = "Assignments",
    responses((status = 200, description = "Assignments with the caller's submission status", body = [AssignmentView])),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_assignments(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> AppResult<HttpResponse> {
    let user = state.repo::<User>().get(&claims.user_id).await?;

    let filter = Filter::Or(vec![
        Filter::is_in("batchId", user.batches.iter().map(String::as_str)),
        Filter::is_in("courseId", user.courses.iter().map(String::as_str)),
    ]);
    let assignments = state
        .repo::<Assignment>()
        .find(&filter, &FindOptions::sorted("deadline", SortOrder::Ascending))
        .await?;

    let refs = ReferenceIndex::load(
        &state.repo(),
        &state.repo(),
        assignments.iter().filter_map(|a| a.batch_id.as_ref()),
        assignments.iter().filter_map(|a| a.course_id.as_ref()),
    )
    .await?;

    let views: Vec<AssignmentView> = assignments
        .into_iter()
        .map(|a| AssignmentView {
            submission_status: a.status_for(&user.id),
            batch_id: refs.batch(a.batch_id.as_ref()),
            course_id: refs.course(a.course_id.as_ref()),
            id: a.id,
            title: a.title,
            description: a.description,
            deadline: a.deadline,
            submissions: a.submissions,
        })
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

/// POST /api/assignments - Creates an assignment for a batch and/or course and notifies members
#[utoipa::path(
    post,
    path = "/api/assignments",
    tag = "Assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created"),
        (status = 400, description = "Neither batchId nor courseId given"),
        (status = 404, description = "Batch or course not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_assignment(
    state: web::Data<AppState>,
    body: web::Json<CreateAssignmentRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    validate(&body)?;
    let CreateAssignmentRequest { title, description, deadline, batch_id, course_id } = body;

    let batch_id = non_empty(batch_id).map(|id| parse_id(&id, "Batch")).transpose()?;
    let course_id = non_empty(course_id).map(|id| parse_id(&id, "Course")).transpose()?;
    if batch_id.is_none() && course_id.is_none() {
        return Err(AppError::BadRequest("Either batchId or courseId must be provided".to_string()));
    }
    let deadline = parse_date(deadline.trim(), "deadline")?;

    let batch = match &batch_id {
        Some(id) => Some(state.repo::<Batch>().get(id).await?),
        None => None,
    };
    let course = match &course_id {
        Some(id) => Some(state.repo::<Course>().get(id).await?),
        None => None,
    };

    let assignment = Assignment::new(title.trim().to_string(), non_empty(description), deadline, batch_id, course_id);
    state.repo::<Assignment>().create(&assignment).await?;

    let users = state.repo::<User>();
    if let Some(batch) = &batch {
        let message = format!("New assignment in batch {}: {}", batch.name, assignment.title);
        notify_users(&users, &batch.students, &message).await?;
    }
    if let Some(course) = &course {
        let enrolled: Vec<String> = users
            .find(&Filter::eq("courses", course.id.as_str()), &FindOptions::default())
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        let message = format!("New assignment in your course: {}", assignment.title);
        notify_users(&users, &enrolled, &message).await?;
    }

    log::info!("📝 Assignment created: {}", assignment.title);
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Assignment created successfully",
        "assignment": assignment,
    })))
}

/// POST /api/assignments/{id}/submit - multipart `file`, optional on resubmission
#[post("/{id}/submit")]
pub async fn submit_assignment(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Assignment")?;
    let form = read_form(payload).await?;

    let assignments = state.repo::<Assignment>();
    let mut assignment = assignments.get(&id).await?;

    let now = Utc::now();
    if assignment.is_past_deadline(now) {
        return Err(AppError::BadRequest("Assignment deadline has passed".to_string()));
    }

    let file = match form.file("file") {
        Some(f) => Some(state.upload("assignments", f).await?),
        None => None,
    };
    assignment.submit(&claims.user_id, file, now);
    assignments.save(&assignment).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Assignment submitted successfully",
        "submissionDate": crate::utils::time::format(&now),
    })))
}

/// PUT /api/assignments/{id}/submissions/{userId} - Grades a submission
#[put("/{id}/submissions/{user_id}")]
pub async fn grade_submission(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<GradeSubmissionRequest>,
) -> AppResult<HttpResponse> {
    let (raw_id, raw_user) = path.into_inner();
    let id = parse_id(&raw_id, "Assignment")?;
    let user_id = parse_id(&raw_user, "User")?;
    let body = body.into_inner();
    validate(&body)?;

    let assignment = state
        .repo::<Assignment>()
        .update(&id, |assignment| {
            let submission = assignment
                .submission_of_mut(&user_id)
                .ok_or_else(|| AppError::not_found("Submission"))?;
            merge_value(&mut submission.marks, body.marks);
            merge_text(&mut submission.feedback, body.feedback);
            Ok(())
        })
        .await?;

    let users = state.repo::<User>();
    if users.find_by_id(&user_id).await?.is_some() {
        notify_user(&users, &user_id, &format!("Your submission for {} has been graded", assignment.title)).await?;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Submission graded successfully",
        "submission": assignment.submission_of(&user_id),
    })))
}
