use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};

use crate::database::{Filter, FindOptions};
use crate::models::batch::AddStudentRequest;
use crate::models::course::{Course, CourseDetail, CourseItem};
use crate::state::AppState;
use crate::services::enrollment_service;
use crate::utils::error::{AppError, AppResult};
use crate::utils::multipart::read_form;
use crate::utils::validation::{parse_id, validate};

const IMAGE_FOLDER: &str = "course-images";

/// GET /api/courses
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "Courses",
    responses((status = 200, description = "All courses", body = [Course])),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_courses(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let courses = state.repo::<Course>().find(&Filter::All, &FindOptions::default()).await?;
    Ok(HttpResponse::Ok().json(courses))
}

/// GET /api/courses/{id} - Course with its items
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course and its items", body = CourseDetail),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/{id}")]
pub async fn get_course(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Course")?;
    let course = state.repo::<Course>().get(&id).await?;
    let course_items = state
        .repo::<CourseItem>()
        .find(&Filter::eq("courseId", course.id.as_str()), &FindOptions::default())
        .await?;

    Ok(HttpResponse::Ok().json(CourseDetail { course, course_items }))
}

/// POST /api/courses - multipart: name, courseId, description, image
#[post("")]
pub async fn create_course(state: web::Data<AppState>, payload: Multipart) -> AppResult<HttpResponse> {
    let form = read_form(payload).await?;
    let name = form
        .text("name")
        .ok_or_else(|| AppError::BadRequest("Course name is required".to_string()))?;
    let course_id = form
        .text("courseId")
        .ok_or_else(|| AppError::BadRequest("Course ID is required".to_string()))?;

    let courses = state.repo::<Course>();
    if courses.find_one(&Filter::eq("courseId", course_id.as_str())).await?.is_some() {
        return Err(AppError::BadRequest("Course with this ID already exists".to_string()));
    }

    let image = match form.file("image") {
        Some(file) => Some(state.upload(IMAGE_FOLDER, file).await?),
        None => None,
    };
    let course = Course::new(name, course_id, form.text("description"), image);
    courses.create(&course).await?;

    log::info!("✅ Course created: {} ({})", course.name, course.course_id);
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Course created successfully",
        "course": course,
    })))
}

/// DELETE /api/courses/{id} - Items stay behind
#[delete("/{id}")]
pub async fn delete_course(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Course")?;
    let course = state.repo::<Course>().delete(&id).await?;

    log::info!("🗑️ Course deleted: {}", course.course_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Course deleted successfully",
        "course": course,
    })))
}

/// POST /api/courses/{id}/items - multipart: name, description, image
#[post("/{id}/items")]
pub async fn create_course_item(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Course")?;
    let form = read_form(payload).await?;
    let course = state.repo::<Course>().get(&id).await?;

    let name = form
        .text("name")
        .ok_or_else(|| AppError::BadRequest("Item name is required".to_string()))?;
    let image = match form.file("image") {
        Some(file) => Some(state.upload(IMAGE_FOLDER, file).await?),
        None => None,
    };

    let item = CourseItem::new(&course.id, name, form.text("description"), image);
    state.repo::<CourseItem>().create(&item).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Course item created successfully",
        "courseItem": item,
    })))
}

/// POST /api/courses/{id}/students - Enrols a user and notifies them
#[utoipa::path(
    post,
    path = "/api/courses/{id}/students",
    tag = "Courses",
    params(("id" = String, Path, description = "Course id")),
    request_body = AddStudentRequest,
    responses(
        (status = 200, description = "Student enrolled"),
        (status = 400, description = "Already enrolled"),
        (status = 404, description = "Course or user not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/{id}/students")]
pub async fn enroll_student(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AddStudentRequest>,
) -> AppResult<HttpResponse> {
    let course_id = parse_id(&path, "Course")?;
    validate(&*body)?;
    let user_id = parse_id(&body.user_id, "User")?;

    let course = enrollment_service::enroll_in_course(&state.repo(), &state.repo(), &course_id, &user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Student enrolled in course successfully",
        "courseId": course.id,
        "userId": user_id,
    })))
}
