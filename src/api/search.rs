use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::{Filter, FindOptions, SortOrder};
use crate::models::batch::Batch;
use crate::models::course::Course;
use crate::models::user::{SearchQuery, User, UserListItem};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::non_empty;

const USER_SEARCH_LIMIT: i64 = 50;
const ACADEMIC_SEARCH_LIMIT: i64 = 10;

/// GET /api/search/users?query= - Empty query lists users
#[utoipa::path(
    get,
    path = "/api/search/users",
    tag = "Search",
    params(SearchQuery),
    responses((status = 200, description = "Matching users", body = [UserListItem])),
    security(("bearer_auth" = []))
)]
#[get("/users")]
pub async fn search_users(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> AppResult<HttpResponse> {
    let filter = match non_empty(query.into_inner().query) {
        Some(needle) => Filter::search(&["name", "email", "phone"], &needle),
        None => Filter::All,
    };

    let users: Vec<UserListItem> = state
        .repo::<User>()
        .find(&filter, &FindOptions::sorted("name", SortOrder::Ascending).limit(USER_SEARCH_LIMIT))
        .await?
        .into_iter()
        .map(UserListItem::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AcademicQuery {
    pub query: Option<String>,
    /// `batch` or `course`; both when omitted
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
pub struct AcademicResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batches: Option<Vec<Batch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Course>>,
}

/// GET /api/search/academic?query=&type=
#[utoipa::path(
    get,
    path = "/api/search/academic",
    tag = "Search",
    params(AcademicQuery),
    responses(
        (status = 200, description = "Matching batches and/or courses", body = AcademicResults),
        (status = 400, description = "Search query is required")
    ),
    security(("bearer_auth" = []))
)]
#[get("/academic")]
pub async fn search_academic(state: web::Data<AppState>, query: web::Query<AcademicQuery>) -> AppResult<HttpResponse> {
    let AcademicQuery { query, kind } = query.into_inner();
    let needle = non_empty(query).ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;
    let kind = non_empty(kind);
    if let Some(other) = kind.as_deref().filter(|k| !matches!(*k, "batch" | "course")) {
        return Err(AppError::BadRequest(format!("Invalid search type: {}", other)));
    }

    let options = FindOptions::default().limit(ACADEMIC_SEARCH_LIMIT);
    let mut results = AcademicResults::default();

    if matches!(kind.as_deref(), None | Some("batch")) {
        let filter = Filter::search(&["name", "batchId"], &needle);
        results.batches = Some(state.repo::<Batch>().find(&filter, &options).await?);
    }
    if matches!(kind.as_deref(), None | Some("course")) {
        let filter = Filter::search(&["name", "courseId"], &needle);
        results.courses = Some(state.repo::<Course>().find(&filter, &options).await?);
    }

    Ok(HttpResponse::Ok().json(results))
}
