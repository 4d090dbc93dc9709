//! One CRUD surface shared by every content catalog. Handlers are generic
//! over [`CatalogItem`], so they are mounted with `web::route` instead of
//! the attribute macros.

use actix_web::{web, HttpResponse, Scope};
use serde::Deserialize;

use crate::database::{Filter, FindOptions};
use crate::models::catalog::{Book, CatalogItem, JobListing, LeaderboardEntry, Note, QuizTest, Resource, Video};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{non_empty, parse_id, validate};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// Case-insensitive text search
    pub query: Option<String>,
    pub limit: Option<i64>,
}

/// Mounts `GET|POST ""` and `GET|PUT|DELETE /{id}` for one catalog.
pub fn catalog_scope<T: CatalogItem>(path: &str) -> Scope {
    web::scope(path)
        .route("", web::get().to(list_items::<T>))
        .route("", web::post().to(create_item::<T>))
        .route("/{id}", web::get().to(get_item::<T>))
        .route("/{id}", web::put().to(update_item::<T>))
        .route("/{id}", web::delete().to(delete_item::<T>))
}

/// Every catalog under its public path.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(catalog_scope::<Note>("/notes"))
        .service(catalog_scope::<Video>("/videos"))
        .service(catalog_scope::<Resource>("/sources"))
        .service(catalog_scope::<JobListing>("/jobs"))
        .service(catalog_scope::<LeaderboardEntry>("/leaderboard"))
        .service(catalog_scope::<Book>("/books"))
        .service(catalog_scope::<QuizTest>("/quiz-tests"));
}

pub async fn list_items<T: CatalogItem>(
    state: web::Data<AppState>,
    query: web::Query<CatalogQuery>,
) -> AppResult<HttpResponse> {
    let CatalogQuery { query, limit } = query.into_inner();

    let filter = match non_empty(query) {
        Some(needle) => Filter::search(T::SEARCH_FIELDS, &needle),
        None => Filter::All,
    };
    let (field, order) = T::SORT;
    let mut options = FindOptions::sorted(field, order);
    if let Some(limit) = limit {
        if limit <= 0 {
            return Err(AppError::BadRequest("limit must be a positive integer".to_string()));
        }
        options = options.limit(limit);
    }

    let items = state.repo::<T>().find(&filter, &options).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_item<T: CatalogItem>(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, T::LABEL)?;
    let item = state.repo::<T>().get(&id).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn create_item<T: CatalogItem>(
    state: web::Data<AppState>,
    body: web::Json<T::Input>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();
    validate(&input)?;

    let item = T::from_input(input)?;
    state.repo::<T>().create(&item).await?;
    log::info!("📚 {} created: {}", T::LABEL, item.id());

    Ok(HttpResponse::Created().json(item))
}

pub async fn update_item<T: CatalogItem>(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<T::Input>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, T::LABEL)?;
    let input = body.into_inner();
    validate(&input)?;

    let item = state.repo::<T>().update(&id, |item| item.apply(input)).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_item<T: CatalogItem>(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, T::LABEL)?;
    let item = state.repo::<T>().delete(&id).await?;
    log::info!("🗑️ {} deleted: {}", T::LABEL, item.id());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("{} deleted successfully", T::LABEL),
    })))
}
