//! Public home-screen content. No token is needed for any of these routes.

use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::database::{Entity, Filter, FindOptions, Repository};
use crate::models::showcase::{
    next_sequence, sort_by_sequence, CarouselImage, CarouselImageRequest, Icon, IconRequest, Sequenced,
};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{non_empty, required};

/// All items of a sequenced collection in numeric id order.
async fn load_sorted<T: Entity + Sequenced>(repo: &Repository<T>) -> AppResult<Vec<T>> {
    let mut items = repo.find(&Filter::All, &FindOptions::default()).await?;
    sort_by_sequence(&mut items);
    Ok(items)
}

async fn find_by_seq<T: Entity>(repo: &Repository<T>, id: &str) -> AppResult<T> {
    repo.find_one(&Filter::eq("id", id))
        .await?
        .ok_or_else(|| AppError::not_found(T::LABEL))
}

// ==================== CAROUSEL ====================

/// GET /api/carouselImages - Image URLs only
#[utoipa::path(
    get,
    path = "/api/carouselImages",
    tag = "Showcase",
    responses((status = 200, description = "Carousel image URLs in display order", body = [String]))
)]
#[get("")]
pub async fn list_carousel_urls(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let urls: Vec<String> = load_sorted(&state.repo::<CarouselImage>())
        .await?
        .into_iter()
        .map(|image| image.image_url)
        .collect();
    Ok(HttpResponse::Ok().json(urls))
}

/// GET /api/carouselImages/withIds
#[utoipa::path(
    get,
    path = "/api/carouselImages/withIds",
    tag = "Showcase",
    responses((status = 200, description = "Carousel images with their ids", body = [CarouselImage]))
)]
#[get("/withIds")]
pub async fn list_carousel_images(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let images = load_sorted(&state.repo::<CarouselImage>()).await?;
    Ok(HttpResponse::Ok().json(images))
}

/// GET /api/carouselImages/{id} - Looks up by the sequential id
#[utoipa::path(
    get,
    path = "/api/carouselImages/{id}",
    tag = "Showcase",
    params(("id" = String, Path, description = "Sequential image id")),
    responses(
        (status = 200, description = "Carousel image", body = CarouselImage),
        (status = 404, description = "Image not found")
    )
)]
#[get("/{id}")]
pub async fn get_carousel_image(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let image = find_by_seq(&state.repo::<CarouselImage>(), &path).await?;
    Ok(HttpResponse::Ok().json(image))
}

#[utoipa::path(
    post,
    path = "/api/carouselImages",
    tag = "Showcase",
    request_body = CarouselImageRequest,
    responses(
        (status = 201, description = "Image added", body = CarouselImage),
        (status = 400, description = "Image URL is required")
    )
)]
#[post("")]
pub async fn create_carousel_image(
    state: web::Data<AppState>,
    body: web::Json<CarouselImageRequest>,
) -> AppResult<HttpResponse> {
    let image_url = required(body.into_inner().image_url, "Image URL")?;
    let images = state.repo::<CarouselImage>();
    let existing = images.find(&Filter::All, &FindOptions::default()).await?;

    let image = CarouselImage::new(next_sequence(&existing), image_url);
    images.create(&image).await?;
    log::info!("🖼️ Carousel image #{} added", image.id);

    Ok(HttpResponse::Created().json(image))
}

#[utoipa::path(
    put,
    path = "/api/carouselImages/{id}",
    tag = "Showcase",
    params(("id" = String, Path, description = "Sequential image id")),
    request_body = CarouselImageRequest,
    responses(
        (status = 200, description = "Image updated", body = CarouselImage),
        (status = 404, description = "Image not found")
    )
)]
#[put("/{id}")]
pub async fn update_carousel_image(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CarouselImageRequest>,
) -> AppResult<HttpResponse> {
    let image_url = required(body.into_inner().image_url, "Image URL")?;
    let images = state.repo::<CarouselImage>();

    let mut image = find_by_seq(&images, &path).await?;
    image.image_url = image_url;
    images.save(&image).await?;

    Ok(HttpResponse::Ok().json(image))
}

#[utoipa::path(
    delete,
    path = "/api/carouselImages/{id}",
    tag = "Showcase",
    params(("id" = String, Path, description = "Sequential image id")),
    responses(
        (status = 200, description = "Image deleted successfully"),
        (status = 404, description = "Image not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_carousel_image(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    state
        .repo::<CarouselImage>()
        .delete_where(&Filter::eq("id", path.as_str()))
        .await?
        .ok_or_else(|| AppError::not_found(CarouselImage::LABEL))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Image deleted successfully" })))
}

// ==================== ICONS ====================

/// GET /icons
#[utoipa::path(
    get,
    path = "/icons",
    tag = "Showcase",
    responses((status = 200, description = "Home icons in display order", body = [Icon]))
)]
#[get("")]
pub async fn list_icons(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let icons = load_sorted(&state.repo::<Icon>()).await?;
    Ok(HttpResponse::Ok().json(icons))
}

#[utoipa::path(
    get,
    path = "/icons/{id}",
    tag = "Showcase",
    params(("id" = String, Path, description = "Sequential icon id")),
    responses(
        (status = 200, description = "Icon", body = Icon),
        (status = 404, description = "Icon not found")
    )
)]
#[get("/{id}")]
pub async fn get_icon(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let icon = find_by_seq(&state.repo::<Icon>(), &path).await?;
    Ok(HttpResponse::Ok().json(icon))
}

/// POST /icons - `image` may be left out, `label` may not
#[utoipa::path(
    post,
    path = "/icons",
    tag = "Showcase",
    request_body = IconRequest,
    responses(
        (status = 201, description = "Icon added", body = Icon),
        (status = 400, description = "Label is required")
    )
)]
#[post("")]
pub async fn create_icon(state: web::Data<AppState>, body: web::Json<IconRequest>) -> AppResult<HttpResponse> {
    let IconRequest { image, label } = body.into_inner();
    let label = required(label, "Label")?;

    let icons = state.repo::<Icon>();
    let existing = icons.find(&Filter::All, &FindOptions::default()).await?;
    let icon = Icon::new(next_sequence(&existing), image.unwrap_or_default(), label);
    icons.create(&icon).await?;
    log::info!("🔖 Icon #{} added: {}", icon.id, icon.label);

    Ok(HttpResponse::Created().json(icon))
}

#[utoipa::path(
    put,
    path = "/icons/{id}",
    tag = "Showcase",
    params(("id" = String, Path, description = "Sequential icon id")),
    request_body = IconRequest,
    responses(
        (status = 200, description = "Icon updated", body = Icon),
        (status = 400, description = "No update data provided"),
        (status = 404, description = "Icon not found")
    )
)]
#[put("/{id}")]
pub async fn update_icon(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<IconRequest>,
) -> AppResult<HttpResponse> {
    let IconRequest { image, label } = body.into_inner();
    let label = non_empty(label);
    if image.is_none() && label.is_none() {
        return Err(AppError::BadRequest("No update data provided".to_string()));
    }

    let icons = state.repo::<Icon>();
    let mut icon = find_by_seq(&icons, &path).await?;
    if let Some(image) = image {
        icon.image = image;
    }
    if let Some(label) = label {
        icon.label = label;
    }
    icons.save(&icon).await?;

    Ok(HttpResponse::Ok().json(icon))
}

#[utoipa::path(
    delete,
    path = "/icons/{id}",
    tag = "Showcase",
    params(("id" = String, Path, description = "Sequential icon id")),
    responses(
        (status = 200, description = "Icon deleted successfully"),
        (status = 404, description = "Icon not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_icon(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    state
        .repo::<Icon>()
        .delete_where(&Filter::eq("id", path.as_str()))
        .await?
        .ok_or_else(|| AppError::not_found(Icon::LABEL))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Icon deleted successfully" })))
}
