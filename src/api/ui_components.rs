use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::database::{Filter, FindOptions, SortOrder};
use crate::models::ui_component::{ComponentType, UiComponent};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::multipart::{read_form, MultipartForm};
use crate::utils::validation::parse_id;

const ICON_FOLDER: &str = "ui-icons";

async fn store_icon(state: &AppState, form: &MultipartForm) -> AppResult<Option<String>> {
    match form.file("icon") {
        Some(file) => Ok(Some(state.upload(ICON_FOLDER, file).await?)),
        None => Ok(None),
    }
}

/// GET /api/ui-components/{type} - Components of one placement, by `order`
#[utoipa::path(
    get,
    path = "/api/ui-components/{type}",
    tag = "UI Components",
    params(("type" = String, Path, description = "home, navbar or sidebar")),
    responses(
        (status = 200, description = "Components sorted by order", body = [UiComponent]),
        (status = 400, description = "Invalid UI component type")
    ),
    security(("bearer_auth" = []))
)]
#[get("/{component_type}")]
pub async fn list_components(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let component_type: ComponentType = path.parse()?;
    let components = state
        .repo::<UiComponent>()
        .find(
            &Filter::eq("type", component_type.to_string()),
            &FindOptions::sorted("order", SortOrder::Ascending),
        )
        .await?;
    Ok(HttpResponse::Ok().json(components))
}

/// POST /api/ui-components - multipart: type, name, description, tag, order, icon
#[post("")]
pub async fn create_component(state: web::Data<AppState>, payload: Multipart) -> AppResult<HttpResponse> {
    let form = read_form(payload).await?;
    // reject bad fields before anything is uploaded
    let mut component = UiComponent::from_form(&form)?;
    component.icon = store_icon(&state, &form).await?;

    state.repo::<UiComponent>().create(&component).await?;
    log::info!("🧩 UI component created: {} ({})", component.name, component.component_type);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "UI component created successfully",
        "component": component,
    })))
}

/// PUT /api/ui-components/{id} - multipart partial update
#[put("/{id}")]
pub async fn update_component(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "UI component")?;
    let form = read_form(payload).await?;

    let components = state.repo::<UiComponent>();
    let mut component = components.get(&id).await?;
    component.apply_form(&form)?;
    if let Some(icon) = store_icon(&state, &form).await? {
        component.icon = Some(icon);
    }
    components.save(&component).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "UI component updated successfully",
        "component": component,
    })))
}

/// DELETE /api/ui-components/{id}
#[delete("/{id}")]
pub async fn delete_component(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "UI component")?;
    let component = state.repo::<UiComponent>().delete(&id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "UI component deleted successfully",
        "component": component,
    })))
}
