//! Profile endpoints. Every route acts on the user named by the token.

use actix_multipart::Multipart;
use actix_web::{get, post, put, web, HttpResponse};

use crate::models::batch::Batch;
use crate::models::course::Course;
use crate::models::user::{
    AddressPatch, BatchRef, CourseRef, EducationPatch, Parent, ParentsRequest, PersonalDetailsPatch,
    ProfileResponse, UpdateProfileRequest, User,
};
use crate::services::auth_service::Claims;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::multipart::{read_form, MultipartForm};
use crate::utils::validation::{merge_text, merge_value, non_empty, validate};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Caller's user document with batches and courses resolved", body = ProfileResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn get_profile(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> AppResult<HttpResponse> {
    let user = state.repo::<User>().get(&claims.user_id).await?;

    let batches: Vec<BatchRef> = state
        .repo::<Batch>()
        .find_by_ids(&user.batches)
        .await?
        .iter()
        .map(BatchRef::from)
        .collect();
    let courses: Vec<CourseRef> = state
        .repo::<Course>()
        .find_by_ids(&user.courses)
        .await?
        .iter()
        .map(CourseRef::from)
        .collect();

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: user.id,
        name: user.name,
        phone: user.phone,
        email: user.email,
        user_type: user.user_type,
        profile: user.profile,
        batches,
        courses,
        notifications: user.notifications,
        created_at: user.created_at,
    }))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated")),
    security(("bearer_auth" = []))
)]
#[put("")]
pub async fn update_profile(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let user = state
        .repo::<User>()
        .update(&claims.user_id, |user| {
            if let Some(name) = non_empty(body.name) {
                user.name = name;
            }
            if let Some(phone) = non_empty(body.phone) {
                user.phone = phone;
            }
            let profile = user.profile_mut();
            merge_text(&mut profile.about, body.about);
            merge_text(&mut profile.roll_number, body.roll_number);
            Ok(())
        })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Profile updated successfully",
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "profile": user.profile,
        }
    })))
}

#[post("/photo")]
pub async fn upload_photo(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_form(payload).await?;
    let file = form
        .file("photo")
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let users = state.repo::<User>();
    let mut user = users.get(&claims.user_id).await?;
    let photo_url = state.upload("profile-photos", file).await?;

    user.profile_mut().photo = Some(photo_url.clone());
    users.save(&user).await?;

    log::info!("🖼️  Profile photo updated for {}", user.email);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Profile photo updated successfully",
        "photoUrl": photo_url,
    })))
}

/// Parents arrive as loose JSON so the array and field checks can report
/// their own messages.
fn parse_parents(raw: serde_json::Value) -> AppResult<Vec<Parent>> {
    let items = match raw {
        serde_json::Value::Array(items) => items,
        _ => return Err(AppError::BadRequest("Parents must be an array".to_string())),
    };

    let field = |item: &serde_json::Value, name: &str| {
        item.get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    items
        .iter()
        .map(|item| {
            match (field(item, "name"), field(item, "relationship"), field(item, "phone"), field(item, "email")) {
                (Some(name), Some(relationship), Some(phone), Some(email)) => {
                    let parent = Parent { name, relationship, phone, email };
                    validate(&parent)?;
                    Ok(parent)
                }
                _ => Err(AppError::BadRequest(
                    "Each parent must have name, relationship, phone, and email".to_string(),
                )),
            }
        })
        .collect()
}

#[utoipa::path(
    post,
    path = "/api/profile/parents",
    tag = "Profile",
    request_body = ParentsRequest,
    responses(
        (status = 200, description = "Parents replaced"),
        (status = 400, description = "Not an array or a parent is incomplete")
    ),
    security(("bearer_auth" = []))
)]
#[post("/parents")]
pub async fn update_parents(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<ParentsRequest>,
) -> AppResult<HttpResponse> {
    let parents = parse_parents(body.into_inner().parents)?;

    let user = state
        .repo::<User>()
        .update(&claims.user_id, |user| {
            user.profile_mut().parents = parents;
            Ok(())
        })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Parents information updated successfully",
        "parents": user.profile.map(|p| p.parents).unwrap_or_default(),
    })))
}

#[put("/personal")]
pub async fn update_personal_details(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<PersonalDetailsPatch>,
) -> AppResult<HttpResponse> {
    let patch = body.into_inner();
    let user = state
        .repo::<User>()
        .update(&claims.user_id, |user| user.profile_mut().personal_details_mut().merge(patch))
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Personal details updated successfully",
        "personalDetails": user.profile.and_then(|p| p.personal_details),
    })))
}

/// Uploads whichever of the named file fields are present, in order.
async fn store_fields<const N: usize>(
    state: &AppState,
    form: &MultipartForm,
    folder: &str,
    names: [&str; N],
) -> AppResult<[Option<String>; N]> {
    let mut stored: [Option<String>; N] = std::array::from_fn(|_| None);
    for (slot, name) in stored.iter_mut().zip(names) {
        if let Some(file) = form.file(name) {
            *slot = Some(state.upload(folder, file).await?);
        }
    }
    Ok(stored)
}

#[post("/documents")]
pub async fn upload_documents(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_form(payload).await?;
    let users = state.repo::<User>();
    let mut user = users.get(&claims.user_id).await?;

    let [aadhar, pan, signature] =
        store_fields(&state, &form, "documents", ["aadharImage", "panImage", "signatureImage"]).await?;

    let details = user.profile_mut().personal_details_mut();
    merge_value(&mut details.aadhar_image, aadhar);
    merge_value(&mut details.pan_image, pan);
    merge_value(&mut details.signature_image, signature);
    let documents = serde_json::json!({
        "aadharImage": details.aadhar_image,
        "panImage": details.pan_image,
        "signatureImage": details.signature_image,
    });
    users.save(&user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Documents uploaded successfully",
        "documents": documents,
    })))
}

#[put("/address")]
pub async fn update_address(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<AddressPatch>,
) -> AppResult<HttpResponse> {
    let patch = body.into_inner();
    let user = state
        .repo::<User>()
        .update(&claims.user_id, |user| {
            user.profile_mut().address_mut().merge(patch);
            Ok(())
        })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Address information updated successfully",
        "address": user.profile.and_then(|p| p.address),
    })))
}

#[put("/education")]
pub async fn update_education(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<EducationPatch>,
) -> AppResult<HttpResponse> {
    let patch = body.into_inner();
    let user = state
        .repo::<User>()
        .update(&claims.user_id, |user| {
            user.profile_mut().education_mut().merge(patch);
            Ok(())
        })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Educational details updated successfully",
        "education": user.profile.and_then(|p| p.education),
    })))
}

#[post("/education/documents")]
pub async fn upload_education_documents(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_form(payload).await?;
    let users = state.repo::<User>();
    let mut user = users.get(&claims.user_id).await?;

    let [college, twelfth, tenth] = store_fields(
        &state,
        &form,
        "education-documents",
        ["collegeResult", "result12th", "result10th"],
    )
    .await?;

    let education = user.profile_mut().education_mut();
    if college.is_some() {
        education.college_mut().result_image = college;
    }
    if twelfth.is_some() {
        education.school_12th_mut().result_image = twelfth;
    }
    if tenth.is_some() {
        education.school_10th_mut().result_image = tenth;
    }
    let documents = serde_json::json!({
        "collegeResult": education.college.as_ref().and_then(|r| r.result_image.clone()),
        "result12th": education.school_12th.as_ref().and_then(|r| r.result_image.clone()),
        "result10th": education.school_10th.as_ref().and_then(|r| r.result_image.clone()),
    });
    users.save(&user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Education documents uploaded successfully",
        "documents": documents,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parents_must_be_an_array() {
        let err = parse_parents(json!({ "name": "x" })).unwrap_err();
        assert_eq!(err.to_string(), "Parents must be an array");
    }

    #[test]
    fn every_parent_field_is_required() {
        let err = parse_parents(json!([{ "name": "Ravi", "relationship": "Father", "phone": "1" }])).unwrap_err();
        assert_eq!(err.to_string(), "Each parent must have name, relationship, phone, and email");
    }

    #[test]
    fn complete_parents_are_accepted() {
        let parents = parse_parents(json!([
            { "name": "Ravi", "relationship": "Father", "phone": "98", "email": "ravi@example.com", "extra": 1 }
        ]))
        .unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].relationship, "Father");
    }
}
