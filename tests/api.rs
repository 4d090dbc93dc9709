use actix_web::{http::StatusCode, test, web, App};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};

use edu_admin_service::config::AppConfig;
use edu_admin_service::configure;
use edu_admin_service::state::AppState;
use edu_admin_service::utils::validation::{json_config, query_config};

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory(&AppConfig::for_tests()).await))
                .app_data(json_config())
                .app_data(query_config())
                .configure(configure),
        )
        .await
    };
}

macro_rules! signup {
    ($app:expr, $email:expr, $phone:expr) => {
        signup!($app, $email, $phone, "free")
    };
    ($app:expr, $email:expr, $phone:expr, $user_type:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({
                "name": "Asha Verma",
                "phone": $phone,
                "email": $email,
                "password": "secret123",
                "userType": $user_type,
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

macro_rules! user_id {
    ($app:expr, $token:expr) => {{
        let req = test::TestRequest::get()
            .uri("/api/auth/verify")
            .insert_header(bearer(&$token))
            .to_request();
        let verified: Value = test::call_and_read_body_json(&$app, req).await;
        verified["user"]["userId"].as_str().unwrap().to_string()
    }};
}

fn multipart_photo(file: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "photo-upload-boundary";
    let mut body = Vec::new();
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                boundary, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(
        format!("--{}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{}--\r\n", boundary, boundary)
            .as_bytes(),
    );
    (format!("multipart/form-data; boundary={}", boundary), body)
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn root_reports_running() {
    let app = app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Server is running");
}

#[actix_web::test]
async fn protected_routes_need_a_valid_token() {
    let app = app!();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/batches").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/batches")
        .insert_header(bearer("not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let token = signup!(app, "asha@example.com", "9000000001");
    let req = test::TestRequest::get()
        .uri("/api/auth/verify")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["valid"], true);
}

#[actix_web::test]
async fn duplicate_email_is_rejected() {
    let app = app!();
    signup!(app, "dup@example.com", "9000000002");

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Someone Else",
            "phone": "9000000003",
            "email": "dup@example.com",
            "password": "another1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn nested_profile_update_keeps_siblings() {
    let app = app!();
    let token = signup!(app, "nested@example.com", "9000000004");

    for patch in [
        json!({ "permanent": { "address": "12 Lake Road", "pin": "110001" } }),
        json!({ "permanent": { "pin": "560001" }, "corresponding": { "address": "Hostel B" } }),
    ] {
        let req = test::TestRequest::put()
            .uri("/api/profile/address")
            .insert_header(bearer(&token))
            .set_json(patch)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(bearer(&token))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    let address = &profile["profile"]["address"];
    assert_eq!(address["permanent"]["address"], "12 Lake Road");
    assert_eq!(address["permanent"]["pin"], "560001");
    assert_eq!(address["corresponding"]["address"], "Hostel B");
    assert!(profile.get("password").is_none());
}

#[actix_web::test]
async fn deleting_missing_documents_is_not_found() {
    let app = app!();
    let token = signup!(app, "deleter@example.com", "9000000005");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/batches/{}", ObjectId::new().to_hex()))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/api/batches/not-an-id")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn batch_membership_notifies_the_student() {
    let app = app!();
    let token = signup!(app, "student@example.com", "9000000006");

    let req = test::TestRequest::get()
        .uri("/api/auth/verify")
        .insert_header(bearer(&token))
        .to_request();
    let verified: Value = test::call_and_read_body_json(&app, req).await;
    let user_id = verified["user"]["userId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/batches")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Morning JEE", "batchId": "JEE-AM-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let batch_id = created["batch"]["_id"].as_str().unwrap().to_string();

    let add = || {
        test::TestRequest::post()
            .uri(&format!("/api/batches/{}/students", batch_id))
            .insert_header(bearer(&token))
            .set_json(json!({ "userId": user_id }))
            .to_request()
    };
    assert_eq!(test::call_service(&app, add()).await.status(), StatusCode::OK);
    assert_eq!(test::call_service(&app, add()).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/notifications")
        .insert_header(bearer(&token))
        .to_request();
    let inbox: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(inbox["unreadCount"], 1);
}

#[actix_web::test]
async fn catalog_crud_round() {
    let app = app!();
    let token = signup!(app, "librarian@example.com", "9000000007");

    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Concepts of Physics", "author": "H. C. Verma" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let book: Value = test::read_body_json(resp).await;
    let id = book["_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/books/{}", id))
        .insert_header(bearer(&token))
        .set_json(json!({ "description": "Volume 1" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["title"], "Concepts of Physics");
    assert_eq!(updated["description"], "Volume 1");

    let req = test::TestRequest::get()
        .uri("/api/books?query=physics")
        .insert_header(bearer(&token))
        .to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let delete = || {
        test::TestRequest::delete()
            .uri(&format!("/api/books/{}", id))
            .insert_header(bearer(&token))
            .to_request()
    };
    assert_eq!(test::call_service(&app, delete()).await.status(), StatusCode::OK);
    assert_eq!(test::call_service(&app, delete()).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(bearer(&token))
        .set_json(json!({ "author": "Nobody" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn carousel_ids_are_numeric_and_public() {
    let app = app!();

    for n in 1..=10 {
        let req = test::TestRequest::post()
            .uri("/api/carouselImages")
            .set_json(json!({ "imageUrl": format!("https://cdn.example.com/{}.jpg", n) }))
            .to_request();
        let image: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(image["id"], n.to_string());
    }

    let req = test::TestRequest::get().uri("/api/carouselImages").to_request();
    let urls: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(urls.len(), 10);
    assert_eq!(urls[1], "https://cdn.example.com/2.jpg");
    assert_eq!(urls[9], "https://cdn.example.com/10.jpg");

    let req = test::TestRequest::delete().uri("/api/carouselImages/4").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::get().uri("/api/carouselImages/4").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/carouselImages")
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn icon_update_needs_a_field() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/icons")
        .set_json(json!({ "label": "Job Opening" }))
        .to_request();
    let icon: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(icon["id"], "1");
    assert_eq!(icon["image"], "");

    let req = test::TestRequest::put().uri("/icons/1").set_json(json!({})).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_phone_is_rejected() {
    let app = app!();
    signup!(app, "first@example.com", "9000000010");

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Second",
            "phone": "9000000010",
            "email": "second@example.com",
            "password": "secret123",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn only_admins_issue_temporary_passwords() {
    let app = app!();
    let victim_token = signup!(app, "victim@example.com", "9000000011");
    let victim_id = user_id!(app, victim_token);
    let student_token = signup!(app, "student2@example.com", "9000000012");
    let admin_token = signup!(app, "admin@example.com", "9000000013", "admin");

    let reset = |token: &str| {
        test::TestRequest::post()
            .uri(&format!("/api/users/{}/reset-password", victim_id))
            .insert_header(bearer(token))
            .to_request()
    };

    let resp = test::call_service(&app, reset(&student_token)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // the victim's own password still works
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "victim@example.com", "password": "secret123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let resp = test::call_service(&app, reset(&admin_token)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/users/reset-password")
        .insert_header(bearer(&student_token))
        .set_json(json!({ "userId": victim_id, "newPassword": "taken-over" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", victim_id))
        .insert_header(bearer(&student_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn profile_photo_upload() {
    let app = app!();
    let token = signup!(app, "photo@example.com", "9000000014");

    let (content_type, body) = multipart_photo(Some(("me.png", b"\x89PNG\r\n\x1a\nfake-image")));
    let req = test::TestRequest::post()
        .uri("/api/profile/photo")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let uploaded: Value = test::read_body_json(resp).await;
    let photo_url = uploaded["photoUrl"].as_str().unwrap().to_string();
    assert!(photo_url.starts_with("/uploads/profile-photos/"));

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(bearer(&token))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["profile"]["photo"], photo_url);

    let (content_type, body) = multipart_photo(None);
    let req = test::TestRequest::post()
        .uri("/api/profile/photo")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["message"], "No file uploaded");
}

#[actix_web::test]
async fn blank_catalog_urls_are_ignored_on_update() {
    let app = app!();
    let token = signup!(app, "notes@example.com", "9000000015");

    let req = test::TestRequest::post()
        .uri("/api/notes")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Optics", "fileUrl": "https://cdn.example.com/optics.pdf" }))
        .to_request();
    let note: Value = test::call_and_read_body_json(&app, req).await;
    let id = note["_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/notes/{}", id))
        .insert_header(bearer(&token))
        .set_json(json!({ "fileUrl": "", "subject": "Physics" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["fileUrl"], "https://cdn.example.com/optics.pdf");
    assert_eq!(updated["subject"], "Physics");
}
