pub mod api;
pub mod config;
pub mod database;
pub mod middleware;
pub mod models;
pub mod seeds;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

use actix_web::web;

use crate::middleware::AuthMiddleware;

/// Registers every route. Shared by the server and the API tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check & metrics
        .service(api::health::root)
        .service(api::health::health_check)
        .service(api::metrics::get_metrics)
        // Auth endpoints (public, except /verify)
        .service(
            web::scope("/api/auth")
                .service(api::auth::signup)
                .service(api::auth::login)
                .service(
                    web::resource("/verify")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(api::auth::verify_token)),
                ),
        )
        // ==================== PUBLIC SHOWCASE ====================
        .service(
            web::scope("/api/carouselImages")
                .service(api::showcase::list_carousel_urls)
                .service(api::showcase::list_carousel_images)
                .service(api::showcase::get_carousel_image)
                .service(api::showcase::create_carousel_image)
                .service(api::showcase::update_carousel_image)
                .service(api::showcase::delete_carousel_image),
        )
        .service(
            web::scope("/icons")
                .service(api::showcase::list_icons)
                .service(api::showcase::get_icon)
                .service(api::showcase::create_icon)
                .service(api::showcase::update_icon)
                .service(api::showcase::delete_icon),
        )
        // ==================== PROTECTED ====================
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(
                    web::scope("/users")
                        .service(api::users::reset_password)
                        .service(api::users::reset_default_password)
                        .service(api::users::reset_to_temporary)
                        .service(api::users::delete_user),
                )
                .service(
                    web::scope("/search")
                        .service(api::search::search_users)
                        .service(api::search::search_academic),
                )
                .service(
                    web::scope("/profile")
                        .service(api::profile::get_profile)
                        .service(api::profile::update_profile)
                        .service(api::profile::upload_photo)
                        .service(api::profile::update_parents)
                        .service(api::profile::update_personal_details)
                        .service(api::profile::upload_documents)
                        .service(api::profile::update_address)
                        .service(api::profile::update_education)
                        .service(api::profile::upload_education_documents),
                )
                .service(
                    web::scope("/batches")
                        .service(api::batches::list_batches)
                        .service(api::batches::create_batch)
                        .service(api::batches::get_batch)
                        .service(api::batches::update_batch)
                        .service(api::batches::delete_batch)
                        .service(api::batches::add_student)
                        .service(api::batches::remove_student),
                )
                .service(
                    web::scope("/courses")
                        .service(api::courses::list_courses)
                        .service(api::courses::create_course)
                        .service(api::courses::get_course)
                        .service(api::courses::delete_course)
                        .service(api::courses::create_course_item)
                        .service(api::courses::enroll_student),
                )
                .service(
                    web::scope("/tests")
                        .service(api::test_records::list_tests)
                        .service(api::test_records::create_test),
                )
                .service(
                    web::scope("/assignments")
                        .service(api::assignments::list_assignments)
                        .service(api::assignments::create_assignment)
                        .service(api::assignments::submit_assignment)
                        .service(api::assignments::grade_submission),
                )
                .service(
                    web::scope("/payments")
                        .service(api::payments::list_payments)
                        .service(api::payments::create_payment)
                        .service(api::payments::update_payment_status),
                )
                .service(
                    web::scope("/notifications")
                        .service(api::notifications::list_notifications)
                        .service(api::notifications::mark_read),
                )
                .service(
                    web::scope("/ui-components")
                        .service(api::ui_components::list_components)
                        .service(api::ui_components::create_component)
                        .service(api::ui_components::update_component)
                        .service(api::ui_components::delete_component),
                )
                // Content catalogs: notes, videos, sources, jobs, leaderboard, books, quiz-tests
                .configure(api::catalog::configure),
        );
}
