use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Education Admin API",
        version = "1.0.0",
        description = "Back office for an education provider: students, batches, courses, tests, assignments, payments and home-screen content.\n\n**Authentication:** everything under `/api` except `/api/auth/*` and `/api/carouselImages` needs a JWT Bearer token.\n\n**Content catalogs** (`/api/notes`, `/api/videos`, `/api/sources`, `/api/jobs`, `/api/leaderboard`, `/api/books`, `/api/quiz-tests`) share one CRUD surface: `GET` with `?query=&limit=`, `GET /{id}`, `POST`, `PUT /{id}`, `DELETE /{id}`."
    ),
    paths(
        // Auth
        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::verify_token,

        // Users
        crate::api::users::reset_to_temporary,
        crate::api::users::reset_password,
        crate::api::users::delete_user,

        // Profile
        crate::api::profile::get_profile,
        crate::api::profile::update_profile,
        crate::api::profile::update_parents,

        // Academics
        crate::api::batches::list_batches,
        crate::api::batches::get_batch,
        crate::api::batches::create_batch,
        crate::api::batches::add_student,
        crate::api::courses::list_courses,
        crate::api::courses::get_course,
        crate::api::courses::enroll_student,
        crate::api::test_records::list_tests,
        crate::api::test_records::create_test,
        crate::api::assignments::list_assignments,
        crate::api::assignments::create_assignment,

        // Payments & notifications
        crate::api::payments::list_payments,
        crate::api::payments::create_payment,
        crate::api::payments::update_payment_status,
        crate::api::notifications::list_notifications,
        crate::api::notifications::mark_read,

        // UI & search
        crate::api::ui_components::list_components,
        crate::api::search::search_users,
        crate::api::search::search_academic,

        // Showcase
        crate::api::showcase::list_carousel_urls,
        crate::api::showcase::list_carousel_images,
        crate::api::showcase::get_carousel_image,
        crate::api::showcase::create_carousel_image,
        crate::api::showcase::update_carousel_image,
        crate::api::showcase::delete_carousel_image,
        crate::api::showcase::list_icons,
        crate::api::showcase::get_icon,
        crate::api::showcase::create_icon,
        crate::api::showcase::update_icon,
        crate::api::showcase::delete_icon,

        // Health & Metrics
        crate::api::health::root,
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::auth_service::Claims,
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            crate::models::user::AuthResponse,
            crate::models::user::ResetPasswordRequest,
            crate::models::user::ProfileResponse,
            crate::models::user::UpdateProfileRequest,
            crate::models::user::ParentsRequest,
            crate::models::user::MarkReadRequest,
            crate::models::user::Notification,
            crate::models::user::UserListItem,
            crate::models::user::UserType,

            crate::models::batch::Batch,
            crate::models::batch::BatchDetail,
            crate::models::batch::CreateBatchRequest,
            crate::models::batch::AddStudentRequest,
            crate::models::course::Course,
            crate::models::course::CourseDetail,
            crate::models::test_record::TestRecordView,
            crate::models::test_record::CreateTestRequest,
            crate::models::assignment::AssignmentView,
            crate::models::assignment::CreateAssignmentRequest,

            crate::models::payment::Payment,
            crate::models::payment::PaymentType,
            crate::models::payment::PaymentStatus,
            crate::models::payment::CreatePaymentRequest,
            crate::models::payment::UpdatePaymentStatusRequest,
            crate::api::notifications::NotificationsResponse,

            crate::models::ui_component::UiComponent,
            crate::models::ui_component::ComponentType,
            crate::api::search::AcademicResults,

            crate::models::showcase::CarouselImage,
            crate::models::showcase::CarouselImageRequest,
            crate::models::showcase::Icon,
            crate::models::showcase::IconRequest,

            crate::models::catalog::Note,
            crate::models::catalog::Video,
            crate::models::catalog::Resource,
            crate::models::catalog::JobListing,
            crate::models::catalog::LeaderboardEntry,
            crate::models::catalog::Book,
            crate::models::catalog::QuizTest,
            crate::models::catalog::QuizQuestion,

            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Signup, login and token verification."),
        (name = "Users", description = "Password resets and account removal."),
        (name = "Profile", description = "The signed-in user's profile, nested details and documents."),
        (name = "Batches", description = "Student batches and their membership."),
        (name = "Courses", description = "Courses, course items and enrollment."),
        (name = "Tests", description = "Recorded test results."),
        (name = "Assignments", description = "Assignments, submissions and grading."),
        (name = "Payments", description = "Deposits and withdrawals."),
        (name = "Notifications", description = "Per-user notification inbox."),
        (name = "UI Components", description = "Configurable home, navbar and sidebar entries."),
        (name = "Search", description = "User and academic search."),
        (name = "Showcase", description = "Public carousel images and home icons."),
        (name = "Health", description = "Liveness, database reachability and request counters."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/login or /api/auth/signup"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_public_and_protected_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/carouselImages/withIds"));
        assert!(doc.paths.paths.contains_key("/api/search/academic"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
