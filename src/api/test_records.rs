use actix_web::{get, post, web, HttpResponse};

use crate::database::{Filter, FindOptions, SortOrder};
use crate::models::batch::Batch;
use crate::models::course::Course;
use crate::models::test_record::{CreateTestRequest, TestRecord, TestRecordView, TestType};
use crate::models::user::User;
use crate::services::auth_service::Claims;
use crate::services::notification_service::notify_user;
use crate::services::reference_service::ReferenceIndex;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::validation::{non_empty, parse_id, validate};

/// GET /api/tests - Caller's test results, newest first
#[utoipa::path(
    get,
    path = "/api/tests",
    tag = "Tests",
    responses((status = 200, description = "Caller's test records", body = [TestRecordView])),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_tests(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> AppResult<HttpResponse> {
    let records = state
        .repo::<TestRecord>()
        .find(
            &Filter::eq("userId", claims.user_id.as_str()),
            &FindOptions::sorted("date", SortOrder::Descending),
        )
        .await?;

    let refs = ReferenceIndex::load(
        &state.repo(),
        &state.repo(),
        records.iter().filter_map(|r| r.batch_id.as_ref()),
        records.iter().filter_map(|r| r.course_id.as_ref()),
    )
    .await?;

    let views: Vec<TestRecordView> = records
        .into_iter()
        .map(|r| TestRecordView {
            batch_id: refs.batch(r.batch_id.as_ref()),
            course_id: refs.course(r.course_id.as_ref()),
            id: r.id,
            user_id: r.user_id,
            test_type: r.test_type,
            date: r.date,
            marks: r.marks,
            total_marks: r.total_marks,
            description: r.description,
        })
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

/// POST /api/tests - Records a result and notifies the student
#[utoipa::path(
    post,
    path = "/api/tests",
    tag = "Tests",
    request_body = CreateTestRequest,
    responses(
        (status = 201, description = "Test record created"),
        (status = 400, description = "Invalid test type or marks"),
        (status = 404, description = "Batch or course not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_test(state: web::Data<AppState>, body: web::Json<CreateTestRequest>) -> AppResult<HttpResponse> {
    let mut body = body.into_inner();
    let test_type: TestType = body.test_type.parse()?;
    validate(&body)?;

    body.user_id = parse_id(&body.user_id, "User")?;
    body.batch_id = non_empty(body.batch_id.take()).map(|id| parse_id(&id, "Batch")).transpose()?;
    body.course_id = non_empty(body.course_id.take()).map(|id| parse_id(&id, "Course")).transpose()?;
    body.description = non_empty(body.description.take());

    if let Some(batch_id) = &body.batch_id {
        state.repo::<Batch>().get(batch_id).await?;
    }
    if let Some(course_id) = &body.course_id {
        state.repo::<Course>().get(course_id).await?;
    }

    let record = TestRecord::new(body, test_type);
    state.repo::<TestRecord>().create(&record).await?;

    let message = format!(
        "New test result added: {}/{} in {}",
        record.marks,
        record.total_marks,
        test_type.describe()
    );
    let users = state.repo::<User>();
    if users.find_by_id(&record.user_id).await?.is_some() {
        notify_user(&users, &record.user_id, &message).await?;
    } else {
        log::warn!("⚠️  Test record {} refers to unknown user {}", record.id, record.user_id);
    }

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Test record created successfully",
        "test": record,
    })))
}
