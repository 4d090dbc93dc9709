//! Two-sided membership links between users and batches or courses.
//!
//! Both sides are written as separate documents; there is no transaction,
//! so the user side is written last and a failure leaves at most a dangling
//! id on the batch or course.

use crate::database::Repository;
use crate::models::batch::Batch;
use crate::models::course::Course;
use crate::models::user::User;
use crate::services::notification_service::notify_user;
use crate::utils::error::{AppError, AppResult};

pub async fn add_student_to_batch(
    batches: &Repository<Batch>,
    users: &Repository<User>,
    batch_id: &str,
    user_id: &str,
) -> AppResult<Batch> {
    let mut batch = batches.get(batch_id).await?;
    let mut user = users.get(user_id).await?;

    if batch.has_student(&user.id) {
        return Err(AppError::BadRequest("User already in this batch".to_string()));
    }

    batch.students.push(user.id.clone());
    batches.save(&batch).await?;

    if !user.batches.contains(&batch.id) {
        user.batches.push(batch.id.clone());
    }
    user.notify(format!("You have been added to batch: {}", batch.name));
    users.save(&user).await?;

    log::info!("👥 {} added to batch {}", user.email, batch.batch_id);
    Ok(batch)
}

pub async fn remove_student_from_batch(
    batches: &Repository<Batch>,
    users: &Repository<User>,
    batch_id: &str,
    user_id: &str,
) -> AppResult<Batch> {
    let mut batch = batches.get(batch_id).await?;
    let mut user = users.get(user_id).await?;

    batch.students.retain(|s| *s != user.id);
    batches.save(&batch).await?;

    user.batches.retain(|b| *b != batch.id);
    user.notify(format!("You have been removed from batch: {}", batch.name));
    users.save(&user).await?;

    log::info!("👋 {} removed from batch {}", user.email, batch.batch_id);
    Ok(batch)
}

pub async fn enroll_in_course(
    courses: &Repository<Course>,
    users: &Repository<User>,
    course_id: &str,
    user_id: &str,
) -> AppResult<Course> {
    let course = courses.get(course_id).await?;
    let user = users.get(user_id).await?;

    if user.courses.contains(&course.id) {
        return Err(AppError::BadRequest("User already enrolled in this course".to_string()));
    }

    users
        .update(&user.id, |u| {
            u.courses.push(course.id.clone());
            Ok(())
        })
        .await?;
    notify_user(users, &user.id, &format!("You have been enrolled in course: {}", course.name)).await?;

    log::info!("🎓 {} enrolled in course {}", user.email, course.course_id);
    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DocumentStore, InMemoryStore};
    use crate::models::user::UserType;
    use std::sync::Arc;

    async fn setup() -> (Repository<Batch>, Repository<Course>, Repository<User>, User) {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
        let users = Repository::<User>::new(store.clone());
        let user = User::new("Kiran".into(), "55".into(), "kiran@x.io", "h".into(), UserType::Free);
        users.create(&user).await.unwrap();
        (Repository::new(store.clone()), Repository::new(store), users, user)
    }

    #[actix_web::test]
    async fn batch_membership_is_two_sided() {
        let (batches, _, users, user) = setup().await;
        let batch = Batch::new("Morning".into(), "B-01".into(), None);
        batches.create(&batch).await.unwrap();

        add_student_to_batch(&batches, &users, &batch.id, &user.id).await.unwrap();
        assert!(batches.get(&batch.id).await.unwrap().has_student(&user.id));
        let stored = users.get(&user.id).await.unwrap();
        assert_eq!(stored.batches, vec![batch.id.clone()]);
        assert_eq!(stored.notifications[0].message, "You have been added to batch: Morning");

        let again = add_student_to_batch(&batches, &users, &batch.id, &user.id).await.unwrap_err();
        assert_eq!(again.to_string(), "User already in this batch");

        remove_student_from_batch(&batches, &users, &batch.id, &user.id).await.unwrap();
        assert!(batches.get(&batch.id).await.unwrap().students.is_empty());
        let stored = users.get(&user.id).await.unwrap();
        assert!(stored.batches.is_empty());
        assert_eq!(stored.notifications.len(), 2);
    }

    #[actix_web::test]
    async fn course_enrollment_rejects_duplicates() {
        let (_, courses, users, user) = setup().await;
        let course = Course::new("Physics".into(), "PHY-1".into(), None, None);
        courses.create(&course).await.unwrap();

        enroll_in_course(&courses, &users, &course.id, &user.id).await.unwrap();
        let err = enroll_in_course(&courses, &users, &course.id, &user.id).await.unwrap_err();
        assert_eq!(err.to_string(), "User already enrolled in this course");
        assert_eq!(users.get(&user.id).await.unwrap().courses, vec![course.id]);
    }
}
