//! In-app notifications stored on the user document.

use crate::database::Repository;
use crate::models::user::User;
use crate::utils::error::AppResult;

/// Appends a notification to one user.
pub async fn notify_user(users: &Repository<User>, user_id: &str, message: &str) -> AppResult<()> {
    users
        .update(user_id, |user| {
            user.notify(message);
            Ok(())
        })
        .await?;
    log::debug!("🔔 Notified {}: {}", user_id, message);
    Ok(())
}

/// Notifies every listed user. Ids that no longer resolve are skipped.
pub async fn notify_users(users: &Repository<User>, user_ids: &[String], message: &str) -> AppResult<usize> {
    let mut delivered = 0;
    for mut user in users.find_by_ids(user_ids).await? {
        user.notify(message);
        users.save(&user).await?;
        delivered += 1;
    }
    if delivered < user_ids.len() {
        log::warn!("⚠️  {} of {} notification recipients not found", user_ids.len() - delivered, user_ids.len());
    }
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use crate::models::user::UserType;
    use std::sync::Arc;

    #[actix_web::test]
    async fn notifies_existing_users_and_skips_missing() {
        let users = Repository::<User>::new(Arc::new(InMemoryStore::new()));
        let a = User::new("A".into(), "1".into(), "a@x.io", "h".into(), UserType::Free);
        let b = User::new("B".into(), "2".into(), "b@x.io", "h".into(), UserType::Free);
        users.create(&a).await.unwrap();
        users.create(&b).await.unwrap();

        let ids = vec![a.id.clone(), b.id.clone(), "000000000000000000000000".to_string()];
        let delivered = notify_users(&users, &ids, "Holiday on Friday").await.unwrap();
        assert_eq!(delivered, 2);

        let a = users.get(&a.id).await.unwrap();
        assert_eq!(a.notifications.len(), 1);
        assert_eq!(a.unread_count(), 1);
    }
}
