use actix_web::web;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::database::{Filter, Repository};
use crate::models::user::{AuthResponse, LoginRequest, SignupRequest, User, UserType};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::validate;

/// JWT claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(expiry_hours),
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.lifetime).timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Any decoding failure (signature, format, expiry) is a 403.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("🔒 Token rejected: {}", e);
                AppError::Forbidden("Invalid or expired token".to_string())
            })
    }
}

/// bcrypt is CPU bound, so hashing runs on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    web::block(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    web::block(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Random alphanumeric password handed out by the admin reset.
pub fn generate_temporary_password() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..10].to_string()
}

pub async fn signup(
    users: &Repository<User>,
    jwt: &JwtKeys,
    bcrypt_cost: u32,
    request: SignupRequest,
) -> AppResult<AuthResponse> {
    validate(&request)?;

    let user_type = match request.user_type.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => raw.parse::<UserType>()?,
        None => UserType::default(),
    };

    let email = request.email.trim().to_lowercase();
    if users.find_one(&Filter::eq("email", email.as_str())).await?.is_some() {
        return Err(AppError::BadRequest("User with this email already exists".to_string()));
    }

    let password_hash = hash_password(request.password, bcrypt_cost).await?;
    let user = User::new(
        request.name.trim().to_string(),
        request.phone.trim().to_string(),
        &email,
        password_hash,
        user_type,
    );
    users.create(&user).await?;

    let token = jwt.issue(&user)?;
    log::info!("✅ User registered: {} ({})", user.email, user.user_type);

    Ok(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: user.summary(),
    })
}

pub async fn login(
    users: &Repository<User>,
    jwt: &JwtKeys,
    request: LoginRequest,
) -> AppResult<AuthResponse> {
    validate(&request)?;

    let invalid = || AppError::BadRequest("Invalid credentials".to_string());

    let email = request.email.trim().to_lowercase();
    let user = users
        .find_one(&Filter::eq("email", email.as_str()))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(request.password, user.password.clone()).await? {
        return Err(invalid());
    }

    let token = jwt.issue(&user)?;
    Ok(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.summary(),
    })
}

/// Stores a new password hash for `user_id` and returns the updated user.
pub async fn set_password(
    users: &Repository<User>,
    bcrypt_cost: u32,
    user_id: &str,
    password: String,
) -> AppResult<User> {
    let mut user = users.get(user_id).await?;
    user.password = hash_password(password, bcrypt_cost).await?;
    users.save(&user).await?;
    log::info!("🔑 Password reset for user: {}", user.email);
    Ok(user)
}

/// Loads the caller named in `claims` and refuses anyone who is not an admin.
pub async fn require_admin(users: &Repository<User>, claims: &Claims) -> AppResult<User> {
    let caller = users.get(&claims.user_id).await?;
    if caller.user_type != UserType::Admin {
        log::warn!("⛔ {} tried an admin-only action", caller.email);
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(caller)
}

/// Users may act on their own account; any other target needs an admin.
pub async fn require_self_or_admin(users: &Repository<User>, claims: &Claims, target_id: &str) -> AppResult<()> {
    if claims.user_id == target_id {
        return Ok(());
    }
    require_admin(users, claims).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use std::sync::Arc;

    fn user() -> User {
        User::new("Neha".into(), "98100".into(), "neha@example.com", "x".into(), UserType::Free)
    }

    #[test]
    fn issued_tokens_verify_with_same_secret_only() {
        let keys = JwtKeys::new("secret-a", 1);
        let token = keys.issue(&user()).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.email, "neha@example.com");
        assert!(claims.exp > claims.iat);

        let other = JwtKeys::new("secret-b", 1);
        assert!(matches!(other.verify(&token), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = JwtKeys::new("secret", -2);
        let token = keys.issue(&user()).unwrap();
        assert!(matches!(keys.verify(&token), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn temporary_passwords_are_ten_chars() {
        let p = generate_temporary_password();
        assert_eq!(p.len(), 10);
        assert!(p.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    fn signup_request(email: &str, phone: &str) -> SignupRequest {
        SignupRequest {
            name: "Neha".into(),
            phone: phone.into(),
            email: email.into(),
            password: "secret1".into(),
            user_type: None,
        }
    }

    #[actix_web::test]
    async fn signup_then_login() {
        let users = Repository::<User>::new(Arc::new(InMemoryStore::new()));
        users.ensure_indexes().await.unwrap();
        let keys = JwtKeys::new("s", 1);

        let created = signup(&users, &keys, 4, signup_request("Neha@Example.com", "1")).await.unwrap();
        assert_eq!(created.user.email, "neha@example.com");
        assert_eq!(created.user.user_type, UserType::Free);

        let dup = signup(&users, &keys, 4, signup_request("neha@example.com", "2")).await.unwrap_err();
        assert_eq!(dup.to_string(), "User with this email already exists");

        let ok = login(&users, &keys, LoginRequest { email: "neha@example.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert_eq!(ok.message, "Login successful");

        let bad = login(&users, &keys, LoginRequest { email: "neha@example.com".into(), password: "wrong!".into() })
            .await
            .unwrap_err();
        assert_eq!(bad.to_string(), "Invalid credentials");
    }

    #[actix_web::test]
    async fn unknown_user_type_is_rejected() {
        let users = Repository::<User>::new(Arc::new(InMemoryStore::new()));
        let mut request = signup_request("a@b.co", "3");
        request.user_type = Some("gold".into());
        let err = signup(&users, &JwtKeys::new("s", 1), 4, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid user type");
    }

    fn claims_for(user: &User) -> Claims {
        Claims { user_id: user.id.clone(), email: user.email.clone(), iat: 0, exp: 0 }
    }

    #[actix_web::test]
    async fn only_admins_act_on_other_accounts() {
        let users = Repository::<User>::new(Arc::new(InMemoryStore::new()));
        let student = user();
        let admin = User::new("Ravi".into(), "98200".into(), "ravi@example.com", "x".into(), UserType::Admin);
        users.create(&student).await.unwrap();
        users.create(&admin).await.unwrap();

        let err = require_admin(&users, &claims_for(&student)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(require_admin(&users, &claims_for(&admin)).await.unwrap().id, admin.id);

        assert!(require_self_or_admin(&users, &claims_for(&student), &student.id).await.is_ok());
        assert!(require_self_or_admin(&users, &claims_for(&student), &admin.id).await.is_err());
        assert!(require_self_or_admin(&users, &claims_for(&admin), &student.id).await.is_ok());
    }
}
