use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::database::Entity;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{merge_text, merge_value, non_empty, parse_date};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Free,
    Admin,
    Premium,
}

impl FromStr for UserType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(UserType::Free),
            "admin" => Ok(UserType::Admin),
            "premium" => Ok(UserType::Premium),
            _ => Err(AppError::BadRequest("Invalid user type".to_string())),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserType::Free => "free",
            UserType::Admin => "admin",
            UserType::Premium => "premium",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub batches: Vec<String>,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(with = "crate::utils::time")]
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
    const UNIQUE_KEYS: &'static [&'static str] = &["email", "phone"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl User {
    pub fn new(name: String, phone: String, email: &str, password_hash: String, user_type: UserType) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            name,
            phone,
            email: email.trim().to_lowercase(),
            password: password_hash,
            user_type,
            profile: None,
            batches: Vec::new(),
            courses: Vec::new(),
            notifications: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Profile sub-document, created on first access.
    pub fn profile_mut(&mut self) -> &mut Profile {
        self.profile.get_or_insert_with(Profile::default)
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notifications.push(Notification::new(message));
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Marks the given notifications read; unknown ids are ignored.
    pub fn mark_read(&mut self, ids: &[String]) {
        for notification in self.notifications.iter_mut() {
            if ids.iter().any(|id| *id == notification.id) {
                notification.read = true;
            }
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            user_type: self.user_type,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::utils::time::option")]
    pub date_of_joining: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parents: Vec<Parent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_details: Option<PersonalDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Education>,
}

impl Profile {
    pub fn personal_details_mut(&mut self) -> &mut PersonalDetails {
        self.personal_details.get_or_insert_with(PersonalDetails::default)
    }

    pub fn address_mut(&mut self) -> &mut Address {
        self.address.get_or_insert_with(Address::default)
    }

    pub fn education_mut(&mut self) -> &mut Education {
        self.education.get_or_insert_with(Education::default)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    #[validate(length(min = 1, message = "Parent name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Parent relationship is required"))]
    pub relationship: String,
    #[validate(length(min = 1, message = "Parent phone is required"))]
    pub phone: String,
    #[validate(email(message = "Parent email must be valid"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::utils::time::option")]
    pub dob: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_image: Option<String>,
}

impl PersonalDetails {
    pub fn merge(&mut self, patch: PersonalDetailsPatch) -> AppResult<()> {
        if let Some(raw) = non_empty(patch.dob) {
            self.dob = Some(parse_date(&raw, "dob")?);
        }
        merge_text(&mut self.gender, patch.gender);
        merge_text(&mut self.nationality, patch.nationality);
        merge_text(&mut self.blood_group, patch.blood_group);
        merge_text(&mut self.aadhar_number, patch.aadhar_number);
        merge_text(&mut self.pan, patch.pan);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

impl AddressLine {
    fn merge(&mut self, patch: AddressLine) {
        merge_text(&mut self.address, patch.address);
        merge_text(&mut self.pin, patch.pin);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent: Option<AddressLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corresponding: Option<AddressLine>,
}

impl Address {
    pub fn merge(&mut self, patch: AddressPatch) {
        if let Some(p) = patch.permanent {
            self.permanent.get_or_insert_with(AddressLine::default).merge(p);
        }
        if let Some(c) = patch.corresponding {
            self.corresponding.get_or_insert_with(AddressLine::default).merge(c);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_image: Option<String>,
}

impl SchoolRecord {
    fn merge(&mut self, patch: SchoolPatch) {
        merge_text(&mut self.name, patch.name);
        merge_value(&mut self.marks, patch.marks);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<SchoolRecord>,
    #[serde(default, rename = "school12th", skip_serializing_if = "Option::is_none")]
    pub school_12th: Option<SchoolRecord>,
    #[serde(default, rename = "school10th", skip_serializing_if = "Option::is_none")]
    pub school_10th: Option<SchoolRecord>,
}

impl Education {
    pub fn merge(&mut self, patch: EducationPatch) {
        if let Some(p) = patch.college {
            self.college.get_or_insert_with(SchoolRecord::default).merge(p);
        }
        if let Some(p) = patch.school_12th {
            self.school_12th.get_or_insert_with(SchoolRecord::default).merge(p);
        }
        if let Some(p) = patch.school_10th {
            self.school_10th.get_or_insert_with(SchoolRecord::default).merge(p);
        }
    }

    pub fn college_mut(&mut self) -> &mut SchoolRecord {
        self.college.get_or_insert_with(SchoolRecord::default)
    }

    pub fn school_12th_mut(&mut self) -> &mut SchoolRecord {
        self.school_12th.get_or_insert_with(SchoolRecord::default)
    }

    pub fn school_10th_mut(&mut self) -> &mut SchoolRecord {
        self.school_10th.get_or_insert_with(SchoolRecord::default)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    pub message: String,
    #[serde(with = "crate::utils::time")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            message: message.into(),
            date: Utc::now(),
            read: false,
        }
    }
}

// ==================== REQUESTS ====================

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub user_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub roll_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ParentsRequest {
    /// Must be an array; checked by the handler to report a clear error.
    #[schema(value_type = Vec<Parent>)]
    pub parents: serde_json::Value,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetailsPatch {
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub blood_group: Option<String>,
    pub aadhar_number: Option<String>,
    pub pan: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddressPatch {
    pub permanent: Option<AddressLine>,
    pub corresponding: Option<AddressLine>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SchoolPatch {
    pub name: Option<String>,
    pub marks: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EducationPatch {
    pub college: Option<SchoolPatch>,
    #[serde(rename = "school12th")]
    pub school_12th: Option<SchoolPatch>,
    #[serde(rename = "school10th")]
    pub school_10th: Option<SchoolPatch>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_id: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefaultPasswordRequest {
    pub user_id: String,
    #[validate(length(min = 1, message = "Default password is required"))]
    pub default_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    #[schema(value_type = Vec<String>)]
    pub notification_ids: serde_json::Value,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub query: Option<String>,
}

// ==================== RESPONSES ====================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// Row returned by the user search.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub user_type: UserType,
}

impl From<User> for UserListItem {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            user_type: user.user_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub batch_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub course_id: String,
}

/// The caller's user document without the password, references populated.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    pub batches: Vec<BatchRef>,
    pub courses: Vec<CourseRef>,
    pub notifications: Vec<Notification>,
    #[serde(with = "crate::utils::time")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Amit".into(), "9999".into(), "  Amit@Example.COM ", "hash".into(), UserType::Free)
    }

    #[test]
    fn email_is_normalised_and_password_hash_kept() {
        let u = user();
        assert_eq!(u.email, "amit@example.com");
        assert_eq!(u.id.len(), 24);
    }

    #[test]
    fn personal_details_merge_keeps_siblings() {
        let mut details = PersonalDetails {
            gender: Some("female".into()),
            aadhar_image: Some("/uploads/a.png".into()),
            ..Default::default()
        };
        details
            .merge(PersonalDetailsPatch {
                nationality: Some("Indian".into()),
                gender: Some("".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(details.gender.as_deref(), Some("female"));
        assert_eq!(details.nationality.as_deref(), Some("Indian"));
        assert_eq!(details.aadhar_image.as_deref(), Some("/uploads/a.png"));
    }

    #[test]
    fn invalid_dob_is_rejected() {
        let mut details = PersonalDetails::default();
        let err = details
            .merge(PersonalDetailsPatch { dob: Some("31/02/2000".into()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn address_merge_creates_missing_lines() {
        let mut address = Address {
            permanent: Some(AddressLine { address: Some("Old Road".into()), pin: Some("110001".into()) }),
            corresponding: None,
        };
        address.merge(AddressPatch {
            permanent: Some(AddressLine { address: None, pin: Some("110002".into()) }),
            corresponding: Some(AddressLine { address: Some("Hostel 4".into()), pin: None }),
        });
        let permanent = address.permanent.unwrap();
        assert_eq!(permanent.address.as_deref(), Some("Old Road"));
        assert_eq!(permanent.pin.as_deref(), Some("110002"));
        assert_eq!(address.corresponding.unwrap().address.as_deref(), Some("Hostel 4"));
    }

    #[test]
    fn education_merge_keeps_result_images() {
        let mut education = Education::default();
        education.school_10th_mut().result_image = Some("/uploads/r10.pdf".into());
        education.merge(EducationPatch {
            school_10th: Some(SchoolPatch { name: Some("DPS".into()), marks: Some(91.5) }),
            ..Default::default()
        });
        let record = education.school_10th.unwrap();
        assert_eq!(record.name.as_deref(), Some("DPS"));
        assert_eq!(record.marks, Some(91.5));
        assert_eq!(record.result_image.as_deref(), Some("/uploads/r10.pdf"));
        assert!(education.college.is_none());
    }

    #[test]
    fn notifications_track_unread() {
        let mut u = user();
        u.notify("one");
        u.notify("two");
        let first = u.notifications[0].id.clone();
        u.mark_read(&[first, "unknown".into()]);
        assert_eq!(u.unread_count(), 1);
    }

    #[test]
    fn user_type_parses_known_values() {
        assert_eq!("premium".parse::<UserType>().unwrap(), UserType::Premium);
        assert!("root".parse::<UserType>().is_err());
        assert_eq!(UserType::Admin.to_string(), "admin");
    }
}
