pub mod assignments;
pub mod auth;
pub mod batches;
pub mod catalog;
pub mod courses;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod payments;
pub mod profile;
pub mod search;
pub mod showcase;
pub mod swagger;
pub mod test_records;
pub mod ui_components;
pub mod users;
