pub mod auth_service;
pub mod enrollment_service;
pub mod notification_service;
pub mod reference_service;
