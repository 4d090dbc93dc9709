// Utility functions
pub mod error;
pub mod multipart;
pub mod time;
pub mod validation;

pub use error::*;
