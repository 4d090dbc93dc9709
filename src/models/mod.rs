pub mod assignment;
pub mod batch;
pub mod catalog;
pub mod course;
pub mod payment;
pub mod showcase;
pub mod test_record;
pub mod ui_component;
pub mod user;

pub use assignment::*;
pub use batch::*;
pub use catalog::*;
pub use course::*;
pub use payment::*;
pub use showcase::*;
pub use test_record::*;
pub use ui_component::*;
pub use user::*;
