pub mod access;
pub mod auth_service;
pub mod certificate_service;
pub mod chapter_service;
pub mod course_service;
pub mod enrollment_service;
pub mod quiz_service;
pub mod upload_service;
pub mod user_service;

pub use auth_service::*;
pub use certificate_service::*;
pub use chapter_service::*;
pub use course_service::*;
pub use enrollment_service::*;
pub use quiz_service::*;
pub use upload_service::*;
pub use user_service::*;
