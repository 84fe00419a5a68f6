pub mod auth;
pub mod certificate;
pub mod chapter;
pub mod course;
pub mod enrollment;
pub mod pages;
pub mod profile;
pub mod quiz;
pub mod upload;

pub use auth::auth_config;
pub use certificate::certificate_config;
pub use chapter::chapter_config;
pub use course::course_config;
pub use enrollment::enrollment_config;
pub use pages::pages_config;
pub use profile::profile_config;
pub use quiz::quiz_config;
pub use upload::upload_config;
