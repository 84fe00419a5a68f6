pub mod auth;
pub mod certificate;
pub mod chapter;
pub mod course;
pub mod enrollment;
pub mod profile;
pub mod quiz;
pub mod upload;

pub use auth::*;
pub use certificate::*;
pub use chapter::*;
pub use course::*;
pub use enrollment::*;
pub use profile::*;
pub use quiz::*;
pub use upload::*;
