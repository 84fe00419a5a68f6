pub mod certificate_number;
pub mod email;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod pdf;

pub use certificate_number::{format_certificate_number, generate_unique_certificate_number};
pub use email::*;
pub use jwt::*;
pub use pagination::*;
pub use password::*;
