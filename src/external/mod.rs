pub mod payment;
pub mod storage;

pub use payment::*;
pub use storage::*;
