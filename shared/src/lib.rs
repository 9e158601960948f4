pub mod id;
pub mod models;

pub use id::*;
pub use models::*;
