pub mod auth;
pub mod auth_handlers;
pub mod auth_middleware;
pub mod category_handlers;
pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod item_handlers;
pub mod oauth;
pub mod observability;
pub mod repository;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use routes::build_router;
pub use state::AppState;
