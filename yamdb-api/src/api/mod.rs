//! HTTP API: router, handlers and extractors

pub mod auth;
pub mod auth_middleware;
pub mod comments;
pub mod pagination;
pub mod reviews;
pub mod server;
pub mod taxonomy;
pub mod titles;
pub mod users;

pub use server::{build_router, AppContext};
