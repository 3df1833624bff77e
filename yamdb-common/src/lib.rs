//! # YaMDb Common Library
//!
//! Shared code for the YaMDb API service including:
//! - Database schema and models
//! - Error taxonomy and HTTP response mapping
//! - Field-level validation rules
//! - Role/permission decision engine
//! - Rating aggregation
//! - Access token and confirmation code issuing
//! - Mail collaborator contract
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod mail;
pub mod permissions;
pub mod rating;
pub mod token;
pub mod validate;

pub use error::{Error, Result};
pub use permissions::{authorize, Action, Scope};
