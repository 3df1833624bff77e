//! Repository queries per entity

pub mod comments;
pub mod reviews;
pub mod taxonomy;
pub mod titles;
pub mod users;
