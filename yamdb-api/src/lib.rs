//! YaMDb API service library
//!
//! Exposes the router construction and repository modules so the
//! integration tests can drive the real HTTP surface without a socket.

pub mod api;
pub mod db;
