//! Middleware HTTP

pub mod auth;
pub mod cors;
