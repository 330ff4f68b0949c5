//! Middleware del sistema

pub mod cors;

pub use cors::*;
