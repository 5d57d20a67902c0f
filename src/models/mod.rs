//! Diesel row types and their conversions to and from the domain.

pub mod category;
pub mod comment;
#[cfg(feature = "server")]
pub mod config;
pub mod post;
pub mod tag;
