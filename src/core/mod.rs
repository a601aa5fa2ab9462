//! Core module - resolution logic and domain model

pub mod doc;
pub mod error;
pub mod filter;
pub mod model;
pub mod resolver;
