//! pyeongeo-core — curriculum extraction, sentence cache, and generation.
//!
//! This crate defines the data model, the curriculum text extractor and
//! index, the sentence cache, and the cache-backed generation pipeline that
//! the rest of pyeongeo builds on.

pub mod cache;
pub mod curriculum;
pub mod error;
pub mod extract;
pub mod generator;
pub mod model;
pub mod prompt;
pub mod results;
pub mod session;
pub mod traits;
