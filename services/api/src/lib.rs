//! services/api/src/lib.rs
//!
//! The ClassTAP attendance service: configuration, storage and identity
//! adapters, and the axum HTTP surface.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
