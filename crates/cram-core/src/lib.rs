//! Core types and trait definitions for the Cram study helper.
//!
//! This crate is deliberately free of HTTP, model-client and database
//! dependencies. Every other crate in the workspace depends on it.

pub mod auth;
pub mod content;
pub mod error;
pub mod practice;
pub mod store;
pub mod study;

pub use error::{Error, Result};
