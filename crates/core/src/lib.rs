//! `careerdesk-core`: shared primitives.
//!
//! Identifiers and the domain error model used by the AI request queue and
//! the HTTP surface. No runtime or infrastructure concerns live here.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{RequestId, UserId};
