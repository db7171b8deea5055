//! `clubhouse-core`: domain foundation building blocks.
//!
//! Identifiers and the domain error model shared by every other crate.
//! No infrastructure concerns live here.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{ClubId, EventId, UserId};
