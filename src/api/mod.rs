//! HTTP access to the game backend.

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;
