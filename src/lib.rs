//! Terminal client for a space empire game server.
//!
//! The client renders the entity tree of one map coordinate, projects the
//! empire's resources forward in time, and drives build, upgrade and destroy
//! requests with cache invalidation against the HTTP backend.

pub mod api;
pub mod app;
pub mod config;
pub mod game;
pub mod store;
pub mod ui;
