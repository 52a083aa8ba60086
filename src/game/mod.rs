//! Game-side data model and the pure derivations the client computes from it.

pub mod aggregate;
pub mod format;
pub mod model;
pub mod research;
pub mod resources;

pub use aggregate::*;
pub use format::*;
pub use model::*;
pub use research::*;
pub use resources::*;
