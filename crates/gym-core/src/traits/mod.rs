//! Ports implemented by the infrastructure crates

mod collaborators;
mod repositories;

pub use collaborators::*;
pub use repositories::*;
