//! Core data models for the mirror.

mod asset;
mod failure;
mod page;

pub use asset::*;
pub use failure::*;
pub use page::*;
