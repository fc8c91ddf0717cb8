//! pd-state: Persistence, autosave, import and configuration
//!
//! Provides the collaborators the draw core talks to but does not implement.

mod autosave;
mod config;
mod error;
mod import;
mod persist;
mod store;

pub use autosave::*;
pub use config::*;
pub use error::*;
pub use import::*;
pub use persist::*;
pub use store::*;
