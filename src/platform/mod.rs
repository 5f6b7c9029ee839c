//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key names to held controls)
//! - Storage (LocalStorage on web, JSON files on native)
//! - The JS-facing session handle (web only)

pub mod input;
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::KeyState;
pub use storage::Store;
