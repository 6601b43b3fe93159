//! `tz-common` -- Shared types, ids, rejections, and configuration for the Trendzo editor.
//!
//! This crate is the foundation the template model and the editor depend on:
//!
//! - **Types**: `TimeCode`, `Resolution`, `AspectRatio`
//! - **Ids**: `SectionId`, `ElementId`, and the `IdGenerator` seam
//! - **Errors**: `Rejection` (why an edit was a no-op), `ConfigError` (thiserror-based)
//! - **Config**: `EditorConfig`

pub mod config;
pub mod error;
pub mod id;
pub mod types;

// Re-export commonly used items at crate root
pub use config::EditorConfig;
pub use error::{ensure_finite, ConfigError, EditResult, Rejection, RejectionKind};
pub use id::{unique_id, ElementId, IdGenerator, RandomIds, SectionId, SequentialIds};
pub use types::{AspectRatio, Resolution, TimeCode};
