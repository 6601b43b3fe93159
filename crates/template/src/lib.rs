//! `tz-template` -- Template model and persistence for the Trendzo editor.
//!
//! This crate owns everything about a template that does not depend on an
//! editing session:
//!
//! - **Model**: `Template`, `Section`, `Element` and their serde JSON shape
//! - **Patches**: `ElementPatch`, `SectionPatch`, `TemplatePatch` partial updates
//! - **Validation**: structural checks and best-effort repair of external input
//! - **Save/Load**: atomic JSON files, with version migration on load
//! - **Stores**: the `TemplateStore` persistence seam, file and memory backed
//! - **Autosave**: a polled timer for periodic saves
//!
//! # Usage
//!
//! ```rust,no_run
//! use tz_common::AspectRatio;
//! use tz_template::{load_template, save_template, Section, SectionKind, Template};
//! use std::path::Path;
//!
//! let template = Template::new("launch", "Launch Promo", AspectRatio::Portrait)
//!     .with_section(Section::new("s1".into(), SectionKind::Hook, 3.0));
//!
//! save_template(&template, Path::new("launch.tzt.json")).unwrap();
//! let loaded = load_template(Path::new("launch.tzt.json")).unwrap();
//! assert_eq!(loaded.name, "Launch Promo");
//! ```

pub mod autosave;
pub mod error;
pub mod load;
pub mod migrate;
pub mod patch;
pub mod save;
pub mod store;
pub mod types;
pub mod validate;

// Re-export primary API at crate root
pub use autosave::AutosaveTimer;
pub use error::{TemplateError, TemplateResult};
pub use load::{from_json_string, load_template};
pub use migrate::{migrate_template, CURRENT_VERSION};
pub use patch::{ElementPatch, SectionPatch, TemplatePatch};
pub use save::{save_template, to_json_string, to_json_string_compact, TEMPLATE_EXTENSION};
pub use store::{JsonFileStore, MemoryStore, TemplateStore};
pub use types::{
    Background, BackgroundKind, Element, ElementContent, ElementType, Section, SectionKind,
    ShapeKind, Template, TextAlign, TextStyle,
};
pub use validate::{normalize, validate_template};
