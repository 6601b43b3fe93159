//! `tz-editor` -- Editing session for Trendzo video templates.
//!
//! This crate provides:
//!
//! - **`Editor`**: the mutation API. Every template change goes through it.
//! - **`HistoryManager`**: snapshot-based undo/redo with gesture grouping.
//! - **`EditorSnapshot`**: what undo/redo restores (template and selection).
//! - **`Selection`**: the section/element cursor, never left dangling.
//! - **`PlaybackState`** / **`EditorMode`**: playhead and edit/preview mode.
//! - **`derived`**: pure read-only values (durations, playhead fraction, lookups).
//!
//! # Architecture
//!
//! ```text
//! Editor
//! ├── state: EditorState             (what subscribers render)
//! │   ├── template: Template         (sections -> elements)
//! │   ├── selection: Selection
//! │   ├── playback: PlaybackState
//! │   └── mode, show_property_editor, is_dirty
//! ├── history: HistoryManager        (undo/redo stacks of EditorSnapshot)
//! ├── ids: Box<dyn IdGenerator>      (fresh section/element ids)
//! ├── autosave: AutosaveTimer
//! └── subscribers                    (called with (&EditorState, &Action))
//! ```
//!
//! # Usage
//!
//! ```rust
//! use tz_common::{AspectRatio, SectionId};
//! use tz_editor::Editor;
//! use tz_template::{ElementPatch, ElementType, Section, SectionKind, Template};
//!
//! let template = Template::new("promo", "Promo", AspectRatio::Portrait)
//!     .with_section(Section::new("s1".into(), SectionKind::Hook, 3.0));
//! let mut editor = Editor::new(template);
//!
//! let s1 = SectionId::from("s1");
//! let title = editor.add_element(&s1, ElementType::Text).unwrap();
//! editor
//!     .update_element(&s1, &title, &ElementPatch::text("Stop scrolling"))
//!     .unwrap();
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.template().sections[0].elements[0].text(), Some("New text"));
//! ```

pub mod action;
pub mod derived;
pub mod editor;
pub mod history;
pub mod playback;
pub mod selection;
pub mod snapshot;
pub mod state;

// Re-export primary types at crate root for convenience.
pub use action::{Action, Direction};
pub use editor::{Editor, SubscriptionId, UNTITLED_TEMPLATE};
pub use history::{HistoryEntry, HistoryManager};
pub use playback::{EditorMode, PlaybackState};
pub use selection::Selection;
pub use snapshot::EditorSnapshot;
pub use state::EditorState;
