//! Committed editor operations, as reported to subscribers.
//!
//! `Action::is_tracked` is the single place that decides which operations
//! create history entries.

use std::fmt;

use tz_common::{ElementId, SectionId, TimeCode};
use tz_template::ElementType;

use crate::playback::EditorMode;

/// Direction of a reorder. `Up` moves towards index 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// An operation the editor has applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    // Session
    LoadTemplate { template: String },
    Saved { template: String },

    // Tracked structure edits
    AddSection { section: SectionId },
    DeleteSection { section: SectionId },
    DuplicateSection { source: SectionId, copy: SectionId },
    MoveSection { section: SectionId, direction: Direction },
    UpdateSection { section: SectionId },
    AddElement { section: SectionId, element: ElementId, kind: ElementType },
    UpdateElement { section: SectionId, element: ElementId },
    DeleteElement { section: SectionId, element: ElementId },
    DuplicateElement { section: SectionId, source: ElementId, copy: ElementId },
    MoveElement { section: SectionId, element: ElementId, direction: Direction },
    SetElementLocked { section: SectionId, element: ElementId, locked: bool },
    UpdateTemplate,

    // Untracked UI state
    SelectSection(Option<SectionId>),
    SelectElement(Option<ElementId>),
    SetCurrentTime(TimeCode),
    TogglePlayback { playing: bool },
    AdvancePlayback { time: TimeCode, reached_end: bool },
    SetEditorMode(EditorMode),
    SetShowPropertyEditor(bool),
    BeginGesture { label: String },
    EndGesture { label: String, recorded: bool },

    // History
    Undo { label: String },
    Redo { label: String },
}

impl Action {
    /// Whether the operation records a history entry before it is applied.
    pub fn is_tracked(&self) -> bool {
        match self {
            Action::AddSection { .. }
            | Action::DeleteSection { .. }
            | Action::DuplicateSection { .. }
            | Action::MoveSection { .. }
            | Action::UpdateSection { .. }
            | Action::AddElement { .. }
            | Action::UpdateElement { .. }
            | Action::DeleteElement { .. }
            | Action::DuplicateElement { .. }
            | Action::MoveElement { .. }
            | Action::SetElementLocked { .. }
            | Action::UpdateTemplate => true,

            Action::LoadTemplate { .. }
            | Action::Saved { .. }
            | Action::SelectSection(_)
            | Action::SelectElement(_)
            | Action::SetCurrentTime(_)
            | Action::TogglePlayback { .. }
            | Action::AdvancePlayback { .. }
            | Action::SetEditorMode(_)
            | Action::SetShowPropertyEditor(_)
            | Action::BeginGesture { .. }
            | Action::EndGesture { .. }
            | Action::Undo { .. }
            | Action::Redo { .. } => false,
        }
    }

    /// Human-readable label, used for history entries and undo/redo menus.
    pub fn label(&self) -> String {
        match self {
            Action::LoadTemplate { .. } => "Load template".into(),
            Action::Saved { .. } => "Save template".into(),
            Action::AddSection { .. } => "Add section".into(),
            Action::DeleteSection { .. } => "Delete section".into(),
            Action::DuplicateSection { .. } => "Duplicate section".into(),
            Action::MoveSection { direction, .. } => format!("Move section {direction}"),
            Action::UpdateSection { .. } => "Edit section".into(),
            Action::AddElement { kind, .. } => format!("Add {kind}"),
            Action::UpdateElement { .. } => "Edit element".into(),
            Action::DeleteElement { .. } => "Delete element".into(),
            Action::DuplicateElement { .. } => "Duplicate element".into(),
            Action::MoveElement { direction, .. } => format!("Move element {direction}"),
            Action::SetElementLocked { locked: true, .. } => "Lock element".into(),
            Action::SetElementLocked { locked: false, .. } => "Unlock element".into(),
            Action::UpdateTemplate => "Edit template".into(),
            Action::SelectSection(_) => "Select section".into(),
            Action::SelectElement(_) => "Select element".into(),
            Action::SetCurrentTime(_) => "Seek".into(),
            Action::TogglePlayback { playing: true } => "Play".into(),
            Action::TogglePlayback { playing: false } => "Pause".into(),
            Action::AdvancePlayback { .. } => "Playback tick".into(),
            Action::SetEditorMode(EditorMode::Edit) => "Edit mode".into(),
            Action::SetEditorMode(EditorMode::Preview) => "Preview mode".into(),
            Action::SetShowPropertyEditor(_) => "Toggle property editor".into(),
            Action::BeginGesture { label } | Action::EndGesture { label, .. } => label.clone(),
            Action::Undo { label } => format!("Undo {label}"),
            Action::Redo { label } => format!("Redo {label}"),
        }
    }
}
