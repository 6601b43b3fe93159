//! Editor state container.
//!
//! `EditorState` is the single source of truth that subscribers render from.
//! The [`Editor`](crate::Editor) owns it and is the only writer.

use serde::{Deserialize, Serialize};

use tz_template::Template;

use crate::playback::{EditorMode, PlaybackState};
use crate::selection::Selection;

/// Template being edited plus the session's UI state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    /// The template tree. Always holds at least one section.
    pub template: Template,
    pub selection: Selection,
    pub playback: PlaybackState,
    pub mode: EditorMode,
    pub show_property_editor: bool,
    /// Changes since the last load or successful save.
    pub is_dirty: bool,
}

impl EditorState {
    /// Fresh session state around `template`: nothing selected, paused at 0, clean.
    pub fn new(template: Template) -> Self {
        Self {
            template,
            selection: Selection::new(),
            playback: PlaybackState::new(),
            mode: EditorMode::Edit,
            show_property_editor: true,
            is_dirty: false,
        }
    }

    pub fn mark_dirty(&mut self) {
        if !self.is_dirty {
            self.is_dirty = true;
            tracing::debug!(template = %self.template.id, "Template marked as dirty");
        }
    }

    pub fn mark_clean(&mut self) {
        if self.is_dirty {
            self.is_dirty = false;
            tracing::debug!(template = %self.template.id, "Template marked as clean");
        }
    }

    /// Restore the selection and playhead invariants after the template changed.
    pub(crate) fn reconcile(&mut self) {
        self.selection.retain_valid(&self.template);
        let total = self.template.total_duration();
        if self.playback.clamp_to(total) {
            tracing::debug!(time = %self.playback.current_time, total, "Playhead clamped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tz_common::{AspectRatio, TimeCode};
    use tz_template::{Element, ElementType, Section, SectionKind};

    fn template() -> Template {
        let mut s1 = Section::new("s1".into(), SectionKind::Hook, 3.0);
        s1.elements.push(Element::new("e1".into(), ElementType::Text));
        Template::new("t", "State", AspectRatio::Square)
            .with_section(s1)
            .with_section(Section::new("s2".into(), SectionKind::Outro, 2.0))
    }

    #[test]
    fn new_state_defaults() {
        let state = EditorState::new(template());
        assert!(state.selection.is_empty());
        assert_eq!(state.mode, EditorMode::Edit);
        assert!(state.show_property_editor);
        assert!(!state.playback.playing);
        assert!(!state.is_dirty);
    }

    #[test]
    fn mark_dirty_and_clean() {
        let mut state = EditorState::new(template());
        state.mark_dirty();
        assert!(state.is_dirty);
        state.mark_clean();
        assert!(!state.is_dirty);
    }

    #[test]
    fn reconcile_fixes_selection_and_playhead() {
        let mut state = EditorState::new(template());
        state
            .selection
            .select_element(&state.template, Some(&"e1".into()))
            .unwrap();
        state.playback.current_time = TimeCode::from_secs(4.5);

        state.template.sections.remove(0);
        state.reconcile();

        assert!(state.selection.is_empty());
        assert_eq!(state.playback.current_time.as_secs(), 2.0);
    }

    #[test]
    fn state_serializes_camel_case() {
        let value = serde_json::to_value(EditorState::new(template())).unwrap();
        assert_eq!(value["mode"], "edit");
        assert_eq!(value["showPropertyEditor"], true);
        assert_eq!(value["playback"]["currentTime"], 0.0);
    }
}
