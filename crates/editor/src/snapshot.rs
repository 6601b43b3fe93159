//! History snapshots.
//!
//! An `EditorSnapshot` captures what undo/redo restores: the template tree and
//! the selection. Playback position, mode and the dirty flag are session state
//! and are left alone by a restore.

use serde::{Deserialize, Serialize};

use tz_template::Template;

use crate::selection::Selection;
use crate::state::EditorState;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub template: Template,
    pub selection: Selection,
}

impl EditorSnapshot {
    pub fn capture(state: &EditorState) -> Self {
        Self {
            template: state.template.clone(),
            selection: state.selection.clone(),
        }
    }

    /// Write this snapshot back into `state`, then re-clamp the playhead to
    /// the restored duration.
    pub fn restore(self, state: &mut EditorState) {
        state.template = self.template;
        state.selection = self.selection;
        state.reconcile();

        tracing::debug!(
            sections = state.template.sections.len(),
            elements = state.template.element_count(),
            "Snapshot restored"
        );
    }
}
