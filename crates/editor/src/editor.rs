//! The editing session: every change to a template goes through [`Editor`].
//!
//! Operations come in two flavours:
//!
//! - **Tracked** edits change the template tree. They record the state before
//!   the change in history, mark the session dirty, and notify subscribers.
//! - **Untracked** operations change selection, playhead, or view state and
//!   only notify subscribers.
//!
//! Every operation returns `Err(Rejection)` instead of failing: a rejected
//! call leaves state, history, and subscribers untouched.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, error, info, warn};

use tz_common::{
    ensure_finite, unique_id, EditResult, EditorConfig, ElementId, IdGenerator, RandomIds,
    Rejection, SectionId,
};
use tz_template::types::clamp_percent;
use tz_template::{
    normalize, AutosaveTimer, Element, ElementPatch, ElementType, Section, SectionKind,
    SectionPatch, Template, TemplatePatch, TemplateResult, TemplateStore,
};

use crate::action::{Action, Direction};
use crate::history::HistoryManager;
use crate::playback::EditorMode;
use crate::snapshot::EditorSnapshot;
use crate::state::EditorState;

/// Name given to templates that arrive without one.
pub const UNTITLED_TEMPLATE: &str = "Untitled Template";

/// Handle returned by [`Editor::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&EditorState, &Action)>;

/// Log a rejection and hand it back as an `Err`.
fn reject<T>(rejection: Rejection) -> EditResult<T> {
    debug!(reason = %rejection, kind = ?rejection.kind(), "Edit rejected");
    Err(rejection)
}

/// Template editing session.
pub struct Editor {
    state: EditorState,
    history: HistoryManager,
    config: EditorConfig,
    ids: Box<dyn IdGenerator>,
    autosave: AutosaveTimer,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("state", &self.state)
            .field("history", &self.history)
            .field("config", &self.config)
            .field("autosave", &self.autosave)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Editor {
    /// Open `template` with the default configuration and random ids.
    pub fn new(template: Template) -> Self {
        Self::with_config(template, EditorConfig::default(), Box::new(RandomIds))
    }

    /// Open `template` with an explicit configuration and id source.
    pub fn with_config(template: Template, config: EditorConfig, ids: Box<dyn IdGenerator>) -> Self {
        let mut editor = Self {
            state: EditorState::new(Template::new("", UNTITLED_TEMPLATE, config.default_aspect_ratio)),
            history: HistoryManager::new(config.history_limit),
            autosave: AutosaveTimer::new(u64::from(config.autosave_interval_secs)),
            config,
            ids,
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        editor.install(template);
        editor
    }

    /// A new, untitled template with one empty section.
    pub fn blank(config: EditorConfig, ids: Box<dyn IdGenerator>) -> Self {
        let template = Template::new("", UNTITLED_TEMPLATE, config.default_aspect_ratio);
        Self::with_config(template, config, ids)
    }

    // --- Read access ---

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn template(&self) -> &Template {
        &self.state.template
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty
    }

    // --- Subscriptions ---

    /// Call `callback` after every committed operation, in dispatch order.
    pub fn subscribe(&mut self, callback: impl FnMut(&EditorState, &Action) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        debug!(subscription = id.0, "Subscriber added");
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, action: &Action) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.state, action);
        }
    }

    // --- Session ---

    /// Replace the session wholesale: the template is repaired if needed,
    /// history, selection and playhead are reset, and the state is clean.
    pub fn load_template(&mut self, template: Template) {
        self.install(template);
        let action = Action::LoadTemplate {
            template: self.state.template.id.clone(),
        };
        self.notify(&action);
    }

    fn install(&mut self, mut template: Template) {
        let Self { ids, config, .. } = self;
        if template.id.trim().is_empty() {
            template.id = ids.next_id("tpl");
        }
        if template.name.trim().is_empty() {
            warn!(template = %template.id, "Template has no name, using default");
            template.name = UNTITLED_TEMPLATE.to_string();
        }
        let repairs = normalize(&mut template, ids.as_mut(), config.section_duration());

        info!(
            template = %template.id,
            sections = template.sections.len(),
            elements = template.element_count(),
            repairs,
            "Template loaded into editor"
        );

        self.state = EditorState::new(template);
        self.history.clear();
        self.autosave.reset();
    }

    /// Hand the current template to `store`. On success the session is clean.
    pub fn save_template(&mut self, store: &mut dyn TemplateStore) -> TemplateResult<()> {
        if let Err(e) = store.save(&self.state.template) {
            error!(template = %self.state.template.id, error = %e, "Saving template failed");
            return Err(e);
        }
        self.state.mark_clean();
        self.autosave.note_saved();
        info!(template = %self.state.template.id, "Template saved");
        let action = Action::Saved {
            template: self.state.template.id.clone(),
        };
        self.notify(&action);
        Ok(())
    }

    /// Whether there are unsaved changes older than the autosave interval.
    pub fn autosave_due(&self) -> bool {
        self.state.is_dirty && self.autosave.is_due()
    }

    pub fn autosave_timer_mut(&mut self) -> &mut AutosaveTimer {
        &mut self.autosave
    }

    // --- Tracked edits ---

    /// Commit a tracked edit whose changes are already applied to `self.state`.
    fn commit_tracked(&mut self, before: EditorSnapshot, action: Action) {
        debug_assert!(action.is_tracked());
        self.history.record(&action.label(), before);

        self.state.reconcile();
        self.state.mark_dirty();
        self.autosave.note_change();

        debug!(
            action = %action.label(),
            undo_depth = self.history.undo_count(),
            "Edit committed"
        );
        self.notify(&action);
    }

    fn commit_untracked(&mut self, action: Action) {
        debug_assert!(!action.is_tracked());
        debug!(action = %action.label(), "UI state changed");
        self.notify(&action);
    }

    fn section_index(&self, id: &SectionId) -> EditResult<usize> {
        match self.state.template.section_index(id) {
            Some(index) => Ok(index),
            None => reject(Rejection::SectionNotFound(id.clone())),
        }
    }

    fn element_index(&self, section: &SectionId, element: &ElementId) -> EditResult<(usize, usize)> {
        let s = self.section_index(section)?;
        match self.state.template.sections[s].element_index(element) {
            Some(e) => Ok((s, e)),
            None => reject(Rejection::ElementNotFound {
                section: section.clone(),
                element: element.clone(),
            }),
        }
    }

    fn fresh_section_id(&mut self) -> SectionId {
        let template = &self.state.template;
        let ids = &mut self.ids;
        SectionId::new(unique_id(
            || ids.section_id().to_string(),
            |c| template.contains_id(c),
        ))
    }

    /// An element id unused by the template and not in `reserved`.
    fn fresh_element_id(&mut self, reserved: &HashSet<String>) -> ElementId {
        let template = &self.state.template;
        let ids = &mut self.ids;
        ElementId::new(unique_id(
            || ids.element_id().to_string(),
            |c| template.contains_id(c) || reserved.contains(c),
        ))
    }

    /// Append a section of `kind` (body when `None`) with the default duration.
    pub fn add_section(&mut self, kind: Option<SectionKind>) -> SectionId {
        let id = self.fresh_section_id();
        let section = Section::new(
            id.clone(),
            kind.unwrap_or_default(),
            self.config.section_duration(),
        );

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections.push(section);
        self.commit_tracked(before, Action::AddSection { section: id.clone() });
        id
    }

    /// Remove a section. The last remaining section cannot be deleted.
    pub fn delete_section(&mut self, id: &SectionId) -> EditResult<()> {
        let index = self.section_index(id)?;
        if self.state.template.sections.len() <= 1 {
            return reject(Rejection::LastSection);
        }

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections.remove(index);
        if self.state.selection.is_section_selected(id) {
            self.state.selection.clear();
        }
        self.commit_tracked(before, Action::DeleteSection { section: id.clone() });
        Ok(())
    }

    /// Deep-copy a section with fresh ids and insert it right after the original.
    pub fn duplicate_section(&mut self, id: &SectionId) -> EditResult<SectionId> {
        let index = self.section_index(id)?;

        let mut copy = self.state.template.sections[index].clone();
        copy.id = self.fresh_section_id();
        copy.name = format!("{} (copy)", copy.name);

        let mut reserved = HashSet::from([copy.id.to_string()]);
        for element in &mut copy.elements {
            element.id = self.fresh_element_id(&reserved);
            reserved.insert(element.id.to_string());
        }

        let copy_id = copy.id.clone();
        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections.insert(index + 1, copy);
        self.commit_tracked(
            before,
            Action::DuplicateSection {
                source: id.clone(),
                copy: copy_id.clone(),
            },
        );
        Ok(copy_id)
    }

    pub fn move_section_up(&mut self, id: &SectionId) -> EditResult<()> {
        self.move_section(id, Direction::Up)
    }

    pub fn move_section_down(&mut self, id: &SectionId) -> EditResult<()> {
        self.move_section(id, Direction::Down)
    }

    fn move_section(&mut self, id: &SectionId, direction: Direction) -> EditResult<()> {
        let index = self.section_index(id)?;
        let Some(target) = neighbour(index, self.state.template.sections.len(), direction) else {
            return reject(Rejection::AtBoundary);
        };

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections.swap(index, target);
        self.commit_tracked(
            before,
            Action::MoveSection {
                section: id.clone(),
                direction,
            },
        );
        Ok(())
    }

    /// Merge `patch` into a section.
    pub fn update_section(&mut self, id: &SectionId, patch: &SectionPatch) -> EditResult<()> {
        let index = self.section_index(id)?;
        let updated = patch
            .apply_to(&self.state.template.sections[index])
            .or_else(reject)?;

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections[index] = updated;
        self.commit_tracked(before, Action::UpdateSection { section: id.clone() });
        Ok(())
    }

    /// Change template name, description or aspect ratio.
    pub fn update_template(&mut self, patch: &TemplatePatch) -> EditResult<()> {
        let mut updated = self.state.template.clone();
        patch.apply_to(&mut updated).or_else(reject)?;

        let before = EditorSnapshot::capture(&self.state);
        self.state.template = updated;
        self.commit_tracked(before, Action::UpdateTemplate);
        Ok(())
    }

    /// Append a centred element of `kind` on top of the section and select it.
    pub fn add_element(&mut self, section: &SectionId, kind: ElementType) -> EditResult<ElementId> {
        let index = self.section_index(section)?;
        let id = self.fresh_element_id(&HashSet::new());

        let mut element = Element::new(id.clone(), kind);
        element.z_index = self.state.template.sections[index].next_z_index();

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections[index].elements.push(element);
        self.state.selection.focus(section.clone(), id.clone());
        self.commit_tracked(
            before,
            Action::AddElement {
                section: section.clone(),
                element: id.clone(),
                kind,
            },
        );
        Ok(id)
    }

    /// Merge `patch` into an element. Locked elements refuse geometry changes
    /// but still accept content and style edits.
    pub fn update_element(
        &mut self,
        section: &SectionId,
        element: &ElementId,
        patch: &ElementPatch,
    ) -> EditResult<()> {
        let (s, e) = self.element_index(section, element)?;
        let updated = patch
            .apply_to(&self.state.template.sections[s].elements[e])
            .or_else(reject)?;

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections[s].elements[e] = updated;
        self.commit_tracked(
            before,
            Action::UpdateElement {
                section: section.clone(),
                element: element.clone(),
            },
        );
        Ok(())
    }

    pub fn set_element_locked(
        &mut self,
        section: &SectionId,
        element: &ElementId,
        locked: bool,
    ) -> EditResult<()> {
        let (s, e) = self.element_index(section, element)?;
        let updated = ElementPatch::locked(locked)
            .apply_to(&self.state.template.sections[s].elements[e])
            .or_else(reject)?;

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections[s].elements[e] = updated;
        self.commit_tracked(
            before,
            Action::SetElementLocked {
                section: section.clone(),
                element: element.clone(),
                locked,
            },
        );
        Ok(())
    }

    pub fn delete_element(&mut self, section: &SectionId, element: &ElementId) -> EditResult<()> {
        let (s, e) = self.element_index(section, element)?;

        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections[s].elements.remove(e);
        if self.state.selection.is_element_selected(element) {
            self.state.selection.clear_element();
        }
        self.commit_tracked(
            before,
            Action::DeleteElement {
                section: section.clone(),
                element: element.clone(),
            },
        );
        Ok(())
    }

    /// Deep-copy an element with a fresh id, offset by the configured amount
    /// and inserted right after the original.
    pub fn duplicate_element(&mut self, section: &SectionId, element: &ElementId) -> EditResult<ElementId> {
        let (s, e) = self.element_index(section, element)?;

        let mut copy = self.state.template.sections[s].elements[e].clone();
        copy.id = self.fresh_element_id(&HashSet::new());
        let offset = self.config.duplicate_offset;
        copy.x = clamp_percent(copy.x + offset);
        copy.y = clamp_percent(copy.y + offset);

        let copy_id = copy.id.clone();
        let before = EditorSnapshot::capture(&self.state);
        self.state.template.sections[s].elements.insert(e + 1, copy);
        self.commit_tracked(
            before,
            Action::DuplicateElement {
                section: section.clone(),
                source: element.clone(),
                copy: copy_id.clone(),
            },
        );
        Ok(copy_id)
    }

    /// Swap with the previous element in the list (and their z-indices).
    pub fn move_element_up(&mut self, section: &SectionId, element: &ElementId) -> EditResult<()> {
        self.move_element(section, element, Direction::Up)
    }

    /// Swap with the next element in the list (and their z-indices).
    pub fn move_element_down(&mut self, section: &SectionId, element: &ElementId) -> EditResult<()> {
        self.move_element(section, element, Direction::Down)
    }

    fn move_element(
        &mut self,
        section: &SectionId,
        element: &ElementId,
        direction: Direction,
    ) -> EditResult<()> {
        let (s, e) = self.element_index(section, element)?;
        let len = self.state.template.sections[s].elements.len();
        let Some(target) = neighbour(e, len, direction) else {
            return reject(Rejection::AtBoundary);
        };

        let before = EditorSnapshot::capture(&self.state);
        let elements = &mut self.state.template.sections[s].elements;
        let (z_a, z_b) = (elements[e].z_index, elements[target].z_index);
        elements[e].z_index = z_b;
        elements[target].z_index = z_a;
        elements.swap(e, target);
        self.commit_tracked(
            before,
            Action::MoveElement {
                section: section.clone(),
                element: element.clone(),
                direction,
            },
        );
        Ok(())
    }

    // --- Untracked UI state ---

    pub fn select_section(&mut self, id: Option<&SectionId>) -> EditResult<()> {
        self.state
            .selection
            .select_section(&self.state.template, id)
            .or_else(reject)?;
        self.commit_untracked(Action::SelectSection(id.cloned()));
        Ok(())
    }

    pub fn select_element(&mut self, id: Option<&ElementId>) -> EditResult<()> {
        self.state
            .selection
            .select_element(&self.state.template, id)
            .or_else(reject)?;
        self.commit_untracked(Action::SelectElement(id.cloned()));
        Ok(())
    }

    /// Move the playhead, clamped to `[0, total duration]`.
    pub fn set_current_time(&mut self, secs: f64) -> EditResult<()> {
        let secs = ensure_finite("current_time", secs).or_else(reject)?;
        let total = self.state.template.total_duration();
        let time = self.state.playback.seek(secs, total);
        self.commit_untracked(Action::SetCurrentTime(time));
        Ok(())
    }

    /// Play or pause. Returns whether playback is now running.
    pub fn toggle_playback(&mut self) -> bool {
        let total = self.state.template.total_duration();
        let playing = self.state.playback.toggle(total);
        self.commit_untracked(Action::TogglePlayback { playing });
        playing
    }

    /// Advance a running playhead by `dt` seconds.
    pub fn advance_playback(&mut self, dt: f64) -> EditResult<()> {
        let dt = ensure_finite("dt", dt).or_else(reject)?;
        if dt < 0.0 {
            return reject(Rejection::invalid("dt", "must not be negative"));
        }
        if !self.state.playback.playing {
            return reject(Rejection::Unchanged);
        }
        let total = self.state.template.total_duration();
        let reached_end = self.state.playback.advance(dt, total);
        let time = self.state.playback.current_time;
        self.commit_untracked(Action::AdvancePlayback { time, reached_end });
        Ok(())
    }

    /// Switch between edit and preview. Preview hides the property editor.
    pub fn set_editor_mode(&mut self, mode: EditorMode) {
        self.state.mode = mode;
        if mode == EditorMode::Preview {
            self.state.show_property_editor = false;
        }
        self.commit_untracked(Action::SetEditorMode(mode));
    }

    pub fn set_show_property_editor(&mut self, show: bool) {
        self.state.show_property_editor = show;
        self.commit_untracked(Action::SetShowPropertyEditor(show));
    }

    /// Start grouping live edits (drag, resize) into a single history entry.
    pub fn begin_gesture(&mut self, label: &str) -> EditResult<()> {
        if self.history.is_in_gesture() {
            return reject(Rejection::invalid("gesture", "a gesture is already in progress"));
        }
        self.history
            .begin_gesture(label, EditorSnapshot::capture(&self.state));
        self.commit_untracked(Action::BeginGesture {
            label: label.to_string(),
        });
        Ok(())
    }

    /// Close the open gesture. Returns whether a history entry was recorded.
    pub fn end_gesture(&mut self) -> EditResult<bool> {
        let Some(label) = self.history.gesture_label().map(str::to_string) else {
            return reject(Rejection::Unchanged);
        };
        let after = EditorSnapshot::capture(&self.state);
        let recorded = self.history.end_gesture(&after).unwrap_or(false);
        self.commit_untracked(Action::EndGesture { label, recorded });
        Ok(recorded)
    }

    // --- History ---

    /// Restore the state before the most recent tracked edit.
    pub fn undo(&mut self) -> EditResult<()> {
        let current = EditorSnapshot::capture(&self.state);
        let Some(entry) = self.history.undo(current) else {
            return reject(Rejection::NothingToUndo);
        };
        self.apply_history(entry.snapshot, Action::Undo { label: entry.label });
        Ok(())
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> EditResult<()> {
        let current = EditorSnapshot::capture(&self.state);
        let Some(entry) = self.history.redo(current) else {
            return reject(Rejection::NothingToRedo);
        };
        self.apply_history(entry.snapshot, Action::Redo { label: entry.label });
        Ok(())
    }

    fn apply_history(&mut self, snapshot: EditorSnapshot, action: Action) {
        snapshot.restore(&mut self.state);
        self.state.mark_dirty();
        self.autosave.note_change();
        debug!(
            action = %action.label(),
            undo_depth = self.history.undo_count(),
            redo_depth = self.history.redo_count(),
            "History applied"
        );
        self.notify(&action);
    }
}

/// Index to swap with when moving `index` one step, if any.
fn neighbour(index: usize, len: usize, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => (index + 1 < len).then_some(index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tz_common::{AspectRatio, SequentialIds, TimeCode};
    use tz_template::{MemoryStore, TemplateError};

    /// A store whose backend is always down.
    struct UnavailableStore;

    impl TemplateStore for UnavailableStore {
        fn save(&mut self, _template: &Template) -> TemplateResult<()> {
            Err(TemplateError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "backend unavailable",
            )))
        }

        fn load(&self, id: &str) -> TemplateResult<Template> {
            Err(TemplateError::NotFound { id: id.to_string() })
        }

        fn list(&self) -> TemplateResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn editor_with(template: Template) -> Editor {
        Editor::with_config(template, EditorConfig::default(), Box::new(SequentialIds::new()))
    }

    /// Hands out the same id every time.
    struct Repeating;

    impl IdGenerator for Repeating {
        fn next_id(&mut self, prefix: &str) -> String {
            format!("{prefix}_same")
        }
    }

    #[test]
    fn repeating_id_generator_still_yields_unique_ids() {
        let mut template = Template::new("t", "Clashes", AspectRatio::Portrait);
        for _ in 0..3 {
            let mut section = Section::new("s".into(), SectionKind::Body, 2.0);
            section.elements.push(Element::new("e".into(), ElementType::Text));
            template.sections.push(section);
        }
        let mut editor = Editor::with_config(template, EditorConfig::default(), Box::new(Repeating));
        tz_template::validate_template(editor.template()).unwrap();

        let s = editor.add_section(None);
        let a = editor.add_element(&s, ElementType::Shape).unwrap();
        let b = editor.add_element(&s, ElementType::Shape).unwrap();
        assert_ne!(a, b);
        assert_ne!(s, "sec_same");
        tz_template::validate_template(editor.template()).unwrap();
    }

    fn one_section() -> Editor {
        editor_with(
            Template::new("t", "Test", AspectRatio::Portrait)
                .with_section(Section::new("s1".into(), SectionKind::Body, 5.0)),
        )
    }

    fn two_sections() -> Editor {
        editor_with(
            Template::new("t", "Test", AspectRatio::Portrait)
                .with_section(Section::new("s1".into(), SectionKind::Hook, 3.0))
                .with_section(Section::new("s2".into(), SectionKind::Body, 5.0)),
        )
    }

    #[test]
    fn neighbour_bounds() {
        assert_eq!(neighbour(0, 3, Direction::Up), None);
        assert_eq!(neighbour(1, 3, Direction::Up), Some(0));
        assert_eq!(neighbour(2, 3, Direction::Down), None);
        assert_eq!(neighbour(0, 1, Direction::Down), None);
    }

    #[test]
    fn blank_editor_has_one_section() {
        let ed = Editor::blank(EditorConfig::default(), Box::new(SequentialIds::new()));
        assert_eq!(ed.template().sections.len(), 1);
        assert_eq!(ed.template().name, UNTITLED_TEMPLATE);
        assert!(!ed.template().id.is_empty());
        assert!(!ed.is_dirty());
        assert!(!ed.can_undo());
    }

    #[test]
    fn add_section_uses_config_duration_and_kind() {
        let config = EditorConfig {
            default_section_duration: 0.2,
            ..EditorConfig::default()
        };
        let mut ed = Editor::with_config(
            Template::new("t", "T", AspectRatio::Square),
            config,
            Box::new(SequentialIds::new()),
        );
        let id = ed.add_section(Some(SectionKind::Outro));
        let section = ed.template().find_section(&id).unwrap();
        assert_eq!(section.duration, 1.0);
        assert_eq!(section.name, "Outro");
        assert!(section.elements.is_empty());
        assert_eq!(ed.undo_label(), Some("Add section"));
        assert!(ed.is_dirty());
    }

    #[test]
    fn delete_section_rules() {
        let mut ed = two_sections();
        assert_eq!(
            ed.delete_section(&"nope".into()),
            Err(Rejection::SectionNotFound("nope".into()))
        );
        ed.delete_section(&"s2".into()).unwrap();
        assert_eq!(ed.delete_section(&"s1".into()), Err(Rejection::LastSection));
        assert_eq!(ed.template().sections.len(), 1);
        assert_eq!(ed.history().undo_count(), 1);
    }

    #[test]
    fn duplicate_section_copies_with_fresh_ids() {
        let mut ed = two_sections();
        let el = ed.add_element(&"s1".into(), ElementType::Text).unwrap();
        let copy = ed.duplicate_section(&"s1".into()).unwrap();

        let t = ed.template();
        assert_eq!(t.section_index(&copy), Some(1));
        let copied = &t.sections[1];
        assert_eq!(copied.name, "Hook (copy)");
        assert_eq!(copied.elements.len(), 1);
        assert_ne!(copied.elements[0].id, el);
        assert_eq!(copied.elements[0].kind(), ElementType::Text);
        tz_template::validate_template(t).unwrap();
    }

    #[test]
    fn move_sections() {
        let mut ed = two_sections();
        assert_eq!(ed.move_section_up(&"s1".into()), Err(Rejection::AtBoundary));
        assert_eq!(ed.move_section_down(&"s2".into()), Err(Rejection::AtBoundary));
        ed.move_section_down(&"s1".into()).unwrap();
        let order: Vec<&str> = ed.template().sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, ["s2", "s1"]);
        assert_eq!(ed.undo_label(), Some("Move section down"));
    }

    #[test]
    fn update_section_duration_clamps_playhead() {
        let mut ed = two_sections();
        ed.set_current_time(7.5).unwrap();
        ed.update_section(&"s2".into(), &SectionPatch::duration(1.0))
            .unwrap();
        assert_eq!(ed.state().playback.current_time.as_secs(), 4.0);

        assert!(matches!(
            ed.update_section(&"s2".into(), &SectionPatch::duration(0.0)),
            Err(Rejection::InvalidValue { field: "duration", .. })
        ));
    }

    #[test]
    fn add_element_selects_and_stacks_on_top() {
        let mut ed = one_section();
        let a = ed.add_element(&"s1".into(), ElementType::Shape).unwrap();
        let b = ed.add_element(&"s1".into(), ElementType::Text).unwrap();
        assert_ne!(a, b);

        let section = &ed.template().sections[0];
        assert_eq!(section.elements[0].z_index, 0);
        assert_eq!(section.elements[1].z_index, 1);
        assert!(ed.state().selection.is_element_selected(&b));
        assert!(ed.state().selection.is_section_selected(&"s1".into()));

        assert_eq!(
            ed.add_element(&"nope".into(), ElementType::Text),
            Err(Rejection::SectionNotFound("nope".into()))
        );
    }

    #[test]
    fn locked_element_rejects_geometry_but_accepts_content() {
        let mut ed = one_section();
        let s1: SectionId = "s1".into();
        let el = ed.add_element(&s1, ElementType::Text).unwrap();
        ed.set_element_locked(&s1, &el, true).unwrap();
        let depth = ed.history().undo_count();

        assert_eq!(
            ed.update_element(&s1, &el, &ElementPatch::position(10.0, 10.0)),
            Err(Rejection::ElementLocked(el.clone()))
        );
        assert_eq!(ed.history().undo_count(), depth);

        ed.update_element(&s1, &el, &ElementPatch::text("Locked but editable"))
            .unwrap();
        let element = ed.template().find_element(&s1, &el).unwrap();
        assert_eq!(element.text(), Some("Locked but editable"));
        assert_eq!((element.x, element.y), (50.0, 50.0));

        assert_eq!(ed.set_element_locked(&s1, &el, true), Err(Rejection::Unchanged));
    }

    #[test]
    fn duplicate_element_is_offset_deep_copy() {
        let mut ed = one_section();
        let s1: SectionId = "s1".into();
        let el = ed.add_element(&s1, ElementType::Text).unwrap();
        ed.update_element(&s1, &el, &ElementPatch::text("Original"))
            .unwrap();
        ed.add_element(&s1, ElementType::Image).unwrap();

        let copy = ed.duplicate_element(&s1, &el).unwrap();
        let section = &ed.template().sections[0];
        assert_eq!(section.elements[1].id, copy);
        let copied = &section.elements[1];
        assert_eq!(copied.text(), Some("Original"));
        assert_eq!((copied.x, copied.y), (55.0, 55.0));
        assert_eq!(copied.width, section.elements[0].width);
    }

    #[test]
    fn move_element_swaps_z_index() {
        let mut ed = one_section();
        let s1: SectionId = "s1".into();
        let a = ed.add_element(&s1, ElementType::Shape).unwrap();
        let b = ed.add_element(&s1, ElementType::Text).unwrap();

        assert_eq!(ed.move_element_up(&s1, &a), Err(Rejection::AtBoundary));
        assert_eq!(ed.move_element_down(&s1, &b), Err(Rejection::AtBoundary));

        ed.move_element_down(&s1, &a).unwrap();
        let section = &ed.template().sections[0];
        assert_eq!(section.elements[0].id, b);
        assert_eq!(section.elements[0].z_index, 0);
        assert_eq!(section.elements[1].id, a);
        assert_eq!(section.elements[1].z_index, 1);
    }

    #[test]
    fn update_template_metadata() {
        let mut ed = one_section();
        let patch = TemplatePatch {
            name: Some("Launch".into()),
            aspect_ratio: Some(AspectRatio::Landscape),
            ..TemplatePatch::default()
        };
        ed.update_template(&patch).unwrap();
        assert_eq!(ed.template().name, "Launch");
        assert_eq!(ed.template().aspect_ratio, AspectRatio::Landscape);
        assert_eq!(ed.update_template(&patch), Err(Rejection::Unchanged));
        ed.undo().unwrap();
        assert_eq!(ed.template().name, "Test");
    }

    #[test]
    fn playback_controls() {
        let mut ed = two_sections();
        assert!(ed.set_current_time(f64::NAN).is_err());
        ed.set_current_time(100.0).unwrap();
        assert_eq!(ed.state().playback.current_time.as_secs(), 8.0);

        assert!(ed.toggle_playback());
        assert_eq!(ed.state().playback.current_time, TimeCode::ZERO);
        ed.advance_playback(2.5).unwrap();
        assert_eq!(ed.state().playback.current_time.as_secs(), 2.5);
        ed.advance_playback(10.0).unwrap();
        assert!(!ed.state().playback.playing);
        assert_eq!(ed.advance_playback(1.0), Err(Rejection::Unchanged));
        assert!(ed.advance_playback(-1.0).is_err());
        assert!(!ed.can_undo());
    }

    #[test]
    fn preview_mode_hides_property_editor() {
        let mut ed = one_section();
        ed.set_editor_mode(EditorMode::Preview);
        assert_eq!(ed.state().mode, EditorMode::Preview);
        assert!(!ed.state().show_property_editor);
        ed.set_editor_mode(EditorMode::Edit);
        ed.set_show_property_editor(true);
        assert!(ed.state().show_property_editor);
        assert!(!ed.can_undo());
    }

    #[test]
    fn gesture_collapses_drag_into_one_entry() {
        let mut ed = one_section();
        let s1: SectionId = "s1".into();
        let el = ed.add_element(&s1, ElementType::Image).unwrap();
        let depth = ed.history().undo_count();

        ed.begin_gesture("Drag element").unwrap();
        assert!(ed.begin_gesture("Again").is_err());
        for step in 1..=5 {
            let pos = 50.0 - step as f32 * 5.0;
            ed.update_element(&s1, &el, &ElementPatch::position(pos, pos))
                .unwrap();
        }
        assert_eq!(ed.history().undo_count(), depth);
        assert_eq!(ed.end_gesture(), Ok(true));
        assert_eq!(ed.history().undo_count(), depth + 1);
        assert_eq!(ed.undo_label(), Some("Drag element"));

        ed.undo().unwrap();
        let element = ed.template().find_element(&s1, &el).unwrap();
        assert_eq!((element.x, element.y), (50.0, 50.0));
        assert_eq!(ed.end_gesture(), Err(Rejection::Unchanged));
    }

    #[test]
    fn undo_redo_underflow() {
        let mut ed = one_section();
        assert_eq!(ed.undo(), Err(Rejection::NothingToUndo));
        assert_eq!(ed.redo(), Err(Rejection::NothingToRedo));
        assert!(!ed.is_dirty());
    }

    #[test]
    fn load_template_resets_session() {
        let mut ed = one_section();
        ed.add_element(&"s1".into(), ElementType::Text).unwrap();
        ed.set_current_time(3.0).unwrap();

        ed.load_template(Template::new("", "", AspectRatio::Feed));
        assert!(!ed.can_undo());
        assert!(!ed.is_dirty());
        assert!(ed.state().selection.is_empty());
        assert_eq!(ed.state().playback.current_time, TimeCode::ZERO);
        assert_eq!(ed.template().sections.len(), 1);
        assert_eq!(ed.template().name, UNTITLED_TEMPLATE);
        assert!(ed.template().id.starts_with("tpl_"));
    }

    #[test]
    fn save_marks_clean_and_failures_keep_dirty() {
        let mut ed = one_section();
        ed.add_section(None);
        let mut store = MemoryStore::new();
        ed.save_template(&mut store).unwrap();
        assert!(!ed.is_dirty());
        assert_eq!(store.get("t").unwrap().sections.len(), 2);

        ed.update_template(&TemplatePatch {
            description: Some("desc".into()),
            ..TemplatePatch::default()
        })
        .unwrap();
        assert!(matches!(
            ed.save_template(&mut UnavailableStore),
            Err(TemplateError::Io(_))
        ));
        assert!(ed.is_dirty());
        assert!(ed.can_undo());
    }

    #[test]
    fn autosave_due_requires_dirty_state() {
        let config = EditorConfig {
            autosave_interval_secs: 0,
            ..EditorConfig::default()
        };
        let mut ed = Editor::with_config(
            Template::new("t", "T", AspectRatio::Portrait),
            config,
            Box::new(SequentialIds::new()),
        );
        ed.autosave_timer_mut().set_enabled(true);
        assert!(!ed.autosave_due());
        ed.add_section(None);
        assert!(ed.autosave_due());
        ed.save_template(&mut MemoryStore::new()).unwrap();
        assert!(!ed.autosave_due());
    }

    #[test]
    fn subscribers_see_each_commit_in_order() {
        let mut ed = one_section();
        let seen: Rc<RefCell<Vec<(String, bool)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let id = ed.subscribe(move |state, action| {
            sink.borrow_mut()
                .push((action.label(), state.is_dirty));
        });

        ed.select_section(Some(&"s1".into())).unwrap();
        ed.add_section(None);
        let _ = ed.delete_section(&"missing".into());
        ed.undo().unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                ("Select section".to_string(), false),
                ("Add section".to_string(), true),
                ("Undo Add section".to_string(), true),
            ]
        );

        assert!(ed.unsubscribe(id));
        assert!(!ed.unsubscribe(id));
        ed.toggle_playback();
        assert_eq!(seen.borrow().len(), 3);
    }
}
