//! Read-only values computed from the editor state on demand.

use tz_common::{SectionId, TimeCode};
use tz_template::{Element, Section, Template};

use crate::state::EditorState;

/// Sum of all section durations in seconds.
pub fn total_duration(template: &Template) -> f64 {
    template.total_duration()
}

/// Playhead position as a fraction of the total duration, 0 when empty.
pub fn playhead_fraction(state: &EditorState) -> f64 {
    let total = total_duration(&state.template);
    if total <= 0.0 {
        return 0.0;
    }
    (state.playback.current_time.as_secs() / total).clamp(0.0, 1.0)
}

pub fn active_section(state: &EditorState) -> Option<&Section> {
    state
        .selection
        .section()
        .and_then(|id| state.template.find_section(id))
}

pub fn active_element(state: &EditorState) -> Option<&Element> {
    let section = active_section(state)?;
    state
        .selection
        .element()
        .and_then(|id| section.find_element(id))
}

/// Start time of a section on the template timeline.
pub fn section_start(template: &Template, id: &SectionId) -> Option<TimeCode> {
    let mut start = 0.0;
    for section in &template.sections {
        if &section.id == id {
            return Some(TimeCode::from_secs(start));
        }
        start += section.duration;
    }
    None
}

/// The section playing at `time` and the offset into it.
///
/// Boundaries belong to the later section; the very end of the timeline
/// belongs to the last section.
pub fn section_at_time(template: &Template, time: TimeCode) -> Option<(&Section, TimeCode)> {
    let t = time.as_secs();
    if t.is_nan() || t < 0.0 || t > template.total_duration() {
        return None;
    }
    let mut start = 0.0;
    for section in &template.sections {
        let end = start + section.duration;
        if t < end {
            return Some((section, TimeCode::from_secs(t - start)));
        }
        start = end;
    }
    template
        .sections
        .last()
        .map(|last| (last, TimeCode::from_secs(last.duration)))
}

/// Elements in the order they are painted: ascending z-index, list order on ties.
pub fn elements_in_paint_order(section: &Section) -> Vec<&Element> {
    let mut elements: Vec<&Element> = section.elements.iter().collect();
    elements.sort_by_key(|e| e.z_index);
    elements
}
