#![allow(dead_code)]

use tracing_subscriber::EnvFilter;
use tz_common::{AspectRatio, EditorConfig, SequentialIds};
use tz_editor::{Editor, EditorSnapshot};
use tz_template::{Element, ElementType, Section, SectionKind, Template};

/// Route editor logs to the test harness. Set `RUST_LOG=tz_editor=debug` to see them.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Editor with deterministic ids, so snapshots compare equal across runs.
pub fn editor(template: Template) -> Editor {
    init_tracing();
    Editor::with_config(
        template,
        EditorConfig::default(),
        Box::new(SequentialIds::starting_at(100)),
    )
}

pub fn section(id: &str, duration: f64) -> Section {
    Section::new(id.into(), SectionKind::Body, duration)
}

pub fn template(sections: Vec<Section>) -> Template {
    sections
        .into_iter()
        .fold(Template::new("tpl", "Scenario", AspectRatio::Portrait), |t, s| {
            t.with_section(s)
        })
}

pub fn text_at(id: &str, x: f32, y: f32, locked: bool) -> Element {
    let mut el = Element::new(id.into(), ElementType::Text);
    el.x = x;
    el.y = y;
    el.locked = locked;
    el
}

pub fn snapshot(editor: &Editor) -> EditorSnapshot {
    EditorSnapshot::capture(editor.state())
}
