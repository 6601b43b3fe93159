//! Templates moving through a file-backed store, including files left behind
//! by the unversioned format.

use serde_json::{json, Value};
use tz_common::AspectRatio;
use tz_template::{
    ElementType, JsonFileStore, Section, SectionKind, Template, TemplateError, TemplateStore,
    CURRENT_VERSION,
};

fn write_legacy(store: &JsonFileStore, id: &str) {
    let legacy = json!({
        "id": id,
        "name": "Spring promo",
        "ratio": "9:16",
        "sections": [
            {
                "type": "hook",
                "duration": 3,
                "elements": [
                    { "type": "text", "content": "Wait for it", "x": 50, "y": 20,
                      "width": 540, "height": 192 },
                    { "id": "logo", "type": "image", "src": "logo.png", "x": 80, "y": 90,
                      "width": 108, "height": 96 }
                ]
            },
            { "id": "cta", "type": "callToAction", "duration": 2 }
        ]
    });
    std::fs::write(store.path_for(id), legacy.to_string()).unwrap();
}

#[test]
fn legacy_file_is_migrated_on_load_and_upgraded_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path()).unwrap();
    write_legacy(&store, "promo");

    assert_eq!(store.list().unwrap(), vec!["promo"]);
    let template = store.load("promo").unwrap();

    assert_eq!(template.version, CURRENT_VERSION);
    assert_eq!(template.aspect_ratio, AspectRatio::Portrait);
    assert_eq!(template.sections.len(), 2);
    let hook = &template.sections[0];
    assert!(!hook.id.as_str().is_empty());
    assert_eq!(hook.kind, SectionKind::Hook);

    let headline = &hook.elements[0];
    assert!(!headline.id.as_str().is_empty());
    assert_eq!(headline.kind(), ElementType::Text);
    assert_eq!(headline.text(), Some("Wait for it"));
    assert_eq!(headline.width, 50.0);
    assert_eq!(headline.height, 10.0);
    assert_eq!(hook.elements[1].id, "logo");

    store.save(&template).unwrap();
    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(store.path_for("promo")).unwrap()).unwrap();
    assert_eq!(raw["version"], json!(CURRENT_VERSION));
    assert!(raw.get("ratio").is_none());

    // A second load must not generate new ids.
    assert_eq!(store.load("promo").unwrap(), template);
}

#[test]
fn corrupt_files_surface_as_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();

    std::fs::write(store.path_for("broken"), "{ not json").unwrap();
    assert!(matches!(store.load("broken"), Err(TemplateError::Json(_))));

    std::fs::write(store.path_for("future"), json!({ "version": 7 }).to_string()).unwrap();
    assert!(matches!(
        store.load("future"),
        Err(TemplateError::UnsupportedVersion { .. })
    ));

    assert!(matches!(
        store.load("missing"),
        Err(TemplateError::NotFound { id }) if id == "missing"
    ));
}

#[test]
fn stores_are_independent_directories() {
    let root = tempfile::tempdir().unwrap();
    let mut drafts = JsonFileStore::open(root.path().join("drafts")).unwrap();
    let published = JsonFileStore::open(root.path().join("published")).unwrap();

    let template = Template::new("draft-1", "Draft", AspectRatio::Square).with_section(
        Section::new("s1".into(), SectionKind::Intro, 4.0),
    );
    drafts.save(&template).unwrap();

    assert_eq!(drafts.list().unwrap(), vec!["draft-1"]);
    assert!(published.list().unwrap().is_empty());
}
