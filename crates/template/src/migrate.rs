//! Version migration -- transforms older template JSON to the current format.
//!
//! Version 0 is the unversioned format written by the first web editor:
//! the aspect ratio lived under `ratio`, text elements kept their text under
//! `content`, element `width`/`height` were pixels on the reference canvas,
//! and ids were occasionally missing.

use tracing::{debug, info, warn};

use serde_json::{Map, Value};
use tz_common::{AspectRatio, IdGenerator, RandomIds};

use crate::error::{TemplateError, TemplateResult};

/// Current template format version.
pub const CURRENT_VERSION: u32 = 1;

/// Migrate a template JSON value to the current version in-place.
///
/// Returns the version after migration.
pub fn migrate_template(value: &mut Value) -> TemplateResult<u32> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| TemplateError::invalid("template root must be a JSON object"))?;

    let version = extract_version(obj)?;

    if version > CURRENT_VERSION {
        return Err(TemplateError::UnsupportedVersion {
            version: version.to_string(),
        });
    }

    if version == CURRENT_VERSION {
        debug!(version, "Template is at current version, no migration needed");
        return Ok(version);
    }

    let mut current = version;
    while current < CURRENT_VERSION {
        let next = current + 1;
        info!(from = current, to = next, "Migrating template");

        match current {
            0 => migrate_v0_to_v1(obj, &mut RandomIds)?,
            other => {
                return Err(TemplateError::MigrationFailed {
                    from: other.to_string(),
                    to: next.to_string(),
                    reason: format!("no migration path from version {other}"),
                });
            }
        }

        current = next;
    }

    obj.insert("version".to_string(), Value::Number(CURRENT_VERSION.into()));
    info!(from = version, to = CURRENT_VERSION, "Template migration complete");

    Ok(CURRENT_VERSION)
}

/// Extract the version number from a template JSON object. Missing means 0.
fn extract_version(obj: &Map<String, Value>) -> TemplateResult<u32> {
    match obj.get("version") {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| TemplateError::invalid("version must be a non-negative integer")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| TemplateError::invalid(format!("cannot parse version string: {s}"))),
        Some(_) => Err(TemplateError::invalid("version field has unexpected type")),
        None => {
            warn!("Template has no version field, assuming version 0");
            Ok(0)
        }
    }
}

fn migration_error(reason: impl Into<String>) -> TemplateError {
    TemplateError::MigrationFailed {
        from: "0".into(),
        to: "1".into(),
        reason: reason.into(),
    }
}

fn migrate_v0_to_v1(obj: &mut Map<String, Value>, ids: &mut dyn IdGenerator) -> TemplateResult<()> {
    // `ratio` -> `aspectRatio`
    if !obj.contains_key("aspectRatio") {
        let ratio = obj
            .remove("ratio")
            .unwrap_or_else(|| Value::String(AspectRatio::default().as_str().to_string()));
        obj.insert("aspectRatio".to_string(), ratio);
    }
    let canvas = obj
        .get("aspectRatio")
        .and_then(Value::as_str)
        .and_then(|r| r.parse::<AspectRatio>().ok())
        .unwrap_or_default()
        .canvas_size();

    if !obj.contains_key("sections") {
        obj.insert("sections".to_string(), Value::Array(Vec::new()));
    }
    let sections = obj
        .get_mut("sections")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| migration_error("sections must be an array"))?;

    for section in sections.iter_mut() {
        let section = section
            .as_object_mut()
            .ok_or_else(|| migration_error("section must be an object"))?;

        ensure_id(section, || ids.section_id().to_string());
        if !section.contains_key("name") {
            let name = section
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("Section")
                .to_string();
            section.insert("name".to_string(), Value::String(name));
        }

        let Some(elements) = section.get_mut("elements") else {
            continue;
        };
        let elements = elements
            .as_array_mut()
            .ok_or_else(|| migration_error("elements must be an array"))?;

        for element in elements.iter_mut() {
            let element = element
                .as_object_mut()
                .ok_or_else(|| migration_error("element must be an object"))?;

            ensure_id(element, || ids.element_id().to_string());

            let is_text = element.get("type").and_then(Value::as_str) == Some("text");
            if is_text && !element.contains_key("text") {
                if let Some(content) = element.remove("content") {
                    element.insert("text".to_string(), content);
                }
            }

            // Pixel sizes -> canvas percent.
            if let Some(px) = element.get("width").and_then(Value::as_f64) {
                element.insert("width".to_string(), percent(canvas.width_percent(px)));
            }
            if let Some(px) = element.get("height").and_then(Value::as_f64) {
                element.insert("height".to_string(), percent(canvas.height_percent(px)));
            }
        }
    }

    Ok(())
}

fn ensure_id(obj: &mut Map<String, Value>, mut fresh: impl FnMut() -> String) {
    let present = obj
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.trim().is_empty());
    if !present {
        obj.insert("id".to_string(), Value::String(fresh()));
    }
}

fn percent(value: f64) -> Value {
    // Round to 0.01 % so migrated files stay readable.
    let rounded = (value * 100.0).round() / 100.0;
    serde_json::Number::from_f64(rounded)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
