//! Template serialization -- writing `Template` to JSON files.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::types::Template;

/// File extension used for template files.
pub const TEMPLATE_EXTENSION: &str = "tzt.json";

/// Serialize a template to a pretty-printed JSON string.
pub fn to_json_string(template: &Template) -> TemplateResult<String> {
    let json = serde_json::to_string_pretty(template)?;
    debug!(
        template = %template.id,
        json_len = json.len(),
        "Serialized template to JSON"
    );
    Ok(json)
}

/// Serialize a template to a compact JSON string (for transport).
pub fn to_json_string_compact(template: &Template) -> TemplateResult<String> {
    Ok(serde_json::to_string(template)?)
}

/// Save a template to `path`.
///
/// Data is written to a sibling temp file first and then renamed over the
/// target, so a crash mid-write never leaves a truncated template behind.
pub fn save_template(template: &Template, path: &Path) -> TemplateResult<()> {
    let json = to_json_string(template)?;
    let temp_path = path.with_extension("tmp");

    std::fs::write(&temp_path, json.as_bytes()).map_err(|e| {
        tracing::error!(path = %temp_path.display(), error = %e, "Failed to write temp file");
        TemplateError::Io(e)
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        tracing::error!(
            from = %temp_path.display(),
            to = %path.display(),
            error = %e,
            "Failed to rename temp file to target"
        );
        TemplateError::Io(e)
    })?;

    info!(
        template = %template.id,
        sections = template.sections.len(),
        path = %path.display(),
        "Template saved"
    );
    Ok(())
}
