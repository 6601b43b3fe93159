//! Template deserialization -- loading `Template` from JSON files.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::migrate::migrate_template;
use crate::types::Template;
use crate::validate::validate_template;

/// Deserialize a template from a JSON string, migrating older formats first.
pub fn from_json_string(json: &str) -> TemplateResult<Template> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;

    let version = migrate_template(&mut value)?;
    debug!(version, "Template version after migration");

    let template: Template = serde_json::from_value(value)?;
    validate_template(&template)?;

    debug!(
        template = %template.id,
        sections = template.sections.len(),
        elements = template.element_count(),
        "Deserialized template from JSON"
    );
    Ok(template)
}

/// Load a template from a file.
pub fn load_template(path: &Path) -> TemplateResult<Template> {
    if !path.is_file() {
        return Err(TemplateError::NotFound {
            id: path.display().to_string(),
        });
    }

    let json = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read template file");
        TemplateError::Io(e)
    })?;

    let template = from_json_string(&json)?;

    info!(
        template = %template.id,
        path = %path.display(),
        sections = template.sections.len(),
        "Template loaded"
    );
    Ok(template)
}
