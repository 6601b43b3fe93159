//! Persistence collaborators -- where the editor sends templates on save.
//!
//! The editor core only knows the [`TemplateStore`] trait. Hosts plug in
//! [`JsonFileStore`] for a directory of `<id>.tzt.json` files, or
//! [`MemoryStore`] when embedding or testing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::load::load_template;
use crate::save::{save_template, TEMPLATE_EXTENSION};
use crate::types::Template;
use crate::validate::validate_template;

/// Synchronous persistence contract for templates, keyed by `Template::id`.
pub trait TemplateStore {
    /// Persist the template, replacing any previous copy with the same id.
    fn save(&mut self, template: &Template) -> TemplateResult<()>;

    /// Fetch a stored template by id.
    fn load(&self, id: &str) -> TemplateResult<Template>;

    /// Ids of all stored templates, sorted.
    fn list(&self) -> TemplateResult<Vec<String>>;
}

/// Ids become file names, so only a conservative character set is accepted.
fn check_id(id: &str) -> TemplateResult<()> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(TemplateError::invalid(format!(
            "template id {id:?} cannot be used as a file name"
        )))
    }
}

/// One pretty-printed JSON file per template inside `dir`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> TemplateResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Template store opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a template with this id is stored at.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{TEMPLATE_EXTENSION}"))
    }

    /// Remove a stored template. Returns whether a file was deleted.
    pub fn remove(&mut self, id: &str) -> TemplateResult<bool> {
        check_id(id)?;
        let path = self.path_for(id);
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        info!(template = id, "Template removed from store");
        Ok(true)
    }
}

impl TemplateStore for JsonFileStore {
    fn save(&mut self, template: &Template) -> TemplateResult<()> {
        check_id(&template.id)?;
        validate_template(template)?;
        save_template(template, &self.path_for(&template.id))
    }

    fn load(&self, id: &str) -> TemplateResult<Template> {
        check_id(id)?;
        let path = self.path_for(id);
        match load_template(&path) {
            Err(TemplateError::NotFound { .. }) => Err(TemplateError::NotFound { id: id.to_string() }),
            other => other,
        }
    }

    fn list(&self) -> TemplateResult<Vec<String>> {
        let suffix = format!(".{TEMPLATE_EXTENSION}");
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(id) = name.strip_suffix(&suffix) {
                if check_id(id).is_ok() {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();
        debug!(dir = %self.dir.display(), count = ids.len(), "Listed stored templates");
        Ok(ids)
    }
}

/// In-process store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    templates: BTreeMap<String, Template>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for MemoryStore {
    fn save(&mut self, template: &Template) -> TemplateResult<()> {
        validate_template(template)?;
        self.templates.insert(template.id.clone(), template.clone());
        self.saves += 1;
        debug!(template = %template.id, "Template stored in memory");
        Ok(())
    }

    fn load(&self, id: &str) -> TemplateResult<Template> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })
    }

    fn list(&self) -> TemplateResult<Vec<String>> {
        Ok(self.templates.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, SectionKind};
    use tz_common::AspectRatio;

    fn template(id: &str) -> Template {
        Template::new(id, format!("Template {id}"), AspectRatio::Feed)
            .with_section(Section::new("s1".into(), SectionKind::Intro, 2.0))
    }

    #[test]
    fn file_store_save_load_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("templates")).unwrap();

        store.save(&template("beta")).unwrap();
        store.save(&template("alpha")).unwrap();
        std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);
        let loaded = store.load("beta").unwrap();
        assert_eq!(loaded, template("beta"));
        assert!(store.path_for("beta").ends_with("beta.tzt.json"));
    }

    #[test]
    fn file_store_overwrites_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();

        let mut t = template("promo");
        store.save(&t).unwrap();
        t.name = "Renamed".into();
        store.save(&t).unwrap();
        assert_eq!(store.load("promo").unwrap().name, "Renamed");

        assert!(store.remove("promo").unwrap());
        assert!(!store.remove("promo").unwrap());
        assert!(matches!(
            store.load("promo"),
            Err(TemplateError::NotFound { id }) if id == "promo"
        ));
    }

    #[test]
    fn file_store_rejects_unsafe_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        for id in ["", "../escape", "a/b", ".hidden"] {
            assert!(store.save(&template(id)).is_err(), "{id:?} accepted");
        }
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn file_store_refuses_invalid_template() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        let empty = Template::new("empty", "Empty", AspectRatio::Square);
        assert!(matches!(
            store.save(&empty),
            Err(TemplateError::InvalidTemplate { .. })
        ));
        assert!(!store.path_for("empty").exists());
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.save(&template("a")).unwrap();
        store.save(&template("a")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load("a").unwrap().name, "Template a");
        assert!(matches!(store.load("b"), Err(TemplateError::NotFound { .. })));
        assert_eq!(store.list().unwrap(), vec!["a"]);
    }
}
