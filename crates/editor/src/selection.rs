//! Section and element selection.
//!
//! The selection holds references, never ownership: it can point at one
//! section and, inside that section, at one element. Every setter validates
//! against the template so the selection never dangles.

use serde::{Deserialize, Serialize};

use tz_common::{EditResult, ElementId, Rejection, SectionId};
use tz_template::Template;

/// What the property editor and canvas are focused on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    section: Option<SectionId>,
    /// Always an element of `section`.
    element: Option<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self) -> Option<&SectionId> {
        self.section.as_ref()
    }

    pub fn element(&self) -> Option<&ElementId> {
        self.element.as_ref()
    }

    /// Select a section, or clear the selection with `None`.
    ///
    /// The element selection survives only if it belongs to the new section.
    pub fn select_section(&mut self, template: &Template, id: Option<&SectionId>) -> EditResult<()> {
        let Some(id) = id else {
            self.clear();
            return Ok(());
        };
        let section = template
            .find_section(id)
            .ok_or_else(|| Rejection::SectionNotFound(id.clone()))?;

        let keep_element = self
            .element
            .as_ref()
            .is_some_and(|el| section.find_element(el).is_some());
        if !keep_element {
            self.element = None;
        }
        self.section = Some(id.clone());
        Ok(())
    }

    /// Select an element together with its owning section. `None` clears only
    /// the element, leaving the section selected.
    pub fn select_element(&mut self, template: &Template, id: Option<&ElementId>) -> EditResult<()> {
        let Some(id) = id else {
            self.element = None;
            return Ok(());
        };
        let owner = template
            .element_owner(id)
            .ok_or_else(|| Rejection::UnknownElement(id.clone()))?;
        self.section = Some(owner.id.clone());
        self.element = Some(id.clone());
        Ok(())
    }

    /// Focus a known section/element pair without lookups.
    pub(crate) fn focus(&mut self, section: SectionId, element: ElementId) {
        self.section = Some(section);
        self.element = Some(element);
    }

    pub fn clear(&mut self) {
        self.section = None;
        self.element = None;
    }

    pub fn clear_element(&mut self) {
        self.element = None;
    }

    /// Drop references that no longer resolve. Returns whether anything changed.
    pub fn retain_valid(&mut self, template: &Template) -> bool {
        let before = self.clone();
        match self.section.as_ref().and_then(|id| template.find_section(id)) {
            None => self.clear(),
            Some(section) => {
                if let Some(el) = &self.element {
                    if section.find_element(el).is_none() {
                        self.element = None;
                    }
                }
            }
        }
        if *self != before {
            tracing::debug!(?before, after = ?self, "Stale selection cleared");
            true
        } else {
            false
        }
    }

    pub fn is_section_selected(&self, id: &SectionId) -> bool {
        self.section.as_ref() == Some(id)
    }

    pub fn is_element_selected(&self, id: &ElementId) -> bool {
        self.element.as_ref() == Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.section.is_none() && self.element.is_none()
    }
}
