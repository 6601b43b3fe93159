//! Structural checks and repairs for templates coming from outside the editor.

use std::collections::HashSet;

use tracing::warn;

use tz_common::{unique_id, ElementId, IdGenerator, SectionId};

use crate::error::{TemplateError, TemplateResult};
use crate::types::{
    clamp_percent, clamp_unit, normalize_rotation, Element, Section, SectionKind, Template,
};

/// Check the invariants a stored template must satisfy.
pub fn validate_template(template: &Template) -> TemplateResult<()> {
    if template.id.trim().is_empty() {
        return Err(TemplateError::invalid("template id is empty"));
    }
    if template.name.trim().is_empty() {
        return Err(TemplateError::invalid("template name is empty"));
    }
    if template.sections.is_empty() {
        return Err(TemplateError::invalid("template has no sections"));
    }

    let mut seen = HashSet::new();
    for section in &template.sections {
        if !seen.insert(section.id.as_str()) {
            return Err(TemplateError::invalid(format!(
                "duplicate id: {}",
                section.id
            )));
        }
        if !(section.duration.is_finite() && section.duration > 0.0) {
            return Err(TemplateError::invalid(format!(
                "section {} has invalid duration {}",
                section.id, section.duration
            )));
        }
        for element in &section.elements {
            if !seen.insert(element.id.as_str()) {
                return Err(TemplateError::invalid(format!(
                    "duplicate id: {}",
                    element.id
                )));
            }
            check_element(element)?;
        }
    }
    Ok(())
}

fn check_element(el: &Element) -> TemplateResult<()> {
    let in_range = |v: f32, lo: f32, hi: f32| v.is_finite() && v >= lo && v <= hi;
    let problem = if !in_range(el.x, 0.0, 100.0) || !in_range(el.y, 0.0, 100.0) {
        Some("position outside the canvas")
    } else if !(in_range(el.width, 0.0, 100.0) && el.width > 0.0)
        || !(in_range(el.height, 0.0, 100.0) && el.height > 0.0)
    {
        Some("size must be within (0, 100] percent")
    } else if !(el.rotation.is_finite() && el.rotation >= 0.0 && el.rotation < 360.0) {
        Some("rotation must be within [0, 360)")
    } else if !in_range(el.opacity, 0.0, 1.0) {
        Some("opacity must be within [0, 1]")
    } else {
        None
    };
    match problem {
        Some(reason) => Err(TemplateError::invalid(format!("element {}: {reason}", el.id))),
        None => Ok(()),
    }
}

/// Repair a template in place so it satisfies [`validate_template`] (apart from
/// empty names). Returns the number of repairs made.
///
/// - An empty section list gets one body section of `default_duration`.
/// - Duplicate or empty ids are replaced with fresh ones.
/// - Non-positive durations become `default_duration`.
/// - Geometry, rotation, and opacity are clamped or wrapped into range.
pub fn normalize(template: &mut Template, ids: &mut dyn IdGenerator, default_duration: f64) -> usize {
    let mut repairs = 0;

    if template.sections.is_empty() {
        warn!(template = %template.id, "Template has no sections, adding one");
        template.sections.push(Section::new(
            fresh_section_id(template, ids),
            SectionKind::Body,
            default_duration,
        ));
        repairs += 1;
    }

    let mut seen: HashSet<String> = HashSet::new();
    for index in 0..template.sections.len() {
        let id = template.sections[index].id.as_str().to_string();
        if id.trim().is_empty() || !seen.insert(id.clone()) {
            let fresh = SectionId::new(unique_id(
                || ids.section_id().to_string(),
                |c| seen.contains(c) || template.contains_id(c),
            ));
            warn!(old = %id, new = %fresh, "Replacing duplicate section id");
            seen.insert(fresh.as_str().to_string());
            template.sections[index].id = fresh;
            repairs += 1;
        }

        let section = &mut template.sections[index];
        if !(section.duration.is_finite() && section.duration > 0.0) {
            warn!(section = %section.id, duration = section.duration, "Resetting invalid duration");
            section.duration = default_duration;
            repairs += 1;
        }

        for el_index in 0..template.sections[index].elements.len() {
            let el_id = template.sections[index].elements[el_index].id.as_str().to_string();
            if el_id.trim().is_empty() || !seen.insert(el_id.clone()) {
                let fresh = ElementId::new(unique_id(
                    || ids.element_id().to_string(),
                    |c| seen.contains(c) || template.contains_id(c),
                ));
                warn!(old = %el_id, new = %fresh, "Replacing duplicate element id");
                seen.insert(fresh.as_str().to_string());
                template.sections[index].elements[el_index].id = fresh;
                repairs += 1;
            }
            if clamp_element(&mut template.sections[index].elements[el_index]) {
                repairs += 1;
            }
        }
    }

    repairs
}

fn fresh_section_id(template: &Template, ids: &mut dyn IdGenerator) -> SectionId {
    SectionId::new(unique_id(
        || ids.section_id().to_string(),
        |c| template.contains_id(c),
    ))
}

/// Clamp an element's numeric fields into range. Returns whether anything changed.
fn clamp_element(el: &mut Element) -> bool {
    let before = el.clone();
    let finite_or = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };

    el.x = clamp_percent(finite_or(el.x, 50.0));
    el.y = clamp_percent(finite_or(el.y, 50.0));
    let (default_w, default_h) = el.kind().default_size();
    el.width = positive_or(el.width, default_w);
    el.height = positive_or(el.height, default_h);
    el.rotation = normalize_rotation(finite_or(el.rotation, 0.0));
    el.opacity = clamp_unit(finite_or(el.opacity, 1.0));

    if *el != before {
        warn!(element = %el.id, "Clamped element attributes into range");
        true
    } else {
        false
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.min(100.0)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementType;
    use tz_common::{AspectRatio, SequentialIds};

    fn valid() -> Template {
        let mut section = Section::new("s1".into(), SectionKind::Intro, 3.0);
        section
            .elements
            .push(Element::new("e1".into(), ElementType::Text));
        Template::new("t1", "Valid", AspectRatio::Portrait).with_section(section)
    }

    #[test]
    fn valid_template_passes() {
        validate_template(&valid()).unwrap();
    }

    #[test]
    fn rejects_empty_sections_and_names() {
        let mut t = valid();
        t.sections.clear();
        assert!(validate_template(&t)
            .unwrap_err()
            .to_string()
            .contains("no sections"));

        let mut t = valid();
        t.name = "  ".into();
        assert!(validate_template(&t).unwrap_err().to_string().contains("name"));
    }

    #[test]
    fn rejects_duplicate_ids_across_sections_and_elements() {
        let mut t = valid();
        t.sections[0].elements[0].id = "s1".into();
        assert!(validate_template(&t)
            .unwrap_err()
            .to_string()
            .contains("duplicate"));
    }

    #[test]
    fn rejects_bad_duration_and_geometry() {
        let mut t = valid();
        t.sections[0].duration = 0.0;
        assert!(validate_template(&t).is_err());

        let mut t = valid();
        t.sections[0].elements[0].width = -1.0;
        assert!(validate_template(&t).unwrap_err().to_string().contains("size"));

        let mut t = valid();
        t.sections[0].elements[0].rotation = 360.0;
        assert!(validate_template(&t).is_err());
    }

    #[test]
    fn normalize_repairs_everything_it_can() {
        let mut t = valid();
        let mut dup = Section::new("s1".into(), SectionKind::Body, -2.0);
        let mut el = Element::new("e1".into(), ElementType::Shape);
        el.x = 180.0;
        el.opacity = f32::NAN;
        el.rotation = 725.0;
        dup.elements.push(el);
        t.sections.push(dup);

        let mut ids = SequentialIds::new();
        let repairs = normalize(&mut t, &mut ids, 5.0);
        assert!(repairs >= 4);
        validate_template(&t).unwrap();

        let fixed = &t.sections[1];
        assert_ne!(fixed.id, "s1");
        assert_eq!(fixed.duration, 5.0);
        let el = &fixed.elements[0];
        assert_ne!(el.id, "e1");
        assert_eq!(el.x, 100.0);
        assert_eq!(el.opacity, 1.0);
        assert_eq!(el.rotation, 5.0);
    }

    #[test]
    fn normalize_adds_section_to_empty_template() {
        let mut t = Template::new("t1", "Empty", AspectRatio::Square);
        let mut ids = SequentialIds::new();
        assert_eq!(normalize(&mut t, &mut ids, 4.0), 1);
        assert_eq!(t.sections.len(), 1);
        assert_eq!(t.sections[0].duration, 4.0);
        validate_template(&t).unwrap();
    }

    #[test]
    fn normalize_valid_template_is_noop() {
        let mut t = valid();
        let before = t.clone();
        let mut ids = SequentialIds::new();
        assert_eq!(normalize(&mut t, &mut ids, 5.0), 0);
        assert_eq!(t, before);
    }

    /// Hands out the same id every time.
    struct Repeating;

    impl IdGenerator for Repeating {
        fn next_id(&mut self, prefix: &str) -> String {
            format!("{prefix}_same")
        }
    }

    #[test]
    fn normalize_survives_a_repeating_generator() {
        let mut t = Template::new("t1", "Clashes", AspectRatio::Portrait);
        for _ in 0..3 {
            let mut section = Section::new("a".into(), SectionKind::Body, 2.0);
            section
                .elements
                .push(Element::new("e".into(), ElementType::Image));
            t.sections.push(section);
        }

        assert_eq!(normalize(&mut t, &mut Repeating, 5.0), 4);
        validate_template(&t).unwrap();
        let section_ids: Vec<&str> = t.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(section_ids, ["a", "sec_same", "sec_same-1"]);
        let element_ids: Vec<&str> = t
            .sections
            .iter()
            .map(|s| s.elements[0].id.as_str())
            .collect();
        assert_eq!(element_ids, ["e", "el_same", "el_same-1"]);
    }
}
