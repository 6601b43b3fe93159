//! Partial updates for elements, sections, and template metadata.
//!
//! A patch never mutates in place: `apply_to` validates every field and returns
//! the updated value, or a [`Rejection`] leaving the original untouched.

use serde::{Deserialize, Deserializer, Serialize};

use tz_common::{ensure_finite, AspectRatio, EditResult, Rejection};

use crate::types::{
    clamp_percent, clamp_unit, normalize_rotation, Background, Element, ElementContent,
    Section, SectionKind, ShapeKind, Template, TextStyle,
};

/// A key that is present maps to `Some`, so an explicit `null` becomes
/// `Some(None)`. Absent keys fall back to the struct default (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Attributes to merge into an element. `None` leaves a field alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// `Some(None)` clears the link; JSON `null` reads as `Some(None)`.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub link: Option<Option<String>>,

    // Variant content. Setting a field the element's variant lacks is rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
}

impl ElementPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn locked(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the patch moves, resizes, or rotates.
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.rotation.is_some()
    }

    /// Merge into `element`, returning the updated copy.
    ///
    /// Lock state is checked against the element *before* the patch: a locked
    /// element rejects geometry even if the same patch unlocks it.
    pub fn apply_to(&self, element: &Element) -> EditResult<Element> {
        if self.is_empty() {
            return Err(Rejection::Unchanged);
        }
        if element.locked && self.touches_geometry() {
            return Err(Rejection::ElementLocked(element.id.clone()));
        }

        let mut out = element.clone();

        if let Some(x) = self.x {
            out.x = clamp_percent(finite_f32("x", x)?);
        }
        if let Some(y) = self.y {
            out.y = clamp_percent(finite_f32("y", y)?);
        }
        if let Some(width) = self.width {
            out.width = positive_percent("width", width)?;
        }
        if let Some(height) = self.height {
            out.height = positive_percent("height", height)?;
        }
        if let Some(rotation) = self.rotation {
            out.rotation = normalize_rotation(finite_f32("rotation", rotation)?);
        }
        if let Some(opacity) = self.opacity {
            out.opacity = clamp_unit(finite_f32("opacity", opacity)?);
        }
        if let Some(z) = self.z_index {
            out.z_index = z;
        }
        if let Some(locked) = self.locked {
            out.locked = locked;
        }
        if let Some(link) = &self.link {
            out.link = link.clone().filter(|l| !l.trim().is_empty());
        }

        self.apply_content(&mut out.content)?;

        if out == *element {
            return Err(Rejection::Unchanged);
        }
        Ok(out)
    }

    fn apply_content(&self, content: &mut ElementContent) -> EditResult<()> {
        let kind = content.kind();
        let wrong_variant =
            |field: &'static str| Rejection::invalid(field, format!("{kind} elements have no {field}"));

        match content {
            ElementContent::Text { text, style } => {
                if let Some(new_text) = &self.text {
                    *text = new_text.clone();
                }
                if let Some(new_style) = &self.style {
                    if !new_style.font_size.is_finite() || new_style.font_size <= 0.0 {
                        return Err(Rejection::invalid("style", "font size must be positive"));
                    }
                    *style = new_style.clone();
                }
            }
            ElementContent::Image { src } => {
                if let Some(new_src) = &self.src {
                    *src = new_src.clone();
                }
            }
            ElementContent::Video { src, muted } => {
                if let Some(new_src) = &self.src {
                    *src = new_src.clone();
                }
                if let Some(new_muted) = self.muted {
                    *muted = new_muted;
                }
            }
            ElementContent::Audio { src, volume } => {
                if let Some(new_src) = &self.src {
                    *src = new_src.clone();
                }
                if let Some(new_volume) = self.volume {
                    *volume = clamp_unit(finite_f32("volume", new_volume)?);
                }
            }
            ElementContent::Shape { shape, fill } => {
                if let Some(new_shape) = self.shape {
                    *shape = new_shape;
                }
                if let Some(new_fill) = &self.fill {
                    *fill = new_fill.clone();
                }
            }
            ElementContent::Effect { effect, intensity } => {
                if let Some(new_effect) = &self.effect {
                    *effect = new_effect.clone();
                }
                if let Some(new_intensity) = self.intensity {
                    *intensity = clamp_unit(finite_f32("intensity", new_intensity)?);
                }
            }
        }

        // Fields no arm consumed belong to another variant.
        let text_only = self.text.is_some() || self.style.is_some();
        let media = self.src.is_some();
        let video_only = self.muted.is_some();
        let audio_only = self.volume.is_some();
        let shape_only = self.shape.is_some() || self.fill.is_some();
        let effect_only = self.effect.is_some() || self.intensity.is_some();

        use crate::types::ElementType as T;
        let offending = match kind {
            T::Text => first_set(&[
                ("src", media),
                ("muted", video_only),
                ("volume", audio_only),
                ("shape", shape_only),
                ("effect", effect_only),
            ]),
            T::Image => first_set(&[
                ("text", text_only),
                ("muted", video_only),
                ("volume", audio_only),
                ("shape", shape_only),
                ("effect", effect_only),
            ]),
            T::Video => first_set(&[
                ("text", text_only),
                ("volume", audio_only),
                ("shape", shape_only),
                ("effect", effect_only),
            ]),
            T::Audio => first_set(&[
                ("text", text_only),
                ("muted", video_only),
                ("shape", shape_only),
                ("effect", effect_only),
            ]),
            T::Shape => first_set(&[
                ("text", text_only),
                ("src", media),
                ("muted", video_only),
                ("volume", audio_only),
                ("effect", effect_only),
            ]),
            T::Effect => first_set(&[
                ("text", text_only),
                ("src", media),
                ("muted", video_only),
                ("volume", audio_only),
                ("shape", shape_only),
            ]),
        };
        match offending {
            Some(field) => Err(wrong_variant(field)),
            None => Ok(()),
        }
    }
}

fn first_set(fields: &[(&'static str, bool)]) -> Option<&'static str> {
    fields.iter().find(|(_, set)| *set).map(|(name, _)| *name)
}

fn finite_f32(field: &'static str, value: f32) -> EditResult<f32> {
    ensure_finite(field, value as f64).map(|_| value)
}

fn positive_percent(field: &'static str, value: f32) -> EditResult<f32> {
    let value = finite_f32(field, value)?;
    if value <= 0.0 {
        return Err(Rejection::invalid(field, "must be greater than zero"));
    }
    Ok(value.min(100.0))
}

/// Attributes to merge into a section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
    /// Seconds, must be finite and > 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// `Some(None)` removes the background; JSON `null` reads as `Some(None)`.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub background: Option<Option<Background>>,
}

impl SectionPatch {
    pub fn duration(secs: f64) -> Self {
        Self {
            duration: Some(secs),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into a copy of `section`. Elements are carried over untouched.
    pub fn apply_to(&self, section: &Section) -> EditResult<Section> {
        if self.is_empty() {
            return Err(Rejection::Unchanged);
        }
        let mut out = section.clone();

        if let Some(name) = &self.name {
            out.name = non_empty("name", name)?;
        }
        if let Some(kind) = &self.kind {
            out.kind = kind.clone();
        }
        if let Some(duration) = self.duration {
            let duration = ensure_finite("duration", duration)?;
            if duration <= 0.0 {
                return Err(Rejection::invalid("duration", "must be greater than zero"));
            }
            out.duration = duration;
        }
        if let Some(background) = &self.background {
            out.background = background.clone().map(|mut bg| {
                bg.opacity = if bg.opacity.is_finite() {
                    clamp_unit(bg.opacity)
                } else {
                    1.0
                };
                bg
            });
        }

        if out == *section {
            return Err(Rejection::Unchanged);
        }
        Ok(out)
    }
}

/// Template-level metadata changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
}

impl TemplatePatch {
    /// Apply to `template` in place. Nothing is written on rejection.
    pub fn apply_to(&self, template: &mut Template) -> EditResult<()> {
        let name = match &self.name {
            Some(name) => Some(non_empty("name", name)?),
            None => None,
        };
        let changed = name.as_ref().is_some_and(|n| *n != template.name)
            || self
                .description
                .as_ref()
                .is_some_and(|d| *d != template.description)
            || self.aspect_ratio.is_some_and(|r| r != template.aspect_ratio);
        if !changed {
            return Err(Rejection::Unchanged);
        }

        if let Some(name) = name {
            template.name = name;
        }
        if let Some(description) = &self.description {
            template.description = description.clone();
        }
        if let Some(ratio) = self.aspect_ratio {
            template.aspect_ratio = ratio;
        }
        Ok(())
    }
}

fn non_empty(field: &'static str, value: &str) -> EditResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Rejection::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}
