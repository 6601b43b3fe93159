//! Template data model -- the JSON shape shared with the web editor.
//!
//! A [`Template`] is an ordered list of timed [`Section`]s, each holding
//! positioned [`Element`]s. Geometry is expressed in percent of the canvas on
//! both axes (`x`/`y` are the element centre); pixels only exist at render time,
//! via [`AspectRatio::canvas_size`].

use serde::{Deserialize, Serialize};
use std::fmt;

use tz_common::{AspectRatio, ElementId, SectionId};

use crate::migrate::CURRENT_VERSION;

fn current_version() -> u32 {
    CURRENT_VERSION
}

fn full() -> f32 {
    1.0
}

/// Top-level editable artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// File format version.
    #[serde(default = "current_version")]
    pub version: u32,
    /// Storage key of the template.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Ordered sections; order is playback order.
    pub sections: Vec<Section>,
}

impl Template {
    /// Create a template with no sections. Editors insert a first section on load.
    pub fn new(id: impl Into<String>, name: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            version: CURRENT_VERSION,
            id: id.into(),
            name: name.into(),
            description: String::new(),
            aspect_ratio,
            sections: Vec::new(),
        }
    }

    /// Builder-style: append a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn find_section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn find_section_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.id == id)
    }

    pub fn section_index(&self, id: &SectionId) -> Option<usize> {
        self.sections.iter().position(|s| &s.id == id)
    }

    /// Find an element inside a specific section.
    pub fn find_element(&self, section: &SectionId, element: &ElementId) -> Option<&Element> {
        self.find_section(section)?.find_element(element)
    }

    pub fn find_element_mut(
        &mut self,
        section: &SectionId,
        element: &ElementId,
    ) -> Option<&mut Element> {
        self.find_section_mut(section)?
            .elements
            .iter_mut()
            .find(|e| &e.id == element)
    }

    /// The section that owns the given element.
    pub fn element_owner(&self, element: &ElementId) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.elements.iter().any(|e| &e.id == element))
    }

    /// Sum of all section durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.sections.iter().map(|s| s.duration).sum()
    }

    /// Total number of elements across all sections.
    pub fn element_count(&self) -> usize {
        self.sections.iter().map(|s| s.elements.len()).sum()
    }

    /// Whether any section or element already uses this id.
    pub fn contains_id(&self, id: &str) -> bool {
        self.sections
            .iter()
            .any(|s| s.id == id || s.elements.iter().any(|e| e.id == id))
    }
}

/// Role of a section in the video. Open set: unknown kinds round-trip as `Custom`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Intro,
    Hook,
    #[default]
    Body,
    CallToAction,
    Outro,
    Custom(String),
}

impl SectionKind {
    pub fn as_str(&self) -> &str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Hook => "hook",
            SectionKind::Body => "body",
            SectionKind::CallToAction => "callToAction",
            SectionKind::Outro => "outro",
            SectionKind::Custom(kind) => kind,
        }
    }

    /// Default display name for a new section of this kind.
    pub fn display_name(&self) -> String {
        match self {
            SectionKind::Intro => "Intro".to_string(),
            SectionKind::Hook => "Hook".to_string(),
            SectionKind::Body => "Body".to_string(),
            SectionKind::CallToAction => "Call to Action".to_string(),
            SectionKind::Outro => "Outro".to_string(),
            SectionKind::Custom(kind) => {
                let mut chars = kind.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => "Section".to_string(),
                }
            }
        }
    }
}

impl From<String> for SectionKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "intro" => SectionKind::Intro,
            "hook" => SectionKind::Hook,
            "body" => SectionKind::Body,
            "callToAction" | "cta" => SectionKind::CallToAction,
            "outro" => SectionKind::Outro,
            _ => SectionKind::Custom(kind),
        }
    }
}

impl From<&str> for SectionKind {
    fn from(kind: &str) -> Self {
        SectionKind::from(kind.to_string())
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Custom(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timed segment of the template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub name: String,
    /// Duration in seconds (> 0).
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    /// Elements in paint order (first is painted first).
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Section {
    pub fn new(id: SectionId, kind: SectionKind, duration: f64) -> Self {
        Self {
            id,
            name: kind.display_name(),
            kind,
            duration,
            background: None,
            elements: Vec::new(),
        }
    }

    pub fn find_element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn element_index(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// z-index one above the current topmost element.
    pub fn next_z_index(&self) -> i32 {
        self.elements
            .iter()
            .map(|e| e.z_index)
            .max()
            .map_or(0, |z| z.saturating_add(1))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Color,
    Image,
    Video,
}

/// Section background fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    /// CSS colour for `color`, URL for `image`/`video`.
    pub value: String,
    /// 0.0 - 1.0.
    #[serde(default = "full")]
    pub opacity: f32,
}

impl Background {
    pub fn color(value: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Color,
            value: value.into(),
            opacity: 1.0,
        }
    }
}

/// Element variant tag, used to request a new element of a given type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Text,
    Image,
    Video,
    Audio,
    Shape,
    Effect,
}

impl ElementType {
    pub const ALL: [ElementType; 6] = [
        ElementType::Text,
        ElementType::Image,
        ElementType::Video,
        ElementType::Audio,
        ElementType::Shape,
        ElementType::Effect,
    ];

    /// Default (width, height) in canvas percent.
    pub fn default_size(self) -> (f32, f32) {
        match self {
            ElementType::Text => (80.0, 10.0),
            ElementType::Image => (60.0, 30.0),
            ElementType::Video => (80.0, 45.0),
            ElementType::Audio => (40.0, 6.0),
            ElementType::Shape => (30.0, 15.0),
            ElementType::Effect => (100.0, 100.0),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Video => "video",
            ElementType::Audio => "audio",
            ElementType::Shape => "shape",
            ElementType::Effect => "effect",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Font and paragraph settings of a text element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    /// Font size in points at the reference canvas.
    pub font_size: f32,
    pub font_weight: u16,
    pub color: String,
    pub align: TextAlign,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 32.0,
            font_weight: 700,
            color: "#FFFFFF".to_string(),
            align: TextAlign::Center,
            italic: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Triangle,
    Line,
}

/// Variant-specific payload of an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementContent {
    Text {
        text: String,
        #[serde(default)]
        style: TextStyle,
    },
    Image {
        src: String,
    },
    Video {
        src: String,
        #[serde(default)]
        muted: bool,
    },
    Audio {
        src: String,
        /// 0.0 - 1.0.
        #[serde(default = "full")]
        volume: f32,
    },
    Shape {
        shape: ShapeKind,
        fill: String,
    },
    Effect {
        effect: String,
        /// 0.0 - 1.0.
        #[serde(default = "full")]
        intensity: f32,
    },
}

impl ElementContent {
    pub fn default_for(kind: ElementType) -> Self {
        match kind {
            ElementType::Text => ElementContent::Text {
                text: "New text".to_string(),
                style: TextStyle::default(),
            },
            ElementType::Image => ElementContent::Image { src: String::new() },
            ElementType::Video => ElementContent::Video {
                src: String::new(),
                muted: false,
            },
            ElementType::Audio => ElementContent::Audio {
                src: String::new(),
                volume: 1.0,
            },
            ElementType::Shape => ElementContent::Shape {
                shape: ShapeKind::Rectangle,
                fill: "#FF3366".to_string(),
            },
            ElementType::Effect => ElementContent::Effect {
                effect: "glow".to_string(),
                intensity: 0.5,
            },
        }
    }

    pub fn kind(&self) -> ElementType {
        match self {
            ElementContent::Text { .. } => ElementType::Text,
            ElementContent::Image { .. } => ElementType::Image,
            ElementContent::Video { .. } => ElementType::Video,
            ElementContent::Audio { .. } => ElementType::Audio,
            ElementContent::Shape { .. } => ElementType::Shape,
            ElementContent::Effect { .. } => ElementType::Effect,
        }
    }
}

/// A positioned, typed object within a section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    /// Centre x, percent of canvas width.
    pub x: f32,
    /// Centre y, percent of canvas height.
    pub y: f32,
    /// Percent of canvas width.
    pub width: f32,
    /// Percent of canvas height.
    pub height: f32,
    /// Degrees in [0, 360).
    #[serde(default)]
    pub rotation: f32,
    /// 0.0 - 1.0.
    #[serde(default = "full")]
    pub opacity: f32,
    #[serde(default)]
    pub z_index: i32,
    /// Locked elements refuse move, resize and rotate.
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub content: ElementContent,
}

impl Element {
    /// A centred element with type-appropriate defaults.
    pub fn new(id: ElementId, kind: ElementType) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id,
            x: 50.0,
            y: 50.0,
            width,
            height,
            rotation: 0.0,
            opacity: 1.0,
            z_index: 0,
            locked: false,
            link: None,
            content: ElementContent::default_for(kind),
        }
    }

    pub fn kind(&self) -> ElementType {
        self.content.kind()
    }

    /// Text of a text element.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ElementContent::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Clamp a canvas percentage into [0, 100].
pub fn clamp_percent(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}

/// Clamp into [0, 1].
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Wrap degrees into [0, 360).
pub fn normalize_rotation(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
