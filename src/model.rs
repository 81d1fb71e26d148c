//! Icon Documents - Drafts and Expanded Specs
//!
//! A draft is what an author writes: identity plus geometry. An expanded
//! spec is what the expander derives from it: the same geometry with the
//! preset's resolved style and constraints attached.

use serde::{Deserialize, Serialize};

use crate::numeric::format_number;
use crate::presets::{LineCap, LineJoin, PresetKey};

pub const DEFAULT_SIZE: u32 = 24;
pub const DEFAULT_PNG_SIZES: [u32; 3] = [64, 128, 256];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    pub d: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ry: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineShape {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineShape {
    pub points: String,
}

/// Ordered shape collections. Shapes carry geometry only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub paths: Vec<PathShape>,
    #[serde(default)]
    pub circles: Vec<CircleShape>,
    #[serde(default)]
    pub rects: Vec<RectShape>,
    #[serde(default)]
    pub lines: Vec<LineShape>,
    #[serde(default)]
    pub polylines: Vec<PolylineShape>,
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
            && self.circles.is_empty()
            && self.rects.is_empty()
            && self.lines.is_empty()
            && self.polylines.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    pub emit_svg: bool,
    pub png_sizes: Vec<u32>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            emit_svg: true,
            png_sizes: DEFAULT_PNG_SIZES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconDraft {
    pub name: String,
    pub preset: PresetKey,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_view_box")]
    pub view_box: String,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<ExportSettings>,
}

fn default_size() -> u32 { DEFAULT_SIZE }

fn default_view_box() -> String { canonical_view_box(DEFAULT_SIZE) }

/// `0 0 size size`
pub fn canonical_view_box(size: u32) -> String {
    let size = format_number(f64::from(size));
    format!("0 0 {} {}", size, size)
}

impl IconDraft {
    pub fn new(name: impl Into<String>, preset: impl Into<PresetKey>) -> Self {
        Self {
            name: name.into(),
            preset: preset.into(),
            size: DEFAULT_SIZE,
            view_box: default_view_box(),
            geometry: Geometry::default(),
            exports: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub stroke_width: f64,
    pub stroke: String,
    pub fill: String,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConstraints {
    pub grid_size: f64,
    pub padding: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_path_commands: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_paths: Option<u32>,
}

/// A draft merged with its preset. Only produced by the expander.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconSpecExpanded {
    pub name: String,
    pub preset: PresetKey,
    pub size: u32,
    pub view_box: String,
    pub style: ResolvedStyle,
    pub constraints: ResolvedConstraints,
    pub geometry: Geometry,
    pub exports: ExportSettings,
}

impl From<&IconSpecExpanded> for IconDraft {
    /// Re-draft an expanded spec: keep identity, geometry and exports, drop
    /// everything the preset supplies.
    fn from(spec: &IconSpecExpanded) -> Self {
        Self {
            name: spec.name.clone(),
            preset: spec.preset.clone(),
            size: spec.size,
            view_box: spec.view_box.clone(),
            geometry: spec.geometry.clone(),
            exports: Some(spec.exports.clone()),
        }
    }
}
