//! Preset Expansion - Draft to Expanded Spec
//!
//! Expansion never fails. An unknown preset degrades to fallback style so the
//! caller always gets a spec to inspect; the validator reports the problem.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::model::{
    canonical_view_box, CircleShape, ExportSettings, Geometry, IconDraft, IconSpecExpanded,
    LineShape, PathShape, PolylineShape, RectShape,
};
use crate::numeric::{collapse_whitespace, extract_numbers, format_number, rewrite_numbers, snap};
use crate::presets::{PresetDefinition, PresetRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandOptions {
    #[serde(default = "default_true")]
    pub normalize: bool,
    #[serde(default = "default_true")]
    pub snap_to_grid: bool,
    #[serde(default = "default_true")]
    pub fill_missing_defaults: bool,
}

fn default_true() -> bool { true }

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            snap_to_grid: true,
            fill_missing_defaults: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    NormalizeViewBox,
    FillMissingDefaults,
    SnapToGrid,
    NormalizePath,
}

/// Audit entry for a draft value the expander altered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub json_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChangeRecord {
    fn new(kind: ChangeKind, json_path: String, before: Option<Value>, after: Option<Value>) -> Self {
        Self { kind, json_path, before, after, note: None }
    }

    fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandResult {
    pub expanded: IconSpecExpanded,
    pub changes: Vec<ChangeRecord>,
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Merge `draft` with its preset. Pure: the same inputs always give the
/// same spec and the same change log.
pub fn apply_preset(
    registry: &PresetRegistry,
    draft: &IconDraft,
    options: &ExpandOptions,
) -> ExpandResult {
    let fallback;
    let preset = match registry.get(&draft.preset) {
        Some(preset) => preset,
        None => {
            warn!(preset = %draft.preset, name = %draft.name, "Unknown preset, expanding with fallback style");
            fallback = PresetDefinition::fallback(&draft.preset);
            &fallback
        }
    };

    let mut changes = vec![];
    let size = draft.size;

    let view_box = if options.normalize {
        normalize_view_box(&draft.view_box, size)
    } else {
        draft.view_box.clone()
    };
    if view_box != draft.view_box {
        changes.push(ChangeRecord::new(
            ChangeKind::NormalizeViewBox,
            "$.viewBox".to_string(),
            Some(json!(draft.view_box)),
            Some(json!(view_box)),
        ));
    }

    let exports = match &draft.exports {
        Some(exports) => exports.clone(),
        None => {
            let defaults = ExportSettings::default();
            let mut change = ChangeRecord::new(
                ChangeKind::FillMissingDefaults,
                "$.exports".to_string(),
                None,
                Some(to_json(&defaults)),
            );
            if !options.fill_missing_defaults {
                change = change.with_note("exports missing; an expanded spec always carries export settings");
            }
            changes.push(change);
            defaults
        }
    };

    let grid_size = preset.constraints.grid_size;
    let geometry = expand_geometry(&draft.geometry, options, grid_size, &mut changes);

    debug!(
        name = %draft.name,
        preset = %preset.id,
        size,
        changes = changes.len(),
        "Expanded draft"
    );

    ExpandResult {
        expanded: IconSpecExpanded {
            name: draft.name.clone(),
            preset: draft.preset.clone(),
            size,
            view_box,
            style: preset.resolved_style(size),
            constraints: preset.resolved_constraints(size),
            geometry,
            exports,
        },
        changes,
    }
}

/// Canonical `0 0 size size`. A view box that already says so is only
/// re-spaced; anything else is replaced.
fn normalize_view_box(view_box: &str, size: u32) -> String {
    let numbers = extract_numbers(view_box);
    let expected = [0.0, 0.0, f64::from(size), f64::from(size)];
    if numbers.len() == 4 && numbers.iter().zip(expected).all(|(a, b)| *a == b) {
        return numbers.iter().map(|n| format_number(*n)).collect::<Vec<_>>().join(" ");
    }
    canonical_view_box(size)
}

fn expand_geometry(
    geometry: &Geometry,
    options: &ExpandOptions,
    grid_size: f64,
    changes: &mut Vec<ChangeRecord>,
) -> Geometry {
    let snap_to_grid = options.snap_to_grid;
    let rewrite = options.normalize || snap_to_grid;
    let adjust = |value: f64| if snap_to_grid { snap(value, grid_size) } else { value };
    let text_kind = if snap_to_grid { ChangeKind::SnapToGrid } else { ChangeKind::NormalizePath };

    let paths = geometry
        .paths
        .iter()
        .enumerate()
        .map(|(index, path)| {
            if !rewrite {
                return path.clone();
            }
            let d = collapse_whitespace(&rewrite_numbers(&path.d, adjust));
            if d != path.d {
                changes.push(ChangeRecord::new(
                    text_kind,
                    format!("$.paths[{}].d", index),
                    Some(json!(path.d)),
                    Some(json!(d)),
                ));
            }
            PathShape { d }
        })
        .collect();

    let circles = snap_shapes(&geometry.circles, "circles", snap_to_grid, changes, |c| CircleShape {
        cx: snap(c.cx, grid_size),
        cy: snap(c.cy, grid_size),
        r: snap(c.r, grid_size),
    });

    let rects = snap_shapes(&geometry.rects, "rects", snap_to_grid, changes, |r| RectShape {
        x: snap(r.x, grid_size),
        y: snap(r.y, grid_size),
        width: snap(r.width, grid_size),
        height: snap(r.height, grid_size),
        rx: r.rx.map(|v| snap(v, grid_size)),
        ry: r.ry.map(|v| snap(v, grid_size)),
    });

    let lines = snap_shapes(&geometry.lines, "lines", snap_to_grid, changes, |l| LineShape {
        x1: snap(l.x1, grid_size),
        y1: snap(l.y1, grid_size),
        x2: snap(l.x2, grid_size),
        y2: snap(l.y2, grid_size),
    });

    let polylines = geometry
        .polylines
        .iter()
        .enumerate()
        .map(|(index, polyline)| {
            if !rewrite {
                return polyline.clone();
            }
            let points = rewrite_numbers(&polyline.points, adjust);
            if points != polyline.points {
                changes.push(ChangeRecord::new(
                    text_kind,
                    format!("$.polylines[{}].points", index),
                    Some(json!(polyline.points)),
                    Some(json!(points)),
                ));
            }
            PolylineShape { points }
        })
        .collect();

    Geometry { paths, circles, rects, lines, polylines }
}

fn snap_shapes<T>(
    shapes: &[T],
    collection: &str,
    snap_to_grid: bool,
    changes: &mut Vec<ChangeRecord>,
    snap_shape: impl Fn(&T) -> T,
) -> Vec<T>
where
    T: Clone + PartialEq + Serialize,
{
    shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            if !snap_to_grid {
                return shape.clone();
            }
            let snapped = snap_shape(shape);
            if snapped != *shape {
                changes.push(ChangeRecord::new(
                    ChangeKind::SnapToGrid,
                    format!("$.{}[{}]", collection, index),
                    Some(to_json(shape)),
                    Some(to_json(&snapped)),
                ));
            }
            snapped
        })
        .collect()
}
