//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured issues. Severity is fixed per issue code:
//! complexity findings are warnings, everything else is an error.
//! The validator never fails; malformed input surfaces as schema issues.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::model::{canonical_view_box, ExportSettings, IconSpecExpanded};
use crate::numeric::{count_path_commands, extract_numbers, is_grid_multiple};
use crate::presets::{PresetDefinition, PresetRegistry};
use crate::schema::{self, child_path, index_path, SHAPE_KEYS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IssueCode {
    #[serde(rename = "ICON_SCHEMA_001")]
    SchemaInvalid,
    #[serde(rename = "ICON_SCHEMA_002")]
    SchemaUnknownField,
    #[serde(rename = "ICON_PRESET_001")]
    PresetUnknown,
    #[serde(rename = "ICON_PRESET_002")]
    PresetConstraints,
    #[serde(rename = "ICON_STYLE_001")]
    StyleStroke,
    #[serde(rename = "ICON_STYLE_002")]
    StyleFill,
    #[serde(rename = "ICON_STYLE_003")]
    StyleLineCap,
    #[serde(rename = "ICON_STYLE_004")]
    StyleLineJoin,
    #[serde(rename = "ICON_STYLE_005")]
    StyleStrokeWidth,
    #[serde(rename = "ICON_STYLE_006")]
    StylePerShape,
    #[serde(rename = "ICON_VIEWBOX_001")]
    ViewBoxFormat,
    #[serde(rename = "ICON_VIEWBOX_002")]
    ViewBoxSize,
    #[serde(rename = "ICON_GRID_001")]
    GridValue,
    #[serde(rename = "ICON_GRID_002")]
    GridPathData,
    #[serde(rename = "ICON_BOUNDS_001")]
    Bounds,
    #[serde(rename = "ICON_COMPLEXITY_001")]
    Complexity,
    #[serde(rename = "ICON_EXPORT_001")]
    ExportSvgFlag,
    #[serde(rename = "ICON_EXPORT_002")]
    ExportPngList,
    #[serde(rename = "ICON_EXPORT_003")]
    ExportPngSize,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::SchemaInvalid => "ICON_SCHEMA_001",
            IssueCode::SchemaUnknownField => "ICON_SCHEMA_002",
            IssueCode::PresetUnknown => "ICON_PRESET_001",
            IssueCode::PresetConstraints => "ICON_PRESET_002",
            IssueCode::StyleStroke => "ICON_STYLE_001",
            IssueCode::StyleFill => "ICON_STYLE_002",
            IssueCode::StyleLineCap => "ICON_STYLE_003",
            IssueCode::StyleLineJoin => "ICON_STYLE_004",
            IssueCode::StyleStrokeWidth => "ICON_STYLE_005",
            IssueCode::StylePerShape => "ICON_STYLE_006",
            IssueCode::ViewBoxFormat => "ICON_VIEWBOX_001",
            IssueCode::ViewBoxSize => "ICON_VIEWBOX_002",
            IssueCode::GridValue => "ICON_GRID_001",
            IssueCode::GridPathData => "ICON_GRID_002",
            IssueCode::Bounds => "ICON_BOUNDS_001",
            IssueCode::Complexity => "ICON_COMPLEXITY_001",
            IssueCode::ExportSvgFlag => "ICON_EXPORT_001",
            IssueCode::ExportPngList => "ICON_EXPORT_002",
            IssueCode::ExportPngSize => "ICON_EXPORT_003",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueCode::Complexity => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    pub severity: Severity,
    /// JSON path of the offending field, e.g. `$.geometry.paths[2].d`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: code.severity(),
            path: path.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Box around numbers read pairwise as (x, y). A trailing odd number and
    /// non-finite pairs are ignored.
    pub fn from_pairs(numbers: &[f64]) -> Option<Bounds> {
        numbers
            .chunks_exact(2)
            .filter(|pair| pair[0].is_finite() && pair[1].is_finite())
            .map(|pair| Bounds { min_x: pair[0], min_y: pair[1], max_x: pair[0], max_y: pair[1] })
            .reduce(Bounds::union)
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn inflate(self, amount: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    pub fn within(&self, min: f64, max: f64) -> bool {
        self.min_x >= min && self.min_y >= min && self.max_x <= max && self.max_y <= max
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetrics {
    pub path_count: usize,
    pub total_path_commands: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_stroke_bounds: Option<Bounds>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub metrics: ValidationMetrics,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<ValidationIssue>, metrics: ValidationMetrics) -> Self {
        Self {
            valid: !issues.iter().any(ValidationIssue::is_error),
            issues,
            metrics,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn errors(&self) -> Vec<ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error()).cloned().collect()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }
}

/// Everything a rule may look at. `raw` is the undecoded input, kept for
/// checks on keys the typed spec drops.
pub struct RuleContext<'a> {
    pub spec: &'a IconSpecExpanded,
    pub raw: &'a Value,
    pub preset: Option<&'a PresetDefinition>,
    pub metrics: &'a ValidationMetrics,
}

/// Validation rule trait - produces issues
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue>;
}

// --- Concrete Rules ---

pub struct PresetRule;

impl ValidationRule for PresetRule {
    fn name(&self) -> &'static str { "preset" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        if ctx.preset.is_some() {
            return vec![];
        }
        vec![ValidationIssue::new(
            IssueCode::PresetUnknown,
            "$.preset",
            format!("Unknown preset \"{}\"", ctx.spec.preset),
        )]
    }
}

pub struct StyleRule;

impl ValidationRule for StyleRule {
    fn name(&self) -> &'static str { "style" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let Some(preset) = ctx.preset else {
            return vec![];
        };
        let expected = preset.resolved_style(ctx.spec.size);
        let actual = &ctx.spec.style;
        let mut issues = vec![];

        let mut check = |code, field: &str, message: &str, expected: Value, received: Value| {
            if expected != received {
                issues.push(
                    ValidationIssue::new(code, child_path("$.style", field), message)
                        .with_details(json!({ "expected": expected, "received": received })),
                );
            }
        };

        check(
            IssueCode::StyleStroke,
            "stroke",
            "Stroke value must match preset",
            json!(expected.stroke),
            json!(actual.stroke),
        );
        check(
            IssueCode::StyleFill,
            "fill",
            "Fill value must match preset",
            json!(expected.fill),
            json!(actual.fill),
        );
        check(
            IssueCode::StyleLineCap,
            "lineCap",
            "lineCap must match preset",
            json!(expected.line_cap),
            json!(actual.line_cap),
        );
        check(
            IssueCode::StyleLineJoin,
            "lineJoin",
            "lineJoin must match preset",
            json!(expected.line_join),
            json!(actual.line_join),
        );
        check(
            IssueCode::StyleStrokeWidth,
            "strokeWidth",
            "strokeWidth must match preset size mapping",
            json!(expected.stroke_width),
            json!(actual.stroke_width),
        );

        issues
    }
}

pub struct ConstraintsRule;

impl ValidationRule for ConstraintsRule {
    fn name(&self) -> &'static str { "constraints" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let Some(preset) = ctx.preset else {
            return vec![];
        };
        let expected = preset.resolved_constraints(ctx.spec.size);
        let actual = &ctx.spec.constraints;

        let fields = [
            ("gridSize", json!(expected.grid_size), json!(actual.grid_size)),
            ("padding", json!(expected.padding), json!(actual.padding)),
            (
                "maxTotalPathCommands",
                json!(expected.max_total_path_commands),
                json!(actual.max_total_path_commands),
            ),
            ("maxPaths", json!(expected.max_paths), json!(actual.max_paths)),
        ];

        fields
            .into_iter()
            .filter(|(_, expected, received)| expected != received)
            .map(|(field, expected, received)| {
                ValidationIssue::new(
                    IssueCode::PresetConstraints,
                    child_path("$.constraints", field),
                    format!("constraints.{} must match preset", field),
                )
                .with_details(json!({ "expected": expected, "received": received }))
            })
            .collect()
    }
}

pub struct ViewBoxRule;

impl ValidationRule for ViewBoxRule {
    fn name(&self) -> &'static str { "view_box" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let spec = ctx.spec;
        let numbers = extract_numbers(&spec.view_box);
        if numbers.len() != 4 || numbers.iter().any(|n| !n.is_finite()) {
            return vec![ValidationIssue::new(
                IssueCode::ViewBoxFormat,
                "$.viewBox",
                "viewBox must contain four numbers",
            )];
        }

        let size = f64::from(spec.size);
        if numbers != [0.0, 0.0, size, size] {
            return vec![ValidationIssue::new(IssueCode::ViewBoxSize, "$.viewBox", "viewBox must match size")
                .with_details(json!({
                    "expected": canonical_view_box(spec.size),
                    "received": spec.view_box,
                }))];
        }
        vec![]
    }
}

/// Geometry is style-free: any key outside a shape's geometric key set is
/// rejected.
pub struct ShapeStyleRule;

impl ValidationRule for ShapeStyleRule {
    fn name(&self) -> &'static str { "shape_style" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = vec![];
        let Some(geometry) = ctx.raw.get("geometry") else {
            return issues;
        };

        for (collection, allowed) in SHAPE_KEYS {
            let Some(items) = geometry.get(*collection).and_then(Value::as_array) else {
                continue;
            };
            for (index, item) in items.iter().enumerate() {
                let Some(shape) = item.as_object() else {
                    continue;
                };
                let extras: Vec<&str> = shape
                    .keys()
                    .map(String::as_str)
                    .filter(|key| !allowed.contains(key))
                    .collect();
                if !extras.is_empty() {
                    issues.push(
                        ValidationIssue::new(
                            IssueCode::StylePerShape,
                            index_path(&child_path("$.geometry", collection), index),
                            "Per-shape styling is not allowed",
                        )
                        .with_details(json!({ "keys": extras })),
                    );
                }
            }
        }
        issues
    }
}

pub struct GridRule;

impl ValidationRule for GridRule {
    fn name(&self) -> &'static str { "grid" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let grid_size = ctx.spec.constraints.grid_size;
        let geometry = &ctx.spec.geometry;
        let aligned = |text: &str| extract_numbers(text).iter().all(|n| is_grid_multiple(*n, grid_size));
        let mut issues = vec![];

        for (index, path) in geometry.paths.iter().enumerate() {
            if !aligned(&path.d) {
                issues.push(ValidationIssue::new(
                    IssueCode::GridPathData,
                    format!("$.geometry.paths[{}].d", index),
                    "Path data must align to grid",
                ));
            }
        }
        for (index, polyline) in geometry.polylines.iter().enumerate() {
            if !aligned(&polyline.points) {
                issues.push(ValidationIssue::new(
                    IssueCode::GridPathData,
                    format!("$.geometry.polylines[{}].points", index),
                    "Polyline points must align to grid",
                ));
            }
        }

        let mut fields: Vec<(String, f64)> = vec![];
        for (i, c) in geometry.circles.iter().enumerate() {
            let at = |f: &str| format!("$.geometry.circles[{}].{}", i, f);
            fields.extend([(at("cx"), c.cx), (at("cy"), c.cy), (at("r"), c.r)]);
        }
        for (i, r) in geometry.rects.iter().enumerate() {
            let at = |f: &str| format!("$.geometry.rects[{}].{}", i, f);
            fields.extend([
                (at("x"), r.x),
                (at("y"), r.y),
                (at("width"), r.width),
                (at("height"), r.height),
            ]);
            fields.extend(r.rx.map(|v| (at("rx"), v)));
            fields.extend(r.ry.map(|v| (at("ry"), v)));
        }
        for (i, l) in geometry.lines.iter().enumerate() {
            let at = |f: &str| format!("$.geometry.lines[{}].{}", i, f);
            fields.extend([(at("x1"), l.x1), (at("y1"), l.y1), (at("x2"), l.x2), (at("y2"), l.y2)]);
        }

        for (path, value) in fields {
            if !is_grid_multiple(value, grid_size) {
                issues.push(
                    ValidationIssue::new(IssueCode::GridValue, path, "Numeric values must align to grid")
                        .with_details(json!({ "gridSize": grid_size, "value": value })),
                );
            }
        }
        issues
    }
}

pub struct BoundsRule;

impl ValidationRule for BoundsRule {
    fn name(&self) -> &'static str { "bounds" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let Some(bounds) = ctx.metrics.estimated_stroke_bounds else {
            return vec![];
        };
        let padding = ctx.spec.constraints.padding;
        let limit_max = f64::from(ctx.spec.size) - padding;

        if bounds.within(padding, limit_max) {
            return vec![];
        }
        vec![ValidationIssue::new(
            IssueCode::Bounds,
            "$.geometry",
            "Geometry exceeds viewBox bounds or padding",
        )
        .with_details(json!({ "padding": padding, "bounds": bounds }))]
    }
}

/// Complexity budgets are guidance only and always produce warnings.
pub struct ComplexityRule;

impl ValidationRule for ComplexityRule {
    fn name(&self) -> &'static str { "complexity" }

    fn validate(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let constraints = &ctx.spec.constraints;
        let metrics = ctx.metrics;
        let mut issues = vec![];

        if let Some(max) = constraints.max_total_path_commands.filter(|m| *m > 0) {
            if metrics.total_path_commands > max as usize {
                issues.push(
                    ValidationIssue::new(
                        IssueCode::Complexity,
                        "$.geometry.paths",
                        "Icon exceeds complexity guidance",
                    )
                    .with_details(json!({
                        "maxTotalPathCommands": max,
                        "totalPathCommands": metrics.total_path_commands,
                    })),
                );
            }
        }

        if let Some(max) = constraints.max_paths.filter(|m| *m > 0) {
            if metrics.path_count > max as usize {
                issues.push(
                    ValidationIssue::new(
                        IssueCode::Complexity,
                        "$.geometry.paths",
                        "Icon exceeds path count guidance",
                    )
                    .with_details(json!({ "maxPaths": max, "pathCount": metrics.path_count })),
                );
            }
        }
        issues
    }
}

/// Estimated extent of the drawn icon, including half the stroke width.
///
/// This is a linear heuristic, not a true curve bounding box: every number
/// in path data and polyline points is read pairwise as an (x, y) sample,
/// with no regard for relative commands, arc flags or control points.
/// Circles, rects and lines contribute exact boxes.
pub fn estimate_stroke_bounds(spec: &IconSpecExpanded) -> Option<Bounds> {
    let geometry = &spec.geometry;

    let paths = geometry.paths.iter().filter_map(|p| Bounds::from_pairs(&extract_numbers(&p.d)));
    let circles = geometry.circles.iter().map(|c| Bounds {
        min_x: c.cx - c.r,
        min_y: c.cy - c.r,
        max_x: c.cx + c.r,
        max_y: c.cy + c.r,
    });
    let rects = geometry.rects.iter().map(|r| Bounds {
        min_x: r.x,
        min_y: r.y,
        max_x: r.x + r.width,
        max_y: r.y + r.height,
    });
    let lines = geometry.lines.iter().map(|l| Bounds {
        min_x: l.x1.min(l.x2),
        min_y: l.y1.min(l.y2),
        max_x: l.x1.max(l.x2),
        max_y: l.y1.max(l.y2),
    });
    let polylines = geometry
        .polylines
        .iter()
        .filter_map(|p| Bounds::from_pairs(&extract_numbers(&p.points)));

    paths
        .chain(circles)
        .chain(rects)
        .chain(lines)
        .chain(polylines)
        .reduce(Bounds::union)
        .map(|bounds| bounds.inflate(spec.style.stroke_width / 2.0))
}

pub fn compute_metrics(spec: &IconSpecExpanded) -> ValidationMetrics {
    let paths = &spec.geometry.paths;
    ValidationMetrics {
        path_count: paths.len(),
        total_path_commands: paths.iter().map(|p| count_path_commands(&p.d)).sum(),
        estimated_stroke_bounds: estimate_stroke_bounds(spec),
    }
}

/// Validator orchestrates rules against a shared preset registry
pub struct Validator {
    registry: Arc<PresetRegistry>,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new(registry: Arc<PresetRegistry>) -> Self {
        Self {
            registry,
            rules: vec![
                Box::new(PresetRule),
                Box::new(StyleRule),
                Box::new(ConstraintsRule),
                Box::new(ViewBoxRule),
                Box::new(ShapeStyleRule),
                Box::new(GridRule),
                Box::new(BoundsRule),
                Box::new(ComplexityRule),
            ],
        }
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn validate(&self, spec: &IconSpecExpanded) -> ValidationResult {
        match serde_json::to_value(spec) {
            Ok(raw) => self.validate_value(&raw),
            Err(e) => ValidationResult::from_issues(
                vec![ValidationIssue::new(IssueCode::SchemaInvalid, "$", e.to_string())],
                ValidationMetrics::default(),
            ),
        }
    }

    /// Validate an untrusted JSON document.
    pub fn validate_value(&self, raw: &Value) -> ValidationResult {
        let mut issues = schema::check_structure(raw);
        let export_issues = schema::check_exports(raw);

        if !issues.is_empty() {
            issues.extend(export_issues);
            debug!(issues = issues.len(), "Spec failed structural checks");
            return ValidationResult::from_issues(issues, ValidationMetrics::default());
        }

        let spec = match decode(raw, !export_issues.is_empty()) {
            Ok(spec) => spec,
            Err(e) => {
                issues.push(ValidationIssue::new(IssueCode::SchemaInvalid, "$", e.to_string()));
                issues.extend(export_issues);
                return ValidationResult::from_issues(issues, ValidationMetrics::default());
            }
        };

        let metrics = compute_metrics(&spec);
        let ctx = RuleContext {
            spec: &spec,
            raw,
            preset: self.registry.get(&spec.preset),
            metrics: &metrics,
        };

        for rule in &self.rules {
            let found = rule.validate(&ctx);
            if !found.is_empty() {
                debug!(rule = rule.name(), count = found.len(), "Rule reported issues");
            }
            issues.extend(found);
        }
        issues.extend(export_issues);

        let result = ValidationResult::from_issues(issues, metrics);
        debug!(
            name = %spec.name,
            valid = result.valid,
            issues = result.issues.len(),
            "Validated spec"
        );
        result
    }
}

/// Decode a structurally sound spec. Broken export settings have already
/// been reported, so they are replaced by defaults to let the other rules run.
fn decode(raw: &Value, replace_exports: bool) -> Result<IconSpecExpanded, serde_json::Error> {
    if !replace_exports {
        return IconSpecExpanded::deserialize(raw);
    }
    let mut patched = raw.clone();
    if let Some(root) = patched.as_object_mut() {
        root.insert("exports".to_string(), serde_json::to_value(ExportSettings::default())?);
    }
    IconSpecExpanded::deserialize(&patched)
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(PresetRegistry::builtin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::{apply_preset, ExpandOptions};
    use crate::samples::sample_icon;

    fn search_spec() -> IconSpecExpanded {
        let registry = PresetRegistry::builtin();
        apply_preset(&registry, sample_icon("search").unwrap(), &ExpandOptions::default()).expanded
    }

    fn codes(result: &ValidationResult) -> Vec<&'static str> {
        result.issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn test_expanded_sample_is_valid() {
        let result = Validator::default().validate(&search_spec());
        assert!(result.valid, "{:?}", result.issues);
        assert!(result.issues.is_empty());
        assert_eq!(result.metrics.path_count, 0);
        let bounds = result.metrics.estimated_stroke_bounds.unwrap();
        assert_eq!(bounds, Bounds { min_x: 2.0, min_y: 2.0, max_x: 22.0, max_y: 22.0 });
    }

    #[test]
    fn test_style_mismatch_names_expected_and_received() {
        let mut spec = search_spec();
        spec.style.stroke_width = 3.0;
        let result = Validator::default().validate(&spec);
        assert_eq!(codes(&result), vec!["ICON_STYLE_005"]);
        let details = result.issues[0].details.as_ref().unwrap();
        assert_eq!(details["expected"].as_f64(), Some(2.0));
        assert_eq!(details["received"].as_f64(), Some(3.0));
        assert_eq!(result.issues[0].path, "$.style.strokeWidth");
    }

    #[test]
    fn test_unknown_preset_skips_style_checks() {
        let mut spec = search_spec();
        spec.preset = "neon".to_string();
        spec.style.fill = "red".to_string();
        let result = Validator::default().validate(&spec);
        assert_eq!(codes(&result), vec!["ICON_PRESET_001"]);
        assert!(!result.valid);
    }

    #[test]
    fn test_constraints_must_match_preset() {
        let mut spec = search_spec();
        spec.constraints.max_paths = Some(100);
        let result = Validator::default().validate(&spec);
        assert_eq!(codes(&result), vec!["ICON_PRESET_002"]);
        assert_eq!(result.issues[0].path, "$.constraints.maxPaths");
    }

    #[test]
    fn test_view_box_checks() {
        let mut spec = search_spec();
        spec.view_box = "0 0 24".to_string();
        assert_eq!(codes(&Validator::default().validate(&spec)), vec!["ICON_VIEWBOX_001"]);

        spec.view_box = "0 0 32 32".to_string();
        assert_eq!(codes(&Validator::default().validate(&spec)), vec!["ICON_VIEWBOX_002"]);
    }

    #[test]
    fn test_per_shape_style_rejected() {
        let mut raw = serde_json::to_value(search_spec()).unwrap();
        raw["geometry"]["circles"][0]["stroke"] = json!("red");
        raw["geometry"]["circles"][0]["opacity"] = json!(0.5);
        let result = Validator::default().validate_value(&raw);
        assert_eq!(codes(&result), vec!["ICON_STYLE_006"]);
        assert_eq!(result.issues[0].path, "$.geometry.circles[0]");
        assert_eq!(result.issues[0].details, Some(json!({ "keys": ["opacity", "stroke"] })));
    }

    #[test]
    fn test_off_grid_values_located() {
        let mut spec = search_spec();
        spec.geometry.lines[0].x2 = 16.65;
        spec.geometry.paths.push(crate::model::PathShape { d: "M6 6.5h4".to_string() });
        let result = Validator::default().validate(&spec);
        assert_eq!(codes(&result), vec!["ICON_GRID_002", "ICON_GRID_001"]);
        assert_eq!(result.issues[0].path, "$.geometry.paths[0].d");
        assert_eq!(result.issues[1].path, "$.geometry.lines[0].x2");
    }

    #[test]
    fn test_off_grid_polyline_located() {
        let mut spec = search_spec();
        spec.geometry.polylines.push(crate::model::PolylineShape { points: "4,4 12,19.5".to_string() });
        let result = Validator::default().validate(&spec);
        assert_eq!(codes(&result), vec!["ICON_GRID_002"]);
        assert_eq!(result.issues[0].path, "$.geometry.polylines[0].points");
    }

    #[test]
    fn test_polyline_bounds_read_pairwise() {
        let mut spec = search_spec();
        spec.geometry = crate::model::Geometry::default();
        spec.geometry.polylines.push(crate::model::PolylineShape { points: "4,6 18,10 12".to_string() });
        let result = Validator::default().validate(&spec);
        assert!(result.valid, "{:?}", result.issues);
        assert_eq!(
            result.metrics.estimated_stroke_bounds,
            Some(Bounds { min_x: 3.0, min_y: 5.0, max_x: 19.0, max_y: 11.0 })
        );

        spec.geometry.polylines[0].points = "1,12 23,12".to_string();
        assert_eq!(codes(&Validator::default().validate(&spec)), vec!["ICON_BOUNDS_001"]);
    }

    #[test]
    fn test_path_bounds_read_pairwise() {
        let bounds = Bounds::from_pairs(&extract_numbers("M3 9l9-7 9")).unwrap();
        assert_eq!(bounds, Bounds { min_x: 3.0, min_y: -7.0, max_x: 9.0, max_y: 9.0 });
        assert!(Bounds::from_pairs(&[4.0]).is_none());
    }

    #[test]
    fn test_path_command_budget_warns() {
        let mut spec = search_spec();
        let d = "M12 12".to_string() + &"L12 12".repeat(170);
        spec.geometry.paths.push(crate::model::PathShape { d });
        let result = Validator::default().validate(&spec);
        assert!(result.valid);
        assert_eq!(codes(&result), vec!["ICON_COMPLEXITY_001"]);
        assert_eq!(result.issues[0].severity, Severity::Warning);
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.metrics.total_path_commands, 171);
    }

    #[test]
    fn test_broken_exports_do_not_hide_other_rules() {
        let mut raw = serde_json::to_value(search_spec()).unwrap();
        raw["exports"]["emitSvg"] = json!("yes");
        raw["style"]["fill"] = json!("red");
        let result = Validator::default().validate_value(&raw);
        assert_eq!(codes(&result), vec!["ICON_STYLE_002", "ICON_EXPORT_001"]);
    }

    #[test]
    fn test_schema_failure_short_circuits() {
        let mut raw = serde_json::to_value(search_spec()).unwrap();
        raw["name"] = json!("");
        raw["style"]["fill"] = json!("red");
        let result = Validator::default().validate_value(&raw);
        assert_eq!(codes(&result), vec!["ICON_SCHEMA_001"]);
        assert_eq!(result.issues[0].path, "$.name");
        assert_eq!(result.metrics, ValidationMetrics::default());
    }

    #[test]
    fn test_synthetic_registry() {
        let mut preset = PresetDefinition::fallback("chunky");
        preset.constraints.grid_size = 2.0;
        let mut registry = PresetRegistry::new();
        registry.register(preset);
        let validator = Validator::new(Arc::new(registry));

        let mut spec = search_spec();
        spec.preset = "chunky".to_string();
        spec.constraints = validator.registry().get("chunky").unwrap().resolved_constraints(24);
        let result = validator.validate(&spec);

        // circle cx, cy and all four line ends are odd
        assert_eq!(codes(&result), vec!["ICON_GRID_001"; 6]);
    }
}
