//! SVG Compilation - Single Entry Point
//!
//! CRITICAL: compile always validates internally. Markup is never emitted
//! for a spec with error-severity issues, whatever the caller checked.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::hashing::{compute_spec_hash, compute_svg_hash};
use crate::model::{CircleShape, IconSpecExpanded, LineShape, RectShape};
use crate::numeric::format_number;
use crate::validation::{IssueCode, ValidationIssue, ValidationMetrics, Validator};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompileMetadata {
    pub size: u32,
    pub view_box: String,
    pub path_count: usize,
    pub total_path_commands: usize,
    pub stroke_width: f64,
    pub padding: f64,
    /// SHA-256 of `svgMinified`.
    pub svg_hash: String,
    /// SHA-256 of the spec's canonical JSON.
    pub spec_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompiledIcon {
    pub svg: String,
    pub svg_minified: String,
    pub metadata: CompileMetadata,
}

/// Outcome of compilation. Callers must branch: a rejected spec carries
/// only its error-severity issues and no markup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "docType")]
pub enum CompileResult {
    #[serde(rename = "iconCompileResult")]
    Compiled(CompiledIcon),
    #[serde(rename = "iconCompileError")]
    Rejected { issues: Vec<ValidationIssue> },
}

impl CompileResult {
    pub fn is_compiled(&self) -> bool {
        matches!(self, CompileResult::Compiled(_))
    }

    pub fn compiled(&self) -> Option<&CompiledIcon> {
        match self {
            CompileResult::Compiled(icon) => Some(icon),
            CompileResult::Rejected { .. } => None,
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            CompileResult::Compiled(_) => &[],
            CompileResult::Rejected { issues } => issues,
        }
    }
}

pub fn compile(validator: &Validator, spec: &IconSpecExpanded) -> CompileResult {
    match serde_json::to_value(spec) {
        Ok(raw) => compile_value(validator, &raw),
        Err(e) => rejected_schema(e),
    }
}

fn rejected_schema(e: serde_json::Error) -> CompileResult {
    CompileResult::Rejected {
        issues: vec![ValidationIssue::new(IssueCode::SchemaInvalid, "$", e.to_string())],
    }
}

/// Compile an untrusted JSON spec.
pub fn compile_value(validator: &Validator, raw: &Value) -> CompileResult {
    // MANDATORY: validation always runs before serialization.
    let validation = validator.validate_value(raw);
    if validation.has_errors() {
        let issues = validation.errors();
        debug!(errors = issues.len(), "Compilation rejected");
        return CompileResult::Rejected { issues };
    }

    let spec = match IconSpecExpanded::deserialize(raw) {
        Ok(spec) => spec,
        Err(e) => return rejected_schema(e),
    };

    let spec_hash = match compute_spec_hash(&spec) {
        Ok(hash) => hash,
        Err(e) => return rejected_schema(e),
    };

    let icon = render(&spec, &validation.metrics, spec_hash);
    debug!(
        name = %spec.name,
        bytes = icon.svg_minified.len(),
        warnings = validation.warnings().count(),
        "Compiled icon"
    );
    CompileResult::Compiled(icon)
}

fn render(spec: &IconSpecExpanded, metrics: &ValidationMetrics, spec_hash: String) -> CompiledIcon {
    let elements = elements(spec);
    let open = open_tag(spec);

    let svg = format!(
        "{}\n{}\n</svg>",
        open,
        elements.iter().map(|e| format!("  {}", e)).collect::<Vec<_>>().join("\n")
    );
    let svg_minified = format!("{}{}</svg>", open, elements.concat());

    CompiledIcon {
        metadata: CompileMetadata {
            size: spec.size,
            view_box: spec.view_box.clone(),
            path_count: metrics.path_count,
            total_path_commands: metrics.total_path_commands,
            stroke_width: spec.style.stroke_width,
            padding: spec.constraints.padding,
            svg_hash: compute_svg_hash(&svg_minified),
            spec_hash,
        },
        svg,
        svg_minified,
    }
}

/// Root element carrying every style attribute; children stay style-free.
fn open_tag(spec: &IconSpecExpanded) -> String {
    let style = &spec.style;
    let size = format_number(f64::from(spec.size));
    let attrs = [
        attr("width", &size),
        attr("height", &size),
        attr("viewBox", &spec.view_box),
        attr("fill", &style.fill),
        attr("xmlns", SVG_NAMESPACE),
        attr("stroke", &style.stroke),
        attr("stroke-width", &format_number(style.stroke_width)),
        attr("stroke-linecap", style.line_cap.as_str()),
        attr("stroke-linejoin", style.line_join.as_str()),
    ];
    format!("<svg {}>", attrs.join(" "))
}

fn elements(spec: &IconSpecExpanded) -> Vec<String> {
    let geometry = &spec.geometry;
    let mut out = Vec::with_capacity(
        geometry.paths.len()
            + geometry.rects.len()
            + geometry.circles.len()
            + geometry.lines.len()
            + geometry.polylines.len(),
    );

    out.extend(geometry.paths.iter().map(|p| element("path", &[attr("d", &p.d)])));
    out.extend(geometry.rects.iter().map(rect_element));
    out.extend(geometry.circles.iter().map(circle_element));
    out.extend(geometry.lines.iter().map(line_element));
    out.extend(geometry.polylines.iter().map(|p| element("polyline", &[attr("points", &p.points)])));
    out
}

fn rect_element(rect: &RectShape) -> String {
    let mut attrs = vec![
        num_attr("x", rect.x),
        num_attr("y", rect.y),
        num_attr("width", rect.width),
        num_attr("height", rect.height),
    ];
    attrs.extend(rect.rx.map(|v| num_attr("rx", v)));
    attrs.extend(rect.ry.map(|v| num_attr("ry", v)));
    element("rect", &attrs)
}

fn circle_element(circle: &CircleShape) -> String {
    element(
        "circle",
        &[num_attr("cx", circle.cx), num_attr("cy", circle.cy), num_attr("r", circle.r)],
    )
}

fn line_element(line: &LineShape) -> String {
    element(
        "line",
        &[
            num_attr("x1", line.x1),
            num_attr("y1", line.y1),
            num_attr("x2", line.x2),
            num_attr("y2", line.y2),
        ],
    )
}

fn element(name: &str, attrs: &[String]) -> String {
    format!("<{} {} />", name, attrs.join(" "))
}

fn attr(name: &str, value: &str) -> String {
    format!("{}=\"{}\"", name, escape_attr(value))
}

fn num_attr(name: &str, value: f64) -> String {
    format!("{}=\"{}\"", name, format_number(value))
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::{apply_preset, ExpandOptions};
    use crate::presets::PresetRegistry;
    use crate::samples::sample_icon;
    use serde_json::json;

    fn search_spec() -> IconSpecExpanded {
        apply_preset(&PresetRegistry::builtin(), sample_icon("search").unwrap(), &ExpandOptions::default())
            .expanded
    }

    #[test]
    fn test_search_markup() {
        let result = compile(&Validator::default(), &search_spec());
        let icon = result.compiled().unwrap();
        let open = "<svg width=\"24\" height=\"24\" viewBox=\"0 0 24 24\" fill=\"none\" \
                    xmlns=\"http://www.w3.org/2000/svg\" stroke=\"currentColor\" stroke-width=\"2\" \
                    stroke-linecap=\"round\" stroke-linejoin=\"round\">";
        assert_eq!(
            icon.svg,
            format!(
                "{}\n  <circle cx=\"11\" cy=\"11\" r=\"8\" />\n  <line x1=\"21\" y1=\"21\" x2=\"17\" y2=\"17\" />\n</svg>",
                open
            )
        );
        assert_eq!(
            icon.svg_minified,
            format!(
                "{}<circle cx=\"11\" cy=\"11\" r=\"8\" /><line x1=\"21\" y1=\"21\" x2=\"17\" y2=\"17\" /></svg>",
                open
            )
        );
    }

    #[test]
    fn test_element_order_and_rect_radii() {
        let mut spec = search_spec();
        spec.geometry.rects.push(RectShape {
            x: 4.0,
            y: 4.0,
            width: 8.0,
            height: 8.0,
            rx: Some(2.0),
            ry: None,
        });
        spec.geometry.paths.push(crate::model::PathShape { d: "M6 6h4".to_string() });
        let icon = compile(&Validator::default(), &spec).compiled().cloned().unwrap();
        let lines: Vec<&str> = icon.svg.lines().collect();
        assert_eq!(lines[1], "  <path d=\"M6 6h4\" />");
        assert_eq!(lines[2], "  <rect x=\"4\" y=\"4\" width=\"8\" height=\"8\" rx=\"2\" />");
        assert!(lines[3].starts_with("  <circle"));
        assert!(lines[4].starts_with("  <line"));
    }

    #[test]
    fn test_polyline_emitted_last() {
        let mut spec = search_spec();
        spec.geometry.polylines.push(crate::model::PolylineShape { points: "4,4 12,12".to_string() });
        let icon = compile(&Validator::default(), &spec).compiled().cloned().unwrap();
        let lines: Vec<&str> = icon.svg.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "  <polyline points=\"4,4 12,12\" />");
        assert!(icon.svg_minified.ends_with("<polyline points=\"4,4 12,12\" /></svg>"));
    }

    #[test]
    fn test_metadata_mirrors_spec() {
        let icon = compile(&Validator::default(), &search_spec()).compiled().cloned().unwrap();
        let meta = icon.metadata;
        assert_eq!(meta.size, 24);
        assert_eq!(meta.view_box, "0 0 24 24");
        assert_eq!(meta.stroke_width, 2.0);
        assert_eq!(meta.padding, 2.0);
        assert_eq!(meta.path_count, 0);
        assert_eq!(meta.svg_hash.len(), 64);
        assert_eq!(meta.spec_hash.len(), 64);
    }

    #[test]
    fn test_rejection_keeps_errors_only() {
        let mut spec = search_spec();
        spec.view_box = "0 0 10 10".to_string();
        spec.geometry.paths = (0..9)
            .map(|_| crate::model::PathShape { d: "M4 4L20 20".to_string() })
            .collect();
        let result = compile(&Validator::default(), &spec);
        assert!(!result.is_compiled());
        let codes: Vec<_> = result.issues().iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["ICON_VIEWBOX_002"]);
    }

    #[test]
    fn test_escapes_attribute_values() {
        assert_eq!(escape_attr("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }

    #[test]
    fn test_result_tagged_by_doc_type() {
        let result = compile(&Validator::default(), &search_spec());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["docType"], json!("iconCompileResult"));
        assert!(value["svgMinified"].is_string());

        let rejected = compile_value(&Validator::default(), &json!({"name": "x"}));
        let value = serde_json::to_value(&rejected).unwrap();
        assert_eq!(value["docType"], json!("iconCompileError"));
        assert!(value.get("svg").is_none());
    }
}
