//! Structural checks for untrusted expanded specs.
//!
//! Runs on raw JSON before anything is decoded, so every missing, mistyped
//! or unknown field is reported with its own path instead of a single
//! decode error.

use serde_json::{json, Map, Value};

use crate::presets::{LineCap, LineJoin};
use crate::validation::{IssueCode, ValidationIssue};

const TOP_LEVEL_KEYS: &[&str] = &[
    "docType",
    "name",
    "preset",
    "size",
    "viewBox",
    "style",
    "constraints",
    "geometry",
    "exports",
];
const STYLE_KEYS: &[&str] = &["strokeWidth", "stroke", "fill", "lineCap", "lineJoin"];
const CONSTRAINT_KEYS: &[&str] = &["gridSize", "padding", "maxTotalPathCommands", "maxPaths"];
const EXPORT_KEYS: &[&str] = &["emitSvg", "pngSizes"];

/// Geometric keys each shape collection may carry. Anything else on a
/// shape is styling and is rejected by the shape style rule.
pub const SHAPE_KEYS: &[(&str, &[&str])] = &[
    ("paths", &["d"]),
    ("circles", &["cx", "cy", "r"]),
    ("rects", &["x", "y", "width", "height", "rx", "ry"]),
    ("lines", &["x1", "y1", "x2", "y2"]),
    ("polylines", &["points"]),
];

const OPTIONAL_SHAPE_KEYS: &[&str] = &["rx", "ry"];
const TEXT_SHAPE_KEYS: &[&str] = &["d", "points"];

#[derive(Debug, Clone, Copy)]
enum NumberRule {
    Any,
    NonNegative,
    Positive,
    PositiveInteger,
    NonNegativeInteger,
}

impl NumberRule {
    fn accepts(self, value: &Value) -> bool {
        let in_u32 = |n: u64| n <= u64::from(u32::MAX);
        match self {
            NumberRule::Any => value.is_number(),
            NumberRule::NonNegative => value.as_f64().map_or(false, |n| n >= 0.0),
            NumberRule::Positive => value.as_f64().map_or(false, |n| n > 0.0),
            NumberRule::PositiveInteger => value.as_u64().map_or(false, |n| n > 0 && in_u32(n)),
            NumberRule::NonNegativeInteger => value.as_u64().map_or(false, in_u32),
        }
    }

    /// zod-style text for a number that has the right type but the wrong
    /// range or precision.
    fn range_message(self, value: f64) -> String {
        let integer = matches!(self, NumberRule::PositiveInteger | NumberRule::NonNegativeInteger);
        if integer && value.fract() != 0.0 {
            return "Expected integer, received float".to_string();
        }
        match self {
            NumberRule::Positive | NumberRule::PositiveInteger if value <= 0.0 => {
                "Number must be greater than 0".to_string()
            }
            NumberRule::NonNegative | NumberRule::NonNegativeInteger if value < 0.0 => {
                "Number must be greater than or equal to 0".to_string()
            }
            _ => format!("Number must be less than or equal to {}", u32::MAX),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            NumberRule::Any => "number",
            NumberRule::NonNegative => "non-negative number",
            NumberRule::Positive => "positive number",
            NumberRule::PositiveInteger => "positive integer",
            NumberRule::NonNegativeInteger => "non-negative integer",
        }
    }
}

/// `$.a.b[0]`, falling back to bracket form for keys that are not
/// identifiers.
pub fn child_path(parent: &str, key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_identifier {
        format!("{}.{}", parent, key)
    } else {
        format!("{}[{}]", parent, Value::String(key.to_string()))
    }
}

pub fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: String, expected: &str, received: &Value) -> ValidationIssue {
    ValidationIssue::new(
        IssueCode::SchemaInvalid,
        path,
        format!("Expected {}, received {}", expected, type_name(received)),
    )
    .with_details(json!({ "expected": expected, "received": received }))
}

fn out_of_range(path: String, rule: NumberRule, n: f64, received: &Value) -> ValidationIssue {
    ValidationIssue::new(IssueCode::SchemaInvalid, path, rule.range_message(n))
        .with_details(json!({ "expected": rule.describe(), "received": received }))
}

fn required(path: String) -> ValidationIssue {
    ValidationIssue::new(IssueCode::SchemaInvalid, path, "Required")
}

fn reject_unknown(
    map: &Map<String, Value>,
    allowed: &[&str],
    parent: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for key in map.keys().filter(|k| !allowed.contains(&k.as_str())) {
        issues.push(ValidationIssue::new(
            IssueCode::SchemaUnknownField,
            child_path(parent, key),
            format!("Unrecognized key \"{}\"", key),
        ));
    }
}

fn object_field<'v>(
    map: &'v Map<String, Value>,
    key: &str,
    parent: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<&'v Map<String, Value>> {
    let path = child_path(parent, key);
    match map.get(key) {
        None => {
            issues.push(required(path));
            None
        }
        Some(Value::Object(inner)) => Some(inner),
        Some(other) => {
            issues.push(mismatch(path, "object", other));
            None
        }
    }
}

fn string_field(
    map: &Map<String, Value>,
    key: &str,
    parent: &str,
    non_empty: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    let path = child_path(parent, key);
    match map.get(key) {
        None => issues.push(required(path)),
        Some(Value::String(s)) if non_empty && s.is_empty() => issues.push(ValidationIssue::new(
            IssueCode::SchemaInvalid,
            path,
            "String must contain at least 1 character(s)",
        )),
        Some(Value::String(_)) => {}
        Some(other) => issues.push(mismatch(path, "string", other)),
    }
}

fn number_field(
    map: &Map<String, Value>,
    key: &str,
    parent: &str,
    rule: NumberRule,
    optional: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    let path = child_path(parent, key);
    match map.get(key) {
        None if optional => {}
        None => issues.push(required(path)),
        Some(value) if rule.accepts(value) => {}
        Some(value) => match value.as_f64() {
            Some(n) => issues.push(out_of_range(path, rule, n, value)),
            None => issues.push(mismatch(path, rule.describe(), value)),
        },
    }
}

fn enum_field(
    map: &Map<String, Value>,
    key: &str,
    parent: &str,
    variants: &[&str],
    issues: &mut Vec<ValidationIssue>,
) {
    let path = child_path(parent, key);
    match map.get(key) {
        None => issues.push(required(path)),
        Some(Value::String(s)) if variants.contains(&s.as_str()) => {}
        Some(other) => {
            let expected = variants
                .iter()
                .map(|v| format!("'{}'", v))
                .collect::<Vec<_>>()
                .join(" | ");
            issues.push(
                ValidationIssue::new(
                    IssueCode::SchemaInvalid,
                    path,
                    format!("Invalid enum value. Expected {}", expected),
                )
                .with_details(json!({ "expected": variants, "received": other })),
            );
        }
    }
}

fn check_shapes(geometry: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) {
    for (collection, keys) in SHAPE_KEYS {
        let path = child_path("$.geometry", collection);
        let items = match geometry.get(*collection) {
            None => continue,
            Some(Value::Array(items)) => items,
            Some(other) => {
                issues.push(mismatch(path, "array", other));
                continue;
            }
        };
        for (index, item) in items.iter().enumerate() {
            let item_path = index_path(&path, index);
            let Some(shape) = item.as_object() else {
                issues.push(mismatch(item_path, "object", item));
                continue;
            };
            for key in *keys {
                let optional = OPTIONAL_SHAPE_KEYS.contains(key);
                if TEXT_SHAPE_KEYS.contains(key) {
                    string_field(shape, key, &item_path, false, issues);
                } else {
                    number_field(shape, key, &item_path, NumberRule::Any, optional, issues);
                }
            }
        }
    }
}

/// Every structural problem with `raw`, excluding export field types.
/// Empty means `raw` decodes as an expanded spec once exports are sound.
pub fn check_structure(raw: &Value) -> Vec<ValidationIssue> {
    let mut issues = vec![];
    let Some(root) = raw.as_object() else {
        issues.push(mismatch("$".to_string(), "object", raw));
        return issues;
    };

    reject_unknown(root, TOP_LEVEL_KEYS, "$", &mut issues);
    string_field(root, "name", "$", true, &mut issues);
    string_field(root, "preset", "$", false, &mut issues);
    number_field(root, "size", "$", NumberRule::PositiveInteger, false, &mut issues);
    string_field(root, "viewBox", "$", false, &mut issues);

    if let Some(style) = object_field(root, "style", "$", &mut issues) {
        reject_unknown(style, STYLE_KEYS, "$.style", &mut issues);
        number_field(style, "strokeWidth", "$.style", NumberRule::NonNegative, false, &mut issues);
        string_field(style, "stroke", "$.style", false, &mut issues);
        string_field(style, "fill", "$.style", false, &mut issues);
        enum_field(style, "lineCap", "$.style", &LineCap::ALL, &mut issues);
        enum_field(style, "lineJoin", "$.style", &LineJoin::ALL, &mut issues);
    }

    if let Some(constraints) = object_field(root, "constraints", "$", &mut issues) {
        let parent = "$.constraints";
        reject_unknown(constraints, CONSTRAINT_KEYS, parent, &mut issues);
        number_field(constraints, "gridSize", parent, NumberRule::Positive, false, &mut issues);
        number_field(constraints, "padding", parent, NumberRule::NonNegative, false, &mut issues);
        for key in ["maxTotalPathCommands", "maxPaths"] {
            number_field(constraints, key, parent, NumberRule::NonNegativeInteger, true, &mut issues);
        }
    }

    if let Some(geometry) = object_field(root, "geometry", "$", &mut issues) {
        let known: Vec<&str> = SHAPE_KEYS.iter().map(|(collection, _)| *collection).collect();
        reject_unknown(geometry, &known, "$.geometry", &mut issues);
        check_shapes(geometry, &mut issues);
    }

    if let Some(exports) = object_field(root, "exports", "$", &mut issues) {
        reject_unknown(exports, EXPORT_KEYS, "$.exports", &mut issues);
    }

    issues
}

/// Export field checks. These are reported under the export codes and do
/// not stop the remaining rules from running.
pub fn check_exports(raw: &Value) -> Vec<ValidationIssue> {
    let mut issues = vec![];
    let Some(exports) = raw.get("exports").and_then(Value::as_object) else {
        return issues;
    };

    if !matches!(exports.get("emitSvg"), Some(Value::Bool(_))) {
        issues.push(ValidationIssue::new(
            IssueCode::ExportSvgFlag,
            "$.exports.emitSvg",
            "exports.emitSvg must be a boolean",
        ));
    }

    match exports.get("pngSizes") {
        Some(Value::Array(sizes)) => {
            for (index, size) in sizes.iter().enumerate() {
                if !NumberRule::PositiveInteger.accepts(size) {
                    issues.push(
                        ValidationIssue::new(
                            IssueCode::ExportPngSize,
                            index_path("$.exports.pngSizes", index),
                            "Export sizes must be positive integers",
                        )
                        .with_details(json!({ "received": size })),
                    );
                }
            }
        }
        _ => issues.push(ValidationIssue::new(
            IssueCode::ExportPngList,
            "$.exports.pngSizes",
            "exports.pngSizes must be an array of sizes",
        )),
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_spec() -> Value {
        json!({
            "name": "dot",
            "preset": "solid",
            "size": 24,
            "viewBox": "0 0 24 24",
            "style": {"strokeWidth": 0, "stroke": "none", "fill": "currentColor", "lineCap": "round", "lineJoin": "round"},
            "constraints": {"gridSize": 1, "padding": 2, "maxTotalPathCommands": 160, "maxPaths": 8},
            "geometry": {"circles": [{"cx": 12, "cy": 12, "r": 4}]},
            "exports": {"emitSvg": true, "pngSizes": [64]}
        })
    }

    fn codes_and_paths(issues: &[ValidationIssue]) -> Vec<(&'static str, &str)> {
        issues.iter().map(|i| (i.code.as_str(), i.path.as_str())).collect()
    }

    #[test]
    fn test_valid_structure_has_no_issues() {
        assert!(check_structure(&valid_spec()).is_empty());
        assert!(check_exports(&valid_spec()).is_empty());
    }

    #[test]
    fn test_non_object_root() {
        let issues = check_structure(&json!([1, 2]));
        assert_eq!(codes_and_paths(&issues), vec![("ICON_SCHEMA_001", "$")]);
    }

    #[test]
    fn test_missing_and_mistyped_fields_located() {
        let mut spec = valid_spec();
        spec.as_object_mut().unwrap().remove("name");
        spec["size"] = json!(-4);
        spec["style"]["lineCap"] = json!("flat");
        spec["geometry"]["circles"][0]["r"] = json!("4");

        let issues = check_structure(&spec);
        assert_eq!(
            codes_and_paths(&issues),
            vec![
                ("ICON_SCHEMA_001", "$.name"),
                ("ICON_SCHEMA_001", "$.size"),
                ("ICON_SCHEMA_001", "$.style.lineCap"),
                ("ICON_SCHEMA_001", "$.geometry.circles[0].r"),
            ]
        );
    }

    #[test]
    fn test_range_failures_have_their_own_message() {
        let mut spec = valid_spec();
        spec["size"] = json!(24.5);
        spec["constraints"]["gridSize"] = json!(0);
        spec["constraints"]["padding"] = json!(-1);
        spec["style"]["strokeWidth"] = json!("2");

        let messages: Vec<_> = check_structure(&spec).into_iter().map(|i| (i.path, i.message)).collect();
        assert_eq!(
            messages,
            vec![
                ("$.size".to_string(), "Expected integer, received float".to_string()),
                (
                    "$.style.strokeWidth".to_string(),
                    "Expected non-negative number, received string".to_string()
                ),
                ("$.constraints.gridSize".to_string(), "Number must be greater than 0".to_string()),
                (
                    "$.constraints.padding".to_string(),
                    "Number must be greater than or equal to 0".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_unknown_keys_outside_shapes() {
        let mut spec = valid_spec();
        spec["style"]["opacity"] = json!(0.5);
        spec["extra key"] = json!(true);

        let issues = check_structure(&spec);
        assert_eq!(
            codes_and_paths(&issues),
            vec![
                ("ICON_SCHEMA_002", "$[\"extra key\"]"),
                ("ICON_SCHEMA_002", "$.style.opacity"),
            ]
        );
    }

    #[test]
    fn test_shape_style_keys_left_to_rules() {
        let mut spec = valid_spec();
        spec["geometry"]["circles"][0]["fill"] = json!("red");
        assert!(check_structure(&spec).is_empty());
    }

    #[test]
    fn test_export_issues() {
        let mut spec = valid_spec();
        spec["exports"] = json!({"emitSvg": "yes", "pngSizes": [64, 0, 12.5]});
        let issues = check_exports(&spec);
        assert_eq!(
            codes_and_paths(&issues),
            vec![
                ("ICON_EXPORT_001", "$.exports.emitSvg"),
                ("ICON_EXPORT_003", "$.exports.pngSizes[1]"),
                ("ICON_EXPORT_003", "$.exports.pngSizes[2]"),
            ]
        );

        spec["exports"] = json!({"emitSvg": true, "pngSizes": 64});
        assert_eq!(codes_and_paths(&check_exports(&spec)), vec![("ICON_EXPORT_002", "$.exports.pngSizes")]);
    }
}
