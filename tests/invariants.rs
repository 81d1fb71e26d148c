//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use std::fs;
use std::sync::Arc;

use serde_json::json;

use iconspec_core::{
    dispatch,
    export::replace_current_color,
    model::{CircleShape, PathShape, PolylineShape},
    samples::{sample_icon, sample_icons},
    tools::{TOOL_COMPILE_SVG, TOOL_PRESET_APPLY, TOOL_VALIDATE},
    CompileResult, ExpandOptions, IconDraft, IconPipeline, IconSpecExpanded, LineCap,
    PresetRegistry, Severity,
};

fn expand(pipeline: &IconPipeline, draft: &IconDraft) -> IconSpecExpanded {
    pipeline.apply_preset(draft, &ExpandOptions::default()).expanded
}

fn codes(issues: &[iconspec_core::ValidationIssue]) -> Vec<&'static str> {
    issues.iter().map(|i| i.code.as_str()).collect()
}

#[test]
fn invariant_search_expands_to_outline_rounded() {
    let pipeline = IconPipeline::default();
    let result = pipeline.apply_preset(sample_icon("search").unwrap(), &ExpandOptions::default());
    let style = &result.expanded.style;

    assert_eq!(style.stroke_width, 2.0);
    assert_eq!(style.stroke, "currentColor");
    assert_eq!(style.fill, "none");
    assert_eq!(style.line_cap, LineCap::Round);
    assert_eq!(result.expanded.geometry.lines[0].x2, 17.0);
    assert_eq!(result.expanded.geometry.lines[0].y2, 17.0);

    let paths: Vec<_> = result.changes.iter().map(|c| c.json_path.as_str()).collect();
    assert_eq!(paths, vec!["$.lines[0]"]);
}

#[test]
fn invariant_compile_calls_validate() {
    // A spec with a foreign fill must never reach the serializer.
    let pipeline = IconPipeline::default();
    let mut spec = expand(&pipeline, sample_icon("search").unwrap());
    spec.style.fill = "red".to_string();

    let validation = pipeline.validate(&spec);
    assert_eq!(codes(&validation.issues), vec!["ICON_STYLE_002"]);

    match pipeline.compile(&spec) {
        CompileResult::Rejected { issues } => assert_eq!(issues, validation.issues),
        CompileResult::Compiled(_) => panic!("Compilation should fail for an invalid spec"),
    }
}

#[test]
fn invariant_out_of_bounds_geometry_rejected() {
    let pipeline = IconPipeline::default();
    let mut draft = IconDraft::new("blob", "outline_rounded");
    draft.geometry.circles.push(CircleShape { cx: 100.0, cy: 100.0, r: 50.0 });

    let spec = expand(&pipeline, &draft);
    let validation = pipeline.validate(&spec);
    assert_eq!(codes(&validation.issues), vec!["ICON_BOUNDS_001"]);
    assert!(!pipeline.compile(&spec).is_compiled());
}

#[test]
fn invariant_warnings_never_block() {
    let pipeline = IconPipeline::default();
    let mut draft = IconDraft::new("hatch", "outline_rounded");
    draft.geometry.paths = (0..9).map(|_| PathShape { d: "M4 4L20 20".to_string() }).collect();

    let spec = expand(&pipeline, &draft);
    let validation = pipeline.validate(&spec);
    assert!(validation.valid);
    assert_eq!(codes(&validation.issues), vec!["ICON_COMPLEXITY_001"]);
    assert_eq!(validation.issues[0].severity, Severity::Warning);
    assert_eq!(validation.metrics.path_count, 9);

    let icon = pipeline.compile(&spec).compiled().cloned().expect("warnings must not block");
    assert_eq!(icon.svg_minified.matches("<path ").count(), 9);
}

#[test]
fn invariant_compile_deterministic() {
    let spec = expand(&IconPipeline::default(), sample_icon("search").unwrap());

    let first = IconPipeline::default().compile(&spec);
    let second = IconPipeline::default().compile(&spec);
    assert_eq!(first, second);

    let (a, b) = (first.compiled().unwrap(), second.compiled().unwrap());
    assert_eq!(a.svg, b.svg);
    assert_eq!(a.metadata.svg_hash, b.metadata.svg_hash);
    assert_eq!(a.metadata.spec_hash, b.metadata.spec_hash);
}

#[test]
fn invariant_spec_hash_ignores_number_spelling() {
    let pipeline = IconPipeline::default();
    let spec = expand(&pipeline, sample_icon("search").unwrap());

    let typed = pipeline.compile(&spec);
    let mut raw = serde_json::to_value(&spec).unwrap();
    raw["style"]["strokeWidth"] = json!(2);
    raw["geometry"]["circles"][0] = json!({"cx": 11, "cy": 11, "r": 8});
    let untyped = pipeline.compile_value(&raw);

    assert_eq!(
        typed.compiled().unwrap().metadata.spec_hash,
        untyped.compiled().unwrap().metadata.spec_hash
    );
}

#[test]
fn invariant_expansion_idempotent() {
    let pipeline = IconPipeline::default();
    for sample in sample_icons() {
        let first = pipeline.apply_preset(sample, &ExpandOptions::default());
        let again = pipeline.apply_preset(&IconDraft::from(&first.expanded), &ExpandOptions::default());
        assert_eq!(again.expanded, first.expanded, "sample {}", sample.name);
        assert!(again.changes.is_empty(), "sample {}", sample.name);
    }
}

#[test]
fn invariant_snapped_samples_are_on_grid() {
    let pipeline = IconPipeline::default();
    for sample in sample_icons() {
        let validation = pipeline.validate(&expand(&pipeline, sample));
        assert!(
            validation.issues.iter().all(|i| !i.code.as_str().starts_with("ICON_GRID")),
            "sample {}: {:?}",
            sample.name,
            validation.issues
        );
    }
}

#[test]
fn invariant_tool_calls_match_direct_calls() {
    let pipeline = IconPipeline::default();
    let draft = sample_icon("search").unwrap();

    let applied = dispatch(&pipeline, TOOL_PRESET_APPLY, json!({ "draft": draft })).unwrap();
    let expanded = applied["expanded"].clone();
    assert_eq!(expanded, serde_json::to_value(expand(&pipeline, draft)).unwrap());

    let validated = dispatch(&pipeline, TOOL_VALIDATE, json!({ "spec": expanded.clone() })).unwrap();
    assert_eq!(validated["valid"], json!(true));

    let compiled = dispatch(&pipeline, TOOL_COMPILE_SVG, json!({ "spec": expanded })).unwrap();
    let direct = serde_json::to_value(pipeline.compile(&expand(&pipeline, draft))).unwrap();
    assert_eq!(compiled, direct);
}

#[test]
fn invariant_presets_dir_extends_registry() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("chunky.json"),
        json!({
            "id": "chunky",
            "name": "Chunky",
            "recommendedSizes": [24],
            "strokeWidthBySize": {"24": 3},
            "paddingBySize": {"24": 3},
            "style": {"stroke": "currentColor", "fill": "none", "lineCap": "butt", "lineJoin": "bevel"},
            "constraints": {"gridSize": 2}
        })
        .to_string(),
    )
    .unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(
        dir.path().join("future.json"),
        json!({
            "id": "future",
            "name": "Future",
            "strokeWidthBySize": {},
            "paddingBySize": {},
            "style": {"stroke": "currentColor", "fill": "none", "lineCap": "round", "lineJoin": "round"},
            "engineMinVersion": "99.0.0"
        })
        .to_string(),
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let registry = PresetRegistry::load_from_dir(dir.path()).unwrap();
    assert_eq!(
        registry.list_keys(),
        vec!["outline_rounded", "outline_sharp", "solid", "duotone", "chunky"]
    );

    let pipeline = IconPipeline::new(Arc::new(registry));
    let mut draft = IconDraft::new("ring", "chunky");
    draft.geometry.circles.push(CircleShape { cx: 11.0, cy: 12.0, r: 6.0 });

    let build = pipeline.build(&draft, &ExpandOptions::default());
    assert_eq!(build.expanded.geometry.circles[0].cx, 12.0);
    let icon = build.result.compiled().expect("chunky ring compiles");
    assert!(icon.svg.contains("stroke-width=\"3\""));
    assert!(icon.svg.contains("stroke-linecap=\"butt\""));
    assert!(icon.svg.contains("stroke-linejoin=\"bevel\""));
}

#[test]
fn invariant_unusable_presets_skipped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("zero.json"),
        json!({
            "id": "zero",
            "name": "Zero",
            "strokeWidthBySize": {"24": 2},
            "paddingBySize": {"24": -1},
            "style": {"stroke": "currentColor", "fill": "none", "lineCap": "round", "lineJoin": "round"},
            "constraints": {"gridSize": 0}
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.path().join("thin.json"),
        json!({
            "id": "thin",
            "name": "Thin",
            "strokeWidthBySize": {"24": 1},
            "paddingBySize": {"24": 2},
            "style": {"stroke": "currentColor", "fill": "none", "lineCap": "round", "lineJoin": "round"}
        })
        .to_string(),
    )
    .unwrap();

    let mut registry = PresetRegistry::builtin();
    assert_eq!(registry.extend_from_dir(dir.path()).unwrap(), 1);
    assert!(registry.get("zero").is_none());
    assert!(registry.get("thin").is_some());
}

#[test]
fn invariant_polyline_built_end_to_end() {
    let pipeline = IconPipeline::default();
    let mut draft = IconDraft::new("zigzag", "outline_rounded");
    draft.geometry.polylines.push(PolylineShape { points: "4.4,4.6 12,19.5 20,4".to_string() });

    let build = pipeline.build(&draft, &ExpandOptions::default());
    assert!(build.changes.iter().any(|c| c.json_path == "$.polylines[0].points"));
    let icon = build.result.compiled().expect("snapped polyline compiles");
    assert!(icon.svg_minified.ends_with("<polyline points=\"4,5 12,20 20,4\" /></svg>"));

    let unsnapped = pipeline.build(&draft, &ExpandOptions { snap_to_grid: false, ..ExpandOptions::default() });
    let paths: Vec<_> = unsnapped.result.issues().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["$.geometry.polylines[0].points"]);
}

#[test]
fn invariant_recolouring_keeps_markup_intact() {
    let pipeline = IconPipeline::default();
    let icon = pipeline
        .compile(&expand(&pipeline, sample_icon("search").unwrap()))
        .compiled()
        .cloned()
        .unwrap();

    let recoloured = replace_current_color(&icon.svg_minified, "red\"/><script>x</script><g a=\"");
    assert!(!recoloured.contains("<script>"));
    assert_eq!(recoloured.matches('<').count(), icon.svg_minified.matches('<').count());
}

#[test]
fn invariant_missing_presets_dir_is_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PresetRegistry::load_from_dir(&dir.path().join("absent")).unwrap();
    assert_eq!(registry.len(), 4);
}
