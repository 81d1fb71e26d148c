//! Preset Registry - Style Contracts
//!
//! A preset fixes everything about an icon's look: stroke and fill paint,
//! caps and joins, and the size-dependent stroke width and padding. Drafts
//! only ever carry geometry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{ResolvedConstraints, ResolvedStyle};
use crate::ENGINE_VERSION;

pub type PresetKey = String;

/// Size whose entries stand in for sizes a preset does not list.
pub const REFERENCE_SIZE: u32 = 24;
pub const FALLBACK_STROKE_WIDTH: f64 = 2.0;
pub const FALLBACK_PADDING: f64 = 2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Round,
    Square,
    Butt,
}

impl LineCap {
    pub const ALL: [&'static str; 3] = ["round", "square", "butt"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineCap::Round => "round",
            LineCap::Square => "square",
            LineCap::Butt => "butt",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Round,
    Miter,
    Bevel,
}

impl LineJoin {
    pub const ALL: [&'static str; 3] = ["round", "miter", "bevel"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineJoin::Round => "round",
            LineJoin::Miter => "miter",
            LineJoin::Bevel => "bevel",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresetStyle {
    pub stroke: String,
    pub fill: String,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl Default for PresetStyle {
    fn default() -> Self {
        Self {
            stroke: "currentColor".to_string(),
            fill: "none".to_string(),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresetConstraints {
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_path_commands: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_paths: Option<u32>,
}

fn default_grid_size() -> f64 { 1.0 }

impl Default for PresetConstraints {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            max_total_path_commands: None,
            max_paths: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresetDefinition {
    pub id: PresetKey,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommended_sizes: Vec<u32>,
    pub stroke_width_by_size: BTreeMap<u32, f64>,
    pub padding_by_size: BTreeMap<u32, f64>,
    pub style: PresetStyle,
    #[serde(default)]
    pub constraints: PresetConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_min_version: Option<String>,
}

impl PresetDefinition {
    /// Stand-in used when a draft names a preset the registry does not know.
    /// Empty size tables resolve every size to the fallback values.
    pub fn fallback(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            recommended_sizes: vec![],
            stroke_width_by_size: BTreeMap::new(),
            padding_by_size: BTreeMap::new(),
            style: PresetStyle::default(),
            constraints: PresetConstraints::default(),
            engine_min_version: None,
        }
    }

    pub fn stroke_width_for(&self, size: u32) -> f64 {
        lookup_by_size(&self.stroke_width_by_size, size).unwrap_or(FALLBACK_STROKE_WIDTH)
    }

    pub fn padding_for(&self, size: u32) -> f64 {
        lookup_by_size(&self.padding_by_size, size).unwrap_or(FALLBACK_PADDING)
    }

    pub fn resolved_style(&self, size: u32) -> ResolvedStyle {
        ResolvedStyle {
            stroke_width: self.stroke_width_for(size),
            stroke: self.style.stroke.clone(),
            fill: self.style.fill.clone(),
            line_cap: self.style.line_cap,
            line_join: self.style.line_join,
        }
    }

    pub fn resolved_constraints(&self, size: u32) -> ResolvedConstraints {
        ResolvedConstraints {
            grid_size: self.constraints.grid_size,
            padding: self.padding_for(size),
            max_total_path_commands: self.constraints.max_total_path_commands,
            max_paths: self.constraints.max_paths,
        }
    }
}

fn lookup_by_size(table: &BTreeMap<u32, f64>, size: u32) -> Option<f64> {
    table.get(&size).or_else(|| table.get(&REFERENCE_SIZE)).copied()
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read presets: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preset {preset} requires engine >= {required}, current is {current}")]
    EngineVersionMismatch {
        preset: String,
        required: String,
        current: String,
    },

    #[error("Invalid version {0}")]
    InvalidVersion(String),

    #[error("Preset {preset} has invalid {field}: {reason}")]
    InvalidPreset {
        preset: String,
        field: String,
        reason: &'static str,
    },
}

/// Immutable preset table. Declared order is preserved for listing.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: Vec<PresetDefinition>,
}

impl PresetRegistry {
    /// An empty registry, for synthetic preset sets.
    pub fn new() -> Self {
        Self { presets: vec![] }
    }

    /// The four standard style families.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for preset in builtin_presets() {
            registry.register(preset);
        }
        registry
    }

    /// Built-in presets plus every compatible `*.json` preset in `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::builtin();
        registry.extend_from_dir(dir)?;
        Ok(registry)
    }

    /// Add presets from `*.json` files in `dir`, in file-name order.
    /// Unreadable or incompatible files are skipped with a warning.
    pub fn extend_from_dir(&mut self, dir: &Path) -> Result<usize, RegistryError> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |e| e == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable preset file");
                    continue;
                }
            };
            let preset = match serde_json::from_str::<PresetDefinition>(&content) {
                Ok(preset) => preset,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed preset file");
                    continue;
                }
            };
            match self.register_checked(preset) {
                Ok(()) => loaded += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping preset"),
            }
        }

        debug!(dir = %dir.display(), loaded, "Loaded presets from directory");
        Ok(loaded)
    }

    /// Insert or replace a preset. Replacement keeps the original position.
    pub fn register(&mut self, preset: PresetDefinition) {
        match self.presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    /// Register after checking the preset's engine version requirement and
    /// that its values can produce a valid expanded spec.
    pub fn register_checked(&mut self, preset: PresetDefinition) -> Result<(), RegistryError> {
        check_engine_version(&preset)?;
        check_values(&preset)?;
        self.register(preset);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&PresetDefinition> {
        self.presets.iter().find(|p| p.id == key)
    }

    pub fn list_keys(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn list(&self) -> &[PresetDefinition] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn check_engine_version(preset: &PresetDefinition) -> Result<(), RegistryError> {
    let Some(required) = &preset.engine_min_version else {
        return Ok(());
    };
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| RegistryError::InvalidVersion(ENGINE_VERSION.to_string()))?;
    let min_ver = semver::Version::parse(required)
        .map_err(|_| RegistryError::InvalidVersion(required.clone()))?;

    if engine_ver < min_ver {
        return Err(RegistryError::EngineVersionMismatch {
            preset: preset.id.clone(),
            required: required.clone(),
            current: ENGINE_VERSION.to_string(),
        });
    }
    Ok(())
}

/// Grid size must be positive; every stroke width and padding must be a
/// finite non-negative number.
fn check_values(preset: &PresetDefinition) -> Result<(), RegistryError> {
    let invalid = |field: String, reason: &'static str| RegistryError::InvalidPreset {
        preset: preset.id.clone(),
        field,
        reason,
    };

    let grid_size = preset.constraints.grid_size;
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return Err(invalid("constraints.gridSize".to_string(), "must be a positive number"));
    }

    let tables = [
        ("strokeWidthBySize", &preset.stroke_width_by_size),
        ("paddingBySize", &preset.padding_by_size),
    ];
    for (name, table) in tables {
        if let Some((size, _)) = table.iter().find(|(_, v)| !(v.is_finite() && **v >= 0.0)) {
            return Err(invalid(format!("{}.{}", name, size), "must be a non-negative number"));
        }
    }
    Ok(())
}

const STANDARD_SIZES: [u32; 5] = [16, 20, 24, 32, 48];

fn size_table(values: [f64; 5]) -> BTreeMap<u32, f64> {
    STANDARD_SIZES.into_iter().zip(values).collect()
}

fn standard_preset(
    id: &str,
    name: &str,
    description: &str,
    stroke_widths: [f64; 5],
    paddings: [f64; 5],
    style: PresetStyle,
) -> PresetDefinition {
    PresetDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        recommended_sizes: STANDARD_SIZES.to_vec(),
        stroke_width_by_size: size_table(stroke_widths),
        padding_by_size: size_table(paddings),
        style,
        constraints: PresetConstraints {
            grid_size: 1.0,
            max_total_path_commands: Some(160),
            max_paths: Some(8),
        },
        engine_min_version: None,
    }
}

fn builtin_presets() -> Vec<PresetDefinition> {
    let outline_widths = [1.5, 1.75, 2.0, 2.5, 3.0];
    let outline_padding = [1.0, 2.0, 2.0, 3.0, 4.0];
    let solid_padding = [1.0, 1.0, 2.0, 2.0, 3.0];

    vec![
        standard_preset(
            "outline_rounded",
            "Outline Rounded",
            "Clean outlines with rounded corners and caps",
            outline_widths,
            outline_padding,
            PresetStyle::default(),
        ),
        standard_preset(
            "outline_sharp",
            "Outline Sharp",
            "Crisp outlines with square corners and caps",
            outline_widths,
            outline_padding,
            PresetStyle {
                line_cap: LineCap::Square,
                line_join: LineJoin::Miter,
                ..PresetStyle::default()
            },
        ),
        standard_preset(
            "solid",
            "Solid",
            "Filled shapes with no stroke",
            [0.0; 5],
            solid_padding,
            PresetStyle {
                stroke: "none".to_string(),
                fill: "currentColor".to_string(),
                ..PresetStyle::default()
            },
        ),
        standard_preset(
            "duotone",
            "Duotone",
            "Two-tone style with shared fill/stroke",
            outline_widths,
            outline_padding,
            PresetStyle {
                fill: "currentColor".to_string(),
                ..PresetStyle::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_in_declared_order() {
        let registry = PresetRegistry::builtin();
        assert_eq!(
            registry.list_keys(),
            vec!["outline_rounded", "outline_sharp", "solid", "duotone"]
        );
    }

    #[test]
    fn test_size_lookup_falls_back_to_reference_size() {
        let registry = PresetRegistry::builtin();
        let preset = registry.get("outline_rounded").unwrap();
        assert_eq!(preset.stroke_width_for(20), 1.75);
        assert_eq!(preset.stroke_width_for(64), 2.0);
        assert_eq!(preset.padding_for(48), 4.0);
        assert_eq!(preset.padding_for(17), 2.0);
    }

    #[test]
    fn test_fallback_preset_uses_hard_defaults() {
        let preset = PresetDefinition::fallback("missing");
        assert_eq!(preset.stroke_width_for(24), FALLBACK_STROKE_WIDTH);
        assert_eq!(preset.padding_for(24), FALLBACK_PADDING);
        assert_eq!(preset.constraints.grid_size, 1.0);
    }

    #[test]
    fn test_unknown_key_is_none() {
        assert!(PresetRegistry::builtin().get("neon").is_none());
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = PresetRegistry::builtin();
        let mut solid = registry.get("solid").unwrap().clone();
        solid.name = "Solid Fill".to_string();
        registry.register(solid);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.list_keys()[2], "solid");
        assert_eq!(registry.get("solid").unwrap().name, "Solid Fill");
    }

    #[test]
    fn test_future_engine_version_rejected() {
        let mut preset = PresetDefinition::fallback("future");
        preset.engine_min_version = Some("99.0.0".to_string());
        let err = PresetRegistry::new().register_checked(preset).unwrap_err();
        assert!(matches!(err, RegistryError::EngineVersionMismatch { .. }));
    }

    #[test]
    fn test_unusable_values_rejected() {
        let mut zero_grid = PresetDefinition::fallback("zero");
        zero_grid.constraints.grid_size = 0.0;
        let err = PresetRegistry::new().register_checked(zero_grid).unwrap_err();
        assert_eq!(err.to_string(), "Preset zero has invalid constraints.gridSize: must be a positive number");

        let mut negative = PresetDefinition::fallback("tight");
        negative.padding_by_size.insert(24, -1.0);
        let mut registry = PresetRegistry::new();
        let err = registry.register_checked(negative).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPreset { ref field, .. } if field == "paddingBySize.24"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_solid_has_no_stroke() {
        let registry = PresetRegistry::builtin();
        let style = registry.get("solid").unwrap().resolved_style(24);
        assert_eq!(style.stroke_width, 0.0);
        assert_eq!(style.stroke, "none");
        assert_eq!(style.fill, "currentColor");
    }
}
