//! Icon Pipeline - Single Entry Point
//!
//! CRITICAL: compile MUST validate internally. No bypass.
//!
//! The pipeline owns the shared preset registry and wires the expander,
//! validator and compiler to it. Every operation is a pure function call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::compile::{self, CompileResult};
use crate::expand::{self, ChangeRecord, ExpandOptions, ExpandResult};
use crate::model::{IconDraft, IconSpecExpanded};
use crate::presets::{PresetDefinition, PresetRegistry, RegistryError};
use crate::validation::{ValidationResult, Validator};

/// Expansion followed by compilation, as one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    pub expanded: IconSpecExpanded,
    pub changes: Vec<ChangeRecord>,
    pub result: CompileResult,
}

/// The icon pipeline - single entry point for all icon operations
pub struct IconPipeline {
    registry: Arc<PresetRegistry>,
    validator: Validator,
}

impl IconPipeline {
    pub fn new(registry: Arc<PresetRegistry>) -> Self {
        Self {
            validator: Validator::new(Arc::clone(&registry)),
            registry,
        }
    }

    /// Builtin presets extended with every `*.json` preset in `dir`.
    pub fn with_presets_dir(dir: &Path) -> Result<Self, RegistryError> {
        let registry = PresetRegistry::load_from_dir(dir)?;
        Ok(Self::new(Arc::new(registry)))
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// List all available presets
    pub fn list_presets(&self) -> &[PresetDefinition] {
        self.registry.list()
    }

    pub fn apply_preset(&self, draft: &IconDraft, options: &ExpandOptions) -> ExpandResult {
        expand::apply_preset(&self.registry, draft, options)
    }

    pub fn validate(&self, spec: &IconSpecExpanded) -> ValidationResult {
        self.validator.validate(spec)
    }

    pub fn validate_value(&self, raw: &Value) -> ValidationResult {
        self.validator.validate_value(raw)
    }

    /// Compile an expanded spec
    ///
    /// CRITICAL: This ALWAYS validates internally. No bypass possible.
    pub fn compile(&self, spec: &IconSpecExpanded) -> CompileResult {
        compile::compile(&self.validator, spec)
    }

    pub fn compile_value(&self, raw: &Value) -> CompileResult {
        compile::compile_value(&self.validator, raw)
    }

    /// Expand a draft and compile the result in one step.
    pub fn build(&self, draft: &IconDraft, options: &ExpandOptions) -> BuildOutput {
        let ExpandResult { expanded, changes } = self.apply_preset(draft, options);
        let result = self.compile(&expanded);
        debug!(
            name = %draft.name,
            changes = changes.len(),
            compiled = result.is_compiled(),
            "Built icon"
        );
        BuildOutput { expanded, changes, result }
    }
}

impl Default for IconPipeline {
    fn default() -> Self {
        Self::new(Arc::new(PresetRegistry::builtin()))
    }
}
