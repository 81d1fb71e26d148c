//! IconSpec Core - Deterministic Icon Compiler
//!
//! # The Five Laws (Non-Negotiable)
//! 1. Drafts Carry Geometry Only
//! 2. Presets Are Contracts
//! 3. Validation Is Protective
//! 4. Deterministic Output
//! 5. Agents Suggest, Engine Enforces

pub mod numeric;
pub mod presets;
pub mod model;
pub mod expand;
pub mod schema;
pub mod validation;
pub mod compile;
pub mod hashing;
pub mod export;
pub mod samples;
pub mod pipeline;
pub mod tools;

pub use presets::{LineCap, LineJoin, PresetDefinition, PresetKey, PresetRegistry, RegistryError};
pub use model::{Geometry, IconDraft, IconSpecExpanded, ResolvedConstraints, ResolvedStyle};
pub use expand::{apply_preset, ChangeKind, ChangeRecord, ExpandOptions, ExpandResult};
pub use validation::{IssueCode, Severity, ValidationIssue, ValidationResult, ValidationRule, Validator};
pub use compile::{CompileMetadata, CompileResult, CompiledIcon};
pub use hashing::{canonical_json, compute_spec_hash, compute_svg_hash};
pub use pipeline::{BuildOutput, IconPipeline};
pub use tools::{dispatch, ToolError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
