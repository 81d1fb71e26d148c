//! Tool Surface - JSON request/response documents
//!
//! An agent calls the pipeline by tool name with a raw JSON input. Requests
//! that do not decode are errors; specs that decode but break rules are
//! answered with issues, never with an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::expand::ExpandOptions;
use crate::model::IconDraft;
use crate::pipeline::IconPipeline;

pub const TOOL_PRESET_LIST: &str = "icon.preset.list";
pub const TOOL_PRESET_APPLY: &str = "icon.preset.apply";
pub const TOOL_VALIDATE: &str = "icon.validate";
pub const TOOL_COMPILE_SVG: &str = "icon.compileSvg";

pub const TOOL_NAMES: [&str; 4] = [TOOL_PRESET_LIST, TOOL_PRESET_APPLY, TOOL_VALIDATE, TOOL_COMPILE_SVG];

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid request for {tool}: {source}")]
    InvalidRequest {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresetSummary {
    pub id: String,
    pub recommended_sizes: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetListResponse {
    pub presets: Vec<PresetSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetApplyRequest {
    pub draft: IconDraft,
    #[serde(default)]
    pub options: Option<ExpandOptions>,
}

/// `spec` stays raw JSON: a malformed spec is reported as schema issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(alias = "expanded")]
    pub spec: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileRequest {
    #[serde(alias = "expanded")]
    pub spec: Value,
}

pub fn list_presets(pipeline: &IconPipeline) -> PresetListResponse {
    PresetListResponse {
        presets: pipeline
            .list_presets()
            .iter()
            .map(|preset| PresetSummary {
                id: preset.id.clone(),
                recommended_sizes: preset.recommended_sizes.clone(),
            })
            .collect(),
    }
}

/// Route a raw tool call to the pipeline and return its JSON response.
pub fn dispatch(pipeline: &IconPipeline, tool: &str, input: Value) -> Result<Value, ToolError> {
    debug!(tool, "Dispatching tool call");
    match tool {
        TOOL_PRESET_LIST => Ok(serde_json::to_value(list_presets(pipeline))?),
        TOOL_PRESET_APPLY => {
            let request: PresetApplyRequest = decode(TOOL_PRESET_APPLY, input)?;
            let options = request.options.unwrap_or_default();
            Ok(serde_json::to_value(pipeline.apply_preset(&request.draft, &options))?)
        }
        TOOL_VALIDATE => {
            let request: ValidateRequest = decode(TOOL_VALIDATE, input)?;
            Ok(serde_json::to_value(pipeline.validate_value(&request.spec))?)
        }
        TOOL_COMPILE_SVG => {
            let request: CompileRequest = decode(TOOL_COMPILE_SVG, input)?;
            Ok(serde_json::to_value(pipeline.compile_value(&request.spec))?)
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

fn decode<T: serde::de::DeserializeOwned>(tool: &'static str, input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|source| ToolError::InvalidRequest { tool, source })
}
