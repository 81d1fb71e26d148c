//! IconSpec CLI - JSON bridge to the icon pipeline
//!
//! Commands: presets, samples, apply, validate, compile, build, call
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation/compile failure, 1 on usage or I/O errors
//!
//! JSON arguments may be given inline or as `@path/to/file.json`.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use iconspec_core::{
    export::{export_file_names, replace_current_color, svg_data_url},
    samples::{sample_icon, sample_icon_by_index, sample_icons, sample_names},
    tools, CompileResult, ExpandOptions, IconDraft, IconPipeline, PresetRegistry,
};

#[derive(Parser)]
#[command(name = "iconspec-cli")]
#[command(about = "IconSpec CLI - Deterministic Icon Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of extra preset JSON files
    #[arg(short, long, global = true)]
    presets_dir: Option<PathBuf>,

    /// Log level written to stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,
}

#[derive(Subcommand)]
enum Commands {
    /// List available presets
    Presets,

    /// Print the sample drafts
    Samples {
        /// Only the sample with this name
        #[arg(short, long)]
        name: Option<String>,

        /// Only the sample at this position (wraps around)
        #[arg(short, long, conflicts_with = "name")]
        index: Option<usize>,
    },

    /// Expand a draft with its preset
    Apply {
        /// JSON payload (IconDraft)
        #[arg(short, long)]
        draft: String,

        #[command(flatten)]
        options: OptionFlags,
    },

    /// Validate an expanded spec
    Validate {
        /// JSON payload (IconSpecExpanded)
        #[arg(short, long)]
        spec: String,
    },

    /// Compile an expanded spec to SVG
    Compile {
        /// JSON payload (IconSpecExpanded)
        #[arg(short, long)]
        spec: String,

        #[command(flatten)]
        output: OutputFlags,
    },

    /// Call a tool by name with a JSON input document
    Call {
        /// Tool name
        #[arg(short, long, value_parser = tools::TOOL_NAMES)]
        tool: String,

        /// JSON input for the tool
        #[arg(short, long, default_value = "{}")]
        input: String,
    },

    /// Expand a draft and compile it
    Build {
        /// JSON payload (IconDraft)
        #[arg(short, long)]
        draft: String,

        #[command(flatten)]
        options: OptionFlags,

        #[command(flatten)]
        output: OutputFlags,
    },
}

#[derive(Args)]
struct OptionFlags {
    /// Keep the viewBox and path formatting as written
    #[arg(long)]
    no_normalize: bool,

    /// Do not round geometry to the preset grid
    #[arg(long)]
    no_snap: bool,

    /// Do not fill missing export settings
    #[arg(long)]
    no_fill_defaults: bool,
}

impl OptionFlags {
    fn to_options(&self) -> ExpandOptions {
        ExpandOptions {
            normalize: !self.no_normalize,
            snap_to_grid: !self.no_snap,
            fill_missing_defaults: !self.no_fill_defaults,
        }
    }
}

#[derive(Args)]
struct OutputFlags {
    /// Replace currentColor in the emitted markup
    #[arg(long)]
    color: Option<String>,

    /// Add a base64 data URL of the minified markup
    #[arg(long)]
    data_url: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to install log subscriber");
    }

    let registry = match &cli.presets_dir {
        Some(dir) => match PresetRegistry::load_from_dir(dir) {
            Ok(r) => r,
            Err(e) => return fail(format!("Failed to load presets: {}", e)),
        },
        None => PresetRegistry::builtin(),
    };
    debug!(presets = registry.len(), "Registry ready");

    let pipeline = IconPipeline::new(Arc::new(registry));

    match cli.command {
        Commands::Presets => emit(&tools::list_presets(&pipeline), ExitCode::SUCCESS),

        Commands::Samples { name, index } => match (name, index) {
            (Some(name), _) => match sample_icon(&name) {
                Some(icon) => emit(icon, ExitCode::SUCCESS),
                None => fail(format!(
                    "Unknown sample: {} (available: {})",
                    name,
                    sample_names().join(", ")
                )),
            },
            (None, Some(index)) => emit(sample_icon_by_index(index), ExitCode::SUCCESS),
            (None, None) => emit(&sample_icons(), ExitCode::SUCCESS),
        },

        Commands::Apply { draft, options } => {
            let draft: IconDraft = match read_payload(&draft).and_then(parse) {
                Ok(d) => d,
                Err(e) => return fail(e),
            };
            emit(&pipeline.apply_preset(&draft, &options.to_options()), ExitCode::SUCCESS)
        }

        Commands::Validate { spec } => {
            let raw: Value = match read_payload(&spec).and_then(parse) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };
            let result = pipeline.validate_value(&raw);
            let code = if result.valid { ExitCode::SUCCESS } else { ExitCode::from(2) };
            emit(&result, code)
        }

        Commands::Compile { spec, output } => {
            let raw: Value = match read_payload(&spec).and_then(parse) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };
            let result = pipeline.compile_value(&raw);
            let code = compile_exit_code(&result);
            match render_result(result, &output) {
                Ok(value) => emit(&value, code),
                Err(e) => fail(e),
            }
        }

        Commands::Call { tool, input } => {
            let input: Value = match read_payload(&input).and_then(parse) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };
            match tools::dispatch(&pipeline, &tool, input) {
                Ok(response) => {
                    let code = tool_exit_code(&response);
                    emit(&response, code)
                }
                Err(e) => fail(e.to_string()),
            }
        }

        Commands::Build { draft, options, output } => {
            let draft: IconDraft = match read_payload(&draft).and_then(parse) {
                Ok(d) => d,
                Err(e) => return fail(e),
            };
            let build = pipeline.build(&draft, &options.to_options());
            let code = compile_exit_code(&build.result);
            let files = export_file_names(&build.expanded.name, &build.expanded.exports);
            let result = match render_result(build.result, &output) {
                Ok(value) => value,
                Err(e) => return fail(e),
            };
            let document = json!({
                "expanded": build.expanded,
                "changes": build.changes,
                "result": result,
                "files": files,
            });
            emit(&document, code)
        }
    }
}

fn compile_exit_code(result: &CompileResult) -> ExitCode {
    if result.is_compiled() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2) // Compilation failure (validation)
    }
}

/// Tool responses that report a rejected spec exit like `validate` and
/// `compile` do.
fn tool_exit_code(response: &Value) -> ExitCode {
    let rejected = response.get("valid") == Some(&Value::Bool(false))
        || response.get("docType").and_then(Value::as_str) == Some("iconCompileError");
    if rejected {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

/// Apply output flags to a compile result. Metadata hashes describe the
/// markup as compiled, before any recolouring.
fn render_result(result: CompileResult, output: &OutputFlags) -> Result<Value, String> {
    let result = match (result, &output.color) {
        (CompileResult::Compiled(mut icon), Some(color)) => {
            icon.svg = replace_current_color(&icon.svg, color);
            icon.svg_minified = replace_current_color(&icon.svg_minified, color);
            CompileResult::Compiled(icon)
        }
        (result, _) => result,
    };

    let data_url = match (&result, output.data_url) {
        (CompileResult::Compiled(icon), true) => Some(svg_data_url(&icon.svg_minified)),
        _ => None,
    };

    let mut value = serde_json::to_value(&result).map_err(|e| e.to_string())?;
    if let (Some(url), Some(map)) = (data_url, value.as_object_mut()) {
        map.insert("dataUrl".to_string(), Value::String(url));
    }
    Ok(value)
}

fn read_payload(arg: &str) -> Result<String, String> {
    match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e)),
        None => Ok(arg.to_string()),
    }
}

fn parse<T: serde::de::DeserializeOwned>(payload: String) -> Result<T, String> {
    serde_json::from_str(&payload).map_err(|e| format!("Invalid payload: {}", e))
}

fn emit<T: Serialize + ?Sized>(value: &T, code: ExitCode) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            code
        }
        Err(e) => fail(format!("Failed to serialize output: {}", e)),
    }
}

fn fail(message: String) -> ExitCode {
    println!("{}", json!({ "error": message }));
    ExitCode::FAILURE
}
