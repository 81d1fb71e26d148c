//! Export helpers for compiled markup. No rasterization happens here; PNG
//! sizes only become file names for a downstream exporter.

use base64::Engine;

use crate::compile::escape_attr;
use crate::model::ExportSettings;

pub const CURRENT_COLOR: &str = "currentColor";
pub const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

/// Swap every `currentColor` reference for a concrete colour. The colour
/// lands inside attribute values, so it is escaped like any other value.
pub fn replace_current_color(svg: &str, color: &str) -> String {
    let color = color.trim();
    if color.is_empty() || color == CURRENT_COLOR {
        return svg.to_string();
    }
    svg.replace(CURRENT_COLOR, &escape_attr(color))
}

pub fn svg_data_url(svg: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
    format!("{}{}", SVG_DATA_URL_PREFIX, encoded)
}

/// `{name}-{size}px.png`, in the order the sizes are listed.
pub fn png_export_names(name: &str, sizes: &[u32]) -> Vec<String> {
    sizes.iter().map(|size| format!("{}-{}px.png", name, size)).collect()
}

/// Every file an exporter would write for an icon.
pub fn export_file_names(name: &str, exports: &ExportSettings) -> Vec<String> {
    let mut names = vec![];
    if exports.emit_svg {
        names.push(format!("{}.svg", name));
    }
    names.extend(png_export_names(name, &exports.png_sizes));
    names
}
