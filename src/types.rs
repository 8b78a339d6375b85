use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

//==============================================================================
// Grid Column Definitions
//==============================================================================

/// A grid column definition as supplied by the surrounding application.
///
/// Column definitions are reused verbatim from the grid's table-definition
/// source, so they carry fields the exporter ignores. A column takes part in
/// rendering only when `display_name` is set and `name` is unset; everything
/// else is grid-only metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnDef {
    /// Grid-internal column name. Present on metadata columns only.
    pub name: Option<String>,
    /// Header label key, resolved through the translation layer.
    #[serde(alias = "displayName")]
    pub display_name: Option<String>,
    /// Field looked up in each row to produce the cell value.
    pub field: String,
    /// Optional `filterName` or `filterName:arg` formatting transform.
    #[serde(alias = "cellFilter")]
    pub cell_filter: Option<String>,
}

impl ColumnDef {
    /// Shorthand for a plain visible data column.
    pub fn visible(display_name: &str, field: &str) -> Self {
        Self {
            name: None,
            display_name: Some(display_name.to_string()),
            field: field.to_string(),
            cell_filter: None,
        }
    }

    /// Whether the column is eligible for rendering.
    pub fn is_visible(&self) -> bool {
        self.display_name.is_some() && self.name.is_none()
    }
}

//==============================================================================
// Rows and Render Context
//==============================================================================

/// A data row: an open mapping from field name to a scalar value.
/// Rows are matched to columns by `field` key lookup; missing keys render
/// as empty cells.
pub type Row = serde_json::Map<String, Value>;

/// Flat placeholder-name to replacement map used for template substitution.
/// Must cover every placeholder the template in use references; unresolved
/// placeholders are left as literal `{name}` text.
pub type RenderContext = HashMap<String, String>;

/// String form of a scalar cell value. Strings pass through verbatim,
/// numbers and booleans use their display form, missing and non-scalar
/// values render empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

//==============================================================================
// Encoded Payloads
//==============================================================================

/// Transport encoding for the merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEncoding {
    /// Base64 `data:` URI for anchor-based downloads.
    DataUri,
    /// BOM-prefixed raw bytes for hosts with a native blob-save primitive.
    Blob,
}

/// The final encoded document, ready for platform delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    DataUri(String),
    Blob { bytes: Vec<u8>, mime: &'static str },
}
