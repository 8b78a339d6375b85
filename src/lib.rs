//! Sheetcast - grid-to-spreadsheet exporter
//!
//! This library converts an in-memory tabular dataset (grid column
//! definitions + row data) into a spreadsheet-compatible document and hands
//! it to a host file-delivery mechanism as a `.xls` download.
//!
//! # Features
//!
//! - HTML worksheet documents Excel opens natively (workbook declaration,
//!   single sheet, gridlines)
//! - Per-column display rules: translated header labels, `filterName:arg`
//!   cell filters, numeric-literal handling for reference columns
//! - Permissive `{identifier}` template substitution
//! - Base64 data-URI and BOM-prefixed blob transports
//! - Capability-probed delivery strategies with deferred anchor cleanup
//!
//! # Example
//!
//! ```
//! use sheetcast::render::{FilterRegistry, NoTranslate, TableRenderer};
//! use sheetcast::template;
//! use sheetcast::types::{ColumnDef, RenderContext, Row, TargetEncoding};
//!
//! let columns = vec![
//!     ColumnDef::visible("EXPORT.REF", "Ref"),
//!     ColumnDef::visible("EXPORT.AMOUNT", "amount"),
//! ];
//! let rows: Vec<Row> = Vec::new();
//!
//! let filters = FilterRegistry::new();
//! let renderer = TableRenderer::new(&NoTranslate, &filters);
//! let fragment = renderer.render_table(&columns, &rows);
//!
//! let mut ctx = RenderContext::new();
//! ctx.insert("title".to_string(), "order export".to_string());
//! ctx.insert("worksheet".to_string(), "Orders".to_string());
//!
//! let payload = template::encode(&fragment, &ctx, TargetEncoding::DataUri);
//! ```

pub mod cli;
pub mod deliver;
pub mod error;
pub mod naming;
pub mod render;
pub mod template;
pub mod types;

// Re-export commonly used types
pub use deliver::{CleanupQueue, DeliveryHost, DeliveryStrategy, DiskHost};
pub use error::{SheetcastError, SheetcastResult};
pub use types::{ColumnDef, Payload, RenderContext, Row, TargetEncoding};
