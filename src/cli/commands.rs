use crate::deliver::{deliver, CleanupQueue, DiskHost};
use crate::error::SheetcastResult;
use crate::render::{FilterRegistry, NoTranslate, TableRenderer};
use crate::types::{ColumnDef, RenderContext, Row};
use colored::Colorize;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// On-disk export document: grid column definitions plus row data, with
/// title/worksheet defaults the CLI flags can override.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ExportDocument {
    title: String,
    worksheet: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
}

impl Default for ExportDocument {
    fn default() -> Self {
        Self {
            title: String::new(),
            worksheet: "Worksheet".to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Common grid cell filters, standing in for the formatting transforms the
/// surrounding application would register.
fn default_filters() -> FilterRegistry {
    let mut filters = FilterRegistry::new();
    filters.register("uppercase", |value, _| value.to_uppercase());
    filters.register("lowercase", |value, _| value.to_lowercase());
    filters.register("number", |value, arg| {
        let digits: usize = arg.parse().unwrap_or(0);
        match value.parse::<f64>() {
            Ok(n) => format!("{n:.digits$}"),
            Err(_) => value.to_string(),
        }
    });
    filters
}

/// Execute the export command
pub fn export(
    input: PathBuf,
    out_dir: PathBuf,
    title: Option<String>,
    worksheet: Option<String>,
    utc_offset: i32,
    verbose: bool,
) -> SheetcastResult<()> {
    println!("{}", "📤 Sheetcast - Exporting grid data".bold().green());
    println!("   Input: {}", input.display());
    println!();

    let content = fs::read_to_string(&input)?;
    let doc: ExportDocument = serde_json::from_str(&content)?;

    let title = title.unwrap_or(doc.title);
    let worksheet = worksheet.unwrap_or(doc.worksheet);

    let visible = doc.columns.iter().filter(|c| c.is_visible()).count();
    if verbose {
        println!("{}", "📖 Rendering table fragment...".cyan());
        println!(
            "   Columns: {} ({} visible)",
            doc.columns.len(),
            visible.to_string().cyan()
        );
        println!("   Rows: {}", doc.rows.len());
        println!();
    }
    if visible == 0 {
        println!(
            "{}",
            "⚠️  No visible columns - exporting a header-only document".yellow()
        );
    }

    let filters = default_filters();
    let renderer = TableRenderer::new(&NoTranslate, &filters);
    let fragment = renderer.render_table(&doc.columns, &doc.rows);

    let mut ctx = RenderContext::new();
    ctx.insert("title".to_string(), title);
    ctx.insert("worksheet".to_string(), worksheet);

    fs::create_dir_all(&out_dir)?;
    let mut host = DiskHost::new(&out_dir);
    let mut queue = CleanupQueue::new();
    deliver(&mut host, &mut queue, &fragment, &ctx, utc_offset)?;
    queue.run_pending(&mut host);

    for path in host.saved_files() {
        println!("{} {}", "✅ Saved:".bold().green(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_number_precision() {
        let filters = default_filters();
        assert_eq!(filters.apply("number", "1234.5", "2"), "1234.50");
        assert_eq!(filters.apply("number", "1234.25", ""), "1234");
    }

    #[test]
    fn test_default_filters_number_passes_non_numeric_through() {
        let filters = default_filters();
        assert_eq!(filters.apply("number", "n/a", "2"), "n/a");
    }

    #[test]
    fn test_default_filters_case_transforms() {
        let filters = default_filters();
        assert_eq!(filters.apply("uppercase", "pending", ""), "PENDING");
        assert_eq!(filters.apply("lowercase", "PENDING", ""), "pending");
    }

    #[test]
    fn test_export_document_defaults() {
        let doc: ExportDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.worksheet, "Worksheet");
        assert!(doc.title.is_empty());
        assert!(doc.columns.is_empty());
        assert!(doc.rows.is_empty());
    }
}
