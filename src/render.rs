//! Table fragment rendering.
//!
//! Converts grid column definitions plus row data into the HTML table
//! fragment spreadsheet applications read as worksheet content. Cell content
//! is inserted verbatim, without markup escaping: the exporter only ever
//! handles trusted, locally-sourced grid data and the output is consumed by
//! a local spreadsheet application, not a browser.

use crate::types::{cell_text, ColumnDef, Row};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::debug;

/// Header row background.
pub const HEADER_COLOR: &str = "#CCCCFF";

/// Style annotation for `Ref` cells. Keeps long numeric references out of
/// scientific notation and centers them.
const REF_CELL_STYLE: &str = "mso-number-format: 0; text-align: center;";

/// Maps a display-name key to localized header text.
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

/// Identity translation for callers without a localization layer.
pub struct NoTranslate;

impl Translate for NoTranslate {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Named cell-formatting transforms, applied per column via the
/// `filterName` or `filterName:arg` spec on a column definition.
#[derive(Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Box<dyn Fn(&str, &str) -> String>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform under `name`. The closure receives the raw cell
    /// value and the (possibly empty) filter argument.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        filter: impl Fn(&str, &str) -> String + 'static,
    ) {
        self.filters.insert(name.into(), Box::new(filter));
    }

    /// Apply a named transform. An unknown filter name degrades to the raw
    /// value; a missing filter never fails the export.
    pub fn apply(&self, name: &str, value: &str, arg: &str) -> String {
        match self.filters.get(name) {
            Some(filter) => filter(value, arg),
            None => value.to_string(),
        }
    }
}

/// Renders column definitions + rows into a `<table>` fragment with one
/// header cell and one body cell per visible column, in definition order.
pub struct TableRenderer<'a> {
    translator: &'a dyn Translate,
    filters: &'a FilterRegistry,
}

impl<'a> TableRenderer<'a> {
    pub fn new(translator: &'a dyn Translate, filters: &'a FilterRegistry) -> Self {
        Self {
            translator,
            filters,
        }
    }

    /// Render the header + body fragment, ready for embedding into the
    /// workbook template.
    ///
    /// Missing row fields render as empty cells; empty `rows` yields a
    /// header-only table; columns without a display name (or with a grid
    /// `name`) are skipped entirely.
    pub fn render_table(&self, columns: &[ColumnDef], rows: &[Row]) -> String {
        let visible: Vec<&ColumnDef> = columns.iter().filter(|c| c.is_visible()).collect();
        debug!(
            columns = visible.len(),
            rows = rows.len(),
            "rendering table fragment"
        );

        let mut out = String::from("<table border=\"1\">");

        let _ = write!(out, "<thead><tr style=\"background: {HEADER_COLOR}\">");
        for column in &visible {
            if let Some(label) = &column.display_name {
                let _ = write!(out, "<th>{}</th>", self.translator.translate(label));
            }
        }
        out.push_str("</tr></thead>");

        out.push_str("<tbody>");
        for row in rows {
            out.push_str("<tr>");
            for column in &visible {
                self.render_cell(&mut out, column, row);
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");

        out
    }

    fn render_cell(&self, out: &mut String, column: &ColumnDef, row: &Row) {
        let raw = cell_text(row.get(&column.field));
        let content = match &column.cell_filter {
            Some(spec) => {
                let (name, arg) = match spec.split_once(':') {
                    Some((name, arg)) => (name, arg),
                    None => (spec.as_str(), ""),
                };
                self.filters.apply(name, &raw, arg)
            }
            None => raw,
        };

        if column.field == "Ref" {
            let _ = write!(out, "<td style=\"{REF_CELL_STYLE}\">{content}</td>");
        } else {
            let _ = write!(out, "<td>{content}</td>");
        }
    }
}
