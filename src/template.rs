//! Workbook template merging and payload encoding.
//!
//! Merges a rendered table fragment into the Excel workbook declaration,
//! substitutes `{identifier}` placeholders from a [`RenderContext`] and
//! encodes the document for one of the two delivery transports. Both
//! transports carry the same logical document; only the encoding differs.

use crate::types::{Payload, RenderContext, TargetEncoding};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

pub const MIME_TYPE: &str = "application/vnd.ms-excel;";
pub const CHARSET: &str = "charset=utf-8;";

/// MIME tag carried by blob payloads.
pub const BLOB_MIME: &str = "application/vnd.ms-excel;charset=utf-8;";

/// Prefix of data-URI payloads.
pub const URI_PREFIX: &str = "data:application/vnd.ms-excel;charset=utf-8;base64,";

/// Workbook/worksheet declaration prepended to every document. The
/// `{worksheet}` placeholder names the single sheet.
pub const TEMPLATE_HEADER: &str = "<html xmlns:html=\"http://www.w3.org/TR/REC-html40\" \
    xmlns=\"urn:schemas-microsoft-com:excel:spreadsheet\"\
    ><head><!--[if gte mso 9]><xml><x:ExcelWorkbook><x:ExcelWorksheets><x:ExcelWorksheet><x:Name>{worksheet}\
    </x:Name><x:WorksheetOptions><x:DisplayGridlines/></x:WorksheetOptions></x:ExcelWorksheet></x:ExcelWorksheets></x:ExcelWorkbook></xml><![endif]-->";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"))
}

/// Replace `{identifier}` tokens with context values.
///
/// Substitution is permissive: a token with no matching context key stays in
/// the output as literal text, so a template referencing placeholders the
/// caller never defined still produces a document.
pub fn substitute(template: &str, ctx: &RenderContext) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| match ctx.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Merge a custom template into the workbook declaration, substitute the
/// context and encode for transport.
pub fn encode(template: &str, ctx: &RenderContext, target: TargetEncoding) -> Payload {
    let document = substitute(&format!("{TEMPLATE_HEADER}{template}"), ctx);
    debug!(?target, bytes = document.len(), "encoding document");

    match target {
        TargetEncoding::DataUri => {
            Payload::DataUri(format!("{URI_PREFIX}{}", STANDARD.encode(&document)))
        }
        TargetEncoding::Blob => {
            // Byte-order marker first, so Excel picks up the UTF-8 charset.
            let mut bytes = Vec::with_capacity(3 + document.len());
            bytes.extend_from_slice("\u{feff}".as_bytes());
            bytes.extend_from_slice(document.as_bytes());
            Payload::Blob {
                bytes,
                mime: BLOB_MIME,
            }
        }
    }
}
