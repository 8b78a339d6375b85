use clap::{Parser, Subcommand};
use sheetcast::cli;
use sheetcast::error::SheetcastResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetcast")]
#[command(about = "Grid-to-spreadsheet exporter: tabular data in, .xls download out.")]
#[command(long_about = "Sheetcast - Excel-compatible grid exports

Renders grid column definitions + row data into an HTML worksheet document
and saves it under a generated '{PascalTitle}_{DD_MM_YYYY_HHmmss}.xls' name.

COMMANDS:
  export - Render a JSON export document and save the .xls

EXAMPLES:
  sheetcast export orders.json                      # Save next to the input
  sheetcast export orders.json -o exports/          # Pick the output directory
  sheetcast export orders.json -t \"order export\"    # Override the title
  sheetcast export orders.json --utc-offset 120     # Shift file-name timestamp

Docs: https://github.com/royalbit/sheetcast")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Render a JSON export document to an Excel-compatible .xls file.

The input document carries the grid definition and the data:

  {
    \"title\": \"order export\",
    \"worksheet\": \"Orders\",
    \"columns\": [
      {\"displayName\": \"EXPORT.REF\", \"field\": \"Ref\"},
      {\"displayName\": \"EXPORT.AMOUNT\", \"field\": \"amount\", \"cellFilter\": \"number:2\"}
    ],
    \"rows\": [
      {\"Ref\": \"20160930001234\", \"amount\": 12.5}
    ]
  }

Columns with a displayName and no grid name are exported; the rest are
grid-only metadata and are skipped. Cells whose field is 'Ref' are written
as literal numeric strings so Excel does not rewrite long references into
scientific notation.

BUILT-IN CELL FILTERS:
  uppercase, lowercase, number:<digits>

EXAMPLE:
  sheetcast export orders.json -o exports/ --worksheet Orders")]
    /// Render a JSON export document and save the .xls
    Export {
        /// Path to the JSON export document
        input: PathBuf,

        /// Directory the generated .xls is written into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Override the document title from the input file
        #[arg(short, long)]
        title: Option<String>,

        /// Override the worksheet name from the input file
        #[arg(short, long)]
        worksheet: Option<String>,

        /// Minutes from UTC applied to the file-name timestamp
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        utc_offset: i32,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> SheetcastResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetcast=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            out_dir,
            title,
            worksheet,
            utc_offset,
            verbose,
        } => cli::export(input, out_dir, title, worksheet, utc_offset, verbose),
    }
}
