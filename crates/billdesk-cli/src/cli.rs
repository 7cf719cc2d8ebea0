use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Total invoices and export them as single-page A4 PDFs.
#[derive(Debug, Parser)]
#[command(name = "billdesk", about, version)]
pub struct Cli {
    /// Log more detail to stderr (-v: debug, -vv: trace). RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print line totals, subtotal and total of an invoice
    Total {
        /// Path to the invoice JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        invoice: InvoiceArgs,
    },

    /// Render the invoice and write the captured region as PNG
    Render {
        /// Path to the invoice JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Where to write the PNG
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        invoice: InvoiceArgs,

        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Render the invoice and save it as an A4 PDF
    Export {
        /// Path to the invoice JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory the PDF is saved into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Wait before capturing, in milliseconds
        #[arg(long, default_value_t = 100)]
        delay_ms: u64,

        #[command(flatten)]
        invoice: InvoiceArgs,

        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        capture: CaptureArgs,
    },
}

/// How invoice files are read.
#[derive(Debug, Clone, clap::Args)]
pub struct InvoiceArgs {
    /// Currency symbol shown before amounts
    #[arg(long, default_value = "₹")]
    pub currency: String,

    /// Refuse non-numeric quantities and prices instead of carrying NaN
    #[arg(long)]
    pub reject_invalid: bool,
}

/// How the invoice view is laid out.
#[derive(Debug, Clone, clap::Args)]
pub struct ViewArgs {
    /// Heading printed at the top of the invoice
    #[arg(long, default_value = "INVOICE")]
    pub title: String,

    /// Logo image: a file path, data: URI, or http(s) URL
    #[arg(long)]
    pub logo: Option<String>,
}

/// How the view is rasterized.
#[derive(Debug, Clone, clap::Args)]
pub struct CaptureArgs {
    /// Device pixels per CSS pixel
    #[arg(long, default_value_t = 2.0)]
    pub scale: f64,

    /// TrueType/OpenType font for text. Default: first system font found
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Region of the view to capture
    #[arg(long, default_value = billdesk::CONTENT_REGION)]
    pub region: String,

    /// Leave images from other origins out of the capture
    #[arg(long)]
    pub no_cross_origin: bool,
}

/// Output format for structured data.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
