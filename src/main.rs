//! # Invoice Forge CLI
//!
//! Usage:
//!   invoice-forge invoice.json -o invoice.pdf
//!   echo '{ ... }' | invoice-forge --page letter
//!   invoice-forge invoice.json --logo logo.png --signature sig.png --assets ./brand
//!   invoice-forge --example > invoice.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use invoice_forge::assets::{load_optional, FsAssets};
use invoice_forge::{render_invoice, InvoiceDocument, InvoiceError, PageSize, RenderedDocument, StyleConfig};

#[derive(Parser)]
#[command(name = "invoice-forge", version, about = "Render an invoice JSON file to a one-page PDF")]
struct Cli {
    /// Invoice JSON file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output path. Defaults to invoice-<number>.pdf.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Style overrides as a JSON file.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Page format: a4 or letter.
    #[arg(long, default_value = "a4", value_parser = parse_page)]
    page: PageSize,

    /// Logo image, relative to --assets.
    #[arg(long)]
    logo: Option<String>,

    /// Signature image, relative to --assets.
    #[arg(long)]
    signature: Option<String>,

    /// Directory that --logo and --signature are resolved against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Print a sample invoice JSON and exit.
    #[arg(long)]
    example: bool,
}

fn parse_page(value: &str) -> Result<PageSize, String> {
    PageSize::parse(value).ok_or_else(|| format!("unknown page size '{}' (expected a4 or letter)", value))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_invoice_json());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok((path, rendered)) => {
            eprintln!("✓ Written {} bytes to {}", rendered.len(), path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(PathBuf, RenderedDocument), InvoiceError> {
    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let style = match &cli.style {
        Some(path) => StyleConfig::from_json(&fs::read_to_string(path)?)?,
        None => StyleConfig::default(),
    };

    let mut document = InvoiceDocument::from_json(&input)?;
    let assets = FsAssets::new(&cli.assets);
    if let Some(key) = &cli.logo {
        document.logo_image = load_optional(&assets, key);
    }
    if let Some(key) = &cli.signature {
        document.signature_image = load_optional(&assets, key);
    }

    let rendered = render_invoice(&document, &style, cli.page)?;
    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(RenderedDocument::file_name(&document.invoice.number)));
    fs::write(&path, &rendered.bytes)?;

    Ok((path, rendered))
}

fn example_invoice_json() -> &'static str {
    r##"{
  "client": {
    "name": "Ada Lovelace",
    "email": "ada@analytical.example",
    "company": "Analytical Engines Ltd",
    "address": "12 St James's Square, London SW1Y 4JH, United Kingdom"
  },
  "invoice": {
    "number": "HOP-75300-001",
    "issueDate": "2026-03-01",
    "dueDate": "2026-03-31"
  },
  "currencySymbol": "$",
  "taxRatePercent": 8.5,
  "lineItems": [
    {
      "description": "Brand identity workshop, two half-day sessions with stakeholder interviews and moodboard review",
      "quantity": 2,
      "unitRate": 650
    },
    { "description": "Logo design", "quantity": 1, "unitRate": 1200 },
    { "description": "Business card layout", "quantity": "3", "unitRate": "45.50" }
  ]
}
"##
}
