mod app;
mod chart;
mod color;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::ExplorerApp;
use clap::Parser;
use eframe::egui;

use chart::{DEFAULT_BINS, MAX_BINS};
use data::loader::{LoadOptions, TextEncoding};
use state::AppState;

/// Filter a tabular dataset and chart what is left.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// CSV, JSON or Parquet file to open at startup.
    path: Option<PathBuf>,

    /// Character encoding of CSV input.
    #[arg(long, value_enum, default_value_t = TextEncoding::Utf8)]
    encoding: TextEncoding,

    /// Field delimiter of CSV input (a single ASCII character, or `\t`).
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Initial number of histogram bins.
    #[arg(long, default_value_t = DEFAULT_BINS, value_parser = parse_bins)]
    bins: usize,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("'{s}' is not a single ASCII character")),
        },
    }
}

fn parse_bins(s: &str) -> Result<usize, String> {
    let bins: usize = s.parse().map_err(|e| format!("{e}"))?;
    if (1..=MAX_BINS).contains(&bins) {
        Ok(bins)
    } else {
        Err(format!("must be between 1 and {MAX_BINS}"))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = LoadOptions {
        encoding: args.encoding,
        delimiter: args.delimiter,
    };
    let mut state = AppState::new(options, args.bins);
    if let Some(path) = &args.path {
        state
            .open(path)
            .with_context(|| format!("could not open {}", path.display()))?;
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tabular Explorer",
        native_options,
        Box::new(move |_cc| Ok(Box::new(ExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the UI: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "tabular-explorer",
            "scores.csv",
            "--encoding",
            "latin1",
            "--delimiter",
            ";",
            "--bins",
            "30",
        ])
        .unwrap();
        assert_eq!(args.path, Some(PathBuf::from("scores.csv")));
        assert_eq!(args.encoding, TextEncoding::Latin1);
        assert_eq!(args.delimiter, b';');
        assert_eq!(args.bins, 30);

        assert!(Args::try_parse_from(["tabular-explorer", "--bins", "0"]).is_err());
        let defaults = Args::try_parse_from(["tabular-explorer"]).unwrap();
        assert_eq!(defaults.encoding, TextEncoding::Utf8);
        assert_eq!(defaults.bins, DEFAULT_BINS);
    }
}
