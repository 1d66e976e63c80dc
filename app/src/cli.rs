//! Command-line arguments.

use clap::{Parser, ValueEnum};
use harvest_core::{AppConfig, ExportFormat};
use std::path::PathBuf;

/// Sweep the catalog and export the deduplicated offers.
#[derive(Parser, Debug, Default)]
#[command(name = "catalog-sweep", version, about)]
pub struct Cli {
    /// Config file (defaults to the user config dir, then built-in defaults)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop once this many unique offers are collected
    #[arg(long)]
    pub cap: Option<usize>,

    /// Combinations fetched in parallel
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Items requested per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Output file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Abort in-flight fetches once the cap is reached
    #[arg(long)]
    pub abort_in_flight: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Command-line spelling of [`ExportFormat`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    JsonLines,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::JsonLines => ExportFormat::JsonLines,
        }
    }
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(cap) = self.cap {
            config.sweep.cap = cap;
        }
        if let Some(concurrency) = self.concurrency {
            config.sweep.concurrency = concurrency;
        }
        if let Some(page_size) = self.page_size {
            config.sweep.page_size = page_size;
        }
        if let Some(output) = &self.output {
            config.export.output_path.clone_from(output);
        }
        if let Some(format) = self.format {
            config.export.format = format.into();
        }
        if self.abort_in_flight {
            config.sweep.abort_in_flight = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_config() {
        let cli = Cli::try_parse_from(["catalog-sweep"]).expect("parse");
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.sweep.cap, 20_000);
        assert_eq!(config.sweep.concurrency, 10);
        assert!(!config.sweep.abort_in_flight);
        assert_eq!(config.export.format, ExportFormat::Csv);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "catalog-sweep",
            "--cap",
            "500",
            "--concurrency",
            "4",
            "--page-size",
            "20",
            "-o",
            "out/offers.jsonl",
            "--format",
            "json-lines",
            "--abort-in-flight",
        ])
        .expect("parse");
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.sweep.cap, 500);
        assert_eq!(config.sweep.concurrency, 4);
        assert_eq!(config.sweep.page_size, 20);
        assert_eq!(config.export.output_path, PathBuf::from("out/offers.jsonl"));
        assert_eq!(config.export.format, ExportFormat::JsonLines);
        assert!(config.sweep.abort_in_flight);
    }

    #[test]
    fn test_rejects_non_numeric_cap() {
        assert!(Cli::try_parse_from(["catalog-sweep", "--cap", "lots"]).is_err());
    }
}
