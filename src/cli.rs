use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "eol-scanner",
    about = "Check packages listed in CSV exports against endoflife.date",
    version
)]
pub struct Cli {
    /// CSV file, or directory of CSV files, to scan
    #[arg(default_value = "input")]
    pub input: PathBuf,

    /// Directory for JSON, CSV and HTML reports
    #[arg(short, long, default_value = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// Catalog base URL [default: https://endoflife.date]
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file [default: ./.eol-scanner/config.toml, fallback ~/.config/eol-scanner/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Response cache directory [default: ~/.cache/eol-scanner]
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the response cache
    #[arg(long, conflicts_with = "refresh")]
    pub no_cache: bool,

    /// Ignore cached responses but store fresh ones
    #[arg(long)]
    pub refresh: bool,

    /// Delete every cached response before scanning
    #[arg(long, conflicts_with = "no_cache")]
    pub clear_cache: bool,

    /// Exit with status 1 if any package is end-of-life
    #[arg(long)]
    pub fail_on_eol: bool,

    /// Show every package, including supported ones, and debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print one summary line per file
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
