use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

/// Usage line reported in the JSON error document
pub const USAGE: &str = "Usage: transcript-fetch <video_id>";

#[derive(Parser, Debug)]
#[command(
    name = "transcript-fetch",
    about = "Transcript Fetch - Pull a YouTube transcript through rotating proxies",
    version,
    long_about = "Fetches the English transcript of a single YouTube video, rotating through Webshare proxies and backing off on rate limits. Prints exactly one JSON document to stdout; progress goes to stderr."
)]
pub struct Cli {
    /// YouTube video id (or a watch/youtu.be/shorts URL)
    #[arg(value_name = "VIDEO_ID")]
    pub video_id: String,

    /// Number of attempts before giving up (overrides the config file)
    #[arg(short, long, value_name = "COUNT")]
    pub retries: Option<u32>,

    /// Configuration file (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Webshare API key used to fetch the proxy list
    #[arg(long, env = "WEBSHARE_API_KEY", hide_env_values = true)]
    pub webshare_api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Outcome of parsing the command line
#[derive(Debug)]
pub enum ParseOutcome {
    Run(Cli),
    /// Wrong arguments: the caller reports `USAGE` as JSON and exits with 1
    Usage(String),
    /// `--help` / `--version`: clap prints and exits on its own
    Exit(clap::Error),
}

impl Cli {
    /// Parse arguments without letting clap exit on usage errors
    pub fn parse_outcome<I, T>(args: I) -> ParseOutcome
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => ParseOutcome::Run(cli),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ParseOutcome::Exit(e),
                _ => ParseOutcome::Usage(e.to_string()),
            },
        }
    }
}
