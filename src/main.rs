use anyhow::Result;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_fetch::cli::{self, Cli, ParseOutcome};
use transcript_fetch::{
    output, utils, Config, RetryController, TokioSleeper, WebshareClient, YoutubeTranscriptSource,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = match Cli::parse_outcome(std::env::args_os()) {
        ParseOutcome::Run(cli) => cli,
        ParseOutcome::Usage(details) => {
            eprintln!("{}", details.trim_end());
            println!("{}", output::usage_error(cli::USAGE));
            return Ok(ExitCode::FAILURE);
        }
        ParseOutcome::Exit(e) => e.exit(),
    };

    // Initialize tracing; stdout is reserved for the JSON result
    let default_filter = if cli.verbose {
        "transcript_fetch=debug"
    } else {
        "transcript_fetch=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.webshare_api_key.is_none() {
        tracing::warn!("{} environment variable not set", transcript_fetch::config::API_KEY_ENV);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config
            .with_api_key(cli.webshare_api_key.clone())
            .with_attempts(cli.retries),
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            println!("{}", output::usage_error(&format!("Invalid configuration: {:#}", e)));
            return Ok(ExitCode::FAILURE);
        }
    };

    let video_id = utils::normalize_video_id(&cli.video_id);
    tracing::info!("Fetching transcript for video: {}", video_id);

    let mut controller = RetryController::new(
        &config,
        Box::new(WebshareClient::new(config.proxy.clone())),
        Box::new(YoutubeTranscriptSource::new()),
        Box::new(TokioSleeper),
    );

    let result = controller.extract(&video_id).await;
    output::print_result(&result)?;

    Ok(ExitCode::SUCCESS)
}
