use async_openai::{config::OpenAIConfig, Client as OpenAiClient};
use audiobook_creator::controllers::audiobook::{AudiobookController, CreateAudiobookCommand};
use audiobook_creator::controllers::voices::VoicesController;
use audiobook_creator::domain::audiobook::AudiobookService;
use audiobook_creator::domain::tts::RateAdjustment;
use audiobook_creator::error::{AppError, AppResult};
use audiobook_creator::infrastructure::assembler::FfmpegAssembler;
use audiobook_creator::infrastructure::config::{Config, LogFormat, TtsProvider};
use audiobook_creator::infrastructure::power::SystemSleepInhibitor;
use audiobook_creator::infrastructure::repositories::{
    FragmentRepository, OpenAiTtsRepository, PollyTtsRepository, TtsRepository,
};
use aws_sdk_polly::types::Engine;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn a plain-text book into a single MP3 audiobook
#[derive(Debug, Parser)]
#[command(name = "audiobook-creator", version, about)]
struct Cli {
    /// Plain-text document to narrate
    #[arg(short = 't', long = "text-file", required_unless_present = "list_voices")]
    text_file: Option<PathBuf>,

    /// Output MP3 path (defaults to <input stem>.mp3)
    #[arg(short = 'o', long = "output-file")]
    output_file: Option<PathBuf>,

    /// Provider voice name, or "auto" to pick one from the document language
    #[arg(short = 'v', long, default_value = "auto")]
    voice: String,

    /// Speaking-rate adjustment such as -5% or +10%
    #[arg(long, default_value = "-5%", allow_hyphen_values = true)]
    rate: RateAdjustment,

    /// Fragmenting strategy: smart or legacy
    #[arg(long = "chunking-strategy", default_value = "smart")]
    chunking_strategy: String,

    /// Synthesis attempts per fragment
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    retries: u32,

    /// List the voices of the configured provider and exit
    #[arg(long)]
    list_voices: bool,

    /// Emit machine-readable JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(AppError::from(e).exit_code());
        }
    };

    init_logging(&config);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "audiobook-creator failed");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, config: Config) -> AppResult<()> {
    let tts_repo = build_tts_repository(&config).await?;

    if cli.list_voices {
        let voices_controller = VoicesController::new(tts_repo);
        return voices_controller.list(cli.json).await;
    }

    let text_file = cli
        .text_file
        .ok_or_else(|| AppError::InvalidArgument("--text-file is required".to_string()))?;

    // === DEPENDENCY INJECTION SETUP ===
    let fragment_repo = Arc::new(FragmentRepository::new(config.fragment_dir.clone()));
    let assembler = Arc::new(FfmpegAssembler::new(
        config.ffmpeg_path.clone(),
        config.fragment_dir.clone(),
    ));
    let audiobook_service = Arc::new(AudiobookService::new(
        tts_repo,
        fragment_repo,
        assembler,
        Arc::new(SystemSleepInhibitor),
        config.retry_delay(),
    ));
    let audiobook_controller = AudiobookController::new(
        audiobook_service,
        config.output_dir.clone(),
        config.fragment_dir.clone(),
    );

    let report = audiobook_controller
        .create(CreateAudiobookCommand {
            text_file,
            output_file: cli.output_file,
            voice: cli.voice,
            rate: cli.rate,
            chunking_strategy: cli.chunking_strategy,
            retries: cli.retries,
        })
        .await?;

    if cli.json {
        let encoded = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode report: {}", e)))?;
        println!("{}", encoded);
    } else {
        println!("Audiobook saved to {}", report.output_file.display());
    }

    Ok(())
}

async fn build_tts_repository(config: &Config) -> AppResult<Arc<dyn TtsRepository>> {
    match config.tts_provider {
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (profile, instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));

            Ok(Arc::new(PollyTtsRepository::new(
                polly_client,
                Engine::from(config.polly_engine.as_str()),
            )))
        }
        TtsProvider::OpenAi => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                AppError::InvalidArgument("OPENAI_API_KEY is not set".to_string())
            })?;
            tracing::info!(model = %config.openai_model, "Initializing OpenAI speech client");

            let openai_client = Arc::new(OpenAiClient::with_config(
                OpenAIConfig::new().with_api_key(api_key),
            ));

            Ok(Arc::new(OpenAiTtsRepository::new(
                openai_client,
                config.openai_model.clone(),
            )))
        }
    }
}

fn init_logging(config: &Config) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "audiobook_creator=info".into())
    };

    // stdout is reserved for results; logs go to stderr
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
