//! Application entry point — pdf-to-speech.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse CLI arguments and load [`AppConfig`] (defaults on first run).
//! 3. Resolve the voice model (catalog alias → download on first use) —
//!    failure here aborts before any document is touched.
//! 4. Locate a working `piper` executable.
//! 5. Build the engine stack (`FallbackTts(PiperTts, SayTts)`), parser,
//!    converter and [`Processor`].
//! 6. Either process one file (`--process-file`) and exit, or monitor the
//!    input directory until ctrl-c.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use pdf_to_speech::audio::{AudioConverter, FfmpegConverter};
use pdf_to_speech::config::{AppConfig, AppPaths};
use pdf_to_speech::exec::{CommandRunner, TokioRunner};
use pdf_to_speech::model::{ModelResolver, VoiceCatalog};
use pdf_to_speech::pdf::{LopdfParser, PdfParser};
use pdf_to_speech::pipeline::{FileProcessor, Processor, StabilizePolicy};
use pdf_to_speech::report::{ConsoleReporter, Reporter};
use pdf_to_speech::tts::{locate_piper, FallbackTts, PiperTts, SayTts, TtsEngine};
use pdf_to_speech::watch::DirectoryMonitor;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Narrate PDF documents into MP3 audio files.
#[derive(Debug, Parser)]
#[command(name = "pdf-to-speech", version, about)]
struct Cli {
    /// Voice model: a catalog alias (e.g. "lessac-medium"), a file under the
    /// models directory, or a direct .onnx path. Overrides the config file.
    #[arg(long)]
    model: Option<String>,

    /// Process a single PDF and exit instead of monitoring the input
    /// directory.
    #[arg(long, value_name = "PATH")]
    process_file: Option<PathBuf>,

    /// Use an explicit settings file instead of the platform default.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the watched input directory.
    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Override the output directory.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("pdf-to-speech starting up");

    let cli = Cli::parse();

    // 2. Configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };
    if let Some(model) = cli.model {
        config.piper.model = model;
    }
    if let Some(dir) = cli.input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new());
    let runner: Arc<dyn CommandRunner> = Arc::new(TokioRunner::new());

    // 3. Voice catalog + model resolution. An unresolvable model is a
    //    startup failure — no document may be processed without one.
    let mut catalog = VoiceCatalog::builtin();
    let catalog_file = config.catalog_file.clone().or_else(|| {
        let default = AppPaths::new().catalog_file;
        default.exists().then_some(default)
    });
    if let Some(path) = &catalog_file {
        match VoiceCatalog::load_from(path) {
            Ok(user) => catalog.merge(user),
            Err(e) => log::warn!("ignoring voice catalog {}: {e}", path.display()),
        }
    }

    reporter.log(&format!("checking model: {}...", config.piper.model));
    let resolver = ModelResolver::new(&config.models_dir, catalog, Arc::clone(&reporter));
    let model_path = resolver
        .resolve(&config.piper.model)
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!("could not resolve voice model '{}'", config.piper.model)
        })?;

    // 4. Piper executable
    let piper_path = locate_piper(
        runner.as_ref(),
        Path::new("."),
        &config.piper.path,
        reporter.as_ref(),
    )
    .await;

    // 5. Engine stack and collaborators
    let primary: Arc<dyn TtsEngine> = Arc::new(
        PiperTts::new(
            piper_path,
            config.transcode.ffmpeg_path.clone(),
            Arc::clone(&runner),
            Arc::clone(&reporter),
        )
        .with_speaker(config.piper.speaker),
    );
    let fallback: Arc<dyn TtsEngine> = Arc::new(SayTts::new(
        config.fallback.say_path.clone(),
        Arc::clone(&runner),
        Arc::clone(&reporter),
    ));
    let tts: Arc<dyn TtsEngine> =
        Arc::new(FallbackTts::new(primary, fallback, Arc::clone(&reporter)));

    let parser: Arc<dyn PdfParser> = Arc::new(LopdfParser::new());
    let converter: Arc<dyn AudioConverter> = Arc::new(FfmpegConverter::new(
        config.transcode.ffmpeg_path.clone(),
        Arc::clone(&runner),
        Arc::clone(&reporter),
    ));

    let processor = Arc::new(
        Processor::new(
            parser,
            tts,
            converter,
            Arc::clone(&reporter),
            config.output_dir.clone(),
            model_path,
        )
        .with_stabilize(StabilizePolicy::from(&config.stabilize)),
    );

    // 6. One-shot or monitor mode
    if let Some(file) = cli.process_file {
        reporter.log(&format!("processing single file: {}", file.display()));
        processor.process_file(&file).await;
        return Ok(());
    }

    let monitor = DirectoryMonitor::new(
        config.input_dir.clone(),
        Duration::from_secs(config.watch.poll_secs),
        processor,
        Arc::clone(&reporter),
    );

    tokio::select! {
        result = monitor.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            reporter.log("shutting down");
        }
    }

    Ok(())
}
