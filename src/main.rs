// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use versereel::app_config::{self, Config};
use versereel::app_controller::Controller;
use versereel::catalog;
use versereel::generation::{GenerationOutcome, UnitRange};
use versereel::language_utils;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by the generating commands
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Voice edition identifier (e.g. 'ar.alafasy'); see `versereel voices`
    #[arg(short, long)]
    voice: Option<String>,

    /// Translation language code (e.g. 'en', 'fr', 'ur')
    #[arg(short = 't', long)]
    translation_language: Option<String>,

    /// Directory the finished video is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a video for an explicit range of verses
    Generate {
        /// Chapter number (1-114)
        collection: u32,

        /// First verse
        start: u32,

        /// Last verse (inclusive)
        end: u32,

        /// Background clip; a solid colour is used when absent
        #[arg(short, long)]
        background: Option<PathBuf>,

        /// Output file name
        #[arg(long)]
        output_name: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate a video for a random range sized to the target duration
    Random {
        /// Restrict the range to this chapter
        #[arg(long)]
        collection: Option<u32>,

        /// Number of videos to generate, each with its own range, voice and background
        #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List the known voices and translation languages
    Voices,

    /// Generate shell completions for versereel
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// versereel - short vertical recitation videos with burned-in subtitles
#[derive(Parser, Debug)]
#[command(name = "versereel")]
#[command(version = "0.1.0")]
#[command(about = "Generate vertical recitation videos with two-lane subtitles")]
#[command(long_about = "versereel fetches verse text, translation and recitation audio, times the
subtitles to the audio and renders a 1080x1920 video with ffmpeg.

EXAMPLES:
    versereel generate 1 1 7                      # Al-Fatiha with the default voice
    versereel generate 2 255 257 -v ar.husary     # Explicit range and voice
    versereel generate 36 1 12 -b clip.mp4 -t fr  # Background clip, French translation
    versereel random                              # Random chapter, voice and background
    versereel random --collection 18              # Random range within Al-Kahf
    versereel random -n 5                         # Five random videos in a row
    versereel voices                              # List voices
    versereel completions bash > versereel.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger; the level can be raised later with log::set_max_level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (marker, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "versereel", &mut std::io::stdout());
            Ok(())
        }
        Commands::Voices => {
            print_voices();
            Ok(())
        }
        Commands::Generate { collection, start, end, background, output_name, common } => {
            let controller = Controller::with_config(load_config(&common)?)?;
            let request = controller.explicit_request(
                UnitRange::new(collection, start, end),
                common.voice.clone(),
                background,
                output_name,
            );
            report(controller.run(&request).await?)
        }
        Commands::Random { collection, count, common } => {
            let controller = Controller::with_config(load_config(&common)?)?;
            let outcomes = controller.run_random(collection, common.voice.clone(), count).await?;
            outcomes.into_iter().try_for_each(report)
        }
    }
}

fn report(outcome: GenerationOutcome) -> Result<()> {
    match outcome {
        GenerationOutcome::Completed(result) => {
            println!("{}", result.output_path.display());
            Ok(())
        }
        GenerationOutcome::Cancelled { stage } => {
            Err(anyhow::anyhow!("Generation cancelled during: {}", stage))
        }
    }
}

fn print_voices() {
    println!("Voices:");
    for voice in catalog::voices() {
        println!("  {:<24} {}", voice.id, voice.display_name);
    }
    println!();
    println!("Translation languages: {}", language_utils::supported_translation_languages().join(", "));
}

/// Load conf.json, creating it with defaults when missing, and apply CLI overrides
fn load_config(options: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(language) = &options.translation_language {
        config.translation_language = language.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    Ok(config)
}
