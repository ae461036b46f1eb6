// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{Read, Write};

use ct2_translator::app_config::{Config, LogLevel};
use ct2_translator::providers::native::NativeBackends;
use ct2_translator::translation::TranslationPipeline;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// ct2-translator - machine translation shim
///
/// Reads the whole of standard input, translates it and writes exactly one
/// JSON record to standard output. Diagnostics go to standard error.
#[derive(Parser, Debug)]
#[command(name = "ct2-translator")]
#[command(version)]
#[command(about = "Translate stdin with a CTranslate2 engine and a local Marian fallback")]
#[command(long_about = "Translates standard input from one language to another and prints one JSON record.

EXAMPLES:
    echo 'Hallo Welt' | ct2-translator --from de --to en
    TRANSLATOR_FORCE_HF=true ct2-translator --from en --to de < input.txt

ENVIRONMENT:
    CT2_MODEL_DE_EN, CT2_MODEL_EN_DE   CTranslate2 model directory per direction
    TRANSLATOR_FORCE_HF                'true' to prefer the local fallback model
    TRANSLATOR_HF_ROOT                 root of local fallback models (default models/hf)
    TRANSLATOR_LOG_LEVEL               error|warn|info|debug|trace (default warn)")]
struct CommandLineOptions {
    /// Source language code (e.g., 'de', 'en')
    #[arg(long = "from", value_name = "LANG")]
    source_language: String,

    /// Target language code (e.g., 'en', 'de')
    #[arg(long = "to", value_name = "LANG")]
    target_language: String,

    /// Set logging level (overrides TRANSLATOR_LOG_LEVEL)
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and label for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());
            // stdout is reserved for the result record
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn read_stdin() -> Result<String> {
    let mut raw = Vec::new();
    std::io::stdin()
        .read_to_end(&mut raw)
        .context("Failed to read standard input")?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    let mut config = Config::from_env();
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    CustomLogger::init(config.log_level.to_level_filter())?;

    if let Err(e) = config.validate() {
        log::warn!("Configuration problem: {}", e);
    }
    debug!(
        "Compiled engine families: {:?}",
        NativeBackends::compiled_features()
    );

    // unreadable input degrades to empty text; a record is printed regardless
    let text = read_stdin().unwrap_or_else(|e| {
        log::warn!("{:#}", e);
        String::new()
    });

    let backends = NativeBackends::new();
    let result = TranslationPipeline::new(&config, &backends).run(&cli.source_language, &cli.target_language, &text);

    let line = result.to_json_line().context("Failed to serialize result record")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line).context("Failed to write result record")?;
    stdout.flush()?;
    Ok(())
}
