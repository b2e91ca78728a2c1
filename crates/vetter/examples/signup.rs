//! Validate a sign-up form and print the outcome.
//!
//! Run with:
//!   cargo run --example signup -- --mode result --log-level debug
//!
//! Pass your own submission as JSON:
//!   cargo run --example signup -- --input '{"username": "ada", "age": "7"}'

use clap::{Parser, ValueEnum};
use vetter::prelude::*;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    Exception,
    Result,
}

#[derive(Debug, Parser)]
#[command(about = "Validate a sign-up form")]
struct Args {
    /// Submission as a JSON object; a built-in sample is used when omitted.
    #[arg(long)]
    input: Option<String>,

    #[arg(long, value_enum, default_value = "result")]
    mode: Mode,

    #[arg(long, value_enum, default_value = "text", env = "VETTER_LOG_FORMAT")]
    log_format: LogFormat,

    #[arg(long, value_enum, default_value = "warn", env = "VETTER_LOG_LEVEL")]
    log_level: LogLevel,
}

fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

fn signup_schema(mode: ReportMode) -> Result<Schema, ValidationError> {
    let tags = ForEach::with_config(
        std::sync::Arc::new(StringRule::with_length(Some(2), Some(16), RuleConfig::default())?),
        ForEachConfig::new().max_length(3),
    )?;
    Schema::builder()
        .config(
            SchemaConfig::new()
                .allow_additional_parameters(false)
                .rule(RuleConfig::new().mode(mode)),
        )
        .field("username", StringRule::with_length(Some(3), Some(20), RuleConfig::new().strip(true))?)
        .field("email", EmailAddressRule::new()?)
        .field("age", IntegerRule::bounded(Some(13), None, RuleConfig::default())?)
        .field("password", StringRule::with_length(Some(8), None, RuleConfig::default())?)
        .field("confirm", StringRule::new()?)
        .field("tags", tags)
        .field("newsletter", BooleanCheckbox::new()?)
        .field("terms", AgreeToConditionsCheckbox::new()?)
        .form_rule(MatchingFields::new("password", "confirm")?)
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_format, args.log_level);

    let input: Value = match &args.input {
        Some(text) => serde_json::from_str(text)?,
        None => json!({
            "username": "  ada ",
            "email": "ada@example..com",
            "age": "12",
            "password": "correct horse",
            "confirm": "correct horse",
            "tags": ["math", "x", "engines", "poetry"],
            "newsletter": "on",
            "terms": "true",
            "referrer": "friend"
        }),
    };

    let mode = match args.mode {
        Mode::Exception => ReportMode::Exception,
        Mode::Result => ReportMode::Result,
    };
    let schema = signup_schema(mode)?;
    tracing::info!(?mode, "validating submission");

    match schema.process(input, &mut Context::new()) {
        Ok(Outcome::Value(value)) => println!("valid: {value}"),
        Ok(Outcome::Result(node)) => {
            println!("{}", serde_json::to_string_pretty(&node)?);
            for error in node.errors().flatten() {
                eprintln!("{}: {}", error.key, error.message);
            }
        }
        Err(ValidationError::InvalidData(err)) => {
            eprintln!("invalid: {err}");
            for (field, nested) in err.error_dict() {
                eprintln!("  {field}: {nested}");
            }
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
