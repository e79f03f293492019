//! Whisker - photo-based cat identity recognition over HTTP.
//!
//! A client uploads a signed photo; the service detects the cat, crops and
//! normalizes it, classifies it against a known identity set and returns
//! ranked candidates.

#![warn(missing_docs)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod server;
pub mod utils;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, ServeArgs};
use config::{
    Config, load_config, resolve_config_path, save_config, validate_config, validate_model_files,
};
use inference::{OnnxClassifier, YoloDetector};
use pipeline::Recognizer;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use utils::IdentityTable;

pub use error::{Error, Result};

/// Main entry point for the whisker CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Command::Config { action }) => handle_config_command(action, config_path),
        Some(Command::Check) => {
            let config = load_with_overrides(config_path, cli.secret, &ServeArgs::default())?;
            check(&config)
        }
        Some(Command::Sign {
            photo,
            timestamp,
            now,
        }) => {
            let config = load_with_overrides(config_path, cli.secret, &ServeArgs::default())?;
            sign(&config, &photo, timestamp, now)
        }
        Some(Command::Serve(args)) => {
            let args = ServeArgs {
                host: args.host.or(cli.serve.host),
                port: args.port.or(cli.serve.port),
            };
            let config = load_with_overrides(config_path, cli.secret, &args)?;
            serve(&config)
        }
        None => {
            let config = load_with_overrides(config_path, cli.secret, &cli.serve)?;
            serve(&config)
        }
    }
}

/// Initialize logging based on verbosity level.
///
/// ORT logging is suppressed by default. Use -v to see ORT warnings, -vv for
/// info, -vvv for full trace. `RUST_LOG` takes precedence when set.
fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn,ort=off"
    } else {
        match verbose {
            0 => "info,ort=off",
            1 => "debug,ort=warn",
            2 => "trace,ort=info",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).init();
}

/// Load configuration and apply command-line and environment overrides.
fn load_with_overrides(
    path: Option<&Path>,
    secret: Option<String>,
    serve: &ServeArgs,
) -> Result<Config> {
    let mut config = load_config(path)?;

    if let Some(secret) = secret {
        config.auth.secret = Some(secret);
    }
    if let Some(host) = &serve.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = serve.port {
        config.server.port = port;
    }

    Ok(config)
}

fn serve(config: &Config) -> Result<()> {
    validate_config(config)?;
    validate_model_files(config)?;

    let recognizer = Arc::new(Recognizer::from_config(config)?);
    info!(
        "Primary: {} identities, fallback: {} identities, multi-subject policy: {}",
        recognizer.primary().identities().len(),
        recognizer.fallback().identities().len(),
        config.routing.multi_subject_policy
    );

    let app = server::router(recognizer, &config.server, config.response.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(app, &config.server.host, config.server.port))
}

fn handle_config_command(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = resolve_config_path(path)?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                save_config(&Config::default(), &path)?;
                println!("Created configuration file: {}", path.display());
                println!("\nNext steps:");
                println!("  set auth.secret (or WHISKER_SECRET) and the model paths, then run 'whisker check'");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let mut config = load_config(path)?;
            if config.auth.secret.is_some() {
                config.auth.secret = Some("********".to_string());
            }
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("{rendered}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = resolve_config_path(path)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Validate configuration and load every model and table once.
fn check(config: &Config) -> Result<()> {
    validate_config(config)?;
    validate_model_files(config)?;
    println!("Configuration: OK");

    let detector = YoloDetector::from_config(&config.detector)?;
    if detector
        .labels()
        .iter()
        .any(|l| l == &config.detector.subject_label)
    {
        println!(
            "Detector: OK ({} classes, subject '{}')",
            detector.labels().len(),
            config.detector.subject_label
        );
    } else {
        warn!(
            "Subject label '{}' is not among the detector classes; every request will use the fallback model",
            config.detector.subject_label
        );
        println!("Detector: subject label not found in {}", config.detector.labels.display());
    }

    for (name, classifier_config) in [("Primary", &config.primary), ("Fallback", &config.fallback)] {
        let identities = IdentityTable::load(&classifier_config.identities)?;
        let classifier = OnnxClassifier::from_config(classifier_config)?;
        let outputs = classifier.output_len()?;
        if outputs != identities.len() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "{} classifier {} produces {} scores but {} lists {} identities",
                    name.to_lowercase(),
                    classifier.path().display(),
                    outputs,
                    classifier_config.identities.display(),
                    identities.len()
                ),
            });
        }
        println!("{name} classifier: OK ({} identities)", identities.len());
    }

    Ok(())
}

/// Print the signature a client must send for `photo`.
fn sign(config: &Config, photo: &Path, timestamp: Option<i64>, now: bool) -> Result<()> {
    let verifier = auth::SignatureVerifier::from_config(&config.auth)?.ok_or_else(|| {
        Error::ConfigValidation {
            message: "request authentication is disabled (auth.enabled = false)".to_string(),
        }
    })?;

    let bytes = std::fs::read(photo)?;

    if verifier.mode().requires_timestamp() {
        let timestamp = match timestamp {
            Some(ts) if !now => ts,
            _ => chrono::Utc::now().timestamp(),
        };
        println!("timestamp={timestamp}");
        println!("signature={}", verifier.sign(&bytes, Some(timestamp)));
    } else {
        if timestamp.is_some() || now {
            warn!("Timestamp ignored: signatures cover the photo only (auth.with_timestamp = false)");
        }
        println!("signature={}", verifier.sign(&bytes, None));
    }

    Ok(())
}
