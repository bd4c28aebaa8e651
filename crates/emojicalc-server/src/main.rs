//! Emojicalc - Entry point
//!
//! Loads configuration, initialises telemetry and serves the calculator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use emojicalc_app::App;
use emojicalc_config::{ConfigLoader, EmojicalcConfig, ENV_PREFIX};
use emojicalc_server::{settings, Server, ServerError};

/// Configuration file read when `--config` is not given, if present.
const DEFAULT_CONFIG_FILE: &str = "emojicalc.toml";

/// Built-in starting point for the configuration layers.
#[derive(Clone, Copy)]
enum Profile {
    Default,
    Development,
    Production,
}

impl Profile {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "dev" | "development" => Some(Self::Development),
            "prod" | "production" => Some(Self::Production),
            _ => None,
        }
    }

    fn loader(self) -> ConfigLoader {
        let loader = ConfigLoader::new();
        match self {
            Self::Default => loader.with_defaults(),
            Self::Development => loader.with_development(),
            Self::Production => loader.with_production(),
        }
    }
}

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
    /// Preset used before the file and environment layers.
    profile: Profile,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut profile = Profile::Default;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--profile" | "-p" => {
                    let name = args.next().unwrap_or_default();
                    profile = Profile::parse(&name).unwrap_or_else(|| {
                        eprintln!("Unknown profile: {name:?} (expected development or production)");
                        std::process::exit(1);
                    });
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("emojicalc {}", emojicalc_server::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config, profile }
    }
}

fn print_help() {
    println!(
        r"Emojicalc - Emoji calculator web application

USAGE:
    emojicalc [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -p, --profile <NAME>   Start from the development or production preset
    -h, --help             Print help information
    -v, --version          Print version information

CONFIGURATION:
    Without --config, ./emojicalc.toml is read if it exists. A .env file is
    loaded when present. A configuration file replaces the preset chosen with
    --profile. Environment variables override file values:

    EMOJICALC__SERVER__HTTP_ADDR             Listen address (default: 0.0.0.0:8080)
    EMOJICALC__SERVER__MAX_BODY_BYTES        Largest accepted body (default: 1048576)
    EMOJICALC__VIEWS__DIRECTORY              Directory of .html view templates
                                             (default: views/ next to the binary)
    EMOJICALC__TELEMETRY__LOGGING__LEVEL     Log filter (default: info)
    EMOJICALC__TELEMETRY__LOGGING__FORMAT    json or pretty (default: json)
    EMOJICALC__TELEMETRY__METRICS__ENABLED   Serve Prometheus metrics (default: true)
    EMOJICALC__TELEMETRY__METRICS__ADDR      Metrics address (default: 0.0.0.0:9090)

EXAMPLES:
    emojicalc --config /etc/emojicalc/emojicalc.toml
    emojicalc --profile development
    EMOJICALC__SERVER__HTTP_ADDR=127.0.0.1:3000 emojicalc
"
    );
}

fn load_config(profile: Profile, path: Option<&Path>) -> Result<EmojicalcConfig, ServerError> {
    let loader = profile.loader();
    let loader = match path {
        Some(path) => loader.with_file(path)?,
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
    };
    Ok(loader.with_dotenv()?.with_env_prefix(ENV_PREFIX).load()?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logging is not installed yet, so configuration errors go to stderr
    let config = match load_config(args.profile, args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = emojicalc_telemetry::init_telemetry(settings::telemetry_config(&config)) {
        eprintln!("Failed to initialize telemetry: {e}");
        std::process::exit(1);
    }

    info!(version = emojicalc_server::VERSION, "Starting emojicalc");

    let app = match App::new(settings::app_config(&config)) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Failed to build application");
            std::process::exit(1);
        }
    };

    let server = Server::new(Arc::new(app), config.server.clone());
    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
