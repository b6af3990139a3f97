use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use gearup_core::WizardConfig;
use services::{AppServices, Clock, GateTicker, OnboardingService};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://gearup.sqlite3";

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn onboarding(&self) -> Arc<OnboardingService> {
        self.services.onboarding()
    }

    fn ticker(&self) -> GateTicker {
        self.services.ticker()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Run(Args),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    export_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--export-dir <dir>] [--config <file.toml>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GEARUP_DB_URL, GEARUP_EXPORT_DIR, GEARUP_CONFIG, RUST_LOG");
}

impl Args {
    /// Flags win over the environment, which wins over built-in defaults.
    fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut db_url = env("GEARUP_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_owned(), normalize_sqlite_url);
        let mut export_dir = env("GEARUP_EXPORT_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut config_path = env("GEARUP_CONFIG")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--export-dir" => {
                    export_dir = Some(PathBuf::from(require_value(&mut args, "--export-dir")?));
                }
                "--config" => {
                    config_path = Some(PathBuf::from(require_value(&mut args, "--config")?));
                }
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Parsed::Run(Self {
            db_url,
            export_dir,
            config_path,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn load_config(path: Option<&Path>) -> Result<WizardConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(WizardConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let config: WizardConfig = toml::from_str(&text)?;
    tracing::info!(path = %path.display(), season = %config.season_label, "loaded wizard config");
    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second install (e.g. under a test harness) is harmless.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?;
    let args = match parsed {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    init_tracing();
    let config = load_config(args.config_path.as_deref())?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let services =
        AppServices::new_sqlite(&args.db_url, Clock::system(), config, args.export_dir).await?;

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("VESL Gear-Up")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let parsed = Args::parse(argv(&[]), no_env).unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Args {
                db_url: DEFAULT_DB_URL.to_owned(),
                export_dir: None,
                config_path: None,
            })
        );
    }

    #[test]
    fn flags_override_environment() {
        let env = |key: &str| match key {
            "GEARUP_DB_URL" => Some("sqlite:///tmp/env.sqlite3".to_owned()),
            "GEARUP_EXPORT_DIR" => Some("/tmp/env-exports".to_owned()),
            _ => None,
        };
        let parsed = Args::parse(
            argv(&["--db", "sqlite:///tmp/flag.sqlite3", "--config", "season.toml"]),
            env,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Args {
                db_url: "sqlite:///tmp/flag.sqlite3".to_owned(),
                export_dir: Some(PathBuf::from("/tmp/env-exports")),
                config_path: Some(PathBuf::from("season.toml")),
            })
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert_eq!(
            Args::parse(argv(&["--db"]), no_env),
            Err(ArgsError::MissingValue { flag: "--db" })
        );
        assert_eq!(
            Args::parse(argv(&["--db", "  "]), no_env),
            Err(ArgsError::InvalidDbUrl { raw: "  ".into() })
        );
        assert_eq!(
            Args::parse(argv(&["--bogus", "1"]), no_env),
            Err(ArgsError::UnknownArg("--bogus".into()))
        );
        assert_eq!(Args::parse(argv(&["-h"]), no_env), Ok(Parsed::Help));
    }

    #[test]
    fn bare_paths_become_absolute_sqlite_urls() {
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/gearup.db".to_owned()),
            "sqlite:///var/gearup.db"
        );
        assert_eq!(normalize_sqlite_url("sqlite::memory:".to_owned()), "sqlite::memory:");
        assert!(normalize_sqlite_url("gearup.sqlite3".to_owned()).starts_with("sqlite:///"));
    }

    #[test]
    fn partial_toml_config_keeps_defaults() {
        let config: WizardConfig = toml::from_str(
            r#"
                season_label = "Fall Season"
                video_min_seconds = 20
                video_policy = "timer_only"
            "#,
        )
        .unwrap();
        assert_eq!(config.season_label, "Fall Season");
        assert_eq!(config.video_min_seconds, 20);
        assert_eq!(config.export_version, "vesl_gearup_v1");
        assert!(config.video_embed_url.is_some());
    }

    #[test]
    fn partial_toml_config_blank_video_disables_gate() {
        let config: WizardConfig = toml::from_str(
            r#"
                season_label = "Fall Season"
                video_embed_url = ""
            "#,
        )
        .unwrap();
        assert_eq!(config.video_embed_url, None);
        assert_eq!(config.gate_seconds(), 0);
    }
}
