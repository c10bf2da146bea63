//! Structured logging for the orrery viewer.
//!
//! Console output via `tracing-subscriber`, plus a JSON log file in debug
//! builds. Crates that log through the `log` facade are forwarded into the
//! same subscriber.

use orrery_config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Targets held at `warn` unless the configured level names them.
const NOISY_TARGETS: [&str; 2] = ["wgpu", "naga"];

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether file logging is enabled
/// * `config` - source of the `debug.log_level` override
///
/// `RUST_LOG` takes precedence over both the config and [`DEFAULT_FILTER`].
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_file_path(log_dir))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directives from the config's log level, falling back to [`DEFAULT_FILTER`].
///
/// `wgpu` and `naga` get a `warn` directive appended unless the level already
/// sets one for them, so a plain `"info"` stays as quiet as the default.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|config| config.debug.log_level.trim())
        .unwrap_or_default();
    if level.is_empty() {
        return DEFAULT_FILTER.to_string();
    }

    let mut directives = level.to_string();
    for target in NOISY_TARGETS {
        let named = level
            .split(',')
            .filter_map(|directive| directive.split_once('='))
            .any(|(name, _)| name.trim().starts_with(target));
        if !named {
            directives.push_str(&format!(",{target}=warn"));
        }
    }
    directives
}

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter_str = default_env_filter().to_string();
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_directives_without_config() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_default_config_quiets_gpu_crates() {
        let config = Config::default();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_directives_from_config() {
        let mut config = Config::default();
        config.debug.log_level = "debug,orrery_render=trace".to_string();
        let directives = filter_directives(Some(&config));
        assert_eq!(directives, "debug,orrery_render=trace,wgpu=warn,naga=warn");
    }

    #[test]
    fn test_configured_gpu_level_is_kept() {
        let mut config = Config::default();
        config.debug.log_level = "warn,wgpu=error".to_string();
        let directives = filter_directives(Some(&config));
        assert_eq!(directives, "warn,wgpu=error,naga=warn");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for filter_str in [
            "info",
            "debug,orrery_render=trace",
            "warn,orrery_mesh=debug,wgpu=error",
        ] {
            assert!(
                EnvFilter::try_new(filter_str).is_ok(),
                "Failed to parse filter: {filter_str}"
            );
        }
    }

    #[test]
    fn test_log_file_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = log_file_path(temp_dir.path());
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
        assert_eq!(path.parent().unwrap(), temp_dir.path());
    }
}
