use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax, e.g.
/// `"quadspin_engine=debug,wgpu_core=warn"`. When unset, `RUST_LOG` is
/// consulted, then [`LoggingConfig::default_level`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    fn filters(&self) -> Option<String> {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.filters() {
            Some(filters) => {
                builder.parse_filters(&filters);
            }
            None => {
                builder
                    .filter_level(config.default_level)
                    // wgpu is chatty at info.
                    .filter_module("wgpu_core", log::LevelFilter::Warn)
                    .filter_module("wgpu_hal", log::LevelFilter::Warn)
                    .filter_module("naga", log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            // Another logger was installed first (e.g. by a test harness).
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let cfg = LoggingConfig {
            env_filter: Some("quadspin_engine=trace".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(cfg.filters().as_deref(), Some("quadspin_engine=trace"));
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
