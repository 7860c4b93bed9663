use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogLevel;

// wgpu and the text shaper are chatty at debug level.
const QUIET_TARGETS: &str = "wgpu_core=warn,wgpu_hal=warn,naga=warn,cosmic_text=warn,iced_wgpu=warn";

pub fn filter_directives(log_level: LogLevel) -> String {
    format!("{},{}", log_level.as_str(), QUIET_TARGETS)
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_subscriber(log_level: LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter_directives(log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_level(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_start_with_configured_level() {
        let directives = filter_directives(LogLevel::Debug);
        assert!(directives.starts_with("debug,"));
        assert!(directives.parse::<EnvFilter>().is_ok());
    }
}
