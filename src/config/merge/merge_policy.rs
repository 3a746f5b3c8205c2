//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("server.base_url", crate::config::default_base_url())?
        .set_default("server.connect_timeout_secs", 10)?
        .set_default("server.request_timeout_secs", 300)?
        .set_default("autosave.delay_ms", 1000)?
        .set_default("history.page_size", 10)
}
