use ferrous_relay_domain::{CliOverrides, Config};

/// Load, apply overrides, then validate. Runs before logging is up, so
/// failures surface through the returned error only.
pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    config.validate()?;
    Ok(config)
}
