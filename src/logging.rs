use anyhow::{Context, Result};

use crate::config::ServerConfig;

/// Install the global logger.
///
/// stdout carries the MCP transport, so logs go to the configured file via
/// fern, or to stderr via env_logger when no file is set.
pub fn init(config: &ServerConfig) -> Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = fern::log_file(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}: {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .level(config.log_level)
                .chain(file)
                .apply()
                .context("Failed to install file logger")?;
        }
        None => {
            env_logger::Builder::new()
                .filter_level(config.log_level)
                .parse_default_env()
                .target(env_logger::Target::Stderr)
                .try_init()
                .context("Failed to install stderr logger")?;
        }
    }
    Ok(())
}
