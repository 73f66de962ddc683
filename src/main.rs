use anyhow::Result;
use tokio::runtime::Runtime;

use slide_editor_mcp::config::ServerConfig;
use slide_editor_mcp::{logging, mcp_handler};

fn main() -> Result<()> {
    let config = ServerConfig::from_env();
    logging::init(&config)?;

    // Create a Tokio runtime for async operations
    let rt = Runtime::new()?;

    rt.block_on(async {
        mcp_handler::start_server(config).await
    })?;

    Ok(())
}
