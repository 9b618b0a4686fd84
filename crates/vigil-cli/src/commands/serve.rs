//! `vigil serve` - start the web server

use anyhow::Result;

use vigil_core::RuleEngine;
use vigil_server::ServerConfig;

pub async fn cmd_serve(
    engine: RuleEngine,
    host: &str,
    port: u16,
    backend_url: Option<String>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    let config = ServerConfig {
        allowed_origins,
        backend_url,
    };

    vigil_server::serve_with_config(engine, host, port, config).await
}
