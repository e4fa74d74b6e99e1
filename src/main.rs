//! # HTTP File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: arma la configuración, abre el listener y corre el
//! loop de accept hasta que el proceso termine.

use anyhow::{anyhow, Context, Result};
use http_file_server::config::Config;
use http_file_server::diagnostics::{self, DiagnosticSink};
use http_file_server::server::Server;
use std::sync::Arc;

fn main() {
    diagnostics::init_tracing();

    if let Err(e) = run() {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::new().resolve().context("invalid configuration")?;
    config.validate().map_err(|e| anyhow!(e)).context("invalid configuration")?;

    let address = config.address();
    let server = Server::bind(config, Arc::new(DiagnosticSink::stderr()))
        .with_context(|| format!("cannot listen on {}", address))?;

    server.run().context("accept loop failed")
}
