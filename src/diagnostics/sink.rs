//! # Transcripción de Requests y Responses
//! src/diagnostics/sink.rs
//!
//! Cada bloque se escribe completo bajo un mutex, así los bloques de
//! workers distintos nunca se intercalan.
//!
//! ```text
//! Connection #3 from 127.0.0.1:51234
//! ----------------------------------------
//! REQ GET /a.txt HTTP/1.1
//! REQ Connection: keep-alive
//!
//! ```

use crate::config::ServerConfig;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};

const RULE: &str = "----------------------------------------";

/// Destino compartido de la transcripción
pub struct DiagnosticSink {
    out: Option<Mutex<Box<dyn Write + Send>>>,
}

impl DiagnosticSink {
    /// Transcripción hacia stderr
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Some(Mutex::new(Box::new(writer))),
        }
    }

    /// Descarta todo (tests de integración)
    pub fn disabled() -> Self {
        Self { out: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    /// Vuelca la configuración efectiva al arrancar
    pub fn dump_startup(&self, addr: SocketAddr, config: &ServerConfig) {
        let (root, goto) = config.describe();
        let na = || "n/a".to_string();

        let text = format!(
            "Server listening on {}\n{}\nport  {}\nsize  {}\nblog  {}\nroot  {}\ngoto  {}\n\n",
            addr,
            RULE,
            addr.port(),
            config.pool_size,
            config.backlog,
            root.unwrap_or_else(na),
            goto.unwrap_or_else(na),
        );
        self.emit(&text);
    }

    /// Vuelca un bloque de líneas con su etiqueta (`REQ` o `RES`)
    pub fn dump_lines<S: AsRef<str>>(&self, conn: u64, peer: Option<SocketAddr>, label: &str, lines: &[S]) {
        if !self.is_enabled() {
            return;
        }

        let mut text = match peer {
            Some(peer) => format!("Connection #{} from {}\n", conn, peer),
            None => format!("Connection #{}\n", conn),
        };
        text.push_str(RULE);
        text.push('\n');
        for line in lines {
            text.push_str(label);
            text.push(' ');
            text.push_str(line.as_ref());
            text.push('\n');
        }
        text.push('\n');

        self.emit(&text);
    }

    fn emit(&self, text: &str) {
        let Some(out) = &self.out else {
            return;
        };

        let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
        // el log nunca corta una conexión
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "diagnostic write failed");
        }
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl std::fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
