//! # Diagnóstico
//! src/diagnostics/mod.rs
//!
//! Dos canales separados:
//!
//! - **tracing**: eventos operativos (arranque, fallas, cierre) filtrados
//!   con `RUST_LOG`
//! - **`DiagnosticSink`**: transcripción textual de cada request/response,
//!   serializada entre workers

pub mod sink;

pub use sink::DiagnosticSink;

use tracing_subscriber::EnvFilter;

/// Inicializa el subscriber global de tracing hacia stderr
///
/// El nivel por defecto es `info`; `RUST_LOG` lo reemplaza. Llamarla dos
/// veces no es un error (la segunda no hace nada).
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init();
}
