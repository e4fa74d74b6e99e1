//! # HTTP File Server
//! src/lib.rs
//!
//! Servidor HTTP/1.x concurrente que sirve archivos y listados de
//! directorio desde un root, o redirige cada request a una URL base.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `config`: CLI, variables de entorno y archivo JSON
//! - `diagnostics`: tracing y transcripción de requests/responses
//! - `http`: Parsing del request, validación de paths y armado de responses
//! - `server`: Listener TCP, pool de workers y sesiones keep-alive
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_file_server::config::ServerConfig;
//! use http_file_server::diagnostics::DiagnosticSink;
//! use http_file_server::server::Server;
//! use std::sync::Arc;
//!
//! let mut config = ServerConfig::with_root("/srv/www");
//! config.port = 8080;
//!
//! let server = Server::bind(config, Arc::new(DiagnosticSink::stderr())).expect("bind");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod diagnostics;
pub mod http;
pub mod server;
