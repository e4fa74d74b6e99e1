//! # Módulo HTTP
//!
//! Motor de protocolo por request del servidor de archivos:
//!
//! - Parsing de la request line y detección de keep-alive
//! - Validación y resolución de paths contra el root
//! - Decisión y armado de la respuesta (status line, headers, plan de body)
//! - Listados de directorio en chunked transfer encoding
//!
//! ### Formato de Request
//!
//! ```text
//! GET /docs/a.txt HTTP/1.1\r\n
//! Connection: keep-alive\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 10\r\n
//! \r\n
//! <10 bytes>
//! ```

pub mod error;     // Taxonomía de fallas
pub mod header;    // Nombres y líneas de header
pub mod listing;   // Listados chunked
pub mod path;      // Validación y resolución de paths
pub mod request;   // Parsing de requests
pub mod response;  // Decisión y armado de responses
pub mod status;    // Códigos de estado, versiones y tokens

// Re-exportamos los tipos principales para facilitar su uso
pub use error::ServeError;
pub use header::{Header, HeaderName};
pub use request::RequestLine;
pub use response::{BodyPlan, ResponseBuilder, ResponseSpec};
pub use status::{Persist, StatusCode, Version};
