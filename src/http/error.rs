//! # Errores del Servidor de Archivos
//! src/http/error.rs
//!
//! Taxonomía de fallas de un request. Las cuatro primeras se recuperan
//! localmente y se convierten en una status line; `ConnectionFailure`
//! termina la sesión sin responder.

use super::path::Rejection;
use super::StatusCode;
use std::io;

#[derive(Debug)]
pub enum ServeError {
    /// El path no pasó la validación sintáctica → 402
    MalformedRequest(Rejection),

    /// El destino no existe → 404
    NotFound,

    /// Existe pero no se puede leer o es de un tipo no permitido → 403
    Forbidden,

    /// Falla de I/O al decidir o armar la respuesta → 500
    TransferFailure(io::Error),

    /// Falla de lectura/escritura en el socket → se cierra la conexión
    ConnectionFailure(io::Error),
}

impl ServeError {
    /// Status que corresponde a la falla, `None` si no se responde
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ServeError::MalformedRequest(_) => Some(StatusCode::PaymentRequired),
            ServeError::NotFound => Some(StatusCode::NotFound),
            ServeError::Forbidden => Some(StatusCode::Forbidden),
            ServeError::TransferFailure(_) => Some(StatusCode::InternalServerError),
            ServeError::ConnectionFailure(_) => None,
        }
    }
}

impl std::fmt::Display for ServeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeError::MalformedRequest(r) => write!(f, "Malformed request path: {}", r),
            ServeError::NotFound => write!(f, "Target not found"),
            ServeError::Forbidden => write!(f, "Target not readable"),
            ServeError::TransferFailure(e) => write!(f, "I/O failure while building response: {}", e),
            ServeError::ConnectionFailure(e) => write!(f, "Connection failure: {}", e),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::MalformedRequest(r) => Some(r),
            ServeError::TransferFailure(e) | ServeError::ConnectionFailure(e) => Some(e),
            ServeError::NotFound | ServeError::Forbidden => None,
        }
    }
}

impl From<Rejection> for ServeError {
    fn from(rejection: Rejection) -> Self {
        ServeError::MalformedRequest(rejection)
    }
}
