//! # Headers HTTP
//! src/http/header.rs
//!
//! Nombres de header como enum cerrado y una línea `Nombre: valor`
//! lista para escribir en el socket.

use super::Persist;

/// Headers que el servidor emite o reconoce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderName {
    ContentType,
    ContentLength,
    ContentEncoding,
    TransferEncoding,
    Location,
    Connection,
}

impl HeaderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderName::ContentType => "Content-Type",
            HeaderName::ContentLength => "Content-Length",
            HeaderName::ContentEncoding => "Content-Encoding",
            HeaderName::TransferEncoding => "Transfer-Encoding",
            HeaderName::Location => "Location",
            HeaderName::Connection => "Connection",
        }
    }
}

/// Una línea de header de la respuesta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: HeaderName,
    value: String,
}

impl Header {
    pub fn new(name: HeaderName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// El header `Connection: keep-alive` tal como lo busca el parser
    pub fn keep_alive() -> Self {
        Self::new(HeaderName::Connection, Persist::KeepAlive.as_str())
    }

    pub fn name(&self) -> HeaderName {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Compara una línea cruda contra este header, sin distinguir mayúsculas
    pub fn matches_line(&self, line: &str) -> bool {
        line.eq_ignore_ascii_case(&self.to_string())
    }
}

impl std::fmt::Display for Header {
    /// Formato: "Content-Length: 10"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name.as_str(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let header = Header::new(HeaderName::ContentLength, 10.to_string());
        assert_eq!(header.to_string(), "Content-Length: 10");
        assert_eq!(header.name(), HeaderName::ContentLength);
        assert_eq!(header.value(), "10");
    }

    #[test]
    fn test_keep_alive_matches_case_insensitive() {
        let header = Header::keep_alive();
        assert!(header.matches_line("Connection: keep-alive"));
        assert!(header.matches_line("connection: Keep-Alive"));
        assert!(!header.matches_line("Connection: close"));
        assert!(!header.matches_line("Connection:  keep-alive"));
        assert!(!header.matches_line("Connection: keep-alive, Upgrade"));
    }
}
