//! # Parsing de Requests
//! src/http/request.rs
//!
//! Lee líneas del transporte hasta la primera línea vacía y extrae lo único
//! que le importa a este servidor:
//!
//! 1. **Request line**: `GET /<file> HTTP/<version>` (sin distinguir
//!    mayúsculas). Sólo cuenta la *primera* línea que matchea.
//! 2. **Keep-alive**: alguna línea igual a `Connection: keep-alive`.
//!
//! El resto de las líneas se guarda para el log pero no afecta el ruteo.
//!
//! ```text
//! GET /docs/a.txt HTTP/1.1\r\n
//! Host: localhost\r\n
//! Connection: keep-alive\r\n
//! \r\n
//! ```

use super::{Header, Version};
use crate::server::transport::Transport;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;

/// Máximo de líneas por request
pub const MAX_REQUEST_LINES: usize = 128;

static GET_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^GET /(?P<file>\S*) HTTP/(?P<http>\S+)$").expect("GET_ENTITY pattern is valid")
});

/// Campos capturados de una línea `GET`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity<'a> {
    /// Path crudo, sin la `/` inicial y sin decodificar
    pub file: &'a str,

    /// Token de versión después de `HTTP/`
    pub http: &'a str,
}

impl<'a> Entity<'a> {
    /// Intenta matchear una línea contra `GET /<file> HTTP/<version>`
    ///
    /// # Ejemplo
    /// ```
    /// use http_file_server::http::request::Entity;
    ///
    /// let entity = Entity::scan("get /a.txt HTTP/1.0").unwrap();
    /// assert_eq!(entity.file, "a.txt");
    /// assert_eq!(entity.http, "1.0");
    /// assert!(Entity::scan("POST /a.txt HTTP/1.0").is_none());
    /// ```
    pub fn scan(line: &'a str) -> Option<Self> {
        let caps = GET_ENTITY.captures(line)?;
        Some(Entity {
            file: caps.name("file").map_or("", |m| m.as_str()),
            http: caps.name("http").map_or("", |m| m.as_str()),
        })
    }
}

/// Errores al leer un request
#[derive(Debug)]
pub enum ParseError {
    /// El peer cerró el stream antes de la línea vacía final
    ConnectionClosed,

    /// Más de `MAX_REQUEST_LINES` líneas sin la línea vacía final
    TooManyLines,

    /// Falla de lectura en el socket
    Io(io::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::ConnectionClosed => write!(f, "Connection closed by peer"),
            ParseError::TooManyLines => write!(f, "Request exceeds {} lines", MAX_REQUEST_LINES),
            ParseError::Io(e) => write!(f, "Read failure: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Request de una iteración de la sesión
#[derive(Debug, Clone, Default)]
pub struct RequestLine {
    /// Líneas no vacías en orden de llegada
    lines: Vec<String>,

    /// Path crudo de la primera línea `GET` (ej: "docs/a.txt")
    file_path: Option<String>,

    /// Versión declarada en esa misma línea
    version: Version,

    /// Alguna línea era `Connection: keep-alive`
    wants_keep_alive: bool,
}

impl RequestLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arma un request a partir de líneas ya leídas
    ///
    /// # Ejemplo
    /// ```
    /// use http_file_server::http::{RequestLine, Version};
    ///
    /// let request = RequestLine::from_lines(["GET /a.txt HTTP/1.1", "Connection: keep-alive"]);
    /// assert_eq!(request.file_path(), Some("a.txt"));
    /// assert_eq!(request.version(), Version::Http11);
    /// assert!(request.wants_keep_alive());
    /// ```
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = Self::new();
        for line in lines {
            request.push_line(line.into());
        }
        request
    }

    /// Vacía el estado para la próxima iteración de la conexión
    pub fn clear(&mut self) {
        self.lines.clear();
        self.file_path = None;
        self.version = Version::default();
        self.wants_keep_alive = false;
    }

    /// Lee líneas del transporte hasta la primera línea vacía
    ///
    /// Si el stream termina antes, retorna `ParseError::ConnectionClosed`.
    pub fn read_from<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<(), ParseError> {
        loop {
            let line = transport.read_line()?.ok_or(ParseError::ConnectionClosed)?;
            if line.is_empty() {
                return Ok(());
            }
            if self.lines.len() == MAX_REQUEST_LINES {
                return Err(ParseError::TooManyLines);
            }
            self.push_line(line);
        }
    }

    /// Registra una línea no vacía
    pub fn push_line(&mut self, line: String) {
        if line.is_empty() {
            return;
        }

        if Header::keep_alive().matches_line(&line) {
            self.wants_keep_alive = true;
        } else if self.file_path.is_none() {
            if let Some(entity) = Entity::scan(&line) {
                self.version = Version::from_token(Some(entity.http));
                self.file_path = Some(entity.file.to_string());
            }
        }

        self.lines.push(line);
    }

    // === Accesores ===

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn wants_keep_alive(&self) -> bool {
        self.wants_keep_alive
    }
}
