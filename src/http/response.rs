//! # Construcción de Respuestas
//! src/http/response.rs
//!
//! `ResponseBuilder` toma un `RequestLine` y decide la respuesta. Produce un
//! `ResponseSpec`: la status line, los headers en orden y un plan para el
//! body. La transmisión la hace la sesión.
//!
//! ## Tabla de decisión (en orden de prioridad)
//!
//! | Situación                          | Respuesta                          |
//! |------------------------------------|------------------------------------|
//! | Path rechazado                     | 402, sin body                      |
//! | Modo redirección                   | 302 + `Location`                   |
//! | Directorio                         | 200 chunked, listado               |
//! | Archivo legible                    | 200 + `Content-Length`, bytes      |
//! | Existe pero ilegible / otro tipo   | 403                                |
//! | No existe                          | 404                                |
//! | Falla de I/O al decidir            | 500 (descarta todo lo anterior)    |
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 10\r\n
//! \r\n
//! <10 bytes>
//! ```

use super::header::{Header, HeaderName};
use super::path::{self, PathResolver, ResolvedPath};
use super::{RequestLine, ServeError, StatusCode, Version};
use crate::config::{ServerConfig, Target};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

const CRLF: &str = "\r\n";

/// Cómo se envía el body de la respuesta
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodyPlan {
    /// Sin body
    #[default]
    None,

    /// Copia byte a byte de un archivo de `len` bytes
    FixedBytes { source: PathBuf, len: u64 },

    /// Listado chunked de un directorio o de un único archivo
    ChunkedListing { target: PathBuf, single_file: bool },
}

/// Respuesta lista para transmitir
#[derive(Debug, Clone, Default)]
pub struct ResponseSpec {
    /// Versión y código de la status line (`None` si no hubo request GET)
    status: Option<(Version, StatusCode)>,

    /// Headers en el orden en que se escriben
    headers: Vec<Header>,

    body: BodyPlan,
}

impl ResponseSpec {
    /// Respuesta vacía: sólo se escribe la línea final `\r\n`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(version: Version, status: StatusCode) -> Self {
        Self {
            status: Some((version, status)),
            headers: Vec::new(),
            body: BodyPlan::None,
        }
    }

    /// Respuesta de error: sólo la status line, sin headers ni body
    pub fn failure(version: Version, error: &ServeError) -> Self {
        match error.status() {
            Some(status) => Self::new(version, status),
            None => Self::empty(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn with_body(mut self, body: BodyPlan) -> Self {
        self.body = body;
        self
    }

    /// Vacía el estado para la próxima iteración de la conexión
    pub fn clear(&mut self) {
        self.status = None;
        self.headers.clear();
        self.body = BodyPlan::None;
    }

    // === Accesores ===

    pub fn status(&self) -> Option<StatusCode> {
        self.status.map(|(_, status)| status)
    }

    pub fn version(&self) -> Option<Version> {
        self.status.map(|(version, _)| version)
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.iter().find(|h| h.name() == name).map(Header::value)
    }

    pub fn body(&self) -> &BodyPlan {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
    }

    /// Status line y headers, una entrada por línea
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.headers.len() + 1);
        if let Some((version, status)) = self.status {
            lines.push(version.status_line(status));
        }
        lines.extend(self.headers.iter().map(ToString::to_string));
        lines
    }

    /// Bloque de headers listo para el socket, incluida la línea vacía final
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut head = String::new();
        for line in self.lines() {
            head.push_str(&line);
            head.push_str(CRLF);
        }
        head.push_str(CRLF);
        head.into_bytes()
    }
}

/// Decide la respuesta de cada request según la configuración
pub struct ResponseBuilder<'a> {
    config: &'a ServerConfig,
}

impl<'a> ResponseBuilder<'a> {
    pub fn new(config: &'a ServerConfig) -> Self {
        Self { config }
    }

    /// Construye la respuesta para el request
    ///
    /// Sólo la primera línea `GET` del request participa; si no hubo
    /// ninguna, la respuesta queda vacía.
    pub fn build(&self, request: &RequestLine) -> ResponseSpec {
        let Some(file) = request.file_path() else {
            return ResponseSpec::empty();
        };
        let version = request.version();

        match self.decide(file, version) {
            Ok(response) => response,
            Err(error) => ResponseSpec::failure(version, &error),
        }
    }

    fn decide(&self, file: &str, version: Version) -> Result<ResponseSpec, ServeError> {
        let raw = path::examine(Some(file), self.config.path_policy)?;

        match &self.config.target {
            Target::Redirect(base) => {
                let location = path::resolve_redirect(base, raw)
                    .map_err(|e| ServeError::TransferFailure(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

                Ok(ResponseSpec::new(version, StatusCode::Found)
                    .with_header(HeaderName::Location, location.as_str()))
            }
            Target::Root(root) => {
                let resolved = PathResolver::new(root, self.config.path_policy).resolve(raw)?;
                Self::inspect(&resolved, version)
            }
        }
    }

    /// Inspecciona el destino en el filesystem
    fn inspect(resolved: &ResolvedPath, version: Version) -> Result<ResponseSpec, ServeError> {
        let target = resolved.path();

        let meta = fs::metadata(target).map_err(metadata_failure)?;

        if meta.is_dir() {
            return Ok(Self::listing(version, target.to_path_buf(), false));
        }
        if !meta.is_file() {
            return Err(ServeError::Forbidden);
        }

        let file = File::open(target).map_err(open_failure)?;
        let len = file.metadata().map_err(ServeError::TransferFailure)?.len();

        if resolved.wants_listing() {
            return Ok(Self::listing(version, target.to_path_buf(), true));
        }

        let mut response = ResponseSpec::new(version, StatusCode::Ok)
            .with_header(HeaderName::ContentLength, len.to_string());
        if resolved.is_gzip() {
            response = response.with_header(HeaderName::ContentEncoding, "gzip");
        }

        Ok(response.with_body(BodyPlan::FixedBytes {
            source: target.to_path_buf(),
            len,
        }))
    }

    fn listing(version: Version, target: PathBuf, single_file: bool) -> ResponseSpec {
        ResponseSpec::new(version, StatusCode::Ok)
            .with_header(HeaderName::ContentType, "text/plain; charset=utf-8")
            .with_header(HeaderName::TransferEncoding, "chunked")
            .with_body(BodyPlan::ChunkedListing { target, single_file })
    }
}

/// Falla al inspeccionar el destino: sin permiso → 403, cualquier otra → 404
fn metadata_failure(e: io::Error) -> ServeError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => ServeError::Forbidden,
        _ => ServeError::NotFound,
    }
}

/// Falla al abrir un archivo regular: sin permiso → 403, cualquier otra → 500
fn open_failure(e: io::Error) -> ServeError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => ServeError::Forbidden,
        _ => ServeError::TransferFailure(e),
    }
}
