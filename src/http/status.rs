//! # Vocabulario del Protocolo
//! src/http/status.rs
//!
//! Los valores textuales del protocolo que el servidor emite o compara se
//! modelan como enums cerrados, uno por categoría:
//!
//! - **StatusCode**: códigos de estado que puede producir el servidor
//! - **Version**: versión declarada en la request line (1.0, 1.1 o 1.x)
//! - **Persist**: tokens del header `Connection`
//!
//! Comparar es comparar variantes; el texto canónico sale de un `match`.

/// Códigos de estado que produce el servidor de archivos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - Archivo o listado encontrado
    Ok = 200,

    /// 302 Found - Modo redirección
    Found = 302,

    /// 402 Payment Required - Path rechazado por la validación sintáctica
    PaymentRequired = 402,

    /// 403 Forbidden - Existe pero no se puede leer o no es archivo/directorio
    Forbidden = 403,

    /// 404 Not Found - El destino no existe
    NotFound = 404,

    /// 500 Internal Server Error - Falla de I/O al decidir la respuesta
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use http_file_server::http::StatusCode;
    /// assert_eq!(StatusCode::PaymentRequired.as_u16(), 402);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Found => "Found",
            StatusCode::PaymentRequired => "Payment Required",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Versión HTTP declarada por el cliente
///
/// Cualquier versión distinta de `1.0` o `1.1` se responde como `1.x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    Http10,
    Http11,
    #[default]
    Http1x,
}

impl Version {
    /// Interpreta el token capturado después de `HTTP/`
    ///
    /// # Ejemplo
    /// ```
    /// use http_file_server::http::Version;
    /// assert_eq!(Version::from_token(Some("1.1")), Version::Http11);
    /// assert_eq!(Version::from_token(Some("2")), Version::Http1x);
    /// assert_eq!(Version::from_token(None), Version::Http1x);
    /// ```
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("1.0") => Version::Http10,
            Some("1.1") => Version::Http11,
            _ => Version::Http1x,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "1.0",
            Version::Http11 => "1.1",
            Version::Http1x => "1.x",
        }
    }

    /// Arma la status line completa: `HTTP/1.1 200 OK`
    pub fn status_line(&self, status: StatusCode) -> String {
        format!("HTTP/{} {}", self.as_str(), status)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens de persistencia del header `Connection`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    KeepAlive,
    Close,
}

impl Persist {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persist::KeepAlive => "keep-alive",
            Persist::Close => "close",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::Found.as_u16(), 302);
        assert_eq!(StatusCode::PaymentRequired.as_u16(), 402);
        assert_eq!(StatusCode::Forbidden.as_u16(), 403);
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
        assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::PaymentRequired.to_string(), "402 Payment Required");
        assert_eq!(StatusCode::InternalServerError.to_string(), "500 Internal Server Error");
    }

    #[test]
    fn test_version_tokens() {
        assert_eq!(Version::from_token(Some("1.0")), Version::Http10);
        assert_eq!(Version::from_token(Some("1.1")), Version::Http11);
        assert_eq!(Version::from_token(Some("1.2")), Version::Http1x);
        assert_eq!(Version::default(), Version::Http1x);
    }

    #[test]
    fn test_status_line() {
        assert_eq!(Version::Http11.status_line(StatusCode::Ok), "HTTP/1.1 200 OK");
        assert_eq!(Version::Http10.status_line(StatusCode::NotFound), "HTTP/1.0 404 Not Found");
        assert_eq!(
            Version::Http1x.status_line(StatusCode::InternalServerError),
            "HTTP/1.x 500 Internal Server Error"
        );
    }

    #[test]
    fn test_persist_tokens() {
        assert_eq!(Persist::KeepAlive.as_str(), "keep-alive");
        assert_eq!(Persist::Close.as_str(), "close");
        assert_ne!(Persist::KeepAlive, Persist::Close);
    }
}
