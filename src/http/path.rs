//! # Resolución de Paths
//! src/http/path.rs
//!
//! Valida el path pedido en la request line y lo resuelve contra el root.
//!
//! ## Orden de validación
//!
//! 1. Chequeo sintáctico sobre el texto crudo (sin decodificar)
//! 2. Decodificación percent-encoding (UTF-8, `+` como espacio)
//! 3. El mismo chequeo sobre el texto decodificado
//! 4. Join con el root, sin normalizar
//!
//! Un path vacío (`GET / HTTP/1.1`) es válido y apunta al root mismo.

use std::path::{Path, PathBuf};
use url::Url;

/// Política de validación sintáctica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathPolicy {
    /// Rechaza `/` o `\` inicial, `:` y `..`
    #[default]
    Lenient,

    /// Además rechaza `//` y cualquier `\`
    Strict,
}

/// Motivo por el que un path fue rechazado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Empieza con `/` o `\`
    Absolute,

    /// Contiene `:` (drive de Windows o scheme)
    DriveOrScheme,

    /// Contiene `..`
    ParentSegment,

    /// Contiene `//` (política estricta)
    EmptySegment,

    /// Contiene `\` (política estricta)
    Backslash,

    /// Contiene un byte NUL después de decodificar
    NulByte,

    /// El percent-encoding no produce UTF-8 válido
    InvalidEncoding,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Absolute => write!(f, "absolute path"),
            Rejection::DriveOrScheme => write!(f, "drive or scheme separator"),
            Rejection::ParentSegment => write!(f, "parent directory segment"),
            Rejection::EmptySegment => write!(f, "empty path segment"),
            Rejection::Backslash => write!(f, "backslash separator"),
            Rejection::NulByte => write!(f, "NUL byte"),
            Rejection::InvalidEncoding => write!(f, "invalid percent-encoding"),
        }
    }
}

impl std::error::Error for Rejection {}

/// Chequeo sintáctico del path (crudo o decodificado)
///
/// Un path ausente equivale a `/` y por lo tanto se rechaza. Retorna el path
/// recortado de espacios cuando es aceptado.
///
/// # Ejemplo
/// ```
/// use http_file_server::http::path::{examine, PathPolicy, Rejection};
///
/// assert_eq!(examine(Some("docs/a.txt"), PathPolicy::Lenient), Ok("docs/a.txt"));
/// assert_eq!(examine(Some(""), PathPolicy::Lenient), Ok(""));
/// assert_eq!(examine(Some("../etc/passwd"), PathPolicy::Lenient), Err(Rejection::ParentSegment));
/// ```
pub fn examine(raw: Option<&str>, policy: PathPolicy) -> Result<&str, Rejection> {
    let path = raw.unwrap_or("/").trim();

    if path.is_empty() {
        return Ok(path);
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(Rejection::Absolute);
    }
    if path.contains(':') {
        return Err(Rejection::DriveOrScheme);
    }
    if path.contains("..") {
        return Err(Rejection::ParentSegment);
    }
    if policy == PathPolicy::Strict {
        if path.contains("//") {
            return Err(Rejection::EmptySegment);
        }
        if path.contains('\\') {
            return Err(Rejection::Backslash);
        }
    }

    Ok(path)
}

/// Decodifica percent-encoding como un formulario (`+` es espacio)
pub fn decode(path: &str) -> Result<String, Rejection> {
    let spaced = path.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Rejection::InvalidEncoding)
}

/// Resuelve el path crudo contra la base de redirección
///
/// # Ejemplo
/// ```
/// use http_file_server::http::path::resolve_redirect;
/// use url::Url;
///
/// let base = Url::parse("https://mirror.example.org/pub/").unwrap();
/// let location = resolve_redirect(&base, "iso/disk.img").unwrap();
/// assert_eq!(location.as_str(), "https://mirror.example.org/pub/iso/disk.img");
/// ```
pub fn resolve_redirect(base: &Url, raw: &str) -> Result<Url, url::ParseError> {
    base.join(raw)
}

/// Path candidato dentro del root (puede no existir todavía)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    raw: String,
}

impl ResolvedPath {
    /// Path en el filesystem
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path crudo tal como vino en la request line
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// El cliente pidió el listado de un solo archivo (`archivo/`)
    pub fn wants_listing(&self) -> bool {
        self.raw.ends_with('/')
    }

    /// El path pedido termina en `.gz` o `.jgz`
    pub fn is_gzip(&self) -> bool {
        self.raw.ends_with(".gz") || self.raw.ends_with(".jgz")
    }
}

/// Resolvedor de paths confinado a un root
#[derive(Debug, Clone)]
pub struct PathResolver<'a> {
    root: &'a Path,
    policy: PathPolicy,
}

impl<'a> PathResolver<'a> {
    pub fn new(root: &'a Path, policy: PathPolicy) -> Self {
        Self { root, policy }
    }

    /// Valida, decodifica y resuelve el path crudo contra el root
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath, Rejection> {
        let checked = examine(Some(raw), self.policy)?;
        let decoded = decode(checked)?;

        if decoded.contains('\0') {
            return Err(Rejection::NulByte);
        }
        // sólo valida: los espacios decodificados son parte del nombre
        examine(Some(&decoded), self.policy)?;

        // "archivo/" se resuelve como "archivo"; la barra sólo cambia el modo
        let relative = decoded.trim_end_matches('/');

        Ok(ResolvedPath {
            path: self.root.join(relative),
            raw: checked.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(raw: &str) -> Result<&str, Rejection> {
        examine(Some(raw), PathPolicy::Lenient)
    }

    #[test]
    fn test_examine_accepts_relative() {
        assert_eq!(lenient("a.txt"), Ok("a.txt"));
        assert_eq!(lenient("dir/sub/b.bin"), Ok("dir/sub/b.bin"));
        assert_eq!(lenient("  a.txt "), Ok("a.txt"));
        assert_eq!(lenient(""), Ok(""));
    }

    #[test]
    fn test_examine_missing_defaults_to_slash() {
        assert_eq!(examine(None, PathPolicy::Lenient), Err(Rejection::Absolute));
    }

    #[test]
    fn test_examine_rejects_markers() {
        assert_eq!(lenient("/etc/passwd"), Err(Rejection::Absolute));
        assert_eq!(lenient("\\windows"), Err(Rejection::Absolute));
        assert_eq!(lenient("C:/boot.ini"), Err(Rejection::DriveOrScheme));
        assert_eq!(lenient("http://evil"), Err(Rejection::DriveOrScheme));
        assert_eq!(lenient("../etc/passwd"), Err(Rejection::ParentSegment));
        assert_eq!(lenient("a/../../b"), Err(Rejection::ParentSegment));
        assert_eq!(lenient("notes..txt"), Err(Rejection::ParentSegment));
    }

    #[test]
    fn test_strict_policy() {
        assert_eq!(lenient("a//b"), Ok("a//b"));
        assert_eq!(lenient("a\\b"), Ok("a\\b"));
        assert_eq!(examine(Some("a//b"), PathPolicy::Strict), Err(Rejection::EmptySegment));
        assert_eq!(examine(Some("a\\b"), PathPolicy::Strict), Err(Rejection::Backslash));
        assert_eq!(examine(Some("a/b"), PathPolicy::Strict), Ok("a/b"));
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("hello%20world.txt").unwrap(), "hello world.txt");
        assert_eq!(decode("a+b").unwrap(), "a b");
        assert_eq!(decode("caf%C3%A9").unwrap(), "café");
        assert_eq!(decode("%FF%FE"), Err(Rejection::InvalidEncoding));
    }

    #[test]
    fn test_resolve_joins_root() {
        let root = Path::new("/srv/www");
        let resolver = PathResolver::new(root, PathPolicy::Lenient);

        let resolved = resolver.resolve("docs/hello%20world.txt").unwrap();
        assert_eq!(resolved.path(), Path::new("/srv/www/docs/hello world.txt"));
        assert_eq!(resolved.raw(), "docs/hello%20world.txt");
        assert!(!resolved.wants_listing());

        let root_itself = resolver.resolve("").unwrap();
        assert_eq!(root_itself.path(), Path::new("/srv/www"));
    }

    #[test]
    fn test_resolve_keeps_decoded_spaces() {
        let resolver = PathResolver::new(Path::new("/srv/www"), PathPolicy::Lenient);

        let trailing = resolver.resolve("a.txt%20").unwrap();
        assert_eq!(trailing.path().as_os_str(), "/srv/www/a.txt ");

        let leading = resolver.resolve("%20b.txt").unwrap();
        assert_eq!(leading.path().as_os_str(), "/srv/www/ b.txt");

        let plus = resolver.resolve("a.txt+++").unwrap();
        assert_eq!(plus.path().as_os_str(), "/srv/www/a.txt   ");
    }

    #[test]
    fn test_resolve_rejects_padded_absolute_path() {
        let resolver = PathResolver::new(Path::new("/srv/www"), PathPolicy::Lenient);
        assert_eq!(resolver.resolve("%20/etc/passwd"), Err(Rejection::Absolute));
        assert_eq!(resolver.resolve("+%2e%2e/x"), Err(Rejection::ParentSegment));
    }

    #[test]
    fn test_resolve_rejects_encoded_traversal() {
        let resolver = PathResolver::new(Path::new("/srv/www"), PathPolicy::Lenient);

        assert_eq!(resolver.resolve("%2e%2e/etc/passwd"), Err(Rejection::ParentSegment));
        assert_eq!(resolver.resolve("%2Fetc%2Fpasswd"), Err(Rejection::Absolute));
        assert_eq!(resolver.resolve("c%3A/x"), Err(Rejection::DriveOrScheme));
        assert_eq!(resolver.resolve("a%00b"), Err(Rejection::NulByte));
    }

    #[test]
    fn test_resolve_trailing_slash_and_gzip() {
        let resolver = PathResolver::new(Path::new("/srv/www"), PathPolicy::Lenient);

        let listing = resolver.resolve("a.txt/").unwrap();
        assert!(listing.wants_listing());
        assert_eq!(listing.path(), Path::new("/srv/www/a.txt"));

        assert!(resolver.resolve("dump.gz").unwrap().is_gzip());
        assert!(resolver.resolve("app.jgz").unwrap().is_gzip());
        assert!(!resolver.resolve("gz").unwrap().is_gzip());
    }

    #[test]
    fn test_resolve_redirect() {
        let base = Url::parse("https://mirror.example.org/pub/").unwrap();
        assert_eq!(
            resolve_redirect(&base, "a/b.txt").unwrap().as_str(),
            "https://mirror.example.org/pub/a/b.txt"
        );

        let no_slash = Url::parse("https://mirror.example.org/pub").unwrap();
        assert_eq!(
            resolve_redirect(&no_slash, "a.txt").unwrap().as_str(),
            "https://mirror.example.org/a.txt"
        );
    }
}
