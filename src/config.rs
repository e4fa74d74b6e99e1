//! # Configuración del Servidor
//! src/config.rs
//!
//! Define la configuración del servidor de archivos con soporte para
//! argumentos CLI, variables de entorno y un archivo JSON opcional.
//!
//! El servidor funciona en uno de dos modos, nunca ambos:
//! - **root**: sirve archivos y listados desde un directorio
//! - **goto**: redirige cada request a una URL base
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_file_server --port 8080 --size 16 --blog 64 --root ./public
//! ./http_file_server --port 8080 --goto https://mirror.example.org/pub/
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 SERVE_ROOT=/srv/www ./http_file_server
//! ```
//!
//! ### Archivo JSON
//! ```json
//! { "port": 8080, "size": 16, "blog": 64, "root": "/srv/www" }
//! ```

use crate::http::path::PathPolicy;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Puerto por defecto
pub const DEFAULT_PORT: u16 = 80;

/// Workers del pool por defecto
pub const DEFAULT_POOL_SIZE: usize = 32;

/// Backlog del listener por defecto
pub const DEFAULT_BACKLOG: u32 = 16;

/// Host por defecto (todas las interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Argumentos de línea de comandos
///
/// Todos los valores son opcionales: lo que no venga por CLI o entorno se
/// toma del archivo `--config` y, si tampoco está ahí, del valor por defecto.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "http_file_server")]
#[command(about = "Servidor HTTP/1.x concurrente de archivos y listados de directorio")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor [default: 80]
    #[arg(short, long, env = "HTTP_PORT")]
    pub port: Option<u16>,

    /// Host/IP en el que escucha [default: 0.0.0.0]
    #[arg(long, env = "HTTP_HOST")]
    pub host: Option<String>,

    /// Número de workers del pool [default: 32]
    #[arg(long = "size", env = "POOL_SIZE")]
    pub pool_size: Option<usize>,

    /// Backlog del listener TCP [default: 16]
    #[arg(long = "blog", env = "BACKLOG")]
    pub backlog: Option<u32>,

    /// Directorio raíz a servir
    #[arg(long, env = "SERVE_ROOT")]
    pub root: Option<PathBuf>,

    /// URL base de redirección (reemplaza al root)
    #[arg(long = "goto", env = "REDIRECT_TO")]
    pub goto: Option<String>,

    /// Archivo de configuración JSON
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Rechaza además paths con `//` o `\`
    #[arg(long, env = "STRICT_PATHS")]
    pub strict_paths: bool,
}

/// Contenido del archivo de configuración JSON
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub size: Option<usize>,
    pub blog: Option<u32>,
    pub root: Option<PathBuf>,
    pub goto: Option<String>,
    pub strict_paths: Option<bool>,
}

impl ConfigFile {
    /// Lee y parsea el archivo
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }
}

/// Errores al armar la configuración
#[derive(Debug)]
pub enum ConfigError {
    /// No se pudo leer el archivo de configuración
    Read { path: PathBuf, source: io::Error },

    /// El archivo de configuración no es JSON válido
    Parse(serde_json::Error),

    /// La URL de redirección no es absoluta o no parsea
    InvalidRedirect { value: String, source: url::ParseError },

    /// No se pudo obtener el directorio de trabajo
    WorkingDir(io::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Cannot read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "Invalid config file: {}", e),
            ConfigError::InvalidRedirect { value, source } => {
                write!(f, "Invalid redirect URL '{}': {}", value, source)
            }
            ConfigError::WorkingDir(e) => write!(f, "Cannot determine working directory: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::InvalidRedirect { source, .. } => Some(source),
            ConfigError::WorkingDir(e) => Some(e),
        }
    }
}

/// Qué sirve el servidor: un directorio o una redirección
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Directorio raíz absoluto
    Root(PathBuf),

    /// URL base absoluta
    Redirect(Url),
}

/// Configuración efectiva, inmutable durante toda la vida del proceso
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub pool_size: usize,
    pub backlog: u32,
    pub target: Target,
    pub path_policy: PathPolicy,
}

impl ServerConfig {
    /// Configuración por defecto sirviendo `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::with_target(Target::Root(root.into()))
    }

    /// Configuración por defecto redirigiendo a `base`
    pub fn with_redirect(base: Url) -> Self {
        Self::with_target(Target::Redirect(base))
    }

    fn with_target(target: Target) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            pool_size: DEFAULT_POOL_SIZE,
            backlog: DEFAULT_BACKLOG,
            target,
            path_policy: PathPolicy::Lenient,
        }
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use http_file_server::config::ServerConfig;
    ///
    /// let config = ServerConfig::with_root("/srv/www");
    /// assert_eq!(config.address(), "0.0.0.0:80");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valor para el log de arranque: (root, goto)
    pub fn describe(&self) -> (Option<String>, Option<String>) {
        match &self.target {
            Target::Root(root) => (Some(root.display().to_string()), None),
            Target::Redirect(base) => (None, Some(base.to_string())),
        }
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_size == 0 {
            return Err("Pool size must be >= 1".to_string());
        }
        if self.backlog == 0 {
            return Err("Backlog must be >= 1".to_string());
        }
        if let Target::Root(root) = &self.target {
            if !root.is_dir() {
                return Err(format!("Root {} is not a directory", root.display()));
            }
        }
        Ok(())
    }
}

fn absent(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn absent_path(value: &Option<PathBuf>) -> bool {
    value
        .as_deref()
        .map_or(true, |p| p.as_os_str().to_string_lossy().trim().is_empty())
}

impl Config {
    /// Crea la configuración parseando argumentos CLI y entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Combina CLI, archivo y valores por defecto en la configuración efectiva
    pub fn resolve(self) -> Result<ServerConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        self.merge(file)
    }

    /// Como `resolve`, pero con el archivo ya cargado
    pub fn merge(self, file: ConfigFile) -> Result<ServerConfig, ConfigError> {
        // root/goto se toman juntos de la fuente que nombre alguno de los dos
        let (root, goto) = if !absent_path(&self.root) || !absent(&self.goto) {
            (self.root, self.goto)
        } else {
            (file.root, file.goto)
        };

        let target = pick_target(root, goto)?;

        Ok(ServerConfig {
            host: self.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.or(file.port).unwrap_or(DEFAULT_PORT),
            pool_size: self.pool_size.or(file.size).unwrap_or(DEFAULT_POOL_SIZE),
            backlog: self.backlog.or(file.blog).unwrap_or(DEFAULT_BACKLOG),
            target,
            path_policy: if self.strict_paths || file.strict_paths.unwrap_or(false) {
                PathPolicy::Strict
            } else {
                PathPolicy::Lenient
            },
        })
    }
}

/// Elige el modo: la redirección gana; sin ninguno, el directorio actual
fn pick_target(root: Option<PathBuf>, goto: Option<String>) -> Result<Target, ConfigError> {
    if !absent(&goto) {
        if !absent_path(&root) {
            tracing::warn!("root y goto configurados a la vez; se ignora root");
        }
        let value = goto.unwrap_or_default().trim().to_string();
        let base = Url::parse(&value).map_err(|source| ConfigError::InvalidRedirect {
            value: value.clone(),
            source,
        })?;
        return Ok(Target::Redirect(base));
    }

    let root = if absent_path(&root) {
        PathBuf::from(".")
    } else {
        root.unwrap_or_default()
    };
    let root = if root.is_absolute() {
        root
    } else {
        std::env::current_dir().map_err(ConfigError::WorkingDir)?.join(root)
    };

    Ok(Target::Root(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default().merge(ConfigFile::default()).unwrap();
        assert_eq!(config.port, 80);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.pool_size, 32);
        assert_eq!(config.backlog, 16);
        assert_eq!(config.path_policy, PathPolicy::Lenient);
    }

    #[test]
    fn test_default_root_is_working_dir() {
        let config = Config::default().merge(ConfigFile::default()).unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.target, Target::Root(cwd.join(".")));
    }

    #[test]
    fn test_address() {
        let mut config = ServerConfig::with_root("/srv");
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_relative_root_is_absolutized() {
        let cli = Config {
            root: Some(PathBuf::from("public")),
            ..Config::default()
        };
        let config = cli.merge(ConfigFile::default()).unwrap();

        match config.target {
            Target::Root(root) => {
                assert!(root.is_absolute());
                assert!(root.ends_with("public"));
            }
            other => panic!("expected root, got {:?}", other),
        }
    }

    #[test]
    fn test_redirect_wins_over_root() {
        let cli = Config {
            root: Some(PathBuf::from("/srv/www")),
            goto: Some(" https://mirror.example.org/pub/ ".to_string()),
            ..Config::default()
        };
        let config = cli.merge(ConfigFile::default()).unwrap();

        assert_eq!(
            config.target,
            Target::Redirect(Url::parse("https://mirror.example.org/pub/").unwrap())
        );
    }

    #[test]
    fn test_blank_goto_is_absent() {
        let cli = Config {
            root: Some(PathBuf::from("/srv/www")),
            goto: Some("   ".to_string()),
            ..Config::default()
        };
        let config = cli.merge(ConfigFile::default()).unwrap();
        assert_eq!(config.target, Target::Root(PathBuf::from("/srv/www")));
    }

    #[test]
    fn test_invalid_redirect() {
        let cli = Config {
            goto: Some("not a url".to_string()),
            ..Config::default()
        };
        let result = cli.merge(ConfigFile::default());
        assert!(matches!(result, Err(ConfigError::InvalidRedirect { .. })));
    }

    #[test]
    fn test_file_values_and_cli_precedence() {
        let file = ConfigFile::parse(
            r#"{ "port": 8080, "size": 4, "blog": 64, "root": "/srv/files", "strict_paths": true }"#,
        )
        .unwrap();
        let cli = Config {
            port: Some(9000),
            ..Config::default()
        };
        let config = cli.merge(file).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.backlog, 64);
        assert_eq!(config.target, Target::Root(PathBuf::from("/srv/files")));
        assert_eq!(config.path_policy, PathPolicy::Strict);
    }

    #[test]
    fn test_cli_target_replaces_file_target() {
        let file = ConfigFile::parse(r#"{ "goto": "https://elsewhere.example/" }"#).unwrap();
        let cli = Config {
            root: Some(PathBuf::from("/srv/www")),
            ..Config::default()
        };
        let config = cli.merge(file).unwrap();
        assert_eq!(config.target, Target::Root(PathBuf::from("/srv/www")));
    }

    #[test]
    fn test_file_rejects_unknown_keys() {
        let result = ConfigFile::parse(r#"{ "port": 80, "threads": 9 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        fs::write(&path, r#"{ "goto": "https://mirror.example.org/" }"#).unwrap();

        let cli = Config {
            config: Some(path),
            ..Config::default()
        };
        let config = cli.resolve().unwrap();
        assert!(matches!(config.target, Target::Redirect(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let cli = Config {
            config: Some(PathBuf::from("/definitely/not/here.json")),
            ..Config::default()
        };
        assert!(matches!(cli.resolve(), Err(ConfigError::Read { .. })));
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_success() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::with_root(dir.path());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_pool_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::with_root(dir.path());
        config.pool_size = 0;
        let result = config.validate();
        assert!(result.unwrap_err().contains("Pool size"));
    }

    #[test]
    fn test_validate_invalid_backlog() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::with_root(dir.path());
        config.backlog = 0;
        assert!(config.validate().unwrap_err().contains("Backlog"));
    }

    #[test]
    fn test_validate_root_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        let config = ServerConfig::with_root(&file);
        assert!(config.validate().unwrap_err().contains("not a directory"));
    }

    #[test]
    fn test_validate_redirect_skips_root_check() {
        let config = ServerConfig::with_redirect(Url::parse("https://mirror.example.org/").unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_describe() {
        let config = ServerConfig::with_root("/srv/www");
        assert_eq!(config.describe(), (Some("/srv/www".to_string()), None));

        let config = ServerConfig::with_redirect(Url::parse("https://m.example/").unwrap());
        assert_eq!(config.describe(), (None, Some("https://m.example/".to_string())));
    }
}
