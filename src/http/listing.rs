//! # Listados en Chunked Transfer Encoding
//! src/http/listing.rs
//!
//! Cada entrada del listado es un registro separado por tabs:
//!
//! ```text
//! <nombre>\t<última modificación ISO-8601>\t<tamaño o ->\r\n\r\n
//! ```
//!
//! y se envía como un chunk HTTP. El tamaño del chunk es el largo del
//! registro menos 2: el último `\r\n` del registro es el terminador del
//! chunk. El listado termina con el chunk vacío `0\r\n\r\n`.
//!
//! El primer registro siempre es `.` (el destino mismo); en modo directorio
//! le siguen los hijos directos, en el orden en que los entrega el
//! filesystem. Sólo se listan directorios y archivos regulares.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, Metadata};
use std::io::{self, Write};
use std::path::Path;

/// Chunk final de un body chunked
pub const EMPTY_CHUNK: &[u8] = b"0\r\n\r\n";

/// Arma el registro de una entrada
///
/// # Ejemplo
/// ```
/// use http_file_server::http::listing::record;
///
/// let dir = std::env::temp_dir();
/// let meta = std::fs::metadata(&dir).unwrap();
/// let line = String::from_utf8(record(".", &meta).unwrap()).unwrap();
/// assert!(line.starts_with(".\t"));
/// assert!(line.ends_with("\t-\r\n\r\n"));
/// ```
pub fn record(name: &str, meta: &Metadata) -> io::Result<Vec<u8>> {
    let time = iso_instant(meta)?;
    let size = if meta.is_dir() {
        "-".to_string()
    } else {
        meta.len().to_string()
    };

    Ok(format!("{}\t{}\t{}\r\n\r\n", name, time, size).into_bytes())
}

/// Última modificación como instante UTC con precisión de segundos
fn iso_instant(meta: &Metadata) -> io::Result<String> {
    let modified: DateTime<Utc> = meta.modified()?.into();
    Ok(modified.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Escribe un registro como chunk HTTP
pub fn write_chunk<W: Write + ?Sized>(out: &mut W, record: &[u8]) -> io::Result<()> {
    let size = record.len().saturating_sub(2);
    out.write_all(format!("{:x}\r\n", size).as_bytes())?;
    out.write_all(record)?;
    out.flush()
}

fn is_listable(meta: &Metadata) -> bool {
    meta.is_dir() || meta.is_file()
}

/// Encoder del listado de un destino
#[derive(Debug, Clone, Copy)]
pub struct ListingEncoder<'a> {
    target: &'a Path,
    single_file: bool,
}

impl<'a> ListingEncoder<'a> {
    /// Listado de un directorio: `.` más sus hijos directos
    pub fn directory(target: &'a Path) -> Self {
        Self {
            target,
            single_file: false,
        }
    }

    /// Listado de un único archivo: sólo el registro `.`
    pub fn single_file(target: &'a Path) -> Self {
        Self {
            target,
            single_file: true,
        }
    }

    pub fn new(target: &'a Path, single_file: bool) -> Self {
        Self { target, single_file }
    }

    /// Escribe todos los chunks y el chunk final
    ///
    /// Retorna la cantidad de registros emitidos.
    pub fn encode<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<usize> {
        let mut count = 0;

        let meta = fs::metadata(self.target)?;
        if is_listable(&meta) {
            write_chunk(out, &record(".", &meta)?)?;
            count += 1;
        }

        if !self.single_file {
            for entry in fs::read_dir(self.target)? {
                let entry = entry?;
                // DirEntry::metadata no sigue symlinks
                let meta = entry.metadata()?;
                if !is_listable(&meta) {
                    continue;
                }

                let name = entry.file_name();
                write_chunk(out, &record(&name.to_string_lossy(), &meta)?)?;
                count += 1;
            }
        }

        out.write_all(EMPTY_CHUNK)?;
        out.flush()?;

        Ok(count)
    }
}
