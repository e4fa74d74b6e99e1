//! # Transporte de la Conexión
//! src/server/transport.rs
//!
//! Abstracción mínima sobre el socket: leer una línea, escribir bytes y
//! copiar un archivo completo. La sesión no sabe si del otro lado hay un
//! `TcpStream` o un buffer en memoria (tests).

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;

/// Largo máximo de una línea del request, terminador incluido
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Operaciones de I/O que necesita una sesión
pub trait Transport: Write {
    /// Lee la próxima línea sin el terminador (`\n` o `\r\n`)
    ///
    /// Retorna `Ok(None)` si el peer cerró el stream y `InvalidData` si la
    /// línea supera `MAX_LINE_LEN`.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Escribe todos los bytes
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }

    /// Copia exactamente `len` bytes del archivo al destino
    fn transfer_file(&mut self, source: &mut File, len: u64) -> io::Result<u64>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        (**self).read_line()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }

    fn transfer_file(&mut self, source: &mut File, len: u64) -> io::Result<u64> {
        (**self).transfer_file(source, len)
    }
}

/// Transporte genérico sobre un par lector/escritor
pub struct StreamTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl<R: Read, W: Write> StreamTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Mitad de escritura (útil en tests para inspeccionar la salida)
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Transporte sobre un socket TCP
///
/// La mitad de escritura es el `TcpStream` sin buffer: así `io::copy` desde
/// un `File` puede usar la copia en kernel (sendfile) en Linux.
pub type TcpTransport = StreamTransport<TcpStream, TcpStream>;

impl TcpTransport {
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        let reader = stream.try_clone()?;
        Ok(Self::new(reader, stream))
    }
}

impl<R: Read, W: Write> Write for StreamTransport<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<R: Read, W: Write> Transport for StreamTransport<R, W> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        let read = (&mut self.reader).take(MAX_LINE_LEN as u64).read_until(b'\n', &mut raw)?;
        if read == 0 {
            return Ok(None);
        }
        if read == MAX_LINE_LEN && raw.last() != Some(&b'\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("request line longer than {} bytes", MAX_LINE_LEN),
            ));
        }

        if raw.last() == Some(&b'\n') {
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    fn transfer_file(&mut self, source: &mut File, len: u64) -> io::Result<u64> {
        let copied = io::copy(&mut source.take(len), &mut self.writer)?;
        if copied < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file ended after {} of {} bytes", copied, len),
            ));
        }
        Ok(copied)
    }
}
