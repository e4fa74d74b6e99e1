//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread acepta conexiones y las entrega al pool de workers; cada worker
//! corre una sesión completa (con todos sus requests keep-alive) antes de
//! tomar la siguiente. El acceptor nunca espera a los workers.

use crate::config::ServerConfig;
use crate::diagnostics::DiagnosticSink;
use crate::http::ResponseBuilder;
use crate::server::pool::WorkerPool;
use crate::server::session::Session;
use crate::server::transport::TcpTransport;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Servidor HTTP/1.x de archivos
pub struct Server {
    config: Arc<ServerConfig>,
    sink: Arc<DiagnosticSink>,
    listener: TcpListener,
    pool: WorkerPool,
    stop: Arc<AtomicBool>,
    next_conn: AtomicU64,
}

impl Server {
    /// Abre el listener y arranca el pool
    pub fn bind(config: ServerConfig, sink: Arc<DiagnosticSink>) -> io::Result<Self> {
        let addr = resolve_addr(&config.address())?;
        let listener = listen(addr, config.backlog)?;
        let pool = WorkerPool::new(config.pool_size).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        Ok(Self {
            config: Arc::new(config),
            sink,
            listener,
            pool,
            stop: Arc::new(AtomicBool::new(false)),
            next_conn: AtomicU64::new(0),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle para detener el acceptor desde otro thread
    pub fn shutdown_handle(&self) -> io::Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            stop: Arc::clone(&self.stop),
            addr: self.local_addr()?,
        })
    }

    /// Loop de accept hasta que se pida el cierre
    ///
    /// Al salir el pool deja de aceptar trabajo; las sesiones abiertas
    /// terminan normalmente.
    pub fn run(&self) -> io::Result<()> {
        let addr = self.local_addr()?;
        self.sink.dump_startup(addr, &self.config);
        tracing::info!(%addr, workers = self.pool.size(), backlog = self.config.backlog, "server listening");

        for stream in self.listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            }
        }

        self.pool.shutdown();
        tracing::info!(queued = self.pool.queued(), "acceptor stopped");
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream) {
        let conn = self.next_conn.fetch_add(1, Ordering::Relaxed) + 1;
        let peer = stream.peer_addr().ok();
        tracing::debug!(conn, ?peer, "connection accepted");

        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&self.sink);

        let submitted = self
            .pool
            .submit(move || handle_connection(stream, conn, peer, &config, &sink));
        if let Err(e) = submitted {
            tracing::warn!(conn, error = %e, "connection dropped");
        }
    }
}

/// Corre una sesión sobre el socket; al volver el socket queda cerrado
fn handle_connection(
    stream: TcpStream,
    conn: u64,
    peer: Option<SocketAddr>,
    config: &ServerConfig,
    sink: &DiagnosticSink,
) {
    let transport = match TcpTransport::from_stream(stream) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::debug!(conn, error = %e, "cannot split socket");
            return;
        }
    };

    let mut session = Session::new(transport, ResponseBuilder::new(config), sink, conn);
    if let Some(peer) = peer {
        session = session.with_peer(peer);
    }

    let summary = session.run();
    tracing::debug!(conn, requests = summary.requests, failed = summary.failure.is_some(), "connection closed");
}

fn resolve_addr(address: &str) -> io::Result<SocketAddr> {
    address.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, format!("{} resolves to no address", address))
    })
}

/// Listener con SO_REUSEADDR y backlog explícito
fn listen(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX))?;
    Ok(socket.into())
}

/// Detiene el acceptor de un `Server`
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    stop: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Marca el cierre y despierta al `accept` bloqueado
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);

        // conexión a nosotros mismos para desbloquear el accept
        let wake = wake_addr(self.addr);
        if let Err(e) = TcpStream::connect_timeout(&wake, WAKE_TIMEOUT) {
            tracing::debug!(%wake, error = %e, "wake-up connect failed");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Una dirección comodín se cambia por loopback de la misma familia
fn wake_addr(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, addr.port())
}
