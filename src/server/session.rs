//! # Sesión de Conexión
//! src/server/session.rs
//!
//! Máquina de estados de una conexión:
//!
//! ```text
//! AwaitRequest → BuildResponse → Transmit ─┬─ keep-alive → AwaitRequest
//!                                          └─ si no      → Close
//! ```
//!
//! Cualquier falla de lectura o escritura termina la sesión sin responder.
//! `run` consume el transporte, así el socket se cierra en toda salida.

use crate::diagnostics::DiagnosticSink;
use crate::http::listing::ListingEncoder;
use crate::http::request::ParseError;
use crate::http::{BodyPlan, RequestLine, ResponseBuilder, ResponseSpec, ServeError};
use crate::server::transport::Transport;
use std::fs::File;
use std::io;
use std::net::SocketAddr;

/// Estados de la sesión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitRequest,
    BuildResponse,
    Transmit,
    Close,
}

/// Resultado de una sesión terminada
#[derive(Debug, Default)]
pub struct SessionSummary {
    /// Responses transmitidas completas
    pub requests: u64,

    /// Falla que cerró la sesión, si la hubo
    pub failure: Option<ServeError>,
}

/// Una conexión y su estado por iteración
pub struct Session<'a, T: Transport> {
    transport: T,
    builder: ResponseBuilder<'a>,
    sink: &'a DiagnosticSink,
    conn: u64,
    peer: Option<SocketAddr>,
    request: RequestLine,
    response: ResponseSpec,
    state: State,
}

impl<'a, T: Transport> Session<'a, T> {
    pub fn new(transport: T, builder: ResponseBuilder<'a>, sink: &'a DiagnosticSink, conn: u64) -> Self {
        Self {
            transport,
            builder,
            sink,
            conn,
            peer: None,
            request: RequestLine::new(),
            response: ResponseSpec::empty(),
            state: State::AwaitRequest,
        }
    }

    /// Dirección del peer para la transcripción
    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Corre la sesión hasta `Close`
    pub fn run(mut self) -> SessionSummary {
        let mut summary = SessionSummary::default();

        while self.state != State::Close {
            match self.step() {
                Ok(next) => {
                    if self.state == State::Transmit {
                        summary.requests += 1;
                    }
                    self.state = next;
                }
                Err(e) => {
                    tracing::debug!(conn = self.conn, error = %e, "session aborted");
                    summary.failure = Some(e);
                    self.state = State::Close;
                }
            }
        }

        summary
    }

    /// Ejecuta el estado actual y retorna el siguiente
    fn step(&mut self) -> Result<State, ServeError> {
        match self.state {
            State::AwaitRequest => self.await_request(),
            State::BuildResponse => {
                self.response = self.builder.build(&self.request);
                Ok(State::Transmit)
            }
            State::Transmit => self.transmit(),
            State::Close => Ok(State::Close),
        }
    }

    fn await_request(&mut self) -> Result<State, ServeError> {
        // nada de la iteración anterior sobrevive
        self.request.clear();
        self.response.clear();

        match self.request.read_from(&mut self.transport) {
            Ok(()) => {}
            Err(ParseError::ConnectionClosed) => {
                tracing::debug!(conn = self.conn, "peer closed the connection");
                return Ok(State::Close);
            }
            Err(ParseError::Io(e)) => return Err(ServeError::ConnectionFailure(e)),
            Err(e @ ParseError::TooManyLines) => {
                return Err(ServeError::ConnectionFailure(io::Error::new(io::ErrorKind::InvalidData, e)))
            }
        }

        if self.request.is_empty() {
            return Ok(State::Close);
        }

        self.sink.dump_lines(self.conn, self.peer, "REQ", self.request.lines());
        Ok(State::BuildResponse)
    }

    fn transmit(&mut self) -> Result<State, ServeError> {
        self.sink.dump_lines(self.conn, self.peer, "RES", &self.response.lines()[..]);

        self.transport
            .write_bytes(&self.response.head_bytes())
            .map_err(ServeError::ConnectionFailure)?;

        match self.response.body() {
            BodyPlan::None => {}
            BodyPlan::FixedBytes { source, len } => {
                // la status line ya salió: una falla acá sólo puede cerrar
                let mut file = File::open(source).map_err(ServeError::ConnectionFailure)?;
                self.transport
                    .transfer_file(&mut file, *len)
                    .map_err(ServeError::ConnectionFailure)?;
            }
            BodyPlan::ChunkedListing { target, single_file } => {
                ListingEncoder::new(target, *single_file)
                    .encode(&mut self.transport)
                    .map_err(ServeError::ConnectionFailure)?;
            }
        }

        self.transport.flush().map_err(ServeError::ConnectionFailure)?;

        if !self.response.is_empty() && self.request.wants_keep_alive() {
            Ok(State::AwaitRequest)
        } else {
            Ok(State::Close)
        }
    }
}
