//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa la parte concurrente del servidor:
//! 1. Escucha en un puerto (`tcp`)
//! 2. Entrega cada conexión aceptada al pool de workers (`pool`)
//! 3. Corre la sesión de la conexión hasta cerrarla (`session`)
//! 4. Abstrae el socket para poder probar sesiones en memoria (`transport`)

pub mod pool;
pub mod session;
pub mod tcp;
pub mod transport;

// Re-exportar para facilitar el uso
pub use pool::{PoolError, WorkerPool};
pub use session::{Session, SessionSummary, State};
pub use tcp::{Server, ShutdownHandle};
pub use transport::{StreamTransport, TcpTransport, Transport};
