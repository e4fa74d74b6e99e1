//! # Pool de Workers
//! src/server/pool.rs
//!
//! Cantidad fija de threads que consumen una cola FIFO compartida.
//! La cola no tiene límite: el acceptor nunca espera a los workers.

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Trabajo a ejecutar en un worker
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errores del pool
#[derive(Debug)]
pub enum PoolError {
    /// El pool ya recibió `shutdown`
    ShuttingDown,

    /// No se pudo crear un thread
    Spawn(io::Error),
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::ShuttingDown => write!(f, "Worker pool is shutting down"),
            PoolError::Spawn(e) => write!(f, "Cannot spawn worker thread: {}", e),
        }
    }
}

impl std::error::Error for PoolError {}

#[derive(Default)]
struct PoolState {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

/// Cola compartida entre el pool y sus workers
#[derive(Default)]
struct Shared {
    state: Mutex<PoolState>,
    condvar: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bloquea hasta que haya un job; `None` si el pool terminó y la cola está vacía
    fn next_job(&self) -> Option<Job> {
        let mut state = self.lock();
        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            if state.shutdown {
                return None;
            }
            state = self.condvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Pool de tamaño fijo
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Crea el pool e inicia `size` workers (`worker-0` … `worker-N`)
    pub fn new(size: usize) -> Result<Self, PoolError> {
        let pool = Self {
            shared: Arc::new(Shared::default()),
            workers: Mutex::new(Vec::with_capacity(size)),
            size,
        };
        pool.spawn_workers()?;
        Ok(pool)
    }

    fn spawn_workers(&self) -> Result<(), PoolError> {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);

        for i in 0..self.size {
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || Self::worker_loop(shared))
                .map_err(PoolError::Spawn)?;
            workers.push(handle);
        }

        Ok(())
    }

    /// Loop principal del worker
    fn worker_loop(shared: Arc<Shared>) {
        tracing::trace!("worker started");

        while let Some(job) = shared.next_job() {
            // un pánico en un job no se lleva al worker
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                tracing::error!("job panicked; worker continues");
            }
        }

        tracing::trace!("worker stopped");
    }

    /// Encola un job
    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(PoolError::ShuttingDown);
        }

        state.jobs.push_back(Box::new(job));
        self.shared.condvar.notify_one();
        Ok(())
    }

    /// Deja de aceptar jobs; los ya encolados se terminan de ejecutar
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        state.shutdown = true;
        self.shared.condvar.notify_all();
    }

    /// Espera a que terminen todos los workers
    pub fn join(&self) {
        let handles: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Jobs esperando un worker libre
    pub fn queued(&self) -> usize {
        self.shared.lock().jobs.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_runs_all_jobs() {
        let pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        pool.join();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert_eq!(pool.queued(), 0);
    }

    #[test]
    fn test_worker_thread_names() {
        let pool = WorkerPool::new(1).unwrap();
        let (tx, rx) = mpsc::channel();

        pool.submit(move || {
            let name = thread::current().name().map(str::to_string);
            tx.send(name).unwrap();
        })
        .unwrap();

        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("worker-0"));
    }

    #[test]
    fn test_jobs_run_concurrently() {
        let pool = WorkerPool::new(2).unwrap();
        let (tx, rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));

        // el primer job bloquea hasta que el segundo haya corrido
        let blocker = Arc::clone(&release_rx);
        pool.submit(move || {
            blocker.lock().unwrap().recv().unwrap();
        })
        .unwrap();

        pool.submit(move || {
            tx.send("second").unwrap();
        })
        .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "second");
        release_tx.send(()).unwrap();

        pool.shutdown();
        pool.join();
    }

    #[test]
    fn test_panic_does_not_kill_worker() {
        let pool = WorkerPool::new(1).unwrap();
        let (tx, rx) = mpsc::channel();

        pool.submit(|| panic!("boom")).unwrap();
        pool.submit(move || tx.send(42).unwrap()).unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
    }

    #[test]
    fn test_submit_after_shutdown() {
        let pool = WorkerPool::new(2).unwrap();
        pool.shutdown();

        let result = pool.submit(|| {});
        assert!(matches!(result, Err(PoolError::ShuttingDown)));
        pool.join();
    }

    #[test]
    fn test_size() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.size(), 3);
    }
}
