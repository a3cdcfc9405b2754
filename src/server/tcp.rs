//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Acceptor de la galería. Un thread dedicado bloquea en `accept`; cada
//! conexión aceptada se procesa en su propio thread, acotado por el
//! [`WorkerLimiter`].
//!
//! ## Estados
//!
//! ```text
//! Stopped ──start()──► Listening ──stop()──► Stopped
//! ```
//!
//! `start()` sobre un servidor que ya escucha no hace nada. `stop()`
//! apaga la bandera, despierta al acceptor (esté en `accept` o
//! esperando un permiso del limiter) y lo espera. Los workers en curso
//! terminan solos; `stop()` nunca los espera.

use super::limiter::WorkerLimiter;
use crate::config::Config;
use crate::error::Result;
use crate::gallery::{ChangeEvent, GalleryStore};
use crate::http::request::{declared_content_length, HEADER_TERMINATOR};
use crate::http::{find_subsequence, Request, Response, StatusCode};
use crate::router::Router;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Tamaño máximo de request line + headers
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Tamaño del buffer de lectura del socket
const READ_CHUNK: usize = 8192;

/// Resultado de leer un request del socket
#[derive(Debug, PartialEq, Eq)]
enum ReadOutcome {
    /// El cliente cerró sin enviar nada
    Closed,
    /// Head + body según `Content-Length` (o lo que llegó antes del EOF)
    Complete(Vec<u8>),
    /// Los headers superan `MAX_HEAD_BYTES`
    HeadTooLarge,
    /// El `Content-Length` declarado supera el máximo configurado
    BodyTooLarge(usize),
}

/// Lee un request completo: headers hasta `\r\n\r\n` y después
/// exactamente `Content-Length` bytes de body
fn read_request(stream: &mut impl Read, max_body_bytes: usize) -> io::Result<ReadOutcome> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let mut scanned = 0;

    let head_end = loop {
        if let Some(pos) = find_subsequence(&buffer, HEADER_TERMINATOR, scanned) {
            break pos;
        }
        // El terminador podría quedar partido entre dos lecturas
        scanned = buffer.len().saturating_sub(HEADER_TERMINATOR.len() - 1);

        if buffer.len() > MAX_HEAD_BYTES {
            return Ok(ReadOutcome::HeadTooLarge);
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            // Head incompleto: que el parser decida
            return Ok(if buffer.is_empty() {
                ReadOutcome::Closed
            } else {
                ReadOutcome::Complete(buffer)
            });
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let body_len = match declared_content_length(&buffer[..head_end]) {
        Ok(len) => len.unwrap_or(0),
        // Content-Length inválido: el parser lo reporta como 400
        Err(_) => return Ok(ReadOutcome::Complete(buffer)),
    };
    if body_len > max_body_bytes {
        return Ok(ReadOutcome::BodyTooLarge(body_len));
    }

    let total = head_end + HEADER_TERMINATOR.len() + body_len;
    buffer.reserve(total.saturating_sub(buffer.len()));
    while buffer.len() < total {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    Ok(ReadOutcome::Complete(buffer))
}

/// Todo lo que un worker necesita para atender una conexión
#[derive(Clone)]
struct ConnectionContext {
    router: Arc<Router>,
    max_body_bytes: usize,
    read_timeout: Option<Duration>,
}

impl ConnectionContext {
    fn from_config(config: &Config, router: Arc<Router>) -> Self {
        Self {
            router,
            max_body_bytes: config.max_body_bytes,
            read_timeout: config.read_timeout(),
        }
    }
}

/// Respuesta generada antes de llegar al router
fn early_response(status: StatusCode, message: &str) -> Response {
    Response::error(status, message).with_header("Connection", "close")
}

/// Atiende una conexión: lee, despacha, responde y cierra
fn handle_connection(mut stream: TcpStream, ctx: &ConnectionContext) -> io::Result<()> {
    let start = Instant::now();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    stream.set_read_timeout(ctx.read_timeout)?;

    let (response, target) = match read_request(&mut stream, ctx.max_body_bytes) {
        Ok(ReadOutcome::Closed) => {
            tracing::debug!(%peer, "conexión cerrada sin datos");
            return Ok(());
        }
        Ok(ReadOutcome::Complete(bytes)) => match Request::parse(&bytes) {
            Ok(request) => {
                let target = format!("{} {}", request.method().as_str(), request.path());
                tracing::debug!(%peer, request = %target, bytes = bytes.len(), "request recibido");
                (ctx.router.route(&request), target)
            }
            Err(e) => {
                tracing::warn!(%peer, error = %e, "request inválido");
                (early_response(StatusCode::BadRequest, &format!("Invalid: {}", e)), "-".to_string())
            }
        },
        Ok(ReadOutcome::HeadTooLarge) => (
            early_response(StatusCode::BadRequest, "Request header too large"),
            "-".to_string(),
        ),
        Ok(ReadOutcome::BodyTooLarge(declared)) => {
            tracing::warn!(%peer, declared, limit = ctx.max_body_bytes, "body demasiado grande");
            (
                early_response(StatusCode::PayloadTooLarge, "Request body too large"),
                "-".to_string(),
            )
        }
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            tracing::warn!(%peer, "timeout leyendo el request");
            (early_response(StatusCode::RequestTimeout, "Request timeout"), "-".to_string())
        }
        Err(e) => return Err(e),
    };

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;
    let _ = stream.shutdown(Shutdown::Write);

    tracing::info!(
        %peer,
        request = %target,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request atendido"
    );

    Ok(())
}

/// Loop del acceptor: corre hasta que `running` se apaga
fn accept_loop(
    listener: TcpListener,
    running: Arc<AtomicBool>,
    limiter: Arc<WorkerLimiter>,
    ctx: ConnectionContext,
) {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match stream {
            Ok(stream) => {
                // Con el límite lleno esto espera; si el servidor se
                // detiene mientras tanto, la conexión se descarta
                let Some(permit) = limiter.acquire(&running) else {
                    drop(stream);
                    break;
                };
                let ctx = ctx.clone();

                let spawned = thread::Builder::new()
                    .name("gallery-worker".to_string())
                    .spawn(move || {
                        let _permit = permit;
                        if let Err(e) = handle_connection(stream, &ctx) {
                            tracing::debug!(error = %e, "error de socket en worker");
                        }
                    });

                if let Err(e) = spawned {
                    tracing::error!(error = %e, "no se pudo crear el thread del worker");
                }
            }
            Err(e) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                tracing::error!(error = %e, "error al aceptar conexión");
            }
        }
    }

    tracing::info!("acceptor detenido");
}

/// Dirección a la que conectarse para despertar el `accept`
fn wake_address(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}

struct Listening {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    acceptor: JoinHandle<()>,
}

enum ServerState {
    Stopped,
    Listening(Listening),
}

/// Servidor HTTP/1.0 de la galería
pub struct Server {
    config: Config,
    store: Arc<GalleryStore>,
    router: Arc<Router>,
    limiter: Arc<WorkerLimiter>,
    state: Mutex<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(GalleryStore::new(&config.gallery_dir));
        Self::with_store(config, store)
    }

    /// Crea el servidor sobre un store ya construido
    pub fn with_store(config: Config, store: Arc<GalleryStore>) -> Self {
        let router = Arc::new(Router::gallery(Arc::clone(&store)));
        let limiter = Arc::new(WorkerLimiter::new(config.worker_limit()));

        Self {
            config,
            store,
            router,
            limiter,
            state: Mutex::new(ServerState::Stopped),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<GalleryStore> {
        &self.store
    }

    /// Suscribe a los cambios de la galería
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.store.subscribe()
    }

    /// Crea el directorio, hace bind y lanza el acceptor
    ///
    /// Retorna la dirección efectiva (útil con puerto 0). Si ya está
    /// escuchando retorna la dirección actual sin hacer nada más.
    pub fn start(&self) -> Result<SocketAddr> {
        let mut state = self.lock_state();
        if let ServerState::Listening(listening) = &*state {
            return Ok(listening.local_addr);
        }

        self.store.ensure_dir()?;

        let address = self.config.address();
        tracing::info!(%address, "iniciando servidor");
        let listener = TcpListener::bind(&address)?;
        let local_addr = listener.local_addr()?;

        let running = Arc::new(AtomicBool::new(true));
        let acceptor = {
            let running = Arc::clone(&running);
            let limiter = Arc::clone(&self.limiter);
            let ctx = ConnectionContext::from_config(&self.config, Arc::clone(&self.router));
            thread::Builder::new()
                .name("gallery-acceptor".to_string())
                .spawn(move || accept_loop(listener, running, limiter, ctx))?
        };

        tracing::info!(
            %local_addr,
            gallery_dir = %self.store.dir().display(),
            max_workers = ?self.limiter.limit(),
            "servidor escuchando"
        );

        *state = ServerState::Listening(Listening {
            local_addr,
            running,
            acceptor,
        });
        Ok(local_addr)
    }

    /// Detiene el acceptor; no hace nada si ya está detenido
    pub fn stop(&self) {
        let previous = std::mem::replace(&mut *self.lock_state(), ServerState::Stopped);
        let ServerState::Listening(listening) = previous else {
            return;
        };

        listening.running.store(false, Ordering::SeqCst);
        self.limiter.wake_all();

        // Despertar el accept bloqueado
        let wake = wake_address(listening.local_addr);
        if let Err(e) = TcpStream::connect_timeout(&wake, Duration::from_secs(1)) {
            tracing::warn!(error = %e, "no se pudo despertar al acceptor");
        }

        if listening.acceptor.join().is_err() {
            tracing::error!("el thread del acceptor terminó con panic");
        }
        tracing::info!(local_addr = %listening.local_addr, "servidor detenido");
    }

    pub fn is_listening(&self) -> bool {
        matches!(*self.lock_state(), ServerState::Listening(_))
    }

    /// Dirección en la que escucha, si está escuchando
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.lock_state() {
            ServerState::Listening(listening) => Some(listening.local_addr),
            ServerState::Stopped => None,
        }
    }

    /// Workers atendiendo conexiones en este momento
    pub fn active_workers(&self) -> usize {
        self.limiter.active()
    }

    fn lock_state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}
