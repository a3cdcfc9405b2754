//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing-subscriber`. `RUST_LOG` tiene prioridad; si no
//! está definido se usa el nivel de la configuración.

use tracing_subscriber::EnvFilter;

/// Instala el subscriber global
///
/// Llamarlo más de una vez no falla: la segunda instalación se ignora.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
