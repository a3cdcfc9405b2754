//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones en un thread propio
//! 3. Atiende cada conexión en un worker (acotado por `WorkerLimiter`)
//! 4. Se detiene a pedido sin matar a los workers en curso

pub mod limiter;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use limiter::{WorkerLimiter, WorkerPermit};
pub use tcp::Server;
