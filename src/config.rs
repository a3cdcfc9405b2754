//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de la galería con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./gallery_server --port 5001 \
//!   --gallery-dir ./images \
//!   --max-workers 64 \
//!   --max-body-bytes 33554432
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! GALLERY_PORT=5001 GALLERY_HOST=0.0.0.0 ./gallery_server
//! ```

use clap::Parser;
use std::time::Duration;

/// Configuración del servidor de la galería
#[derive(Debug, Clone, Parser)]
#[command(name = "gallery_server")]
#[command(about = "Servidor HTTP/1.0 embebido para administrar la galería del slideshow")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "5001", env = "GALLERY_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "GALLERY_HOST")]
    pub host: String,

    /// Directorio de imágenes del slideshow
    #[arg(long = "gallery-dir", default_value = "./images", env = "GALLERY_DIR")]
    pub gallery_dir: String,

    // === Concurrencia ===
    /// Máximo de workers simultáneos (0 = sin límite)
    #[arg(long = "max-workers", default_value = "64", env = "GALLERY_MAX_WORKERS")]
    pub max_workers: usize,

    // === Límites por request ===
    /// Tamaño máximo del body en bytes
    #[arg(long = "max-body-bytes", default_value = "33554432", env = "GALLERY_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Timeout de lectura del socket en segundos (0 = sin timeout)
    #[arg(long = "read-timeout", default_value = "30", env = "GALLERY_READ_TIMEOUT")]
    pub read_timeout_secs: u64,

    // === Logging ===
    /// Nivel de log cuando RUST_LOG no está definido
    #[arg(long = "log-level", default_value = "info", env = "GALLERY_LOG")]
    pub log_level: String,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI y entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use gallery_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:5001");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout de lectura, `None` si está desactivado
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }

    /// Límite de workers, `None` si es ilimitado
    pub fn worker_limit(&self) -> Option<usize> {
        (self.max_workers > 0).then_some(self.max_workers)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.gallery_dir.trim().is_empty() {
            return Err("Gallery dir must not be empty".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("Max body bytes must be >= 1".to_string());
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        tracing::info!(
            address = %self.address(),
            gallery_dir = %self.gallery_dir,
            max_workers = %self.worker_limit().map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
            max_body_bytes = self.max_body_bytes,
            read_timeout_secs = self.read_timeout_secs,
            "configuración cargada"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto, sin leer argv ni entorno
    fn default() -> Self {
        Self {
            port: 5001,
            host: "0.0.0.0".to_string(),
            gallery_dir: "./images".to_string(),
            max_workers: 64,
            max_body_bytes: 32 * 1024 * 1024,
            read_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}
