//! # Gallery Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de la galería.
//!
//! Levanta el servidor y hace de "capa de display": mantiene la
//! playlist del slideshow y la recarga con cada cambio.

use gallery_server::config::Config;
use gallery_server::logging;
use gallery_server::server::Server;
use gallery_server::slideshow::Playlist;
use std::sync::{Arc, Mutex};

fn main() {
    let config = Config::new();
    logging::init(&config.log_level);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "configuración inválida");
        std::process::exit(1);
    }
    config.print_summary();

    let server = Server::new(config);
    let events = server.subscribe();

    let addr = match server.start() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "error fatal al iniciar el servidor");
            std::process::exit(1);
        }
    };
    tracing::info!("galería disponible en http://{}/gallery", addr);

    let playlist = match Playlist::load(server.store().dir()) {
        Ok(playlist) => playlist,
        Err(e) => {
            tracing::error!(error = %e, "no se pudo leer el directorio de la galería");
            std::process::exit(1);
        }
    };
    tracing::info!(images = playlist.len(), "slideshow cargado");

    let playlist = Arc::new(Mutex::new(playlist));
    let handle = match Playlist::follow(playlist, events) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "no se pudo lanzar el thread del slideshow");
            std::process::exit(1);
        }
    };

    // El store mantiene vivo el notificador, así que el canal nunca se
    // cierra: el proceso vive hasta que lo matan. Sólo un panic del
    // thread del slideshow llega acá.
    if handle.join().is_err() {
        tracing::error!("el thread del slideshow terminó con panic");
        std::process::exit(1);
    }
}
