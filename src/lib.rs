//! # Gallery Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 embebido, implementado desde cero sobre
//! `std::net`, que administra el directorio de imágenes de un slideshow:
//! subir, listar, servir y borrar imágenes, y avisar de cada cambio.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y construcción de mensajes HTTP/1.0
//! - `multipart`: Decodificación de `multipart/form-data` sobre bytes
//! - `gallery`: Store del directorio, notificador, página y handlers
//! - `router`: Enrutamiento de peticiones a handlers
//! - `server`: Acceptor TCP, workers y ciclo start/stop
//! - `slideshow`: Playlist que se recarga con cada cambio
//! - `config`, `logging`, `error`: infraestructura
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use gallery_server::config::Config;
//! use gallery_server::server::Server;
//!
//! let server = Server::new(Config::default());
//! let addr = server.start().expect("Error al iniciar servidor");
//! println!("escuchando en {}", addr);
//! server.stop();
//! ```

pub mod config;
pub mod error;
pub mod gallery;
pub mod http;
pub mod logging;
pub mod multipart;
pub mod router;
pub mod server;
pub mod slideshow;
