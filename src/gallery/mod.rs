//! # Galería
//! src/gallery/mod.rs
//!
//! Todo lo que manipula el conjunto de imágenes del slideshow:
//!
//! - `store`: directorio en disco (listar, guardar, leer, borrar)
//! - `notifier`: señal de cambio hacia la capa de display
//! - `page`: HTML de la galería
//! - `handlers`: endpoints HTTP sobre el store

pub mod handlers;
pub mod notifier;
pub mod page;
pub mod store;

pub use notifier::{ChangeEvent, ChangeNotifier};
pub use store::{sanitize_filename, GalleryStore};
