//! # Playlist del Slideshow
//! src/slideshow.rs
//!
//! Lado consumidor de las notificaciones: la lista ordenada de imágenes
//! que muestra el slideshow y el índice de la imagen actual. Se recarga
//! desde disco cada vez que la galería avisa un cambio.

use crate::error::Result;
use crate::gallery::ChangeEvent;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Extensiones que el slideshow sabe mostrar
const SLIDESHOW_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

fn is_slideshow_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SLIDESHOW_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Imágenes del slideshow en orden de nombre
#[derive(Debug, Clone)]
pub struct Playlist {
    dir: PathBuf,
    images: Vec<PathBuf>,
    index: usize,
}

impl Playlist {
    /// Lee el directorio y arma la playlist
    ///
    /// Un directorio inexistente produce una playlist vacía.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let mut playlist = Self {
            dir: dir.into(),
            images: Vec::new(),
            index: 0,
        };
        playlist.reload()?;
        Ok(playlist)
    }

    /// Vuelve a leer el directorio y reinicia el índice
    pub fn reload(&mut self) -> Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.images.clear();
                self.index = 0;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_slideshow_image(&path) {
                images.push(path);
            }
        }
        images.sort();

        self.images = images;
        self.index = 0;
        tracing::debug!(dir = %self.dir.display(), images = self.images.len(), "playlist recargada");
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    /// Imagen actual, `None` si la playlist está vacía
    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.index).map(PathBuf::as_path)
    }

    /// Pasa a la siguiente imagen, volviendo al inicio al final
    pub fn advance(&mut self) -> Option<&Path> {
        if self.images.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.images.len();
        self.current()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Recarga `playlist` en un thread propio por cada evento recibido
    ///
    /// El thread termina cuando el canal se cierra (todos los emisores
    /// dropeados).
    pub fn follow(
        playlist: Arc<Mutex<Playlist>>,
        events: Receiver<ChangeEvent>,
    ) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("slideshow-refresh".to_string())
            .spawn(move || {
                for _event in events {
                    let mut playlist = playlist.lock().unwrap_or_else(PoisonError::into_inner);
                    match playlist.reload() {
                        Ok(()) => tracing::info!(images = playlist.len(), "slideshow actualizado"),
                        Err(e) => tracing::error!(error = %e, "no se pudo recargar el slideshow"),
                    }
                }
                tracing::debug!("canal de cambios cerrado");
            })
    }
}
