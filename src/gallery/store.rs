//! # Almacén de la Galería
//! src/gallery/store.rs
//!
//! Dueño del directorio de imágenes en disco. No hay índice en memoria:
//! cada `list` vuelve a leer el directorio, que es la única fuente de
//! verdad.
//!
//! ## Concurrencia
//!
//! - `save` y `delete` toman un único lock de mutación, así dos uploads
//!   del mismo nombre no se pisan a medio escribir (gana el último).
//! - `list` y `read` no toman lock. Un `read` después de un `list` puede
//!   dar `NotFound` si otro worker borró la imagen entre medio.
//! - `save` escribe a un archivo temporal dentro de `<dir>/.incoming/` y
//!   lo renombra, así un `read` concurrente nunca ve una imagen a medias.
//!   Los temporales no comparten espacio de nombres con las imágenes.

use super::notifier::{ChangeEvent, ChangeNotifier};
use crate::error::{GalleryError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};

/// Subdirectorio de los temporales de `save`; `list` lo omite por no
/// ser un archivo regular
const INCOMING_DIR: &str = ".incoming";

/// Reduce un nombre enviado por el cliente a un basename seguro
///
/// Descarta cualquier componente de directorio (separadores `/` y `\`)
/// y los bytes NUL. Los nombres especiales `.` y `..` y el nombre del
/// directorio de temporales se rechazan. Retorna `None` si no queda nada
/// utilizable. El resto del nombre se conserva tal cual, espacios
/// incluidos.
///
/// # Ejemplo
/// ```
/// use gallery_server::gallery::sanitize_filename;
///
/// assert_eq!(sanitize_filename("../../evil.png").as_deref(), Some("evil.png"));
/// assert_eq!(sanitize_filename("C:\\fotos\\cat.jpg").as_deref(), Some("cat.jpg"));
/// assert_eq!(sanitize_filename("uploads/"), None);
/// ```
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let base: String = base.chars().filter(|c| *c != '\0').collect();

    if base.is_empty() || base == "." || base == ".." || base == INCOMING_DIR {
        return None;
    }
    Some(base)
}

/// Nombre para uploads cuyo nombre quedó vacío tras sanitizar
fn timestamp_name() -> String {
    chrono::Local::now().format("uploaded_%Y%m%d_%H%M%S.jpg").to_string()
}


/// Crea `<dir>/.incoming` si falta; nunca crea el directorio de la galería
fn create_incoming(incoming: &Path) -> std::io::Result<()> {
    match fs::create_dir(incoming) {
        Err(e) if e.kind() != ErrorKind::AlreadyExists => Err(e),
        _ => Ok(()),
    }
}

/// Directorio de imágenes compartido por todos los workers
#[derive(Debug)]
pub struct GalleryStore {
    dir: PathBuf,
    notifier: Arc<ChangeNotifier>,
    mutation_lock: Mutex<()>,
}

impl GalleryStore {
    /// Crea un store sobre `dir` con su propio notificador
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_notifier(dir, Arc::new(ChangeNotifier::new()))
    }

    /// Crea un store que publica en un notificador compartido
    pub fn with_notifier(dir: impl Into<PathBuf>, notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            dir: dir.into(),
            notifier,
            mutation_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Atajo para `notifier().subscribe()`
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    /// Crea el directorio si no existe
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Lista los archivos regulares del directorio
    ///
    /// El orden es el de enumeración del sistema de archivos, no está
    /// garantizado. Los nombres que no son UTF-8 se omiten.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        Ok(names)
    }

    /// Guarda `bytes` como `<dir>/<filename>` sobrescribiendo si existe
    ///
    /// Retorna el nombre final con el que quedó guardado. Notifica un
    /// cambio si la escritura tuvo éxito.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let name = sanitize_filename(filename).unwrap_or_else(timestamp_name);
        let target = self.dir.join(&name);
        let incoming = self.dir.join(INCOMING_DIR);
        let temp = incoming.join(&name);

        {
            let _guard = self.mutation_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let written = create_incoming(&incoming)
                .and_then(|_| fs::write(&temp, bytes))
                .and_then(|_| fs::rename(&temp, &target));
            if let Err(e) = written {
                let _ = fs::remove_file(&temp);
                tracing::error!(file = %name, error = %e, "no se pudo guardar la imagen");
                return Err(e.into());
            }
        }

        tracing::info!(file = %name, bytes = bytes.len(), "imagen guardada");
        self.notifier.notify();
        Ok(name)
    }

    /// Lee los bytes de una imagen
    pub fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let name = sanitize_filename(filename).ok_or_else(|| GalleryError::NotFound(filename.to_string()))?;
        let path = self.dir.join(&name);

        if !path.is_file() {
            return Err(GalleryError::NotFound(name));
        }

        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GalleryError::NotFound(name),
            _ => GalleryError::Io(e),
        })
    }

    /// Borra una imagen
    ///
    /// Borrar algo que no existe no es un error: retorna `Ok(false)` y
    /// no notifica. Retorna `Ok(true)` si se borró un archivo.
    pub fn delete(&self, filename: &str) -> Result<bool> {
        let Some(name) = sanitize_filename(filename) else {
            return Ok(false);
        };
        let path = self.dir.join(&name);

        let removed = {
            let _guard = self.mutation_lock.lock().unwrap_or_else(PoisonError::into_inner);
            match fs::remove_file(&path) {
                Ok(()) => true,
                Err(e) if e.kind() == ErrorKind::NotFound => false,
                Err(e) => {
                    tracing::error!(file = %name, error = %e, "no se pudo borrar la imagen");
                    return Err(e.into());
                }
            }
        };

        if removed {
            tracing::info!(file = %name, "imagen borrada");
            self.notifier.notify();
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, GalleryStore) {
        let dir = TempDir::new().unwrap();
        let store = GalleryStore::new(dir.path().join("images"));
        store.ensure_dir().unwrap();
        (dir, store)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a.png").as_deref(), Some("a.png"));
        assert_eq!(sanitize_filename("../../evil.png").as_deref(), Some("evil.png"));
        assert_eq!(sanitize_filename("/etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("..\\..\\win.jpg").as_deref(), Some("win.jpg"));
        assert_eq!(sanitize_filename("a\0b.png").as_deref(), Some("ab.png"));
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename(".incoming"), None);
        assert_eq!(sanitize_filename(" a.png").as_deref(), Some(" a.png"));
        assert_eq!(sanitize_filename(".holiday.png.part").as_deref(), Some(".holiday.png.part"));
    }

    #[test]
    fn test_timestamp_name_format() {
        let name = timestamp_name();
        assert!(name.starts_with("uploaded_"));
        assert!(name.ends_with(".jpg"));
        // uploaded_YYYYMMDD_HHMMSS.jpg
        assert_eq!(name.len(), "uploaded_20240101_120000.jpg".len());
    }

    #[test]
    fn test_ensure_dir_creates_directory() {
        let (_tmp, store) = store();
        assert!(store.dir().is_dir());
        // Idempotente
        store.ensure_dir().unwrap();
    }

    #[test]
    fn test_save_then_read_roundtrip() {
        let (_tmp, store) = store();
        let bytes = vec![0x89, b'P', b'N', b'G', 0x00, 0xFF, b'\r', b'\n'];

        let name = store.save("a.png", &bytes).unwrap();
        assert_eq!(name, "a.png");
        assert_eq!(store.read("a.png").unwrap(), bytes);
    }

    #[test]
    fn test_save_overwrites_same_name() {
        let (_tmp, store) = store();

        store.save("a.png", b"first").unwrap();
        store.save("a.png", b"second").unwrap();

        assert_eq!(store.read("a.png").unwrap(), b"second");
        assert_eq!(store.list().unwrap(), vec!["a.png".to_string()]);
    }

    #[test]
    fn test_save_strips_path_traversal() {
        let (tmp, store) = store();

        let name = store.save("../../evil.png", b"x").unwrap();

        assert_eq!(name, "evil.png");
        assert!(store.dir().join("evil.png").is_file());
        assert!(!tmp.path().join("evil.png").exists());
    }

    #[test]
    fn test_save_empty_name_uses_timestamp() {
        let (_tmp, store) = store();

        let name = store.save("some/dir/", b"x").unwrap();

        assert!(name.starts_with("uploaded_"));
        assert_eq!(store.read(&name).unwrap(), b"x");
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (_tmp, store) = store();
        store.save("a.png", b"x").unwrap();

        let files: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_type().unwrap().is_file())
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(fs::read_dir(store.dir().join(".incoming")).unwrap().count(), 0);
    }

    #[test]
    fn test_list_skips_directories() {
        let (_tmp, store) = store();
        store.save("a.png", b"a").unwrap();
        store.save("b.jpg", b"b").unwrap();
        fs::create_dir(store.dir().join("nested")).unwrap();

        let mut names = store.list().unwrap();
        names.sort();
        assert_eq!(names, vec!["a.png".to_string(), "b.jpg".to_string()]);
        assert!(store.dir().join(".incoming").is_dir());
    }

    #[test]
    fn test_temp_like_names_are_regular_images() {
        let (_tmp, store) = store();

        let name = store.save(".holiday.png.part", b"img").unwrap();
        assert_eq!(name, ".holiday.png.part");
        assert_eq!(store.list().unwrap(), vec![name.clone()]);
        assert_eq!(store.read(&name).unwrap(), b"img");

        assert!(store.delete(&name).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_keeps_surrounding_spaces() {
        let (_tmp, store) = store();

        assert_eq!(store.save(" a.png", b"x").unwrap(), " a.png");
        assert!(store.dir().join(" a.png").is_file());
        assert!(!store.dir().join("a.png").exists());
    }

    #[test]
    fn test_save_reserved_incoming_name_uses_timestamp() {
        let (_tmp, store) = store();

        let name = store.save(".incoming", b"x").unwrap();
        assert!(name.starts_with("uploaded_"));
        assert_eq!(store.list().unwrap(), vec![name]);
    }

    #[test]
    fn test_list_missing_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let store = GalleryStore::new(tmp.path().join("missing"));

        assert!(matches!(store.list(), Err(GalleryError::Io(_))));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_tmp, store) = store();
        assert!(matches!(store.read("missing.png"), Err(GalleryError::NotFound(_))));
        assert!(matches!(store.read(""), Err(GalleryError::NotFound(_))));
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let (_tmp, store) = store();
        fs::create_dir(store.dir().join("sub")).unwrap();

        assert!(matches!(store.read("sub"), Err(GalleryError::NotFound(_))));
    }

    #[test]
    fn test_read_cannot_escape_directory() {
        let (tmp, store) = store();
        fs::write(tmp.path().join("secret.txt"), b"secret").unwrap();

        assert!(matches!(store.read("../secret.txt"), Err(GalleryError::NotFound(_))));
    }

    #[test]
    fn test_delete_existing() {
        let (_tmp, store) = store();
        store.save("a.png", b"a").unwrap();

        assert!(store.delete("a.png").unwrap());
        assert!(matches!(store.read("a.png"), Err(GalleryError::NotFound(_))));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let (_tmp, store) = store();
        assert!(!store.delete("missing.png").unwrap());
        assert!(!store.delete("").unwrap());
    }

    #[test]
    fn test_save_and_delete_notify_once() {
        let (_tmp, store) = store();
        let rx = store.subscribe();

        store.save("a.png", b"a").unwrap();
        assert_eq!(rx.try_recv(), Ok(ChangeEvent));
        assert!(rx.try_recv().is_err());

        store.delete("a.png").unwrap();
        assert_eq!(rx.try_recv(), Ok(ChangeEvent));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_read_list_and_noop_delete_do_not_notify() {
        let (_tmp, store) = store();
        store.save("a.png", b"a").unwrap();
        let rx = store.subscribe();

        store.list().unwrap();
        store.read("a.png").unwrap();
        store.delete("missing.png").unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_save_does_not_notify() {
        let tmp = TempDir::new().unwrap();
        let store = GalleryStore::new(tmp.path().join("never-created"));
        let rx = store.subscribe();

        assert!(matches!(store.save("a.png", b"a"), Err(GalleryError::Io(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_saves_distinct_names() {
        let (_tmp, store) = store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let name = format!("img{}.png", i);
                    store.save(&name, name.as_bytes()).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list().unwrap().len(), 8);
        for i in 0..8 {
            let name = format!("img{}.png", i);
            assert_eq!(store.read(&name).unwrap(), name.as_bytes());
        }
    }
}
