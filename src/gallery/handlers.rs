//! # Handlers HTTP de la Galería
//! src/gallery/handlers.rs
//!
//! Implementa los endpoints de la galería:
//! - GET /, GET /gallery
//! - GET /images/<name>
//! - POST /upload
//! - POST /delete?name=<name>
//!
//! Cada handler traduce localmente los `GalleryError` a su código HTTP.

use super::page::render_gallery;
use super::store::GalleryStore;
use crate::error::GalleryError;
use crate::http::encoding::percent_decode;
use crate::http::{Request, Response, StatusCode};
use crate::multipart::UploadRequest;

/// Prefijo de la ruta de imágenes
pub const IMAGES_PREFIX: &str = "/images/";

/// Destino de las redirecciones después de subir o borrar
pub const GALLERY_PATH: &str = "/gallery";

/// Content type según la extensión; `image/png` si no se reconoce
///
/// # Ejemplo
/// ```
/// use gallery_server::gallery::handlers::content_type_for;
///
/// assert_eq!(content_type_for("cat.JPG"), "image/jpeg");
/// assert_eq!(content_type_for("noext"), "image/png");
/// ```
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => "image/png",
    }
}

/// Convierte un error de la galería en su response
fn error_response(error: &GalleryError) -> Response {
    let status = error.status();
    if status.is_server_error() {
        tracing::error!(error = %error, "error de la galería");
    } else {
        tracing::warn!(error = %error, status = status.as_u16(), "request rechazado");
    }
    Response::error(status, &error.to_string())
}

/// Handler para GET / y GET /gallery
///
/// Lista el directorio en cada request; no hay cache.
pub fn gallery_handler(_req: &Request, store: &GalleryStore) -> Response {
    match store.list() {
        Ok(images) => Response::html(&render_gallery(&images)),
        Err(e) => error_response(&e),
    }
}

/// Handler para GET /images/<name>
///
/// El nombre viene percent-encoded en el path.
pub fn image_handler(req: &Request, store: &GalleryStore) -> Response {
    let raw = req.path().strip_prefix(IMAGES_PREFIX).unwrap_or_default();
    let name = percent_decode(raw, false);

    match store.read(&name) {
        Ok(bytes) => Response::bytes(content_type_for(&name), bytes),
        Err(e) => error_response(&e),
    }
}

/// Handler para POST /upload
///
/// Espera un body `multipart/form-data` con un único archivo. Responde
/// 302 a `/gallery` si se guardó; 400 si el multipart es inválido; 500
/// si falla el disco.
pub fn upload_handler(req: &Request, store: &GalleryStore) -> Response {
    let upload = match UploadRequest::from_request(req) {
        Ok(upload) => upload,
        Err(e) => return error_response(&e),
    };

    tracing::debug!(
        filename = %upload.filename,
        boundary = %upload.boundary,
        bytes = upload.payload.len(),
        "upload decodificado"
    );

    match store.save(&upload.filename, upload.payload) {
        Ok(_) => Response::redirect(GALLERY_PATH),
        Err(e) => error_response(&e),
    }
}

/// Handler para POST /delete?name=NAME
///
/// Redirige a `/gallery` exista o no la imagen; sin `name` no hace nada.
/// Sólo un error de disco produce 500.
pub fn delete_handler(req: &Request, store: &GalleryStore) -> Response {
    if let Some(name) = req.query_param("name").filter(|n| !n.is_empty()) {
        if let Err(e) = store.delete(name) {
            return error_response(&e);
        }
    }
    Response::redirect(GALLERY_PATH)
}

/// Fallback para cualquier combinación método/ruta sin handler
pub fn not_found(req: &Request) -> Response {
    Response::error(
        StatusCode::NotFound,
        &format!("Route not found: {} {}", req.method().as_str(), req.path()),
    )
}
