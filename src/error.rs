//! # Errores de la Galería
//! src/error.rs
//!
//! Taxonomía de errores del subsistema de galería. Cada variante se
//! traduce a un código HTTP en el handler que la produjo; ningún error
//! cruza la frontera del worker.
//!
//! | Variante        | HTTP |
//! |-----------------|------|
//! | `NoBoundary`    | 400  |
//! | `MalformedBody` | 400  |
//! | `NoFilename`    | 400  |
//! | `EmptyPayload`  | 400  |
//! | `NotFound`      | 404  |
//! | `Io`            | 500  |

use crate::http::StatusCode;
use thiserror::Error;

/// Errores de parsing multipart y de acceso al directorio de imágenes
#[derive(Debug, Error)]
pub enum GalleryError {
    /// El `Content-Type` falta o no tiene parámetro `boundary=`
    #[error("missing multipart boundary")]
    NoBoundary,

    /// El body no tiene el separador de headers o no cierra con el boundary
    #[error("malformed multipart body")]
    MalformedBody,

    /// La parte no declara `filename="..."` ni `filename*=UTF-8''...`
    #[error("no filename in multipart part")]
    NoFilename,

    /// La parte existe pero el archivo viene vacío
    #[error("uploaded file is empty")]
    EmptyPayload,

    /// La imagen pedida no existe
    #[error("image not found: {0}")]
    NotFound(String),

    /// Error de disco o permisos
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    /// Código HTTP con el que se reporta este error
    pub fn status(&self) -> StatusCode {
        match self {
            GalleryError::NoBoundary
            | GalleryError::MalformedBody
            | GalleryError::NoFilename
            | GalleryError::EmptyPayload => StatusCode::BadRequest,
            GalleryError::NotFound(_) => StatusCode::NotFound,
            GalleryError::Io(_) => StatusCode::InternalServerError,
        }
    }

    /// Indica si el error lo causó el cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

/// Alias de `Result` para las operaciones de la galería
pub type Result<T> = std::result::Result<T, GalleryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        for err in [
            GalleryError::NoBoundary,
            GalleryError::MalformedBody,
            GalleryError::NoFilename,
            GalleryError::EmptyPayload,
        ] {
            assert_eq!(err.status(), StatusCode::BadRequest);
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = GalleryError::NotFound("a.png".to_string());
        assert_eq!(err.status(), StatusCode::NotFound);
        assert!(err.to_string().contains("a.png"));
    }

    #[test]
    fn test_io_maps_to_500() {
        let err: GalleryError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.status(), StatusCode::InternalServerError);
        assert!(!err.is_client_error());
    }
}
