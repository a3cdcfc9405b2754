//! # Extracción del Boundary
//! src/multipart/boundary.rs
//!
//! Obtiene el delimitador de partes desde el header `Content-Type`.
//!
//! ```text
//! Content-Type: multipart/form-data; boundary=----WebKitFormBoundaryX
//!                                            └──────── boundary ─────┘
//! ```
//!
//! El boundary es todo lo que sigue a `boundary=` hasta el final del
//! valor. Un boundary entre comillas (`boundary="abc"`) o seguido de
//! otros parámetros se toma literalmente, comillas incluidas.

use crate::error::{GalleryError, Result};

const BOUNDARY_PARAM: &str = "boundary=";

/// Retorna el boundary con el prefijo `--` tal como aparece en el body
///
/// # Errores
///
/// `NoBoundary` si el header falta, no tiene `boundary=` o el valor
/// está vacío.
///
/// # Ejemplo
/// ```
/// use gallery_server::multipart::extract_boundary;
///
/// let boundary = extract_boundary(Some("multipart/form-data; boundary=XYZ")).unwrap();
/// assert_eq!(boundary, "--XYZ");
/// assert!(extract_boundary(Some("text/plain")).is_err());
/// ```
pub fn extract_boundary(content_type: Option<&str>) -> Result<String> {
    let content_type = content_type.ok_or(GalleryError::NoBoundary)?;
    let idx = content_type.find(BOUNDARY_PARAM).ok_or(GalleryError::NoBoundary)?;

    let value = &content_type[idx + BOUNDARY_PARAM.len()..];
    if value.is_empty() {
        return Err(GalleryError::NoBoundary);
    }

    Ok(format!("--{}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_boundary() {
        let boundary = extract_boundary(Some("multipart/form-data; boundary=XYZ")).unwrap();
        assert_eq!(boundary, "--XYZ");
    }

    #[test]
    fn test_extract_browser_boundary() {
        let ct = "multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxkTrZu0gW";
        assert_eq!(
            extract_boundary(Some(ct)).unwrap(),
            "------WebKitFormBoundary7MA4YWxkTrZu0gW"
        );
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(extract_boundary(None), Err(GalleryError::NoBoundary)));
    }

    #[test]
    fn test_no_boundary_param() {
        assert!(matches!(
            extract_boundary(Some("text/plain")),
            Err(GalleryError::NoBoundary)
        ));
        assert!(matches!(
            extract_boundary(Some("multipart/form-data")),
            Err(GalleryError::NoBoundary)
        ));
    }

    #[test]
    fn test_empty_boundary_value() {
        assert!(matches!(
            extract_boundary(Some("multipart/form-data; boundary=")),
            Err(GalleryError::NoBoundary)
        ));
    }

    #[test]
    fn test_quoted_boundary_taken_literally() {
        let boundary = extract_boundary(Some("multipart/form-data; boundary=\"abc\"")).unwrap();
        assert_eq!(boundary, "--\"abc\"");
    }

    #[test]
    fn test_trailing_params_taken_literally() {
        let boundary = extract_boundary(Some("multipart/form-data; boundary=abc; charset=utf-8")).unwrap();
        assert_eq!(boundary, "--abc; charset=utf-8");
    }
}
