//! # Módulo Multipart
//! src/multipart/mod.rs
//!
//! Parsing manual de `multipart/form-data` sobre bytes crudos:
//!
//! - `boundary`: obtiene el delimitador desde el `Content-Type`
//! - `decoder`: localiza la parte de archivo y extrae nombre y payload
//!
//! ```text
//! Request ──► extract_boundary(Content-Type) ──► decode_file_part(body) ──► UploadRequest
//! ```

pub mod boundary;
pub mod decoder;

pub use boundary::extract_boundary;
pub use decoder::{decode_file_part, FilePart};

use crate::error::Result;
use crate::http::Request;

/// Upload ya decodificado; vive lo que dura el request
#[derive(Debug)]
pub struct UploadRequest<'a> {
    /// Boundary con prefijo `--`
    pub boundary: String,
    /// Nombre declarado por el cliente, sin sanitizar
    pub filename: String,
    /// Bytes del archivo, prestados del body del request
    pub payload: &'a [u8],
}

impl<'a> UploadRequest<'a> {
    /// Decodifica el upload de un request `POST /upload`
    pub fn from_request(request: &'a Request) -> Result<Self> {
        let boundary = extract_boundary(request.header("Content-Type"))?;
        let part = decode_file_part(request.body(), boundary.as_bytes())?;

        Ok(Self {
            boundary,
            filename: part.filename,
            payload: part.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GalleryError;

    fn upload_request(content_type: Option<&str>, body: &[u8]) -> Request {
        let mut raw = b"POST /upload HTTP/1.0\r\n".to_vec();
        if let Some(ct) = content_type {
            raw.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }
        raw.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
        raw.extend_from_slice(body);
        Request::parse(&raw).unwrap()
    }

    #[test]
    fn test_upload_request_from_request() {
        let body = b"--BOUND123\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\r\n0123456789\r\n--BOUND123--\r\n";
        let request = upload_request(Some("multipart/form-data; boundary=BOUND123"), body);

        let upload = UploadRequest::from_request(&request).unwrap();
        assert_eq!(upload.boundary, "--BOUND123");
        assert_eq!(upload.filename, "a.png");
        assert_eq!(upload.payload, b"0123456789");
    }

    #[test]
    fn test_upload_request_without_content_type() {
        let request = upload_request(None, b"whatever");
        assert!(matches!(UploadRequest::from_request(&request), Err(GalleryError::NoBoundary)));
    }

    #[test]
    fn test_upload_request_empty_body() {
        let request = upload_request(Some("multipart/form-data; boundary=X"), b"");
        assert!(matches!(UploadRequest::from_request(&request), Err(GalleryError::MalformedBody)));
    }
}
