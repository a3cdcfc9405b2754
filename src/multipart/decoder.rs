//! # Decoder Multipart
//! src/multipart/decoder.rs
//!
//! Extrae la única parte de archivo de un body `multipart/form-data`.
//!
//! ## Formato
//!
//! ```text
//! --BOUND123\r\n
//! Content-Disposition: form-data; name="file"; filename="a.png"\r\n
//! Content-Type: image/png\r\n
//! \r\n
//! <payload binario>\r\n
//! --BOUND123--\r\n
//! ```
//!
//! ## Fases sobre el mismo buffer
//!
//! 1. Se busca el primer `\r\n\r\n`. Todo lo anterior es el bloque de
//!    headers de la parte y es lo único que se decodifica como texto.
//! 2. El payload empieza justo después del terminador y termina en el
//!    primer `\r\n<boundary>` (o `<boundary>` a secas si el cliente omite
//!    el CRLF). Esta búsqueda es exacta sobre bytes.
//!
//! Sólo se soporta una parte de archivo; campos extra no se interpretan.

use crate::error::{GalleryError, Result};
use crate::http::encoding::percent_decode;
use crate::http::find_subsequence;
use crate::http::request::HEADER_TERMINATOR;

const FILENAME_QUOTED: &str = "filename=\"";
const FILENAME_EXTENDED: &str = "filename*=UTF-8''";

/// Parte de archivo decodificada
///
/// El payload es un slice del body original; no se copia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart<'a> {
    pub filename: String,
    pub payload: &'a [u8],
}

/// Decodifica la parte de archivo de `body` delimitada por `boundary`
///
/// `boundary` debe incluir el prefijo `--` (ver [`super::extract_boundary`]).
///
/// # Errores
///
/// - `MalformedBody`: no hay `\r\n\r\n` o no aparece el boundary de cierre
/// - `NoFilename`: la parte no declara nombre de archivo
/// - `EmptyPayload`: el archivo viene vacío
///
/// # Ejemplo
/// ```
/// use gallery_server::multipart::decode_file_part;
///
/// let body = b"--B\r\nContent-Disposition: form-data; name=\"file\"; filename=\"x.png\"\r\n\r\nDATA\r\n--B--\r\n";
/// let part = decode_file_part(body, b"--B").unwrap();
/// assert_eq!(part.filename, "x.png");
/// assert_eq!(part.payload, b"DATA");
/// ```
pub fn decode_file_part<'a>(body: &'a [u8], boundary: &[u8]) -> Result<FilePart<'a>> {
    let header_end = find_subsequence(body, HEADER_TERMINATOR, 0).ok_or(GalleryError::MalformedBody)?;

    let header_block = String::from_utf8_lossy(&body[..header_end]);
    let filename = filename_from_headers(&header_block).ok_or(GalleryError::NoFilename)?;

    let payload_start = header_end + HEADER_TERMINATOR.len();
    let payload_end = find_payload_end(body, boundary, payload_start).ok_or(GalleryError::MalformedBody)?;

    let payload = &body[payload_start..payload_end];
    if payload.is_empty() {
        return Err(GalleryError::EmptyPayload);
    }

    Ok(FilePart { filename, payload })
}

/// Lee `filename="..."` o, si falta, `filename*=UTF-8''...` (RFC 5987)
fn filename_from_headers(headers: &str) -> Option<String> {
    if let Some(idx) = headers.find(FILENAME_QUOTED) {
        let start = idx + FILENAME_QUOTED.len();
        if let Some(len) = headers[start..].find('"') {
            if len > 0 {
                return Some(headers[start..start + len].to_string());
            }
        }
    }

    let idx = headers.find(FILENAME_EXTENDED)?;
    let start = idx + FILENAME_EXTENDED.len();
    let len = headers[start..]
        .find([';', '\r', '\n'])
        .unwrap_or(headers.len() - start);
    if len == 0 {
        return None;
    }
    Some(percent_decode(&headers[start..start + len], false))
}

fn find_payload_end(body: &[u8], boundary: &[u8], from: usize) -> Option<usize> {
    let mut delimiter = Vec::with_capacity(boundary.len() + 2);
    delimiter.extend_from_slice(b"\r\n");
    delimiter.extend_from_slice(boundary);

    find_subsequence(body, &delimiter, from).or_else(|| find_subsequence(body, boundary, from))
}
