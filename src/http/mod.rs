//! # Módulo HTTP
//!
//! Implementa el subconjunto de HTTP/1.0 que necesita la galería, sin
//! librerías de alto nivel:
//!
//! - Parsing de requests sobre bytes (el body nunca se decodifica)
//! - Construcción de responses HTTP
//! - Códigos de estado
//! - Percent-encoding para query strings, paths y nombres de archivo
//!
//! ## Especificación HTTP/1.0
//!
//! El protocolo HTTP/1.0 (RFC 1945) es más simple que HTTP/1.1:
//! - No requiere el header `Host`
//! - No tiene chunked transfer encoding
//! - No mantiene conexiones persistentes por defecto
//!
//! ### Formato de Request
//!
//! ```text
//! GET /images/cat.png HTTP/1.0\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```

pub mod encoding;  // Percent-encoding y escape HTML
pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{find_subsequence, Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
