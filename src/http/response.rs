//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas HTTP/1.0 y convertirlas a bytes para
//! enviar al cliente.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 302 Found\r\n
//! Location: /gallery\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 123\r\n
//! \r\n
//! <html>...</html>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use gallery_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

/// Cuerpo JSON de las respuestas de error
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Headers HTTP; HashMap para evitar duplicados
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío o binario)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta. Si ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Versión mutable de [`Response::with_header`]
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo desde un string y calcula `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes (imágenes) y calcula `Content-Length`
    ///
    /// # Ejemplo
    /// ```
    /// use gallery_server::http::{Response, StatusCode};
    ///
    /// let binary_data = vec![0x89, 0x50, 0x4E, 0x47]; // PNG header
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body_bytes(binary_data);
    /// assert_eq!(response.body().len(), 4);
    /// ```
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.headers.insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Página HTML (200 OK)
    pub fn html(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body)
    }

    /// Contenido binario con el content type indicado (200 OK)
    pub fn bytes(content_type: &str, body: Vec<u8>) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", content_type)
            .with_body_bytes(body)
    }

    /// Redirección 302 con un body HTML para clientes que no la siguen
    ///
    /// # Ejemplo
    /// ```
    /// use gallery_server::http::{Response, StatusCode};
    ///
    /// let response = Response::redirect("/gallery");
    /// assert_eq!(response.status(), StatusCode::Found);
    /// assert_eq!(response.header("Location"), Some("/gallery"));
    /// ```
    pub fn redirect(location: &str) -> Self {
        let body = format!(
            "<html><head><meta http-equiv='refresh' content='0;url={0}'></head>\
             <body>Redirecting. <a href='{0}'>Click here if not redirected</a></body></html>",
            location
        );
        Self::new(StatusCode::Found)
            .with_header("Location", location)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(&body)
    }

    /// Respuesta de error con mensaje JSON
    ///
    /// Formato del JSON: `{"error": "mensaje"}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| String::from(r#"{"error": "internal"}"#));
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&body)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.body.len() + 256);

        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header por nombre exacto
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
