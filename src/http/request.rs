//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Parser HTTP/1.0 escrito desde cero que trabaja sobre bytes.
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! POST /upload HTTP/1.0\r\n
//! Content-Type: multipart/form-data; boundary=XYZ\r\n
//! Content-Length: 1234\r\n
//! \r\n
//! <body binario>
//! ```
//!
//! ## Dos fases
//!
//! 1. **Head**: request line + headers. Es ASCII por convención HTTP, así
//!    que es lo único que se decodifica como texto.
//! 2. **Body**: se conserva como bytes crudos. Una imagen subida puede
//!    contener cualquier valor de byte y nunca pasa por `str`.

use super::encoding::percent_decode;
use std::collections::HashMap;

/// Separador entre head y body
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Método HTTP del request
///
/// Que un método se parsee no significa que tenga ruta: el router
/// responde 404 a cualquier combinación que no esté en su tabla,
/// incluidos los métodos que no conoce (`Other`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    /// Cualquier otro token válido (`BREW`, `TRACE`, `PROPFIND`...)
    Other(String),
}

/// Caracteres permitidos en un token HTTP (RFC 7230 `tchar`)
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// # Errores
    ///
    /// Retorna error sólo si el token tiene caracteres no permitidos
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ if !s.is_empty() && s.chars().all(is_token_char) => Ok(Method::Other(s.to_string())),
            _ => Err(ParseError::InvalidMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
            Method::Other(token) => token,
        }
    }
}

/// Representa un request HTTP/1.0 parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path sin query string y sin decodificar (ej: "/images/a%20b.png")
    path: String,

    /// Query parameters ya decodificados (ej: {"name": "a b.png"})
    query_params: HashMap<String, String>,

    /// Headers en el orden recibido
    headers: Vec<(String, String)>,

    version: String,

    /// Body crudo, sin decodificar
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request incompleto o truncado
    IncompleteRequest,

    /// Formato inválido de la request line
    InvalidRequestLine,

    /// Método que no es un token HTTP válido
    InvalidMethod(String),

    /// Versión HTTP incorrecta
    InvalidHttpVersion(String),

    /// Header malformado
    InvalidHeader(String),

    /// Request vacío
    EmptyRequest,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncompleteRequest => write!(f, "Incomplete HTTP request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::InvalidMethod(m) => write!(f, "Invalid HTTP method: {}", m),
            ParseError::InvalidHttpVersion(v) => write!(f, "Invalid HTTP version: {}", v),
            ParseError::InvalidHeader(h) => write!(f, "Invalid header: {}", h),
            ParseError::EmptyRequest => write!(f, "Empty request"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Busca `needle` dentro de `haystack` a partir de `from`
///
/// Búsqueda lineal byte a byte; funciona con cualquier contenido
/// binario. Retorna la posición absoluta del primer match.
pub fn find_subsequence(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() || haystack.len() - from < needle.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Lee el `Content-Length` declarado en un bloque de headers crudo
///
/// Lo usa el servidor para saber cuántos bytes de body leer antes de
/// tener el request completo.
pub fn declared_content_length(head: &[u8]) -> Result<Option<usize>, ParseError> {
    let text = String::from_utf8_lossy(head);
    for line in text.split("\r\n").skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                let value = value.trim();
                return value
                    .parse::<usize>()
                    .map(Some)
                    .map_err(|_| ParseError::InvalidHeader(line.to_string()));
            }
        }
    }
    Ok(None)
}

impl Request {
    /// Parsea un request HTTP/1.0 desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use gallery_server::http::Request;
    ///
    /// let raw = b"POST /delete?name=a.png HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/delete");
    /// assert_eq!(request.query_param("name"), Some("a.png"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        // Fase 1: separar el head. Sin terminador, todo el buffer es head.
        let (head, body) = match find_subsequence(buffer, HEADER_TERMINATOR, 0) {
            Some(end) => (&buffer[..end], &buffer[end + HEADER_TERMINATOR.len()..]),
            None => (buffer, &buffer[buffer.len()..]),
        };

        let head_str = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;
        let mut lines = head_str.split("\r\n");

        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;
        let (method, path, query_params, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        // Fase 2: el body queda en bytes; se recorta al Content-Length declarado
        let mut body = body.to_vec();
        if let Some(len) = declared_content_length(head)? {
            body.truncate(len);
        }

        Ok(Request {
            method,
            path,
            query_params,
            headers,
            version,
            body,
        })
    }

    /// Parsea la request line
    ///
    /// Formato: `GET /path?query HTTP/1.0`
    fn parse_request_line(line: &str) -> Result<(Method, String, HashMap<String, String>, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_str(parts[0])?;
        let (path, query_params) = Self::parse_path_and_query(parts[1]);

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, query_params, version))
    }

    /// Separa el path de la query string
    ///
    /// Ejemplo: "/delete?name=a.png" → ("/delete", {"name": "a.png"})
    fn parse_path_and_query(target: &str) -> (String, HashMap<String, String>) {
        match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Self::parse_query_string(query)),
            None => (target.to_string(), HashMap::new()),
        }
    }

    fn parse_query_string(query: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();

        for param in query.split('&').filter(|p| !p.is_empty()) {
            match param.split_once('=') {
                Some((key, value)) => {
                    params.insert(percent_decode(key, true), percent_decode(value, true));
                }
                // Parámetro sin valor (ej: "?debug")
                None => {
                    params.insert(percent_decode(param, true), String::new());
                }
            }
        }

        params
    }

    /// Cada header tiene formato: "Name: Value"
    fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Vec<(String, String)>, ParseError> {
        let mut headers = Vec::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => headers.push((name.trim().to_string(), value.trim().to_string())),
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico (ya decodificado)
    ///
    /// # Ejemplo
    /// ```
    /// use gallery_server::http::Request;
    ///
    /// let raw = b"POST /delete?name=my%20cat.png HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.query_param("name"), Some("my cat.png"));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body crudo del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.query_params().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_parse_with_query_params() {
        let raw = b"POST /delete?name=a.png&x=1 HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/delete");
        assert_eq!(request.query_param("name"), Some("a.png"));
        assert_eq!(request.query_param("x"), Some("1"));
        assert_eq!(request.version(), "HTTP/1.1");
    }

    #[test]
    fn test_query_param_percent_decoded() {
        let raw = b"POST /delete?name=caf%C3%A9+1.png HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.query_param("name"), Some("café 1.png"));
    }

    #[test]
    fn test_path_not_decoded() {
        let raw = b"GET /images/a%20b.png HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/images/a%20b.png");
    }

    #[test]
    fn test_headers_case_insensitive() {
        let raw = b"GET / HTTP/1.0\r\nContent-Type: text/plain\r\nHost: localhost\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("content-type"), Some("text/plain"));
        assert_eq!(request.header("HOST"), Some("localhost"));
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn test_binary_body_preserved() {
        let mut raw = b"POST /upload HTTP/1.0\r\nContent-Length: 6\r\n\r\n".to_vec();
        let payload = [0x00, 0xFF, b'\r', b'\n', 0x89, 0x50];
        raw.extend_from_slice(&payload);

        let request = Request::parse(&raw).unwrap();
        assert_eq!(request.body(), &payload);
    }

    #[test]
    fn test_body_truncated_to_content_length() {
        let raw = b"POST /upload HTTP/1.0\r\nContent-Length: 3\r\n\r\nabcdef";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.body(), b"abc");
    }

    #[test]
    fn test_unknown_method_is_parsed() {
        for token in ["BREW", "TRACE", "CONNECT", "PROPFIND"] {
            let raw = format!("{} /gallery HTTP/1.0\r\n\r\n", token);
            let request = Request::parse(raw.as_bytes()).unwrap();

            assert_eq!(request.method(), &Method::Other(token.to_string()));
            assert_eq!(request.method().as_str(), token);
        }
    }

    #[test]
    fn test_invalid_method_token() {
        let raw = b"GE(T / HTTP/1.0\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidMethod(_))));
    }

    #[test]
    fn test_delete_method_parses() {
        let raw = b"DELETE /images/a.png HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), &Method::DELETE);
    }

    #[test]
    fn test_invalid_version() {
        let raw = b"GET / HTTP/2.0\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(Request::parse(b""), Err(ParseError::EmptyRequest)));
        assert!(matches!(Request::parse(b"\r\n"), Err(ParseError::EmptyRequest)));
    }

    #[test]
    fn test_invalid_request_line() {
        let raw = b"GET\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidRequestLine)));
    }

    #[test]
    fn test_invalid_header() {
        let raw = b"GET / HTTP/1.0\r\nNoColonHere\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
    }

    #[test]
    fn test_declared_content_length() {
        let head = b"POST /upload HTTP/1.0\r\ncontent-length: 42\r\nHost: x";
        assert_eq!(declared_content_length(head), Ok(Some(42)));

        let head = b"GET / HTTP/1.0\r\nHost: x";
        assert_eq!(declared_content_length(head), Ok(None));

        let head = b"POST / HTTP/1.0\r\nContent-Length: lots";
        assert!(declared_content_length(head).is_err());
    }

    #[test]
    fn test_find_subsequence() {
        let data = b"abc\r\n\r\ndef";
        assert_eq!(find_subsequence(data, b"\r\n\r\n", 0), Some(3));
        assert_eq!(find_subsequence(data, b"def", 4), Some(7));
        assert_eq!(find_subsequence(data, b"abc", 1), None);
        assert_eq!(find_subsequence(data, b"", 0), None);
        assert_eq!(find_subsequence(data, b"zz", 100), None);
    }
}
