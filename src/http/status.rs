//! # Códigos de Estado HTTP
//!
//! Códigos de estado HTTP/1.0 que usa el servidor de la galería.
//! Según el RFC 1945, HTTP/1.0 define códigos en 5 categorías:
//!
//! - **2xx**: Éxito (200 OK)
//! - **3xx**: Redirección (302 después de subir o borrar)
//! - **4xx**: Error del cliente (400, 404, 408, 413)
//! - **5xx**: Error del servidor (500)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 302 Found - Redirección a la galería
    Found = 302,

    /// 400 Bad Request - Request o multipart malformado
    BadRequest = 400,

    /// 404 Not Found - Ruta o imagen no encontrada
    NotFound = 404,

    /// 408 Request Timeout - El cliente no terminó de enviar el request
    RequestTimeout = 408,

    /// 413 Payload Too Large - El body supera el máximo configurado
    PayloadTooLarge = 413,

    /// 500 Internal Server Error - Error de disco o panic en un handler
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use gallery_server::http::StatusCode;
    /// assert_eq!(StatusCode::Found.as_u16(), 302);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use gallery_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Found => "Found",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Verifica si el código indica redirección (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del cliente (4xx)
    ///
    /// # Ejemplo
    /// ```
    /// use gallery_server::http::StatusCode;
    /// assert!(StatusCode::BadRequest.is_client_error());
    /// assert!(!StatusCode::Ok.is_client_error());
    /// ```
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::Found.as_u16(), 302);
        assert_eq!(StatusCode::BadRequest.as_u16(), 400);
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
        assert_eq!(StatusCode::PayloadTooLarge.as_u16(), 413);
        assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    }

    #[test]
    fn test_categories() {
        assert!(StatusCode::Found.is_redirect());
        assert!(!StatusCode::Ok.is_redirect());
        assert!(StatusCode::RequestTimeout.is_client_error());
        assert!(!StatusCode::InternalServerError.is_client_error());
        assert!(StatusCode::InternalServerError.is_server_error());
        assert!(!StatusCode::NotFound.is_server_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::Found.to_string(), "302 Found");
        assert_eq!(StatusCode::PayloadTooLarge.to_string(), "413 Payload Too Large");
    }
}
