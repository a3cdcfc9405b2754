//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea (método, path) a un handler de la galería.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler(&Request, &GalleryStore) → Response
//! ```
//!
//! Las rutas se evalúan en orden de registro; gana la primera que
//! coincide. Si ninguna coincide, 404. Un panic dentro de un handler se
//! convierte en 500 y no sale del router.

use crate::gallery::handlers::{self, GALLERY_PATH, IMAGES_PREFIX};
use crate::gallery::GalleryStore;
use crate::http::{Method, Request, Response, StatusCode};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Tipo de función handler
///
/// Recibe el request y el store compartido y retorna una Response
pub type Handler = fn(&Request, &GalleryStore) -> Response;

/// Cómo se compara el path del request con una ruta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// El path debe ser exactamente este
    Exact(&'static str),
    /// El path debe empezar con este prefijo
    Prefix(&'static str),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(expected) => path == *expected,
            PathPattern::Prefix(prefix) => path.starts_with(prefix),
        }
    }
}

struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

/// Router que mapea (método, path) a handlers
pub struct Router {
    routes: Vec<Route>,
    store: Arc<GalleryStore>,
}

impl Router {
    /// Crea un router vacío sobre el store dado
    pub fn new(store: Arc<GalleryStore>) -> Self {
        Self {
            routes: Vec::new(),
            store,
        }
    }

    /// Tabla de rutas fija de la galería
    ///
    /// | Método | Path               | Handler   |
    /// |--------|--------------------|-----------|
    /// | GET    | `/`, `/gallery`    | página    |
    /// | GET    | `/images/<name>`   | imagen    |
    /// | POST   | `/upload`          | upload    |
    /// | POST   | `/delete?name=...` | borrar    |
    pub fn gallery(store: Arc<GalleryStore>) -> Self {
        let mut router = Self::new(store);
        router.register(Method::GET, PathPattern::Exact("/"), handlers::gallery_handler);
        router.register(Method::GET, PathPattern::Exact(GALLERY_PATH), handlers::gallery_handler);
        router.register(Method::GET, PathPattern::Prefix(IMAGES_PREFIX), handlers::image_handler);
        router.register(Method::POST, PathPattern::Exact("/upload"), handlers::upload_handler);
        router.register(Method::POST, PathPattern::Exact("/delete"), handlers::delete_handler);
        router
    }

    /// Registra una ruta al final de la tabla
    pub fn register(&mut self, method: Method, pattern: PathPattern, handler: Handler) {
        self.routes.push(Route {
            method,
            pattern,
            handler,
        });
    }

    /// Número de rutas registradas
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn store(&self) -> &Arc<GalleryStore> {
        &self.store
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request) -> Response {
        let route = self
            .routes
            .iter()
            .find(|r| &r.method == request.method() && r.pattern.matches(request.path()));

        let mut response = match route {
            Some(route) => self.invoke(route.handler, request),
            None => handlers::not_found(request),
        };
        self.add_common_headers(&mut response);
        response
    }

    /// Ejecuta el handler atrapando panics
    fn invoke(&self, handler: Handler, request: &Request) -> Response {
        let store = &*self.store;
        match panic::catch_unwind(AssertUnwindSafe(|| handler(request, store))) {
            Ok(response) => response,
            Err(_) => {
                tracing::error!(
                    method = request.method().as_str(),
                    path = request.path(),
                    "panic en handler"
                );
                Response::error(StatusCode::InternalServerError, "Internal server error")
            }
        }
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", "Gallery-HTTP/1.0");
        response.add_header("Connection", "close");
    }
}
