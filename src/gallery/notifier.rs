//! # Notificador de Cambios
//! src/gallery/notifier.rs
//!
//! Señal sin payload que se emite después de cada `save`/`delete`
//! exitoso para que la capa de display refresque su slideshow.
//!
//! En vez de invocar un callback en el thread del worker, cada
//! suscriptor recibe su propio `mpsc::Receiver` y decide en qué thread
//! consumirlo. Los eventos no se encolan para suscriptores futuros: si
//! nadie escucha, el evento se descarta.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Evento "cambió el conjunto de imágenes"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent;

/// Fan-out de eventos hacia todos los suscriptores vivos
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un suscriptor nuevo
    ///
    /// El suscriptor se elimina solo cuando se dropea su `Receiver`.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        rx
    }

    /// Envía el evento a todos los suscriptores
    ///
    /// Retorna a cuántos se entregó. Los suscriptores desconectados se
    /// podan en la misma pasada.
    pub fn notify(&self) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(ChangeEvent).is_ok());
        tracing::debug!(subscribers = subscribers.len(), "cambio en la galería notificado");
        subscribers.len()
    }

    /// Número de suscriptores registrados (puede incluir alguno ya
    /// desconectado hasta el próximo `notify`)
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sender<ChangeEvent>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
