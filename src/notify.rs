//! Change notification
//!
//! Observers register a URI and get back a [`Subscription`]. A write through
//! the provider publishes a [`ChangeEvent`] for the URI it touched, which is
//! delivered to every observer registered on that URI, on one of its
//! ancestors, or on one of its descendants.

use std::ops::Deref;
use std::sync::{Arc, Mutex, Weak};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::uri::ContentUri;

/// A table (or row) addressed by `uri` has changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub uri: ContentUri,
}

struct Observer {
    uri: ContentUri,
    tx: Sender<ChangeEvent>,
    alive: Weak<()>,
}

/// Receiving end of a registration. Dropping it unregisters the observer.
pub struct Subscription {
    rx: Receiver<ChangeEvent>,
    _token: Arc<()>,
}

impl Deref for Subscription {
    type Target = Receiver<ChangeEvent>;

    fn deref(&self) -> &Receiver<ChangeEvent> {
        &self.rx
    }
}

/// Registry of change observers
#[derive(Default)]
pub struct ChangeNotifier {
    observers: Mutex<Vec<Observer>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `uri`. Registrations whose subscription was
    /// dropped are pruned here as well as on delivery.
    pub fn register(&self, uri: &ContentUri) -> Subscription {
        let (tx, rx) = unbounded();
        let token = Arc::new(());
        let mut observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
        observers.retain(|observer| observer.alive.strong_count() > 0);
        observers.push(Observer { uri: uri.clone(), tx, alive: Arc::downgrade(&token) });
        Subscription { rx, _token: token }
    }

    /// Publish a change for `uri` and return how many observers received it
    pub fn notify_change(&self, uri: &ContentUri) -> usize {
        let mut observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
        let mut delivered = 0;

        observers.retain(|observer| {
            if observer.alive.strong_count() == 0 {
                return false;
            }
            if !(observer.uri.is_ancestor_of(uri) || uri.is_ancestor_of(&observer.uri)) {
                return true;
            }
            match observer.tx.send(ChangeEvent { uri: uri.clone() }) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });

        tracing::debug!("Change on {} delivered to {} observer(s)", uri, delivered);
        delivered
    }

    /// Number of registrations, including dropped ones not yet pruned
    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
