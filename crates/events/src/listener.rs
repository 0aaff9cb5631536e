//! Listener abstraction: a registered callback invoked per published event.

use thiserror::Error;

/// Error returned by a listener.
///
/// The bus stops the remaining chain on the first failing listener and
/// surfaces the error through its publish result; nothing in this workspace
/// retries or masks it.
#[derive(Debug, Error)]
#[error("listener failed: {message}")]
pub struct ListenerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A callback invoked by the bus when its channel is published.
///
/// Listeners receive the event exclusively and in sequence: whatever one
/// listener writes through the event, the next listener reads.
pub trait EventListener<E>: Send + Sync {
    fn handle(&self, event: &mut E) -> Result<(), ListenerError>;
}

impl<E, F> EventListener<E> for F
where
    F: Fn(&mut E) -> Result<(), ListenerError> + Send + Sync,
{
    fn handle(&self, event: &mut E) -> Result<(), ListenerError> {
        self(event)
    }
}
