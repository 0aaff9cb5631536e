//! Startup-time listener wiring.
//!
//! The set of listeners on a channel is process-wide configuration, assembled
//! by the host at initialization and installed onto the bus in one step. The
//! order of `with` calls is the tie-break order for equal priorities.

use std::sync::Arc;

use tracing::info;

use formbus_events::{EventBus, EventListener, Registration};

/// A channel's listener configuration, collected before the bus exists.
pub struct ListenerSet<E> {
    channel: String,
    registrations: Vec<Registration<E>>,
}

impl<E> ListenerSet<E> {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            registrations: Vec::new(),
        }
    }

    /// Add a listener. Higher priority runs earlier; equal priorities run in
    /// the order they were added here.
    pub fn with(
        mut self,
        name: impl Into<String>,
        priority: i32,
        listener: Arc<dyn EventListener<E>>,
    ) -> Self {
        self.registrations
            .push(Registration::new(name, priority, listener));
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Register every collected listener on `bus`.
    pub fn install<B>(self, bus: &B) -> Result<(), B::Error>
    where
        B: EventBus<E>,
    {
        info!(
            channel = %self.channel,
            listeners = self.registrations.len(),
            "installing listener set"
        );
        for registration in self.registrations {
            bus.register(&self.channel, registration)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formbus_events::{InMemoryEventBus, ListenerError};

    #[test]
    fn install_registers_every_listener_in_order() {
        let bus: InMemoryEventBus<Vec<&'static str>> = InMemoryEventBus::new();
        let push = |name: &'static str| -> Arc<dyn EventListener<Vec<&'static str>>> {
            Arc::new(move |event: &mut Vec<&'static str>| -> Result<(), ListenerError> {
                event.push(name);
                Ok(())
            })
        };

        ListenerSet::new("ch")
            .with("first", 10, push("first"))
            .with("second", 10, push("second"))
            .install(&bus)
            .unwrap();

        let mut log = Vec::new();
        bus.publish("ch", &mut log).unwrap();
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn empty_set_installs_nothing() {
        let bus: InMemoryEventBus<Vec<&'static str>> = InMemoryEventBus::new();
        let set: ListenerSet<Vec<&'static str>> = ListenerSet::new("ch");
        assert!(set.is_empty());
        set.install(&bus).unwrap();

        let mut log = Vec::new();
        bus.publish("ch", &mut log).unwrap();
        assert!(log.is_empty());
    }
}
