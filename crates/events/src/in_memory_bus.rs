//! In-memory priority bus for tests/dev and single-process hosts.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::bus::{EventBus, Registration};
use crate::listener::{EventListener, ListenerError};

/// Errors surfaced by [`InMemoryEventBus`].
#[derive(Debug)]
pub enum InMemoryBusError {
    /// Internal lock poisoning.
    Poisoned,
    /// A listener failed; later listeners on the channel did not run.
    Listener {
        name: String,
        source: ListenerError,
    },
}

struct Entry<E> {
    /// Per-channel registration sequence; the tie-break at equal priority.
    seq: u64,
    registration: Registration<E>,
}

/// In-memory pub/sub bus with priority-ordered, synchronous fan-out.
///
/// - No IO / no async
/// - Listeners run on the publishing thread, higher priority first
/// - Equal priorities run in registration order
///
/// Registrations are sorted once at registration time, so publishing walks a
/// pre-ordered list.
pub struct InMemoryEventBus<E> {
    channels: RwLock<HashMap<String, Vec<Entry<E>>>>,
}

impl<E> InMemoryEventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> EventBus<E> for InMemoryEventBus<E>
where
    E: 'static,
{
    type Error = InMemoryBusError;

    fn register(&self, channel: &str, registration: Registration<E>) -> Result<(), Self::Error> {
        let mut channels = self
            .channels
            .write()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        let entries = channels.entry(channel.to_owned()).or_default();
        debug!(
            channel,
            listener = registration.name(),
            priority = registration.priority(),
            "registering listener"
        );

        let seq = entries.len() as u64;
        entries.push(Entry { seq, registration });
        entries.sort_by_key(|e| (Reverse(e.registration.priority()), e.seq));
        Ok(())
    }

    fn publish(&self, channel: &str, event: &mut E) -> Result<(), Self::Error> {
        // Snapshot the chain, then run listeners outside the lock so they may
        // register further listeners without deadlocking.
        let chain: Vec<(String, Arc<dyn EventListener<E>>)> = {
            let channels = self
                .channels
                .read()
                .map_err(|_| InMemoryBusError::Poisoned)?;
            channels
                .get(channel)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|e| {
                            (
                                e.registration.name().to_owned(),
                                Arc::clone(e.registration.listener()),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        if chain.is_empty() {
            debug!(channel, "publish with no listeners");
            return Ok(());
        }

        for (name, listener) in chain {
            debug!(channel, listener = %name, "invoking listener");
            listener
                .handle(event)
                .map_err(|source| InMemoryBusError::Listener {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Event type for these tests: a log of listener names, in run order.
    type RunLog = Vec<&'static str>;

    fn recorder(name: &'static str) -> Arc<dyn EventListener<RunLog>> {
        Arc::new(move |event: &mut RunLog| -> Result<(), ListenerError> {
            event.push(name);
            Ok(())
        })
    }

    fn register(
        bus: &InMemoryEventBus<RunLog>,
        channel: &str,
        name: &'static str,
        priority: i32,
    ) {
        bus.register(channel, Registration::new(name, priority, recorder(name)))
            .unwrap();
    }

    #[test]
    fn listeners_run_in_descending_priority_order() {
        let bus = InMemoryEventBus::new();
        register(&bus, "ch", "low", 50);
        register(&bus, "ch", "high", 100);
        register(&bus, "ch", "mid", 75);

        let mut log = RunLog::new();
        bus.publish("ch", &mut log).unwrap();
        assert_eq!(log, vec!["high", "mid", "low"]);
    }

    #[test]
    fn equal_priorities_run_in_registration_order() {
        let bus = InMemoryEventBus::new();
        register(&bus, "ch", "first", 10);
        register(&bus, "ch", "second", 10);
        register(&bus, "ch", "third", 10);

        let mut log = RunLog::new();
        bus.publish("ch", &mut log).unwrap();
        assert_eq!(log, vec!["first", "second", "third"]);
    }

    #[test]
    fn registration_after_a_publish_keeps_the_order_stable() {
        let bus = InMemoryEventBus::new();
        register(&bus, "ch", "a", 10);
        register(&bus, "ch", "b", 10);
        let mut log = RunLog::new();
        bus.publish("ch", &mut log).unwrap();

        // A later registration at the same priority sorts after the earlier ones.
        register(&bus, "ch", "c", 10);
        let mut log = RunLog::new();
        bus.publish("ch", &mut log).unwrap();
        assert_eq!(log, vec!["a", "b", "c"]);
    }

    #[test]
    fn publish_on_unknown_channel_is_a_no_op() {
        let bus: InMemoryEventBus<RunLog> = InMemoryEventBus::new();
        let mut log = RunLog::new();
        bus.publish("nobody-home", &mut log).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn channels_are_isolated() {
        let bus = InMemoryEventBus::new();
        register(&bus, "a", "on_a", 10);
        register(&bus, "b", "on_b", 10);

        let mut log = RunLog::new();
        bus.publish("a", &mut log).unwrap();
        assert_eq!(log, vec!["on_a"]);
    }

    #[test]
    fn first_listener_failure_aborts_the_remaining_chain() {
        let bus: InMemoryEventBus<RunLog> = InMemoryEventBus::new();
        let ran_after: Arc<Mutex<bool>> = Arc::new(Mutex::new(false));

        register(&bus, "ch", "before", 100);
        bus.register(
            "ch",
            Registration::new(
                "failing",
                50,
                Arc::new(|_: &mut RunLog| -> Result<(), ListenerError> {
                    Err(ListenerError::new("boom"))
                }),
            ),
        )
        .unwrap();
        let ran_after_clone = Arc::clone(&ran_after);
        bus.register(
            "ch",
            Registration::new(
                "after",
                10,
                Arc::new(move |_: &mut RunLog| -> Result<(), ListenerError> {
                    *ran_after_clone.lock().unwrap() = true;
                    Ok(())
                }),
            ),
        )
        .unwrap();

        let mut log = RunLog::new();
        let err = bus.publish("ch", &mut log).unwrap_err();

        assert_eq!(log, vec!["before"]);
        assert!(!*ran_after.lock().unwrap());
        match err {
            InMemoryBusError::Listener { name, source } => {
                assert_eq!(name, "failing");
                assert_eq!(source.message(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn every_listener_observes_earlier_mutations() {
        let bus: InMemoryEventBus<Vec<i64>> = InMemoryEventBus::new();
        bus.register(
            "ch",
            Registration::new(
                "doubler",
                100,
                Arc::new(|event: &mut Vec<i64>| -> Result<(), ListenerError> {
                    event.push(2);
                    Ok(())
                }),
            ),
        )
        .unwrap();
        bus.register(
            "ch",
            Registration::new(
                "summer",
                50,
                Arc::new(|event: &mut Vec<i64>| -> Result<(), ListenerError> {
                    let sum: i64 = event.iter().sum();
                    event.push(sum);
                    Ok(())
                }),
            ),
        )
        .unwrap();

        let mut event = vec![1];
        bus.publish("ch", &mut event).unwrap();
        // The summer saw the doubler's push.
        assert_eq!(event, vec![1, 2, 3]);
    }
}
