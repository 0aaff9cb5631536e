//! Form alter dispatch (application-level orchestration).
//!
//! This module adapts the host's single form-rendering interception point
//! into one published event per form-processing cycle:
//!
//! ```text
//! host callback(form, state, form_id)
//!   ↓
//! 1. Derive the base form id from the state's build info
//!   ↓
//! 2. Construct exactly one FormAlterEvent
//!   ↓
//! 3. Publish on the form-alter channel (synchronous fan-out)
//!   ↓
//! 4. Hand the (possibly mutated) form back to the caller
//! ```
//!
//! The dispatcher composes the `EventBus` trait, so it works unchanged with
//! the in-memory bus in tests and whatever registry a host wires in.

use std::mem;
use std::sync::Arc;

use tracing::debug;

use formbus_core::{FormId, FormMap, FormValue};
use formbus_events::{
    BASE_FORM_ID_KEY, EventBus, FORM_ALTER_CHANNEL, FormAlterEvent, FormState,
};

/// Errors surfaced by [`AlterDispatcher::dispatch`].
#[derive(Debug)]
pub enum DispatchError {
    /// The bus's publish call failed (a listener error, or the bus itself).
    /// The caller's form retains every mutation applied before the failure.
    Publish(String),
}

/// Stateless adapter between the host's form hook and the event bus.
///
/// Holds one immutable reference to the injected bus for its entire process
/// lifetime; owns no other state. One `dispatch` call per form render/submit
/// cycle.
#[derive(Debug)]
pub struct AlterDispatcher<B> {
    bus: B,
}

impl<B> AlterDispatcher<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn into_bus(self) -> B {
        self.bus
    }
}

impl<B> AlterDispatcher<B>
where
    B: EventBus<FormAlterEvent>,
{
    /// Run one alteration pass over `form`.
    ///
    /// Constructs exactly one [`FormAlterEvent`] from the inputs plus the
    /// base form id derived from `state`, publishes it on
    /// [`FORM_ALTER_CHANNEL`], and returns once every registered listener has
    /// run. The caller's `form` is handed back in place before this method
    /// returns, mutated by however many listeners ran (on the error path
    /// included).
    ///
    /// No retries: a listener failure surfaces as
    /// [`DispatchError::Publish`], exactly as if the listener's code had
    /// failed inline in the host's hook.
    pub fn dispatch(
        &self,
        form: &mut FormMap,
        state: Arc<dyn FormState>,
        form_id: FormId,
    ) -> Result<(), DispatchError> {
        let base_form_id = base_form_id(state.as_ref());
        debug!(
            form_id = form_id.as_str(),
            base_form_id = base_form_id.as_deref(),
            "dispatching form alter event"
        );

        // The event owns the form for the duration of the publish; every
        // listener mutates that single instance in sequence.
        let mut event = FormAlterEvent::new(mem::take(form), state, form_id, base_form_id);
        let published = self.bus.publish(FORM_ALTER_CHANNEL, &mut event);
        *form = event.into_form();

        published.map_err(|e| DispatchError::Publish(format!("{e:?}")))
    }
}

/// Read the optional shared base identifier out of the state's build info.
///
/// Absent key, or a value that is not text, both mean "no base form id";
/// neither is an error.
fn base_form_id(state: &dyn FormState) -> Option<String> {
    match state.build_info().get(BASE_FORM_ID_KEY) {
        Some(FormValue::Text(s)) => Some(s.clone()),
        _ => None,
    }
}
