//! The form alter event: one mutable form, one pass, many listeners.

use core::fmt;
use std::sync::Arc;

use formbus_core::{FormId, FormMap};

use crate::state::FormState;

/// Channel on which form alter events are published.
pub const FORM_ALTER_CHANNEL: &str = "form_alter_events.form_alter";

/// Event carrying one form through its alteration pass.
///
/// Exactly one `FormAlterEvent` exists per dispatch. The dispatcher takes the
/// caller's form into the event, every listener mutates that single instance
/// through [`form_mut`](Self::form_mut), and the dispatcher hands the result
/// back when the publish returns. The identifying metadata (`form_id`,
/// `base_form_id`) is set at construction and immutable thereafter.
///
/// The event is not `Clone`: a clone would fork the form, and listeners
/// would stop observing each other's changes.
pub struct FormAlterEvent {
    form: FormMap,
    state: Arc<dyn FormState>,
    form_id: FormId,
    base_form_id: Option<String>,
}

impl FormAlterEvent {
    /// Build the event for one dispatch.
    ///
    /// Never fails: [`FormId`] already guarantees non-emptiness and no other
    /// validation applies.
    pub fn new(
        form: FormMap,
        state: Arc<dyn FormState>,
        form_id: FormId,
        base_form_id: Option<String>,
    ) -> Self {
        Self {
            form,
            state,
            form_id,
            base_form_id,
        }
    }

    /// The form being altered.
    pub fn form(&self) -> &FormMap {
        &self.form
    }

    /// Mutable access to the form.
    ///
    /// This is the sole mechanism by which listeners communicate changes back
    /// to the host: every listener in the pass sees the mutations made by the
    /// listeners invoked before it.
    pub fn form_mut(&mut self) -> &mut FormMap {
        &mut self.form
    }

    /// The host's form-processing state, read-only.
    pub fn form_state(&self) -> &dyn FormState {
        self.state.as_ref()
    }

    /// Identifier of the form variant being built.
    pub fn form_id(&self) -> &FormId {
        &self.form_id
    }

    /// Shared base identifier, when the form has one.
    pub fn base_form_id(&self) -> Option<&str> {
        self.base_form_id.as_deref()
    }

    /// Tear the event down, returning the (possibly mutated) form.
    pub fn into_form(self) -> FormMap {
        self.form
    }
}

impl fmt::Debug for FormAlterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormAlterEvent")
            .field("form_id", &self.form_id)
            .field("base_form_id", &self.base_form_id)
            .field("form_len", &self.form.len())
            .finish_non_exhaustive()
    }
}
