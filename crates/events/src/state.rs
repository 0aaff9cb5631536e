//! The form-processing-state capability required of the host.

use formbus_core::FormMap;

/// Build-info key under which the host records a shared base identifier.
pub const BASE_FORM_ID_KEY: &str = "base_form_id";

/// Capability required of the host's per-request form-processing state.
///
/// The handle is opaque to this workspace: the only read it must support is
/// the build-info mapping the host records while assembling the form. It is
/// never constructed or mutated here.
pub trait FormState: Send + Sync {
    /// Build metadata for the current form (shared base id, rebuild flags, …).
    fn build_info(&self) -> &FormMap;
}

/// Fixed build-info behind the [`FormState`] capability.
///
/// Intended for tests/dev; real hosts expose their own state object.
#[derive(Debug, Clone, Default)]
pub struct StaticFormState {
    build_info: FormMap,
}

impl StaticFormState {
    pub fn new(build_info: FormMap) -> Self {
        Self { build_info }
    }

    /// State with empty build info (no base form id).
    pub fn empty() -> Self {
        Self::default()
    }
}

impl FormState for StaticFormState {
    fn build_info(&self) -> &FormMap {
        &self.build_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formbus_core::FormValue;

    #[test]
    fn static_state_exposes_its_build_info() {
        let mut info = FormMap::new();
        info.insert(BASE_FORM_ID_KEY, FormValue::Text("node_form".into()));
        let state = StaticFormState::new(info);

        assert_eq!(
            state
                .build_info()
                .get(BASE_FORM_ID_KEY)
                .and_then(FormValue::as_text),
            Some("node_form")
        );
    }
}
