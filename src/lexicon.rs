use indexmap::IndexMap;

use crate::error::InferenceError;

/// Maps caller-chosen variable identifiers to the dense ids handed out by a
/// solver backend, for one inference run.
///
/// Identifiers are unique per run and never overwritten. Looking up an
/// identifier that was never registered returns `None` rather than failing:
/// callers routinely probe for variables that a structural precondition made
/// inapplicable, and must treat `None` as "this variable was not
/// instantiated".
#[derive(Debug, Clone, Default)]
pub struct VariableLexicon {
    ids: IndexMap<String, usize>,
}

impl VariableLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `identifier` for `id`. Duplicate registration within one run
    /// is a caller error.
    pub fn add_variable(
        &mut self,
        identifier: impl Into<String>,
        id: usize,
    ) -> Result<(), InferenceError> {
        let identifier = identifier.into();
        if self.ids.contains_key(&identifier) {
            return Err(InferenceError::DuplicateVariable(identifier));
        }
        self.ids.insert(identifier, id);
        Ok(())
    }

    pub fn get_variable(&self, identifier: &str) -> Option<usize> {
        self.ids.get(identifier).copied()
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reverse lookup by id. Linear scan; diagnostics only.
    pub fn variable_name(&self, id: usize) -> Option<&str> {
        self.ids
            .iter()
            .find(|(_, &v)| v == id)
            .map(|(name, _)| name.as_str())
    }
}
