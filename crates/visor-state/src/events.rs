//! Session notifications.

use visor_common::{Alert, CacheKey};

use crate::transition::{FieldChange, FieldValue, SelectionField};

/// Published on the session's broadcast channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// One selection link moved.
    Changed {
        key: SelectionField,
        old: Option<FieldValue>,
        new: Option<FieldValue>,
    },
    InstancesChanged(Vec<String>),
    VariablesChanged(Vec<String>),
    /// The data behind the selection was replaced; `loaded` is false when
    /// the selection is incomplete or its load failed.
    CurrentDataChanged {
        key: Option<CacheKey>,
        loaded: bool,
    },
    ScenarioChanged {
        key: CacheKey,
    },
    /// An option list could not be fetched.
    Alert(Alert),
}

impl From<FieldChange> for StateEvent {
    fn from(change: FieldChange) -> Self {
        StateEvent::Changed {
            key: change.field,
            old: change.old,
            new: change.new,
        }
    }
}
