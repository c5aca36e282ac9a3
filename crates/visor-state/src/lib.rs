//! Selection state for the dispersion visor.
//!
//! [`Selection::apply`] is the pure transition function of the
//! `domain → instance → variable → (frame, level)` chain. [`VisorSession`]
//! drives it against a [`data_access::DataCache`]: each upstream change
//! re-resolves the option lists below it, loads the selected variable and
//! publishes [`StateEvent`]s.
//!
//! ```text
//! set_domain ─► instances ─► pick instance ─► variables ─► pick variable ─► load
//! set_instance ─────────────────────────────► variables ─► pick variable ─► load
//! set_variable ───────────────────────────────────────────────────────────► load
//! set_frame / set_level ─► Changed only
//! ```

pub mod config;
pub mod events;
pub mod session;
pub mod transition;

pub use config::SessionConfig;
pub use events::StateEvent;
pub use session::{DomainOutline, SessionSeries, VisorSession};
pub use transition::{
    pick_instance, pick_variable, Effect, FieldChange, FieldValue, Selection, SelectionField,
    Transition, TransitionOutcome,
};
