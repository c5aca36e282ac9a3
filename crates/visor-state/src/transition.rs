//! Pure selection transitions.
//!
//! The selection is an ordered chain `domain → instance → variable →
//! (frame, level)`. Changing a link resets everything after it, and the
//! outcome says which option list or load has to follow:
//!
//! ```text
//! SetDomain    ─► clear instance, variable, frame, level ─► ResolveInstances
//! SetInstance  ─► clear variable, frame, level           ─► ResolveVariables
//! SetVariable  ─► reset frame, level                     ─► LoadData
//! SetFrame     ─►                                        ─► Recombine
//! SetLevel     ─►                                        ─► Recombine
//! ```
//!
//! Setting a value equal to the current one is a no-op. Naming an
//! instance without a domain, or a variable without an instance, is
//! rejected so the chain never has a gap.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A link of the selection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionField {
    Domain,
    Instance,
    Variable,
    Frame,
    Level,
}

impl SelectionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Instance => "instance",
            Self::Variable => "variable",
            Self::Frame => "frame",
            Self::Level => "level",
        }
    }
}

impl fmt::Display for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of one link, as reported in change notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Name(String),
    Index(usize),
}

/// One link that moved from `old` to `new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: SelectionField,
    pub old: Option<FieldValue>,
    pub new: Option<FieldValue>,
}

/// A requested selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SetDomain(Option<String>),
    SetInstance(Option<String>),
    SetVariable(Option<String>),
    SetFrame(usize),
    SetLevel(usize),
}

/// Work a changed selection requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ResolveInstances,
    ResolveVariables,
    LoadData,
    Recombine,
}

impl Effect {
    /// Effects that refetch something and supersede older async work.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Effect::Recombine)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Unchanged,
    /// The link above the target is unset.
    Rejected { missing: SelectionField },
    Changed {
        changes: Vec<FieldChange>,
        effect: Effect,
    },
}

impl TransitionOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, TransitionOutcome::Changed { .. })
    }

    pub fn effect(&self) -> Option<Effect> {
        match self {
            TransitionOutcome::Changed { effect, .. } => Some(*effect),
            _ => None,
        }
    }
}

/// Current `(domain, instance, variable, frame, level)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    domain: Option<String>,
    instance: Option<String>,
    variable: Option<String>,
    frame: usize,
    level: usize,
}

impl Selection {
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// `(domain, instance, variable)` once all three are set.
    pub fn triple(&self) -> Option<(&str, &str, &str)> {
        Some((self.domain()?, self.instance()?, self.variable()?))
    }

    /// Whether every set link has its upstream links set.
    pub fn is_consistent(&self) -> bool {
        (self.variable.is_none() || self.instance.is_some())
            && (self.instance.is_none() || self.domain.is_some())
    }

    pub fn apply(&mut self, transition: Transition) -> TransitionOutcome {
        let mut changes = Vec::new();
        let effect = match transition {
            Transition::SetDomain(domain) => {
                if domain == self.domain {
                    return TransitionOutcome::Unchanged;
                }
                push_name(&mut changes, SelectionField::Domain, &self.domain, &domain);
                self.domain = domain;
                self.clear_instance(&mut changes);
                Effect::ResolveInstances
            }
            Transition::SetInstance(instance) => {
                if instance == self.instance {
                    return TransitionOutcome::Unchanged;
                }
                if instance.is_some() && self.domain.is_none() {
                    return TransitionOutcome::Rejected {
                        missing: SelectionField::Domain,
                    };
                }
                push_name(&mut changes, SelectionField::Instance, &self.instance, &instance);
                self.instance = instance;
                self.clear_variable(&mut changes);
                Effect::ResolveVariables
            }
            Transition::SetVariable(variable) => {
                if variable == self.variable {
                    return TransitionOutcome::Unchanged;
                }
                if variable.is_some() && self.instance.is_none() {
                    return TransitionOutcome::Rejected {
                        missing: SelectionField::Instance,
                    };
                }
                push_name(&mut changes, SelectionField::Variable, &self.variable, &variable);
                self.variable = variable;
                self.reset_indices(&mut changes);
                Effect::LoadData
            }
            Transition::SetFrame(frame) => {
                if frame == self.frame {
                    return TransitionOutcome::Unchanged;
                }
                push_index(&mut changes, SelectionField::Frame, self.frame, frame);
                self.frame = frame;
                Effect::Recombine
            }
            Transition::SetLevel(level) => {
                if level == self.level {
                    return TransitionOutcome::Unchanged;
                }
                push_index(&mut changes, SelectionField::Level, self.level, level);
                self.level = level;
                Effect::Recombine
            }
        };
        TransitionOutcome::Changed { changes, effect }
    }

    fn clear_instance(&mut self, changes: &mut Vec<FieldChange>) {
        if let Some(old) = self.instance.take() {
            push_name(changes, SelectionField::Instance, &Some(old), &None);
        }
        self.clear_variable(changes);
    }

    fn clear_variable(&mut self, changes: &mut Vec<FieldChange>) {
        if let Some(old) = self.variable.take() {
            push_name(changes, SelectionField::Variable, &Some(old), &None);
        }
        self.reset_indices(changes);
    }

    fn reset_indices(&mut self, changes: &mut Vec<FieldChange>) {
        if self.frame != 0 {
            push_index(changes, SelectionField::Frame, self.frame, 0);
            self.frame = 0;
        }
        if self.level != 0 {
            push_index(changes, SelectionField::Level, self.level, 0);
            self.level = 0;
        }
    }
}

fn push_name(
    changes: &mut Vec<FieldChange>,
    field: SelectionField,
    old: &Option<String>,
    new: &Option<String>,
) {
    changes.push(FieldChange {
        field,
        old: old.clone().map(FieldValue::Name),
        new: new.clone().map(FieldValue::Name),
    });
}

fn push_index(changes: &mut Vec<FieldChange>, field: SelectionField, old: usize, new: usize) {
    changes.push(FieldChange {
        field,
        old: Some(FieldValue::Index(old)),
        new: Some(FieldValue::Index(new)),
    });
}

/// Instance to select from a freshly resolved list.
///
/// The preferred instance wins when listed, then the current one, then the
/// lexicographically greatest (the latest run).
pub fn pick_instance(
    instances: &[String],
    preferred: Option<&str>,
    current: Option<&str>,
) -> Option<String> {
    let listed = |name: &str| instances.iter().any(|i| i == name);
    if let Some(preferred) = preferred.filter(|p| listed(p)) {
        return Some(preferred.to_string());
    }
    if let Some(current) = current.filter(|c| listed(c)) {
        return Some(current.to_string());
    }
    instances.iter().max().cloned()
}

/// Variable to select from a freshly resolved list: the preferred one when
/// listed, else the current one when listed, else none.
pub fn pick_variable(
    variables: &[String],
    preferred: Option<&str>,
    current: Option<&str>,
) -> Option<String> {
    [preferred, current]
        .into_iter()
        .flatten()
        .find(|name| variables.iter().any(|v| v == name))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn full() -> Selection {
        let mut s = Selection::default();
        s.apply(Transition::SetDomain(name("d")));
        s.apply(Transition::SetInstance(name("i")));
        s.apply(Transition::SetVariable(name("v")));
        s.apply(Transition::SetFrame(3));
        s.apply(Transition::SetLevel(1));
        s
    }

    #[test]
    fn test_domain_change_clears_downstream() {
        let mut s = full();
        let outcome = s.apply(Transition::SetDomain(name("e")));

        assert_eq!(outcome.effect(), Some(Effect::ResolveInstances));
        assert_eq!(s.domain(), Some("e"));
        assert_eq!(s.instance(), None);
        assert_eq!(s.variable(), None);
        assert_eq!((s.frame(), s.level()), (0, 0));

        let TransitionOutcome::Changed { changes, .. } = outcome else {
            panic!("expected a change");
        };
        let fields: Vec<_> = changes.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            vec![
                SelectionField::Domain,
                SelectionField::Instance,
                SelectionField::Variable,
                SelectionField::Frame,
                SelectionField::Level,
            ]
        );
        assert_eq!(changes[1].old, Some(FieldValue::Name("i".into())));
        assert_eq!(changes[1].new, None);
    }

    #[test]
    fn test_instance_change_keeps_domain() {
        let mut s = full();
        let outcome = s.apply(Transition::SetInstance(name("j")));
        assert_eq!(outcome.effect(), Some(Effect::ResolveVariables));
        assert_eq!(s.domain(), Some("d"));
        assert_eq!(s.instance(), Some("j"));
        assert_eq!(s.variable(), None);
    }

    #[test]
    fn test_variable_change_resets_indices() {
        let mut s = full();
        let outcome = s.apply(Transition::SetVariable(name("w")));
        assert_eq!(outcome.effect(), Some(Effect::LoadData));
        assert_eq!(s.triple(), Some(("d", "i", "w")));
        assert_eq!(s.frame(), 0);
    }

    #[test]
    fn test_frame_and_level_do_not_cascade() {
        let mut s = full();
        let outcome = s.apply(Transition::SetFrame(7));
        assert_eq!(outcome.effect(), Some(Effect::Recombine));
        assert!(!Effect::Recombine.is_upstream());
        assert_eq!(s.triple(), Some(("d", "i", "v")));
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn test_same_value_is_noop() {
        let mut s = full();
        let before = s.clone();
        assert_eq!(s.apply(Transition::SetDomain(name("d"))), TransitionOutcome::Unchanged);
        assert_eq!(s.apply(Transition::SetInstance(name("i"))), TransitionOutcome::Unchanged);
        assert_eq!(s.apply(Transition::SetVariable(name("v"))), TransitionOutcome::Unchanged);
        assert_eq!(s.apply(Transition::SetFrame(3)), TransitionOutcome::Unchanged);
        assert_eq!(s.apply(Transition::SetLevel(1)), TransitionOutcome::Unchanged);
        assert_eq!(s, before);
    }

    #[test]
    fn test_gaps_are_rejected() {
        let mut s = Selection::default();
        assert_eq!(
            s.apply(Transition::SetInstance(name("i"))),
            TransitionOutcome::Rejected {
                missing: SelectionField::Domain
            }
        );
        s.apply(Transition::SetDomain(name("d")));
        assert_eq!(
            s.apply(Transition::SetVariable(name("v"))),
            TransitionOutcome::Rejected {
                missing: SelectionField::Instance
            }
        );
        assert!(s.is_consistent());
    }

    #[test]
    fn test_clearing_domain_clears_everything() {
        let mut s = full();
        assert!(s.apply(Transition::SetDomain(None)).is_changed());
        assert_eq!(s, Selection::default());
    }

    #[test]
    fn test_pick_instance() {
        let list: Vec<String> = ["2025-07-23_00", "2025-07-25_00", "2025-07-24_00"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(pick_instance(&list, None, None).as_deref(), Some("2025-07-25_00"));
        assert_eq!(
            pick_instance(&list, Some("2025-07-23_00"), None).as_deref(),
            Some("2025-07-23_00")
        );
        assert_eq!(
            pick_instance(&list, Some("1999-01-01_00"), Some("2025-07-24_00")).as_deref(),
            Some("2025-07-24_00")
        );
        assert_eq!(pick_instance(&[], Some("x"), None), None);
    }

    #[test]
    fn test_pick_variable() {
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(pick_variable(&list, Some("b"), Some("a")).as_deref(), Some("b"));
        assert_eq!(pick_variable(&list, Some("z"), Some("a")).as_deref(), Some("a"));
        assert_eq!(pick_variable(&list, Some("z"), None), None);
        assert_eq!(pick_variable(&list, None, None), None);
    }
}
