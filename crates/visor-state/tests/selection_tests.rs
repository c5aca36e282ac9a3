//! Transition function properties over long random sequences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use visor_state::{Effect, Selection, Transition, TransitionOutcome};

fn pick_name(rng: &mut StdRng, names: &[&str]) -> Option<String> {
    // one extra slot stands for clearing the field
    let pick = rng.gen_range(0..=names.len());
    names.get(pick).map(|s| s.to_string())
}

fn random_transition(rng: &mut StdRng) -> Transition {
    match rng.gen_range(0..5) {
        0 => Transition::SetDomain(pick_name(rng, &["a", "b"])),
        1 => Transition::SetInstance(pick_name(rng, &["2025-01-01_00", "2025-01-02_00"])),
        2 => Transition::SetVariable(pick_name(rng, &["x", "y", "z"])),
        3 => Transition::SetFrame(rng.gen_range(0..4)),
        _ => Transition::SetLevel(rng.gen_range(0..2)),
    }
}

// ============================================================================
// Dependency chain
// ============================================================================

#[test]
fn test_chain_never_has_gaps() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut selection = Selection::default();
        for _ in 0..200 {
            selection.apply(random_transition(&mut rng));
            assert!(selection.is_consistent(), "seed {}: {:?}", seed, selection);
        }
    }
}

#[test]
fn test_upstream_changes_reset_indices() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut selection = Selection::default();
    for _ in 0..500 {
        let outcome = selection.apply(random_transition(&mut rng));
        if let Some(effect) = outcome.effect() {
            if effect.is_upstream() {
                assert_eq!((selection.frame(), selection.level()), (0, 0));
            }
        }
    }
}

#[test]
fn test_repeated_transition_is_noop() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut selection = Selection::default();
    for _ in 0..300 {
        let transition = random_transition(&mut rng);
        let first = selection.apply(transition.clone());
        let snapshot = selection.clone();
        let second = selection.apply(transition);
        if !matches!(first, TransitionOutcome::Rejected { .. }) {
            assert_eq!(second, TransitionOutcome::Unchanged);
        }
        assert_eq!(selection, snapshot);
    }
}

#[test]
fn test_effects_match_transition_kind() {
    let mut selection = Selection::default();
    let steps = [
        (Transition::SetDomain(Some("a".into())), Effect::ResolveInstances),
        (Transition::SetInstance(Some("i".into())), Effect::ResolveVariables),
        (Transition::SetVariable(Some("v".into())), Effect::LoadData),
        (Transition::SetFrame(2), Effect::Recombine),
        (Transition::SetLevel(1), Effect::Recombine),
        (Transition::SetVariable(None), Effect::LoadData),
    ];
    for (transition, effect) in steps {
        assert_eq!(selection.apply(transition).effect(), Some(effect));
    }
    assert_eq!(selection.triple(), None);
    assert_eq!(selection.instance(), Some("i"));
}
