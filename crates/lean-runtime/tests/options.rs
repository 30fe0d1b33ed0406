// Options store semantics over the hosted backend: persistence, the
// get/set lens surface, join, equality, and display.

use lean_runtime::{LeanError, Options, Runtime};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn empty() -> Options {
    Runtime::hosted().empty_options().unwrap()
}

// ===== set/get round trips, one per value kind =====

#[test]
fn test_roundtrip_bool() {
    let options = empty().set_bool("pp.compact", true).unwrap();
    assert_eq!(options.get_bool("pp.compact").unwrap(), Some(true));
}

#[test]
fn test_roundtrip_i32() {
    let options = empty().set_i32("pp.depth", -12).unwrap();
    assert_eq!(options.get_i32("pp.depth").unwrap(), Some(-12));
}

#[test]
fn test_roundtrip_u32() {
    let options = empty().set_u32("pp.width", 120).unwrap();
    assert_eq!(options.get_u32("pp.width").unwrap(), Some(120));
}

#[test]
fn test_roundtrip_f64() {
    let options = empty().set_f64("timeout.scale", 1.5).unwrap();
    assert_eq!(options.get_f64("timeout.scale").unwrap(), Some(1.5));
}

#[test]
fn test_roundtrip_string() {
    let options = empty().set_str("pp.notation", "unicode").unwrap();
    assert_eq!(
        options.get_string("pp.notation").unwrap(),
        Some("unicode".to_owned())
    );
}

// ===== contains / soft absence =====

#[test]
fn test_contains_matches_get() {
    let options = empty().set_bool("pp.compact", false).unwrap();
    assert!(options.contains("pp.compact"));
    assert_eq!(
        options.contains("pp.compact"),
        options.get_bool("pp.compact").unwrap().is_some()
    );
    assert!(!options.contains("pp.unset_key"));
    assert_eq!(
        options.contains("pp.unset_key"),
        options.get_bool("pp.unset_key").unwrap().is_some()
    );
}

#[test]
fn test_unset_key_is_none_not_error() {
    let options = empty();
    assert_eq!(options.get_bool("pp.unset_key").unwrap(), None);
    assert_eq!(options.get_string("pp.unset_key").unwrap(), None);
}

#[test]
fn test_type_mismatch_is_none_not_error() {
    let options = empty().set_bool("pp.compact", true).unwrap();
    assert_eq!(options.get_i32("pp.compact").unwrap(), None);
}

// ===== persistence =====

#[test]
fn test_set_does_not_mutate_input() {
    let before_set = empty().set_i32("a", 1).unwrap();
    let snapshot = before_set.clone();
    let updated = before_set.set_i32("a", 2).unwrap();

    assert_eq!(before_set, snapshot);
    assert_eq!(before_set.get_i32("a").unwrap(), Some(1));
    assert_eq!(updated.get_i32("a").unwrap(), Some(2));
    assert_ne!(before_set, updated);
}

#[test]
fn test_generic_get_sees_bound_string_key() {
    let options = empty().set_str("pp.notation", "unicode").unwrap();
    // The generic getter and the typed lens agree: a bound key is present.
    assert_eq!(
        options.get::<String>("pp.notation").unwrap(),
        Some("unicode".to_owned())
    );
    assert_eq!(
        options.get_string("pp.notation").unwrap(),
        Some("unicode".to_owned())
    );
}

#[test]
fn test_noop_set_str_is_observationally_equal() {
    let options = empty().set_str("pp.notation", "ascii").unwrap();
    let rebound = options.set_str("pp.notation", "ascii").unwrap();
    assert_eq!(options, rebound);
    assert_eq!(
        options.to_display_string().unwrap(),
        rebound.to_display_string().unwrap()
    );
}

#[test]
fn test_noop_set_is_observationally_equal() {
    let options = empty().set_bool("pp.compact", true).unwrap();
    let rebound = options.set_bool("pp.compact", true).unwrap();
    assert_eq!(options, rebound);
    assert_eq!(
        options.to_display_string().unwrap(),
        rebound.to_display_string().unwrap()
    );
}

// ===== join =====

#[test]
fn test_join_collision_secondary_wins() {
    let a = empty().set_i32("a", 1).unwrap();
    let b = empty().set_i32("a", 2).unwrap();
    let joined = a.join(&b).unwrap();
    assert_eq!(joined.get_i32("a").unwrap(), Some(2));
    // Neither input mutated.
    assert_eq!(a.get_i32("a").unwrap(), Some(1));
    assert_eq!(b.get_i32("a").unwrap(), Some(2));
}

#[test]
fn test_join_identity_laws() {
    let rt = Runtime::hosted();
    let none = rt.empty_options().unwrap();
    let a = none
        .set_bool("pp.compact", true)
        .unwrap()
        .set_u32("pp.width", 80)
        .unwrap();
    assert_eq!(none.join(&a).unwrap(), a);
    assert_eq!(a.join(&none).unwrap(), a);
}

#[test]
fn test_join_merges_disjoint_keys() {
    let a = empty().set_bool("pp.compact", true).unwrap();
    let b = empty().set_u32("pp.width", 80).unwrap();
    let joined = a.join(&b).unwrap();
    assert_eq!(joined.get_bool("pp.compact").unwrap(), Some(true));
    assert_eq!(joined.get_u32("pp.width").unwrap(), Some(80));
}

// ===== display and errors =====

#[test]
fn test_display_lists_bindings() {
    let options = empty()
        .set_bool("pp.compact", true)
        .unwrap()
        .set_str("pp.notation", "ascii")
        .unwrap();
    assert_eq!(
        options.to_string(),
        "(pp.compact := true, pp.notation := \"ascii\")"
    );
}

#[test]
fn test_interior_nul_value_is_rejected() {
    let result = empty().set_str("pp.notation", "uni\0code");
    assert!(matches!(result, Err(LeanError::InvalidString(_))));
}

// ===== end-to-end scenarios =====

#[test]
fn test_scenario_pp_compact() {
    let options = empty().set_bool("pp.compact", true).unwrap();
    assert_eq!(options.get_bool("pp.compact").unwrap(), Some(true));
    assert_eq!(options.get_bool("pp.unset_key").unwrap(), None);
}

#[test]
fn test_scenario_join_conflicting_bindings() {
    let first = empty().set_i32("a", 1).unwrap();
    let second = empty().set_i32("a", 2).unwrap();
    assert_eq!(first.join(&second).unwrap().get_i32("a").unwrap(), Some(2));
}

// ===== properties =====

fn option_name() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(\\.[a-z]{1,8})?"
}

proptest! {
    #[test]
    fn prop_i32_roundtrip(name in option_name(), value: i32) {
        let options = empty().set_i32(&name, value).unwrap();
        prop_assert_eq!(options.get_i32(&name).unwrap(), Some(value));
        prop_assert!(options.contains(&name));
    }

    #[test]
    fn prop_set_preserves_other_keys(name in option_name(), a: u32, b: u32) {
        let base = empty().set_u32("anchor.key", a).unwrap();
        let updated = base.set_u32(&name, b).unwrap();
        if name != "anchor.key" {
            prop_assert_eq!(updated.get_u32("anchor.key").unwrap(), Some(a));
        } else {
            prop_assert_eq!(updated.get_u32("anchor.key").unwrap(), Some(b));
        }
    }

    #[test]
    fn prop_set_never_mutates(name in option_name(), first: i32, second: i32) {
        let base = empty().set_i32(&name, first).unwrap();
        let snapshot = base.clone();
        let _updated = base.set_i32(&name, second).unwrap();
        prop_assert!(base == snapshot);
        prop_assert_eq!(base.get_i32(&name).unwrap(), Some(first));
    }

    #[test]
    fn prop_join_secondary_wins(name in option_name(), x: i32, y: i32) {
        let a = empty().set_i32(&name, x).unwrap();
        let b = empty().set_i32(&name, y).unwrap();
        prop_assert_eq!(a.join(&b).unwrap().get_i32(&name).unwrap(), Some(y));
    }

    #[test]
    fn prop_string_roundtrip(name in option_name(), value in "[a-zA-Z0-9 ._-]{0,24}") {
        let options = empty().set_str(&name, &value).unwrap();
        prop_assert_eq!(options.get_string(&name).unwrap(), Some(value));
    }
}
