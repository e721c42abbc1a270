// crates/protomcp-runtime/src/flatten/tests.rs
// ============================================================================
// Module: Oneof Flattener Unit Tests
// Description: Unit tests for wrapper promotion and traversal.
// Purpose: Pin nested, inlined, and malformed wrapper handling.
// Dependencies: protomcp-runtime, serde_json
// ============================================================================

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;

use super::flatten_oneofs;
use super::flattened;

// ============================================================================
// SECTION: Variant Shapes
// ============================================================================

#[test]
fn message_variant_promotes_named_payload() {
    let input = json!({"kindOneOfType": {"object_type": "opt_a", "opt_a": {"value": "x"}}});
    assert_eq!(flattened(input), json!({"opt_a": {"value": "x"}}));
}

#[test]
fn inline_variant_promotes_remaining_keys() {
    let input = json!({"kOneOfType": {"object_type": "s", "value": "hi"}});
    assert_eq!(flattened(input), json!({"s": {"value": "hi"}}));
}

#[test]
fn scalar_variant_promotes_scalar() {
    let input = json!({"item_typeOneOfType": {"object_type": "label", "label": "desk"}});
    assert_eq!(flattened(input), json!({"label": "desk"}));
}

#[test]
fn inlined_message_with_no_fields_becomes_empty_object() {
    let input = json!({"actionOneOfType": {"object_type": "noop"}});
    assert_eq!(flattened(input), json!({"noop": {}}));
}

#[test]
fn sibling_fields_are_kept() {
    let input = json!({
        "name": "lamp",
        "item_typeOneOfType": {"object_type": "thumbnail", "url": "https://x", "width": 32},
        "tags": ["home"]
    });
    assert_eq!(
        flattened(input),
        json!({
            "name": "lamp",
            "thumbnail": {"url": "https://x", "width": 32},
            "tags": ["home"]
        })
    );
}

// ============================================================================
// SECTION: Ordering and Collisions
// ============================================================================

#[test]
fn promoted_key_takes_wrapper_position() {
    let input = json!({
        "first": 1,
        "choiceOneOfType": {"object_type": "picked", "picked": true},
        "last": 2
    });
    let output = flattened(input);
    let keys: Vec<&str> = output.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["first", "picked", "last"]);
}

#[test]
fn promoted_value_replaces_existing_sibling() {
    let before = json!({"picked": "old", "choiceOneOfType": {"object_type": "picked", "picked": "new"}});
    assert_eq!(flattened(before), json!({"picked": "new"}));

    let after = json!({"choiceOneOfType": {"object_type": "picked", "picked": "new"}, "picked": "old"});
    assert_eq!(flattened(after), json!({"picked": "new"}));
}

#[test]
fn promoted_key_naming_another_wrapper_is_rewritten() {
    let input = json!({
        "outerOneOfType": {
            "object_type": "innerOneOfType",
            "innerOneOfType": {"object_type": "leaf", "leaf": 7}
        }
    });
    assert_eq!(flattened(input), json!({"leaf": 7}));
}

// ============================================================================
// SECTION: Traversal
// ============================================================================

#[test]
fn nested_wrappers_are_rewritten_at_any_depth() {
    let input = json!({
        "outerOneOfType": {
            "object_type": "node",
            "node": {
                "children": [
                    {"valueOneOfType": {"object_type": "number", "number": 1}},
                    {"valueOneOfType": {"object_type": "text", "text": "two"}}
                ],
                "meta": {"deep": {"modeOneOfType": {"object_type": "fast", "fast": true}}}
            }
        }
    });
    assert_eq!(
        flattened(input),
        json!({
            "node": {
                "children": [{"number": 1}, {"text": "two"}],
                "meta": {"deep": {"fast": true}}
            }
        })
    );
}

#[test]
fn wrappers_inside_top_level_arrays_are_rewritten() {
    let input = json!([
        {"aOneOfType": {"object_type": "x", "x": 1}},
        "plain",
        [{"bOneOfType": {"object_type": "y", "y": 2}}]
    ]);
    assert_eq!(flattened(input), json!([{"x": 1}, "plain", [{"y": 2}]]));
}

#[test]
fn inline_variant_with_inner_oneof_is_rewritten() {
    let input = json!({
        "shapeOneOfType": {
            "object_type": "circle",
            "radius": 2,
            "fillOneOfType": {"object_type": "color", "color": "red"}
        }
    });
    assert_eq!(flattened(input), json!({"circle": {"radius": 2, "color": "red"}}));
}

// ============================================================================
// SECTION: Malformed Input
// ============================================================================

#[test]
fn malformed_wrappers_are_left_untouched() {
    let cases = [
        json!({"kOneOfType": {"value": "no discriminator"}}),
        json!({"kOneOfType": {"object_type": 3, "value": "numeric discriminator"}}),
        json!({"kOneOfType": "not an object"}),
        json!({"kOneOfType": null}),
        json!({"kOneOfType": [{"object_type": "a"}]}),
    ];
    for case in cases {
        assert_eq!(flattened(case.clone()), case);
    }
}

#[test]
fn keys_without_suffix_are_not_wrappers() {
    let input = json!({"kind": {"object_type": "a", "a": 1}, "OneOfTypeHint": {"object_type": "b"}});
    assert_eq!(flattened(input.clone()), input);
}

#[test]
fn scalars_and_empty_structures_pass_through() {
    for value in [json!(null), json!(true), json!(1.5), json!("s"), json!({}), json!([])] {
        assert_eq!(flattened(value.clone()), value);
    }
}

#[test]
fn in_place_and_owned_forms_agree() {
    let input = json!({"kOneOfType": {"object_type": "s", "value": "hi"}, "n": [1, 2]});
    let mut in_place = input.clone();
    flatten_oneofs(&mut in_place);
    assert_eq!(in_place, flattened(input));
}
