use pipette::{Pattern, Replacement, TransformRegistry, replace_text, transform};
use proptest::prelude::*;
use serde_json::{Value, json};

fn non_text_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        prop::collection::vec("[a-z]{0,4}", 0..4).prop_map(|items| json!(items)),
        "[a-z]{1,4}".prop_map(|key| {
            let mut map = serde_json::Map::new();
            map.insert(key, json!("value"));
            Value::Object(map)
        }),
    ]
}

proptest! {
    #[test]
    fn non_text_input_is_returned_unchanged(
        input in non_text_value(),
        pattern in "[a-z]{0,3}",
        replacement in "[a-z$&]{0,3}",
    ) {
        let pattern = Pattern::literal(pattern);
        let replacement = Replacement::template(replacement);
        prop_assert_eq!(transform(&input, Some(&pattern), Some(&replacement)), input);
    }

    #[test]
    fn absent_pattern_returns_input(input in ".*", replacement in ".*") {
        let input = json!(input);
        let replacement = Replacement::template(replacement);
        prop_assert_eq!(transform(&input, None, Some(&replacement)), input);
    }

    #[test]
    fn absent_replacement_returns_input(input in ".*", pattern in ".*") {
        let input = json!(input);
        let pattern = Pattern::literal(pattern);
        prop_assert_eq!(transform(&input, Some(&pattern), None), input);
    }

    #[test]
    fn literal_replacement_matches_replacen(
        input in "[ab ]{0,12}",
        needle in "[ab]{1,2}",
        replacement in "[xy]{0,3}",
    ) {
        let expected = input.replacen(&needle, &replacement, 1);
        let actual = replace_text(
            &input,
            &Pattern::literal(needle),
            &Replacement::template(replacement),
        );
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn global_expression_matches_str_replace(
        input in "[ab ]{0,12}",
        needle in "[ab]{1,2}",
        replacement in "[xy]{0,3}",
    ) {
        let expected = input.replace(&needle, &replacement);
        let pattern = Pattern::expression(&regex::escape(&needle), "g").unwrap();
        let actual = replace_text(&input, &pattern, &Replacement::template(replacement));
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn whole_match_reference_is_identity(input in "[a-z0-9 ]{0,16}") {
        let pattern = Pattern::expression(r"\w+", "g").unwrap();
        let actual = replace_text(&input, &pattern, &Replacement::template("$&"));
        prop_assert_eq!(actual.as_ref(), input.as_str());
    }

    #[test]
    fn registry_agrees_with_typed_transform(
        input in "[ab]{0,8}",
        needle in "[ab]",
        replacement in "[xy]",
    ) {
        let registry = TransformRegistry::with_builtins();
        let via_registry = registry
            .apply("replace", &json!(input), &[json!(needle), json!(replacement)])
            .unwrap();
        let typed = transform(
            &json!(input),
            Some(&Pattern::literal(needle)),
            Some(&Replacement::template(replacement)),
        );
        prop_assert_eq!(via_registry, typed);
    }
}

#[test]
fn examples_from_the_contract() {
    let b = Replacement::template("b");

    assert_eq!(
        transform(
            &json!("hello world"),
            Some(&Pattern::literal("world")),
            Some(&Replacement::template("there")),
        ),
        json!("hello there")
    );
    assert_eq!(
        transform(&json!("aaa"), Some(&Pattern::expression("a", "g").unwrap()), Some(&b)),
        json!("bbb")
    );
    assert_eq!(
        transform(&json!("aaa"), Some(&Pattern::literal("a")), Some(&b)),
        json!("baa")
    );
}
