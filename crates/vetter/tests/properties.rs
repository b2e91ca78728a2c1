use proptest::prelude::*;
use vetter::prelude::*;

fn result_mode() -> RuleConfig {
    RuleConfig::new().result_mode()
}

/// An integer field value: valid numbers, numeric strings, or garbage.
fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        any::<i32>().prop_map(|n| json!(n.to_string())),
        "[a-z]{1,6}".prop_map(|s| json!(s)),
        Just(Value::Null),
    ]
}

proptest! {
    #[test]
    fn integers_are_idempotent(n in any::<i64>()) {
        let rule = IntegerRule::new().unwrap();
        let first = rule.process(json!(n), &mut Context::new()).unwrap();
        prop_assert_eq!(&first, &Outcome::Value(json!(n)));

        let again = rule.process(first.into_value().unwrap(), &mut Context::new()).unwrap();
        prop_assert_eq!(again, Outcome::Value(json!(n)));
    }

    #[test]
    fn numeric_strings_convert(n in any::<i64>(), pad in "[ ]{0,3}") {
        let rule = IntegerRule::new().unwrap();
        let input = json!(format!("{pad}{n}{pad}"));
        prop_assert_eq!(rule.process(input, &mut Context::new()).unwrap(), Outcome::Value(json!(n)));
    }

    #[test]
    fn valid_input_has_no_errors(text in "[a-z]{1,20}") {
        let rule = StringRule::with_length(Some(1), Some(20), result_mode()).unwrap();
        let node = rule.process(json!(text), &mut Context::new()).unwrap().into_result().unwrap();
        prop_assert!(!node.contains_error());
        prop_assert_eq!(node.value(), Some(&json!(text)));
    }

    #[test]
    fn required_empty_yields_one_empty_error(blank in prop_oneof![Just(Value::Null), Just(json!(""))]) {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(StringRule::with_config(result_mode()).unwrap()),
            Box::new(EmailAddressRule::with_config(result_mode()).unwrap()),
            Box::new(DomainNameRule::with_config(result_mode()).unwrap()),
        ];
        for rule in rules {
            let node = rule.process(blank.clone(), &mut Context::new()).unwrap().into_result().unwrap();
            prop_assert_eq!(node.error_count(), 1);
            prop_assert_eq!(node.first_error().map(|e| e.key.clone()), Some("empty".to_string()));
        }
    }

    #[test]
    fn blank_string_is_not_an_empty_number(pad in "[ ]{0,3}") {
        let rule = IntegerRule::with_config(result_mode()).unwrap();
        let node = rule.process(json!(pad), &mut Context::new()).unwrap().into_result().unwrap();
        prop_assert_eq!(node.error_count(), 1);
        prop_assert_eq!(node.first_error().map(|e| e.key.clone()), Some("invalid_number".to_string()));
    }

    #[test]
    fn missing_field_behaves_like_empty_marker(present in any::<bool>()) {
        let schema = Schema::builder()
            .config(SchemaConfig::new().rule(result_mode()))
            .field("id", IntegerRule::new().unwrap())
            .build()
            .unwrap();
        let input = if present { json!({"id": null}) } else { json!({}) };
        let node = schema.process(input, &mut Context::new()).unwrap().into_result().unwrap();
        let id = node.as_record().unwrap().child("id").unwrap();
        prop_assert_eq!(id.first_error().map(|e| e.key.clone()), Some("empty".to_string()));
        prop_assert_eq!(node.error_count(), 1);
    }

    #[test]
    fn error_list_slots_follow_input_positions(items in prop::collection::vec(prop::option::of(any::<i32>()), 1..12)) {
        let input: Vec<Value> = items
            .iter()
            .map(|item| item.map_or(json!("bad"), |n| json!(n)))
            .collect();
        let rule = ForEach::new(IntegerRule::new().unwrap()).unwrap();
        let outcome = rule.process(Value::Array(input), &mut Context::new());

        if items.iter().all(Option::is_some) {
            prop_assert!(outcome.is_ok());
        } else {
            let err = outcome.unwrap_err();
            let slots = err.as_invalid_data().unwrap().errors();
            prop_assert_eq!(slots.len(), items.len());
            for (slot, item) in slots.iter().zip(&items) {
                prop_assert_eq!(slot.is_some(), item.is_none());
            }
        }
    }

    #[test]
    fn exception_and_result_agree_on_primary_error(
        a in field_value(),
        b in field_value(),
        c in field_value(),
    ) {
        let build = |mode: ReportMode| {
            Schema::builder()
                .config(SchemaConfig::new().rule(RuleConfig::new().mode(mode)))
                .field("a", IntegerRule::bounded(Some(0), None, RuleConfig::default()).unwrap())
                .field("b", IntegerRule::new().unwrap())
                .field("c", IntegerRule::bounded(None, Some(100), RuleConfig::default()).unwrap())
                .build()
                .unwrap()
        };
        let input = json!({"a": a, "b": b, "c": c});

        let node = build(ReportMode::Result)
            .process(input.clone(), &mut Context::new())
            .unwrap()
            .into_result()
            .unwrap();
        match build(ReportMode::Exception).process(input, &mut Context::new()) {
            Ok(_) => prop_assert!(!node.contains_error()),
            Err(err) => {
                let err = err.as_invalid_data().unwrap();
                prop_assert_eq!(Some(err.key()), node.first_error().map(|e| e.key.as_str()));
                let ErrorShape::Record { fields, .. } = node.errors() else {
                    panic!("schema results have a record shape");
                };
                prop_assert_eq!(err.error_dict().len(), fields.len());
            }
        }
    }
}
