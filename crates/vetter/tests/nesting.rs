use std::sync::Arc;

use vetter::prelude::*;
use vetter::rule::bridge;
use vetter::rule::{MessageLayer, RuleDefaults, RuleOptions, Unpacked};

fn person(mode: ReportMode) -> Schema {
    Schema::builder()
        .config(SchemaConfig::new().rule(RuleConfig::new().mode(mode)))
        .field("name", StringRule::with_length(Some(2), None, RuleConfig::default()).unwrap())
        .field("age", IntegerRule::bounded(Some(0), Some(150), RuleConfig::default()).unwrap())
        .build()
        .unwrap()
}

fn team(mode: ReportMode) -> Schema {
    let members = ForEach::with_config(
        Arc::new(person(mode)),
        ForEachConfig::new().rule(RuleConfig::new().mode(mode)),
    )
    .unwrap();
    Schema::builder()
        .config(SchemaConfig::new().rule(RuleConfig::new().mode(mode)))
        .field("title", StringRule::new().unwrap())
        .field("lead", person(mode))
        .field("members", members)
        .build()
        .unwrap()
}

fn invalid_team() -> Value {
    json!({
        "title": "core",
        "lead": {"name": "A", "age": "40"},
        "members": [
            {"name": "bob", "age": "x"},
            {"name": "eve", "age": "30"},
            {"name": "mallory", "age": 200}
        ]
    })
}

#[test]
fn valid_nested_input_converts() {
    let input = json!({
        "title": "core",
        "lead": {"name": "ada", "age": "36"},
        "members": [{"name": "bob", "age": 20}]
    });
    let outcome = team(ReportMode::Exception)
        .process(input, &mut Context::new())
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Value(json!({
            "title": "core",
            "lead": {"name": "ada", "age": 36},
            "members": [{"name": "bob", "age": 20}]
        }))
    );
}

#[test]
fn result_tree_mirrors_nesting() {
    let node = team(ReportMode::Result)
        .process(invalid_team(), &mut Context::new())
        .unwrap()
        .into_result()
        .unwrap();

    let record = node.as_record().unwrap();
    assert!(!record.child("title").unwrap().contains_error());

    let lead = record.child("lead").unwrap().as_record().unwrap();
    assert_eq!(lead.child("name").unwrap().first_error().unwrap().key, "too_short");
    assert_eq!(lead.child("age").and_then(ResultNode::value), Some(&json!(40)));

    let members = record.child("members").unwrap();
    let ErrorShape::Sequence { items, global } = members.errors() else {
        panic!("members should report a sequence of errors");
    };
    assert!(global.is_empty());
    assert_eq!(items.len(), 3);
    assert_eq!(
        items[0].as_ref().and_then(|shape| shape.field("age")).and_then(ErrorShape::first).map(|e| e.key.as_str()),
        Some("invalid_number")
    );
    assert!(items[1].is_none());
    assert_eq!(
        items[2].as_ref().and_then(|shape| shape.field("age")).and_then(ErrorShape::first).map(|e| e.key.as_str()),
        Some("too_big")
    );

    assert_eq!(node.error_count(), 3);
    assert!(node.contains_critical_error());
    assert!(node.value().is_none());
    let eve = members.as_repeating().unwrap().item(1).unwrap();
    assert_eq!(eve.value(), Some(&json!({"name": "eve", "age": 30})));
}

#[test]
fn exception_exposes_nested_structure() {
    let err = team(ReportMode::Exception)
        .process(invalid_team(), &mut Context::new())
        .unwrap_err();
    let err = err.as_invalid_data().unwrap();

    assert_eq!(err.details().key, "too_short");
    let lead = err.error_for("lead").unwrap();
    assert_eq!(lead.error_for("name").unwrap().key(), "too_short");

    let members = err.error_for("members").unwrap();
    let slots = members.errors();
    assert_eq!(slots.len(), 3);
    assert!(slots[1].is_none());
    assert_eq!(
        slots[2].and_then(|member| member.error_for("age")).map(|e| e.key()),
        Some("too_big")
    );

    let unpacked = err.unpack_errors();
    assert!(matches!(
        unpacked.get("members").and_then(|m| m.item(0)).and_then(|m| m.get("age")),
        Some(Unpacked::Leaf(_))
    ));
    assert!(unpacked.get("members").and_then(|m| m.item(1)).is_none());
}

#[test]
fn primary_error_is_the_same_in_both_modes() {
    let err = team(ReportMode::Exception)
        .process(invalid_team(), &mut Context::new())
        .unwrap_err();
    let node = team(ReportMode::Result)
        .process(invalid_team(), &mut Context::new())
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(
        err.as_invalid_data().map(|e| e.key()),
        node.first_error().map(|e| e.key.as_str())
    );
}

#[test]
fn bridge_round_trip_keeps_structure_and_criticality() {
    let node = team(ReportMode::Result)
        .process(invalid_team(), &mut Context::new())
        .unwrap()
        .into_result()
        .unwrap();
    let shape = node.errors();

    let exception = bridge::exception_from_errors(&shape).unwrap();
    let back = bridge::errors_from_exception(&exception);

    assert_eq!(back.count(), shape.count());
    assert_eq!(back.contains_critical_error(), shape.contains_critical_error());
    let keys = |shape: &ErrorShape| shape.flatten().iter().map(|e| e.key.clone()).collect::<Vec<_>>();
    assert_eq!(keys(&back), keys(&shape));
}

#[test]
fn sub_schema_with_non_mapping_input_stays_attached() {
    let node = team(ReportMode::Result)
        .process(
            json!({"title": "core", "lead": "ada", "members": []}),
            &mut Context::new(),
        )
        .unwrap()
        .into_result()
        .unwrap();

    let lead = node.as_record().unwrap().child("lead").unwrap();
    assert_eq!(lead.first_error().unwrap().key, "invalid_type");
    assert!(lead.as_record().is_some());
    assert_eq!(node.error_count(), 1);
}

/// Reports two independent problems for any string.
#[derive(Debug)]
struct Nitpicker {
    options: RuleOptions,
}

impl Nitpicker {
    fn new() -> Self {
        let layer = MessageLayer::new("nitpick")
            .message("lowercase", "Use lowercase letters.")
            .message("too_plain", "Add some decoration.");
        Self {
            options: RuleOptions::new(RuleConfig::default(), RuleDefaults::default(), [layer]).unwrap(),
        }
    }
}

impl Rule for Nitpicker {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn validate(&self, value: &Value, context: &mut Context) -> Result<(), ValidationError> {
        self.new_error("lowercase", value, context, Value::Null, false)?;
        self.new_error("too_plain", value, context, Value::Null, false)?;
        Ok(())
    }
}

#[test]
fn field_with_two_errors_stays_a_field() {
    let schema = Schema::builder()
        .config(SchemaConfig::new().rule(RuleConfig::new().result_mode()))
        .field("name", Nitpicker::new())
        .build()
        .unwrap();
    let node = schema
        .process(json!({"name": "x"}), &mut Context::new())
        .unwrap()
        .into_result()
        .unwrap();

    let child = node.as_record().unwrap().child("name").unwrap();
    let field = child.as_field().expect("a scalar field keeps a field node");
    let keys: Vec<_> = field.errors().iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, ["lowercase", "too_plain"]);
    assert!(field.errors().iter().all(|e| !e.is_critical));
    assert_eq!(child.initial_value(), &json!("x"));
    assert_eq!(node.error_count(), 2);
}

#[test]
fn exception_keeps_all_errors_of_a_field() {
    let schema = Schema::builder().field("name", Nitpicker::new()).build().unwrap();
    let err = schema
        .process(json!({"name": "x"}), &mut Context::new())
        .unwrap_err();
    let name = err.as_invalid_data().and_then(|e| e.error_for("name")).unwrap();

    assert_eq!(name.key(), "lowercase");
    assert!(name.is_leaf());
    let keys: Vec<_> = name.errors().into_iter().flatten().map(InvalidDataError::key).collect();
    assert_eq!(keys, ["lowercase", "too_plain"]);
}
