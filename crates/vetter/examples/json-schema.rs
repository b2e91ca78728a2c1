//! Combine a JSON Schema document with field rules.
//!
//! Run with:
//!   cargo run --example json-schema --features json-schema

use vetter::prelude::*;

const ADDRESS_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "street": {"type": "string"},
        "zip": {"type": "string", "pattern": "^[0-9]{5}$"}
    },
    "required": ["street", "zip"]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let address: Value = serde_json::from_str(ADDRESS_SCHEMA)?;
    let address = JsonSchemaRule::with_config(
        &address,
        JsonSchemaConfig {
            strict_mode: true,
            ..JsonSchemaConfig::default()
        },
    )?;

    let order = Schema::builder()
        .config(SchemaConfig::new().rule(RuleConfig::new().result_mode()))
        .field("quantity", IntegerRule::bounded(Some(1), Some(10), RuleConfig::default())?)
        .field("address", address)
        .build()?;

    let node = order
        .process(
            json!({"quantity": "3", "address": {"street": "Main St 1", "zip": "12a45", "floor": 2}}),
            &mut Context::new(),
        )?
        .into_result()
        .ok_or("result mode always returns a node")?;

    println!("{}", serde_json::to_string_pretty(&node.errors())?);
    Ok(())
}
