//! One schema instance shared by several worker threads.
//!
//! Run with:
//!   cargo run --example shared-schema

use std::sync::Arc;
use std::thread;

use vetter::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::level_filters::LevelFilter::INFO)
        .with_target(false)
        .init();

    let schema = Arc::new(
        Schema::builder()
            .config(SchemaConfig::new().rule(RuleConfig::new().result_mode()))
            .field("id", IntegerRule::bounded(Some(1), None, RuleConfig::default())?)
            .field("tag", OneOf::new([json!("red"), json!("green"), json!("blue")])?)
            .build()?,
    );

    let submissions = vec![
        json!({"id": "1", "tag": "red"}),
        json!({"id": "0", "tag": "green"}),
        json!({"id": "x", "tag": "purple"}),
        json!({"id": "42", "tag": "blue"}),
    ];

    let handles: Vec<_> = submissions
        .into_iter()
        .enumerate()
        .map(|(worker, input)| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let outcome = schema.process(input, &mut Context::new());
                (worker, outcome)
            })
        })
        .collect();

    for handle in handles {
        let (worker, outcome) = handle.join().map_err(|_| "worker panicked")?;
        let node = outcome?
            .into_result()
            .ok_or("result mode always returns a node")?;
        tracing::info!(
            worker,
            errors = node.error_count(),
            critical = node.contains_critical_error(),
            "submission processed"
        );
        match node.value() {
            Some(value) => println!("worker {worker}: {value}"),
            None => println!("worker {worker}: rejected"),
        }
    }
    Ok(())
}
