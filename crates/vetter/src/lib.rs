//! Convert and validate untrusted input into typed values.
//!
//! vetter takes in-memory input (a scalar, a mapping or a list, usually
//! built with [`serde_json::json!`] or deserialized by the caller) and runs
//! it through [`Rule`](rule::Rule)s. Each rule converts the raw value and
//! then validates the converted one. Failures are reported either as an
//! error (`ReportMode::Exception`) or as a result tree that keeps every
//! field's initial value, converted value and errors (`ReportMode::Result`).
//!
//! # Crate Structure
//!
//! - [`tree`]: Result tree nodes and the error record
//! - [`rule`]: Rule contract, context, messages, error bridge and leaf rules
//! - [`schema`]: Schemas, repeaters, whole-record rules and JSON Schema (behind `json-schema` feature)
//!
//! # Example
//!
//! ```
//! use vetter::prelude::*;
//!
//! let schema = Schema::builder()
//!     .field("age", IntegerRule::bounded(Some(18), None, RuleConfig::default())?)
//!     .field("email", EmailAddressRule::new()?)
//!     .build()?;
//!
//! let err = schema
//!     .process(json!({"age": "12", "email": "ada@example.com"}), &mut Context::new())
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "Number must be 18 or greater.");
//! # Ok::<(), ValidationError>(())
//! ```

/// Re-export result tree types.
pub mod tree {
    pub use vetter_tree::*;
}

/// Re-export rule types.
pub mod rule {
    pub use vetter_rule::*;
}

/// Re-export composite rule types.
pub mod schema {
    pub use vetter_schema::*;
}

/// The types needed to build and run rules.
pub mod prelude {
    pub use serde_json::{json, Value};
    pub use vetter_rule::{
        AgreeToConditionsCheckbox, AnyRule, BooleanCheckbox, Context, DomainNameRule,
        EmailAddressRule, IntegerRule, InvalidDataError, OneOf, Outcome, RegexRule, ReportMode,
        Rule, RuleConfig, StringRule, ValidationError,
    };
    #[cfg(feature = "json-schema")]
    pub use vetter_schema::{JsonSchemaConfig, JsonSchemaRule};
    pub use vetter_schema::{
        ForEach, ForEachConfig, MatchingFields, PositionalSchema, Schema, SchemaConfig,
    };
    pub use vetter_tree::{Error, ErrorShape, ResultNode};
}
