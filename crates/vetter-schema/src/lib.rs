//! Composite rules for vetter.
//!
//! [`Schema`] validates a mapping field by field and then runs whole-record
//! rules such as [`MatchingFields`]; [`ForEach`] applies one rule to every
//! element of a list. Both are ordinary [`Rule`](vetter_rule::Rule)s, so
//! they nest freely: a schema field may hold another schema or a `ForEach`
//! of schemas, and the result tree mirrors that nesting.
//!
//! With the `json-schema` feature (on by default), [`JsonSchemaRule`]
//! checks a value against a JSON Schema document.

pub mod config;
pub mod foreach;
#[cfg(feature = "json-schema")]
pub mod json_schema;
pub mod matching;
pub mod positional;
pub mod schema;
mod scope;

#[cfg(feature = "json-schema")]
pub use config::JsonSchemaConfig;
pub use config::{ForEachConfig, SchemaConfig};
pub use foreach::ForEach;
#[cfg(feature = "json-schema")]
pub use json_schema::JsonSchemaRule;
pub use matching::MatchingFields;
pub use positional::{PositionalSchema, EXTRA_FIELD};
pub use schema::{Schema, SchemaBuilder};
