//! Result tree for vetter rules.
//!
//! Every call to a rule produces one tree of nodes holding the raw input,
//! the converted value and the errors found. The tree is per-call data and
//! never shared between calls.

pub mod error;
pub mod field;
pub mod node;
pub mod record;
pub mod repeating;

pub use error::Error;
pub use field::FieldValue;
pub use node::{ErrorShape, ResultNode};
pub use record::RecordValue;
pub use repeating::RepeatingValue;
