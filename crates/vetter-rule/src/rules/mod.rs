//! Built-in leaf rules.

pub mod any;
pub mod checkbox;
pub mod domain;
pub mod email;
pub mod integer;
pub mod oneof;
pub mod regex;
pub mod string;

pub use any::AnyRule;
pub use checkbox::{AgreeToConditionsCheckbox, BooleanCheckbox};
pub use domain::DomainNameRule;
pub use email::EmailAddressRule;
pub use integer::IntegerRule;
pub use oneof::OneOf;
pub use self::regex::RegexRule;
pub use string::StringRule;

use serde_json::Value;

/// Short type name of a value, used in `invalid_type` messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
