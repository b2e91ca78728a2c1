//! Rule contract for vetter: convert, validate, report.
//!
//! A [`Rule`] turns one untrusted input value into a typed value. Every rule
//! runs through the same pipeline (strip, emptiness and required/default
//! policy, `convert`, then `validate` if conversion recorded no errors) and
//! reports in one of two modes: [`ReportMode::Exception`] fails with
//! [`ValidationError::InvalidData`], [`ReportMode::Result`] returns the
//! populated result node.
//!
//! Rule instances are frozen once built and can be shared between threads;
//! all per-call state lives in the [`Context`].

pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod messages;
pub mod options;
mod pipeline;
pub mod rule;
pub mod rules;

pub use config::{ReportMode, RuleConfig};
pub use context::Context;
pub use error::{ErrorDetails, ErrorKind, InvalidDataError, Result, Unpacked, ValidationError};
pub use messages::{MessageLayer, MessageRegistry, NativeTranslator, Translator};
pub use options::{base_layer, RuleDefaults, RuleOptions};
pub use rule::{outcome_into_node, process_scoped, Outcome, Rule};
pub use rules::{
    AgreeToConditionsCheckbox, AnyRule, BooleanCheckbox, DomainNameRule, EmailAddressRule,
    IntegerRule, OneOf, RegexRule, StringRule,
};
