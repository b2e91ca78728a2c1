use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Errors that can occur while processing a value with a rule.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The input data is invalid (or empty while required).
    #[error(transparent)]
    InvalidData(Box<InvalidDataError>),

    /// A rule was built or called with inconsistent arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Mutation of a frozen rule instance.
    #[error("thread safety violation: {0}")]
    ThreadSafety(String),

    /// A converted value could not be deserialized into the caller's type.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValidationError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// The carried data error, if this is one.
    pub fn as_invalid_data(&self) -> Option<&InvalidDataError> {
        match self {
            Self::InvalidData(error) => Some(error.as_ref()),
            _ => None,
        }
    }

    /// True for errors caused by the programmer rather than by user input.
    pub fn is_programmer_error(&self) -> bool {
        !matches!(self, Self::InvalidData(_))
    }
}

impl From<InvalidDataError> for ValidationError {
    fn from(error: InvalidDataError) -> Self {
        Self::InvalidData(Box::new(error))
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Distinguishes "value missing" from "value wrong".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    #[default]
    Invalid,
    Empty,
}

/// Primary (first) error carried by an [`InvalidDataError`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    pub key: String,
    pub message: String,
    pub value: Value,
    pub context: Map<String, Value>,
}

/// Exception-style report of invalid data.
///
/// A leaf error carries only its details. Composite errors additionally
/// carry either a per-field `error_dict` or a per-position `error_list`
/// (where `None` marks a valid position), never both.
///
/// Errors reported for the value itself rather than for a nested field or
/// position are kept in `global_errors`: every error of a field that failed
/// more than one check, or the record/list-level errors of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidDataError {
    kind: ErrorKind,
    details: ErrorDetails,
    is_critical: bool,
    error_dict: IndexMap<String, InvalidDataError>,
    error_list: Vec<Option<InvalidDataError>>,
    global_errors: Vec<InvalidDataError>,
}

impl InvalidDataError {
    /// Create a leaf error.
    pub fn new(
        key: impl Into<String>,
        message: impl Into<String>,
        value: Value,
        context: Map<String, Value>,
    ) -> Self {
        let key = key.into();
        let kind = if key == "empty" {
            ErrorKind::Empty
        } else {
            ErrorKind::Invalid
        };
        Self {
            kind,
            details: ErrorDetails {
                key,
                message: message.into(),
                value,
                context,
            },
            is_critical: true,
            error_dict: IndexMap::new(),
            error_list: Vec::new(),
            global_errors: Vec::new(),
        }
    }

    /// Create a composite error. Passing both a non-empty dict and a
    /// non-empty list is a programmer error.
    pub fn composite(
        details: ErrorDetails,
        error_dict: IndexMap<String, InvalidDataError>,
        error_list: Vec<Option<InvalidDataError>>,
    ) -> Result<Self> {
        if !error_dict.is_empty() && !error_list.is_empty() {
            return Err(ValidationError::invalid_arguments(
                "error_dict and error_list are mutually exclusive",
            ));
        }
        let mut error = Self::new(details.key, details.message, details.value, details.context);
        error.error_dict = error_dict;
        error.error_list = error_list;
        Ok(error)
    }

    pub(crate) fn with_error_dict(mut self, error_dict: IndexMap<String, InvalidDataError>) -> Self {
        self.error_list.clear();
        self.error_dict = error_dict;
        self
    }

    pub(crate) fn with_error_list(mut self, error_list: Vec<Option<InvalidDataError>>) -> Self {
        self.error_dict.clear();
        self.error_list = error_list;
        self
    }

    /// Attach the errors reported for the value itself.
    pub fn with_global_errors(mut self, global_errors: Vec<InvalidDataError>) -> Self {
        self.global_errors = global_errors;
        self
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn critical(mut self, is_critical: bool) -> Self {
        self.is_critical = is_critical;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_empty_error(&self) -> bool {
        self.kind == ErrorKind::Empty
    }

    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    /// The primary error: for composites this is the first nested error.
    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn key(&self) -> &str {
        &self.details.key
    }

    pub fn message(&self) -> &str {
        &self.details.message
    }

    pub fn value(&self) -> &Value {
        &self.details.value
    }

    pub fn error_dict(&self) -> &IndexMap<String, InvalidDataError> {
        &self.error_dict
    }

    pub fn error_list(&self) -> &[Option<InvalidDataError>] {
        &self.error_list
    }

    /// True when neither a dict nor a list is attached.
    pub fn is_leaf(&self) -> bool {
        self.error_dict.is_empty() && self.error_list.is_empty()
    }

    /// Errors reported for the value itself. A leaf without further errors
    /// yields itself.
    pub fn global_errors(&self) -> Vec<&InvalidDataError> {
        if self.global_errors.is_empty() && self.is_leaf() {
            vec![self]
        } else {
            self.global_errors.iter().collect()
        }
    }

    /// Direct children: the list entries, or the dict values, or the
    /// errors of the value itself.
    pub fn errors(&self) -> Vec<Option<&InvalidDataError>> {
        if !self.error_list.is_empty() {
            self.error_list.iter().map(Option::as_ref).collect()
        } else if !self.error_dict.is_empty() {
            self.error_dict.values().map(Some).collect()
        } else {
            self.global_errors().into_iter().map(Some).collect()
        }
    }

    /// Nested error for a named field.
    pub fn error_for(&self, name: &str) -> Option<&InvalidDataError> {
        self.error_dict.get(name)
    }

    /// Recursive view of all nested errors.
    pub fn unpack_errors(&self) -> Unpacked<'_> {
        if !self.error_dict.is_empty() {
            Unpacked::Dict {
                fields: self
                    .error_dict
                    .iter()
                    .map(|(name, error)| (name.as_str(), error.unpack_errors()))
                    .collect(),
                global: self.global_errors.iter().collect(),
            }
        } else if !self.error_list.is_empty() {
            Unpacked::List {
                items: self
                    .error_list
                    .iter()
                    .map(|error| error.as_ref().map(InvalidDataError::unpack_errors))
                    .collect(),
                global: self.global_errors.iter().collect(),
            }
        } else {
            Unpacked::Leaf(self)
        }
    }
}

impl fmt::Display for InvalidDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.details.message)
    }
}

impl std::error::Error for InvalidDataError {}

/// Nested structure returned by [`InvalidDataError::unpack_errors`].
#[derive(Debug, Clone, PartialEq)]
pub enum Unpacked<'a> {
    Leaf(&'a InvalidDataError),
    Dict {
        fields: IndexMap<&'a str, Unpacked<'a>>,
        global: Vec<&'a InvalidDataError>,
    },
    List {
        items: Vec<Option<Unpacked<'a>>>,
        global: Vec<&'a InvalidDataError>,
    },
}

impl<'a> Unpacked<'a> {
    pub fn as_leaf(&self) -> Option<&'a InvalidDataError> {
        match self {
            Self::Leaf(error) => Some(*error),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Unpacked<'a>> {
        match self {
            Self::Dict { fields, .. } => fields.get(name),
            _ => None,
        }
    }

    pub fn item(&self, index: usize) -> Option<&Unpacked<'a>> {
        match self {
            Self::List { items, .. } => items.get(index).and_then(Option::as_ref),
            _ => None,
        }
    }

    /// Errors reported for the value itself at this level.
    pub fn global(&self) -> Vec<&'a InvalidDataError> {
        match self {
            Self::Leaf(error) => InvalidDataError::global_errors(*error),
            Self::Dict { global, .. } | Self::List { global, .. } => global.clone(),
        }
    }
}
