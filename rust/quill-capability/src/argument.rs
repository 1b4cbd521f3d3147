use serde::{Deserialize, Serialize};

use crate::QuillCapabilityError;

/// A positional argument passed along with an action.
///
/// The meaning of each position is specific to the action: the first
/// argument of `edit_post` is a post id, the second argument of
/// `edit_post_meta` a meta key, the arguments of `manage_sites` tenant ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    /// A numeric id
    Int(i64),
    /// A name or key
    Text(String),
    /// A list of numeric ids
    List(Vec<i64>),
}

impl Argument {
    /// Interpret the argument as an object id.
    ///
    /// Ids are positive. Zero, negative numbers, lists and text that does not
    /// parse as a positive integer identify no object and yield `None`.
    pub fn as_object_id(&self) -> Option<u64> {
        match self {
            Argument::Int(value) if *value > 0 => Some(*value as u64),
            Argument::Text(text) => text.trim().parse::<u64>().ok().filter(|id| *id > 0),
            _ => None,
        }
    }

    /// Interpret the argument as a name
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Argument::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Every integer carried by the argument
    pub fn integers(&self) -> Vec<i64> {
        match self {
            Argument::Int(value) => vec![*value],
            Argument::List(values) => values.clone(),
            Argument::Text(text) => text.trim().parse::<i64>().ok().into_iter().collect(),
        }
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Int(value)
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Int(value as i64)
    }
}

impl From<u64> for Argument {
    fn from(value: u64) -> Self {
        Argument::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

impl From<Vec<i64>> for Argument {
    fn from(value: Vec<i64>) -> Self {
        Argument::List(value)
    }
}

/// Fetch the argument at `position`, raising a programmer error when the
/// caller supplied none.
pub(crate) fn required<'a>(
    action: &str,
    arguments: &'a [Argument],
    position: usize,
) -> Result<&'a Argument, QuillCapabilityError> {
    arguments
        .get(position)
        .ok_or_else(|| QuillCapabilityError::MissingArgument {
            action: action.to_string(),
            position,
        })
}

/// One entry of a batched authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequest {
    /// The action to authorize
    pub action: String,
    /// Its positional arguments
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl CapabilityRequest {
    /// A request without arguments
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            arguments: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn with_argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }
}

impl<S, A> From<(S, A)> for CapabilityRequest
where
    S: Into<String>,
    A: IntoIterator,
    A::Item: Into<Argument>,
{
    fn from((action, arguments): (S, A)) -> Self {
        Self {
            action: action.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}
