//! Prompt collaborator
//!
//! The gate never draws anything. It describes the dialog it wants as a
//! [`PromptRequest`] (title, message, labelled fields with pre-filled values)
//! and the host presents it however it likes, answering with the submitted
//! values or a cancellation.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Flow;
use crate::pin::Pin;

/// Input fields the gate may ask for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// The PIN (verification) or the new PIN (setup, reset)
    Pin,
    /// Confirmation of the new PIN
    Confirm,
    /// Current PIN when changing it
    OldPin,
}

impl Field {
    /// Stable field name for hosts that key submissions by string
    pub fn name(&self) -> &'static str {
        match self {
            Field::Pin => "pin",
            Field::Confirm => "confirm",
            Field::OldPin => "old_pin",
        }
    }

    /// Inverse of [`Field::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pin" => Some(Field::Pin),
            "confirm" => Some(Field::Confirm),
            "old_pin" => Some(Field::OldPin),
            _ => None,
        }
    }
}

/// One labelled input in a prompt
#[derive(Clone, Debug)]
pub struct PromptField {
    pub field: Field,
    /// Placeholder / label text
    pub label: String,
    /// Pre-filled value
    pub value: Pin,
    /// Mask the input
    pub secure: bool,
}

impl PromptField {
    /// A masked field pre-filled with `value`
    pub fn secure(field: Field, label: impl Into<String>, value: Pin) -> Self {
        Self {
            field,
            label: label.into(),
            value,
            secure: true,
        }
    }
}

/// A dialog the gate wants shown
#[derive(Clone, Debug)]
pub struct PromptRequest {
    /// Which flow is asking
    pub flow: Flow,
    pub title: String,
    /// Instruction text, with the reason for the retry appended when re-prompting
    pub message: String,
    pub fields: Vec<PromptField>,
}

impl PromptRequest {
    /// Look up a field description
    pub fn field(&self, field: Field) -> Option<&PromptField> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// Pre-filled value of a field, empty if the field is absent
    pub fn value(&self, field: Field) -> Pin {
        self.field(field)
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }
}

/// Values the user submitted, keyed by field
#[derive(Clone, Debug, Default)]
pub struct Submission {
    values: HashMap<Field, Pin>,
}

impl Submission {
    /// Empty submission
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: Field, value: impl Into<Pin>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field value
    pub fn insert(&mut self, field: Field, value: impl Into<Pin>) {
        self.values.insert(field, value.into());
    }

    /// Submitted value; a missing field reads as empty
    pub fn get(&self, field: Field) -> Pin {
        self.values.get(&field).cloned().unwrap_or_default()
    }

    /// Build from string-keyed pairs, ignoring unknown names
    pub fn from_named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Pin>,
    {
        pairs
            .into_iter()
            .filter_map(|(name, value)| {
                let value: Pin = value.into();
                Field::from_name(name.as_ref()).map(|field| (field, value))
            })
            .collect()
    }
}

impl FromIterator<(Field, Pin)> for Submission {
    fn from_iter<T: IntoIterator<Item = (Field, Pin)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// How the user answered a prompt
#[derive(Clone, Debug)]
pub enum PromptResponse {
    Submitted(Submission),
    Cancelled,
}

/// Presents prompts to the user
///
/// Each call suspends the flow until the user submits or cancels. The gate
/// never issues a second prompt before the first has been answered.
#[async_trait]
pub trait Prompt: Send {
    /// Show `request` and wait for the answer
    async fn present(&mut self, request: PromptRequest) -> PromptResponse;
}
