//! Form serialization
//!
//! A [`Form`] is a snapshot of the controls of a management page form.
//! [`form_to_json`] turns it into the JSON object that is submitted to the
//! backend, normalizing checkboxes to real booleans.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value a checkbox submits when it has no `value` attribute
const DEFAULT_CHECKBOX_VALUE: &str = "on";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Number,
    Hidden,
    Password,
    Email,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Submit,
    Button,
    Reset,
    File,
}

impl InputKind {
    /// Controls that `serializeArray` never submits
    fn is_excluded(self) -> bool {
        matches!(
            self,
            InputKind::Submit | InputKind::Button | InputKind::Reset | InputKind::File
        )
    }

    fn is_checkable(self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Radio)
    }
}

/// One control of a form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Control {
    #[serde(rename = "type", default)]
    pub kind: InputKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl Control {
    pub fn new(kind: InputKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self::new(InputKind::Text, name).with_value(value)
    }

    pub fn checkbox(name: &str, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(InputKind::Checkbox, name)
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Value submitted for this control, if it is successful
    fn submitted_value(&self) -> Option<String> {
        if self.name.is_empty() || self.disabled || self.kind.is_excluded() {
            return None;
        }
        if self.kind.is_checkable() && !self.checked {
            return None;
        }

        match (self.kind, &self.value) {
            (InputKind::Checkbox | InputKind::Radio, None) => {
                Some(DEFAULT_CHECKBOX_VALUE.to_string())
            }
            // A select with nothing selected submits nothing
            (InputKind::Select, None) => None,
            (_, value) => Some(value.clone().unwrap_or_default()),
        }
    }
}

/// A name/value pair as produced by `serializeArray`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPair {
    pub name: String,
    pub value: String,
}

/// The host primitives form serialization relies on
pub trait FormSource {
    /// Successful controls in document order
    fn serialize_array(&self) -> Vec<FieldPair>;

    /// Every checkbox with its checked state
    fn checkboxes(&self) -> Vec<(String, bool)>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }
}

impl FormSource for Form {
    fn serialize_array(&self) -> Vec<FieldPair> {
        self.controls
            .iter()
            .filter_map(|c| {
                c.submitted_value().map(|value| FieldPair {
                    name: c.name.clone(),
                    value,
                })
            })
            .collect()
    }

    fn checkboxes(&self) -> Vec<(String, bool)> {
        self.controls
            .iter()
            .filter(|c| c.kind == InputKind::Checkbox && !c.name.is_empty())
            .map(|c| (c.name.clone(), c.checked))
            .collect()
    }
}

/// Convert a form into a JSON object keyed by field name.
///
/// Repeated names keep the last value. Every checkbox ends up as a boolean
/// equal to its checked state, including unchecked ones that
/// `serialize_array` leaves out.
pub fn form_to_json<F: FormSource + ?Sized>(form: &F) -> Map<String, Value> {
    let mut data = Map::new();

    for pair in form.serialize_array() {
        data.insert(pair.name, Value::String(pair.value));
    }

    for (name, checked) in form.checkboxes() {
        data.insert(name, Value::Bool(checked));
    }

    tracing::debug!("Serialized form with {} fields", data.len());
    data
}
