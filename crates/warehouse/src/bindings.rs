//! Positional statement bindings in SQL API wire form.
//!
//! Serializes as an object keyed by 1-based position:
//! `{"1": {"type": "TEXT", "value": "..."}, "2": {"type": "TEXT", "value": null}}`.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BindingType {
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: BindingType,
    pub value: Option<String>,
}

/// Ordered bindings for the `?` placeholders of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    /// Binds every value as `TEXT`, `None` as SQL `NULL`.
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self(
            values
                .into_iter()
                .map(|value| Binding { kind: BindingType::Text, value: value.map(Into::into) })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Value bound at a 1-based position. `None` for NULL or out of range.
    #[must_use]
    pub fn text_at(&self, position: usize) -> Option<&str> {
        self.0.get(position.checked_sub(1)?)?.value.as_deref()
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, binding) in self.0.iter().enumerate() {
            map.serialize_entry(&(index + 1).to_string(), binding)?;
        }
        map.end()
    }
}
