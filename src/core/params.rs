//! Purpose: Named, typed configuration parameters loaded from JSON.
//! Exports: `ParameterSet`.
//! Role: Builds one `DynHolder` per declared parameter through the text codec.
//! Invariants: Parameter names are unique; declaration order is preserved.
//! Invariants: Values obey the same grammar and errors as `TextCodec::set_as_text`.
use std::path::Path;

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use crate::core::codec::TextCodec;
use crate::core::error::{Error, ErrorKind};
use crate::core::holder::DynHolder;
use crate::core::value::HolderKind;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterDoc {
    parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterEntry {
    name: String,
    kind: String,
    value: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, DynHolder)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let doc: ParameterDoc = serde_json::from_str(input).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("invalid parameter document")
                .with_hint(r#"expected {"parameters":[{"name":..,"kind":..,"value":..}]}"#)
                .with_source(err)
        })?;
        let mut set = Self::new();
        for entry in doc.parameters {
            let kind = entry.kind.parse::<HolderKind>()?;
            let mut holder = DynHolder::new(kind);
            if let Err(err) = holder.set_as_text(&entry.value) {
                let mut wrapped = Error::new(err.kind()).with_message(format!(
                    "parameter {:?} has an invalid {} value",
                    entry.name, kind
                ));
                let hint = err.hint().map(str::to_string);
                if let Some(hint) = hint {
                    wrapped = wrapped.with_hint(hint);
                }
                return Err(wrapped.with_source(err));
            }
            set.insert(entry.name, holder)?;
        }
        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        })?;
        Self::from_json_str(&input)
    }

    /// Adds a parameter; a second parameter with the same name is rejected.
    pub fn insert(&mut self, name: impl Into<String>, holder: DynHolder) -> Result<(), Error> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("duplicate parameter {name:?}"))
                .with_hint("parameter names must be unique"));
        }
        self.entries.push((name, holder));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DynHolder> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, holder)| holder)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynHolder)> {
        self.entries
            .iter()
            .map(|(name, holder)| (name.as_str(), holder))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical document for this set; loading it yields an equal set.
    pub fn to_json(&self) -> JsonValue {
        let parameters: Vec<JsonValue> = self
            .iter()
            .map(|(name, holder)| {
                json!({
                    "name": name,
                    "kind": holder.kind().name(),
                    "value": holder.get_as_text(),
                })
            })
            .collect();
        json!({ "parameters": parameters })
    }
}
