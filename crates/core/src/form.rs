//! Form data model: an insertion-ordered tree of renderable input elements.
//!
//! The host's form structure is order-sensitive (elements render in the order
//! they were attached), so the mapping type preserves insertion order on
//! iteration and replacing a value never moves its entry.

use core::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::ValidatorRef;

/// Key reserved for validator references in serialized form trees.
const VALIDATOR_TAG: &str = "::validator";

/// A single node in a form tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Sequence(Vec<FormValue>),
    Map(FormMap),
    /// Reference to a named validation routine owned by the host.
    Validator(ValidatorRef),
}

impl FormValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FormValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[FormValue]> {
        match self {
            FormValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FormMap> {
        match self {
            FormValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut FormMap> {
        match self {
            FormValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_validator(&self) -> Option<&ValidatorRef> {
        match self {
            FormValue::Validator(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Int(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<Vec<FormValue>> for FormValue {
    fn from(value: Vec<FormValue>) -> Self {
        FormValue::Sequence(value)
    }
}

impl From<FormMap> for FormValue {
    fn from(value: FormMap) -> Self {
        FormValue::Map(value)
    }
}

impl From<ValidatorRef> for FormValue {
    fn from(value: ValidatorRef) -> Self {
        FormValue::Validator(value)
    }
}

/// Insertion-ordered mapping from element keys to [`FormValue`] nodes.
///
/// Invariants:
/// - iteration yields entries in insertion order
/// - `insert` on an existing key replaces the value without moving the entry
/// - `remove` preserves the relative order of the remaining entries
///
/// Lookups are linear; form trees stay small.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormMap {
    entries: Vec<(String, FormValue)>,
}

impl FormMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FormValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert or replace. Replacing keeps the entry's position; a new key is
    /// appended at the end. Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FormValue>,
    ) -> Option<FormValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<FormValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut FormValue)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Walk a path of nested map keys, returning the node at its end.
    pub fn get_path(&self, path: &[&str]) -> Option<&FormValue> {
        let (first, rest) = path.split_first()?;
        let mut current = self.get(first)?;
        for key in rest {
            current = current.as_map()?.get(key)?;
        }
        Some(current)
    }

    /// Get-or-insert a nested map under `key`.
    ///
    /// Any non-map value previously stored under `key` is replaced by an
    /// empty map.
    pub fn map_mut(&mut self, key: impl Into<String>) -> &mut FormMap {
        let key = key.into();
        let idx = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key, FormValue::Map(FormMap::new())));
                self.entries.len() - 1
            }
        };
        let slot = &mut self.entries[idx].1;
        if !matches!(slot, FormValue::Map(_)) {
            *slot = FormValue::Map(FormMap::new());
        }
        match slot {
            FormValue::Map(map) => map,
            _ => unreachable!("slot was just made a map"),
        }
    }
}

impl FromIterator<(String, FormValue)> for FormMap {
    fn from_iter<T: IntoIterator<Item = (String, FormValue)>>(iter: T) -> Self {
        let mut map = FormMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for FormMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FormMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FormMapVisitor;

        impl<'de> Visitor<'de> for FormMapVisitor {
            type Value = FormMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of form elements")
            }

            fn visit_map<A>(self, mut access: A) -> Result<FormMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = FormMap::new();
                // Duplicate keys in the input keep the last value.
                while let Some((key, value)) = access.next_entry::<String, FormValue>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(FormMapVisitor)
    }
}

impl Serialize for FormValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FormValue::Bool(b) => serializer.serialize_bool(*b),
            FormValue::Int(i) => serializer.serialize_i64(*i),
            FormValue::Text(s) => serializer.serialize_str(s),
            FormValue::Sequence(items) => items.serialize(serializer),
            FormValue::Map(map) => map.serialize(serializer),
            FormValue::Validator(v) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(VALIDATOR_TAG, v.as_str())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FormValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FormValueVisitor;

        impl<'de> Visitor<'de> for FormValueVisitor {
            type Value = FormValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a form value (bool, integer, string, sequence, or map)")
            }

            fn visit_bool<E>(self, v: bool) -> Result<FormValue, E> {
                Ok(FormValue::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<FormValue, E> {
                Ok(FormValue::Int(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<FormValue, E>
            where
                E: de::Error,
            {
                i64::try_from(v)
                    .map(FormValue::Int)
                    .map_err(|_| E::custom("integer out of range for a form value"))
            }

            fn visit_str<E>(self, v: &str) -> Result<FormValue, E> {
                Ok(FormValue::Text(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<FormValue, E> {
                Ok(FormValue::Text(v))
            }

            fn visit_seq<A>(self, mut access: A) -> Result<FormValue, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = access.next_element()? {
                    items.push(item);
                }
                Ok(FormValue::Sequence(items))
            }

            fn visit_map<A>(self, mut access: A) -> Result<FormValue, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = FormMap::new();
                while let Some((key, value)) = access.next_entry::<String, FormValue>()? {
                    map.insert(key, value);
                }
                // A single `::validator` entry is the tagged encoding of a
                // validator reference.
                if map.len() == 1 {
                    if let Some(FormValue::Text(name)) = map.get(VALIDATOR_TAG) {
                        let validator =
                            ValidatorRef::new(name.clone()).map_err(de::Error::custom)?;
                        return Ok(FormValue::Validator(validator));
                    }
                }
                Ok(FormValue::Map(map))
            }
        }

        deserializer.deserialize_any(FormValueVisitor)
    }
}
