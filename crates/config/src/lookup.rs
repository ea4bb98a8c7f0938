//! Hook declaration lookup
//!
//! Answers one question about a `.pre-commit-config.yaml` document: is a hook
//! with this id or alias declared anywhere in it?
//!
//! ```yaml
//! repos:
//!   - repo: https://github.com/pre-commit/pre-commit-hooks
//!     hooks:
//!       - id: trailing-whitespace
//!       - id: pretty-format-json
//!         alias: pretty-format-openapi-json
//! ```
//!
//! The document is parsed fresh on every call. Structure that does not match
//! the shape above (a repo that is not a mapping, `hooks` that is not a
//! sequence, a non-string `id`) is skipped rather than reported, and a document
//! that cannot be parsed at all simply declares nothing.
//!
//! Parsing follows what pre-commit itself accepts: anchors and `<<` merge keys
//! are resolved, and a key repeated within one mapping keeps its last value.

use serde::de::{
    self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// File name of the hook configuration, relative to the project base directory
pub const CONFIG_FILE_NAME: &str = ".pre-commit-config.yaml";

/// Keys under which a hook entry can be named
const NAME_KEYS: [&str; 2] = ["id", "alias"];

/// Stateless lookup of hook declarations
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLookup;

impl ConfigLookup {
    /// Create a new lookup
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check if `hook` is declared in the configuration file at `config_file`
    ///
    /// Returns false when the file does not exist, the hook name is empty, or
    /// the file cannot be read or parsed. Read and parse failures are logged as
    /// warnings.
    #[must_use]
    pub fn is_hook_configured(&self, config_file: &Path, hook: &str) -> bool {
        if hook.is_empty() || !config_file.exists() {
            return false;
        }

        match File::open(config_file) {
            Ok(file) => self.is_hook_configured_in(file, hook),
            Err(e) => {
                tracing::warn!(
                    "Failed to read pre-commit config file {}: {}",
                    config_file.display(),
                    e
                );
                false
            }
        }
    }

    /// Check if `hook` is declared in the YAML document read from `reader`
    #[must_use]
    pub fn is_hook_configured_in<R: Read>(&self, mut reader: R, hook: &str) -> bool {
        if hook.is_empty() {
            return false;
        }

        let mut content = String::new();
        if let Err(e) = reader.read_to_string(&mut content) {
            tracing::warn!("Failed to read pre-commit config: {}", e);
            return false;
        }

        if content.trim().is_empty() {
            return false;
        }

        let mut document = match serde_yaml::from_str::<LenientValue>(&content) {
            Ok(LenientValue(document)) => document,
            Err(e) => {
                tracing::warn!("Failed to parse pre-commit config YAML: {}", e);
                return false;
            }
        };

        // A bad merge leaves the rest of the document usable
        if let Err(e) = document.apply_merge() {
            tracing::debug!("Failed to resolve YAML merge keys: {}", e);
        }

        hook_entries(&document).any(|entry| names_hook(entry, hook))
    }
}

/// Every hook entry that is a mapping, across every repo that is a mapping
fn hook_entries(document: &Value) -> impl Iterator<Item = &Mapping> {
    document
        .get("repos")
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(Value::as_mapping)
        .filter_map(|repo| repo.get("hooks").and_then(Value::as_sequence))
        .flatten()
        .filter_map(Value::as_mapping)
}

fn names_hook(entry: &Mapping, hook: &str) -> bool {
    NAME_KEYS
        .iter()
        .any(|key| entry.get(*key).and_then(Value::as_str) == Some(hook))
}

/// YAML value that tolerates repeated mapping keys, last one wins
struct LenientValue(Value);

impl<'de> Deserialize<'de> for LenientValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientVisitor)
    }
}

struct LenientVisitor;

impl<'de> Visitor<'de> for LenientVisitor {
    type Value = LenientValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::Number(v.into())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::Number(v.into())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::Number(v.into())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<LenientValue, E> {
        Ok(LenientValue(Value::Null))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<LenientValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        LenientValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<LenientValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(LenientValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(LenientValue(Value::Sequence(items)))
    }

    fn visit_map<A>(self, mut map: A) -> Result<LenientValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut mapping = Mapping::new();
        while let Some((LenientValue(key), LenientValue(value))) = map.next_entry()? {
            mapping.insert(key, value);
        }
        Ok(LenientValue(Value::Mapping(mapping)))
    }

    fn visit_enum<A>(self, data: A) -> Result<LenientValue, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (tag, contents) = data.variant::<String>()?;
        let LenientValue(value) = contents.newtype_variant()?;
        Ok(LenientValue(Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(tag),
            value,
        }))))
    }
}
