//! # Target Configuration
//!
//! A flat mapping from option name to [`Value`], pushed to the target system
//! before every step. Layers are merged left to right:
//!
//! 1. [`Config::defaults`]
//! 2. suite-level overrides (`TestFramework::set_config`)
//! 3. case-level overrides (`TestCase::set_config`)
//!
//! Unknown options are carried through untouched; the target decides what to
//! do with them.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use crate::error::HarnessError;
use crate::value::Value;

/// Option names understood by the harness.
pub mod keys {
    pub const SYNTAX: &str = "syntax";
    pub const INDENTATION_MODE: &str = "indentationMode";
    pub const BLOCK_SELECTION: &str = "blockSelection";
    pub const INDENTATION_WIDTH: &str = "indentationWidth";
    pub const TAB_WIDTH: &str = "tabWidth";
    pub const REPLACE_TABS: &str = "replaceTabs";
    pub const OVERRIDE_MODE: &str = "overrideMode";
    pub const INDENT_PASTED_TEXT: &str = "indentPastedText";

    /// Legacy switch, expanded by [`normalize_config`](super::normalize_config).
    pub const ENABLE_PLACEHOLDERS: &str = "enablePlaceholders";
    pub const ENABLE_CURSOR_PLACEHOLDER: &str = "enableCursorPlaceholder";
    pub const ENABLE_VIRTUAL_CURSOR_PLACEHOLDER: &str = "enableVirtualCursorPlaceholder";
    pub const ENABLE_SELECTION_PLACEHOLDER: &str = "enableSelectionPlaceholder";
}

const DEFAULT_SYNTAX: &str = "None";
const DEFAULT_INDENTATION_MODE: &str = "none";
const DEFAULT_WIDTH: u32 = 4;

/// Numeric value of the dual block-selection mode.
pub const DUAL_MODE: f64 = 2.0;

/// Block-selection behavior. `Dual` runs the step in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSelection {
    Off,
    On,
    Dual,
}

impl BlockSelection {
    pub fn to_value(self) -> Value {
        match self {
            BlockSelection::Off => Value::Bool(false),
            BlockSelection::On => Value::Bool(true),
            BlockSelection::Dual => Value::Number(DUAL_MODE),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(false) => Some(BlockSelection::Off),
            Value::Bool(true) => Some(BlockSelection::On),
            Value::Number(n) if *n == DUAL_MODE => Some(BlockSelection::Dual),
            _ => None,
        }
    }
}

/// A flat, ordered set of target options.
#[derive(Debug, Clone, Default)]
pub struct Config {
    options: BTreeMap<String, Value>,
}

impl Config {
    /// An empty layer with no options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The documented base layer.
    pub fn defaults() -> Self {
        Config::new()
            .with(keys::SYNTAX, DEFAULT_SYNTAX)
            .with(keys::INDENTATION_MODE, DEFAULT_INDENTATION_MODE)
            .with(keys::BLOCK_SELECTION, BlockSelection::Dual.to_value())
            .with(keys::INDENTATION_WIDTH, DEFAULT_WIDTH as usize)
            .with(keys::TAB_WIDTH, DEFAULT_WIDTH as usize)
            .with(keys::REPLACE_TABS, false)
            .with(keys::OVERRIDE_MODE, false)
            .with(keys::INDENT_PASTED_TEXT, false)
    }

    /// Reads a flat JSON object, e.g. `{"tabWidth": 8, "replaceTabs": true}`.
    pub fn from_json(text: &str) -> Result<Self, HarnessError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Config::try_from(&Value::from(json))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.options.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Layers `overrides` on top of this configuration.
    pub fn merge(&mut self, overrides: &Config) -> &mut Self {
        for (key, value) in &overrides.options {
            self.options.insert(key.clone(), value.clone());
        }
        self
    }

    // ------------------------------------------------------------------------
    // Typed accessors (fall back to the documented defaults)
    // ------------------------------------------------------------------------

    pub fn syntax(&self) -> &str {
        self.text(keys::SYNTAX).unwrap_or(DEFAULT_SYNTAX)
    }

    pub fn indentation_mode(&self) -> &str {
        self.text(keys::INDENTATION_MODE)
            .unwrap_or(DEFAULT_INDENTATION_MODE)
    }

    pub fn block_selection(&self) -> BlockSelection {
        self.get(keys::BLOCK_SELECTION)
            .and_then(BlockSelection::from_value)
            .unwrap_or(BlockSelection::Dual)
    }

    pub fn indentation_width(&self) -> u32 {
        self.width(keys::INDENTATION_WIDTH)
    }

    pub fn tab_width(&self) -> u32 {
        self.width(keys::TAB_WIDTH)
    }

    pub fn replace_tabs(&self) -> bool {
        self.flag(keys::REPLACE_TABS)
    }

    pub fn override_mode(&self) -> bool {
        self.flag(keys::OVERRIDE_MODE)
    }

    pub fn indent_pasted_text(&self) -> bool {
        self.flag(keys::INDENT_PASTED_TEXT)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn width(&self, key: &str) -> u32 {
        self.get(key)
            .and_then(Value::as_number)
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map_or(DEFAULT_WIDTH, |n| n as u32)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Config {
            options: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl TryFrom<&Value> for Config {
    type Error = HarnessError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(map) => Ok(map
                .entries()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            other => Err(HarnessError::ConfigNotMapping {
                found: other.type_name(),
            }),
        }
    }
}

/// Expands the legacy `enablePlaceholders` switch into the three
/// placeholder flags it stands for, removing the legacy key.
///
/// The flags are enabled only when the legacy value is exactly `true`.
/// Only `config` is touched; a configuration without the legacy key is left as is.
pub fn normalize_config(config: &mut Config) {
    let Some(legacy) = config.remove(keys::ENABLE_PLACEHOLDERS) else {
        return;
    };
    let enabled = matches!(legacy, Value::Bool(true));
    config
        .set(keys::ENABLE_CURSOR_PLACEHOLDER, enabled)
        .set(keys::ENABLE_VIRTUAL_CURSOR_PLACEHOLDER, enabled)
        .set(keys::ENABLE_SELECTION_PLACEHOLDER, enabled);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let c = Config::defaults();
        assert_eq!(c.syntax(), "None");
        assert_eq!(c.indentation_mode(), "none");
        assert_eq!(c.block_selection(), BlockSelection::Dual);
        assert_eq!(c.indentation_width(), 4);
        assert_eq!(c.tab_width(), 4);
        assert!(!c.replace_tabs());
        assert!(!c.override_mode());
        assert!(!c.indent_pasted_text());
        assert_eq!(c.len(), 8);
    }

    #[test]
    fn later_layers_win() {
        let mut c = Config::defaults();
        c.merge(&Config::new().with(keys::TAB_WIDTH, 8).with("syntax", "C++"));
        c.merge(&Config::new().with(keys::TAB_WIDTH, 2));
        assert_eq!(c.tab_width(), 2);
        assert_eq!(c.syntax(), "C++");
        assert_eq!(c.indentation_width(), 4);
    }

    #[test]
    fn legacy_placeholder_flag_is_expanded() {
        let mut c = Config::new().with(keys::ENABLE_PLACEHOLDERS, true);
        normalize_config(&mut c);
        assert!(!c.contains(keys::ENABLE_PLACEHOLDERS));
        for key in [
            keys::ENABLE_CURSOR_PLACEHOLDER,
            keys::ENABLE_VIRTUAL_CURSOR_PLACEHOLDER,
            keys::ENABLE_SELECTION_PLACEHOLDER,
        ] {
            assert_eq!(c.get(key).and_then(Value::as_bool), Some(true), "{key}");
        }
    }

    #[test]
    fn non_true_legacy_value_disables_placeholders() {
        let mut c = Config::new().with(keys::ENABLE_PLACEHOLDERS, "yes");
        normalize_config(&mut c);
        assert_eq!(
            c.get(keys::ENABLE_SELECTION_PLACEHOLDER).and_then(Value::as_bool),
            Some(false)
        );
    }

    #[test]
    fn normalization_without_legacy_key_is_a_no_op() {
        let mut c = Config::defaults();
        normalize_config(&mut c);
        assert_eq!(c.len(), Config::defaults().len());
        assert!(!c.contains(keys::ENABLE_CURSOR_PLACEHOLDER));
    }

    #[test]
    fn json_documents_load_as_a_layer() {
        let c = Config::from_json(r#"{"tabWidth": 8, "blockSelection": true}"#);
        let c = c.map(|c| (c.tab_width(), c.block_selection()));
        assert!(matches!(c, Ok((8, BlockSelection::On))));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = Config::from_json("[1, 2]");
        assert!(matches!(err, Err(HarnessError::ConfigNotMapping { found: "List" })));
        assert!(matches!(Config::from_json("{"), Err(HarnessError::ConfigJson(_))));
    }
}
