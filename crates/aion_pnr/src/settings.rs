//! The PnR runtime settings map.
//!
//! Distinct from `aion_config`'s project-level `aion.toml` loader:
//! `aion_config` resolves target/pin/constraint configuration before
//! synthesis runs, while [`Settings`] holds free-form, string-keyed
//! algorithm knobs (`"placer1/constraint_weight"`, `"router1/max_iter_cnt"`)
//! consulted deep inside placement and routing. A caller that wants to seed
//! PnR settings from project config does so by constructing a `Settings`
//! from the relevant `ProjectConfig` fields; the two types are not merged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single settings value: one of the small set of primitive types the
/// placer and router knobs need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    /// A boolean flag (e.g. `timing_driven`).
    Bool(bool),
    /// An integer value (e.g. `router1/max_iter_cnt`).
    Int(i64),
    /// A floating-point value (e.g. `placer1/constraint_weight`).
    Float(f64),
    /// A string value (e.g. `placer` algorithm selection).
    Str(String),
}

/// The PnR context's settings map.
///
/// Typed accessors fall back to a caller-supplied default when a key is
/// absent or holds the wrong variant, so call sites never need to
/// special-case "not configured" versus "configured wrong".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    values: HashMap<String, SettingValue>,
}

impl Settings {
    /// Creates an empty settings map; every lookup falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key to a boolean value.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.values.insert(key.into(), SettingValue::Bool(value));
    }

    /// Sets a key to an integer value.
    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.values.insert(key.into(), SettingValue::Int(value));
    }

    /// Sets a key to a float value.
    pub fn set_float(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), SettingValue::Float(value));
    }

    /// Sets a key to a string value.
    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), SettingValue::Str(value.into()));
    }

    /// Returns the boolean at `key`, or `default` if absent/mistyped.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(SettingValue::Bool(b)) => *b,
            _ => default,
        }
    }

    /// Returns the integer at `key`, or `default` if absent/mistyped.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(SettingValue::Int(i)) => *i,
            _ => default,
        }
    }

    /// Returns the float at `key`, or `default` if absent/mistyped.
    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(SettingValue::Float(f)) => *f,
            _ => default,
        }
    }

    /// Returns the string at `key`, or `default` if absent/mistyped.
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.values.get(key) {
            Some(SettingValue::Str(s)) => s.as_str(),
            _ => default,
        }
    }

    /// Builds the documented default settings (spec §6).
    pub fn with_defaults() -> Self {
        let mut s = Self::new();
        s.set_str("placer", "sa");
        s.set_str("router", "router1");
        s.set_bool("timing_driven", false);
        s.set_float("placer1/constraint_weight", 10.0);
        s.set_int("placer1/min_bels_for_grid_pick", 64);
        s.set_int("router1/max_iter_cnt", 50);
        s.set_float("router1/tmg_ripup_threshold_pct", 5.0);
        s.set_bool("router1/use_estimate", true);
        s.set_bool("router/tmg_ripup", false);
        s.set_int("slack_redist_iter", 5);
        s.set_int("seed", 1);
        s
    }
}
