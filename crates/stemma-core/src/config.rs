//! Value-backed configuration with built-in defaults.
//!
//! Overrides are deep-merged onto the defaults, so a partial object such as
//! `{"viewport": {"maxScale": 8}}` only changes the keys it names.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Sentinel branch key used when no ancestor defines one.
pub const DEFAULT_BRANCH: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq)]
pub struct StemmaConfig(Value);

impl Default for StemmaConfig {
    fn default() -> Self {
        Self(default_config_value())
    }
}

fn default_config_value() -> Value {
    json!({
        "palette": {
            "ROOT": "#4B5563",
            "CAIN": "#D55E00",
            "SETH": "#0072B2",
            "SHEM": "#009E73",
            "HAM": "#CC79A7",
            "JAPHETH": "#E69F00",
            "ABRAHAMIC_MAIN": "#56B4E9",
            "ISHMAEL": "#F0E442",
            "ESAU": "#A52A2A",
            "JUDAH": "#8B5CF6",
            "DAVIDIC": "#111827",
            "LEVITE": "#0F766E",
            "DEFAULT": "#333333"
        },
        "layout": {
            "nodeWidth": 110.0,
            "levelHeight": 145.0,
            "siblingSeparation": 1.0,
            "cousinSeparation": 2.0
        },
        "node": {
            "minWidth": 120.0,
            "labelPadding": 26.0,
            "height": 32.0,
            "cornerRadius": 8.0,
            "fontSize": 14.0
        },
        "viewport": {
            "width": 900.0,
            "height": 600.0,
            "minScale": 0.2,
            "maxScale": 4.0,
            "fitPadding": 50.0
        },
        "transition": {
            "durationMs": 750
        },
        "expansion": {
            "mode": "expanded",
            "paths": []
        }
    })
}

impl StemmaConfig {
    /// An empty object, without defaults. Useful as an override document.
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(text)?;
        if !overrides.is_object() {
            return Err(Error::InvalidConfig {
                key: "$".to_string(),
                message: "config overrides must be a JSON object".to_string(),
            });
        }
        Ok(Self::with_overrides(&overrides))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.lookup(dotted_path)?;
        v.as_f64()
            .or_else(|| v.as_i64().map(|n| n as f64))
            .or_else(|| v.as_u64().map(|n| n as f64))
    }

    /// Reads a finite, strictly positive number, falling back to `fallback` otherwise.
    pub fn positive_f64(&self, dotted_path: &str, fallback: f64) -> f64 {
        match self.get_f64(dotted_path) {
            Some(v) if v.is_finite() && v > 0.0 => v,
            Some(v) => {
                tracing::warn!(key = dotted_path, value = v, fallback, "ignoring non-positive config value");
                fallback
            }
            None => fallback,
        }
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur
                .entry(seg)
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Branch key to CSS color, in definition order.
    pub fn palette(&self) -> Palette {
        let mut colors = IndexMap::new();
        if let Some(Value::Object(map)) = self.lookup("palette") {
            for (key, value) in map {
                if let Some(color) = value.as_str() {
                    colors.insert(key.clone(), color.to_string());
                }
            }
        }
        Palette { colors }
    }

    pub fn expansion(&self) -> Result<ExpansionPolicy> {
        let Some(value) = self.lookup("expansion") else {
            return Ok(ExpansionPolicy::default());
        };
        ExpansionPolicy::deserialize(value).map_err(|err| Error::InvalidConfig {
            key: "expansion".to_string(),
            message: err.to_string(),
        })
    }

    pub fn transition_duration(&self) -> std::time::Duration {
        let ms = self.get_f64("transition.durationMs").unwrap_or(750.0);
        if ms.is_finite() && ms >= 0.0 {
            std::time::Duration::from_secs_f64(ms / 1000.0)
        } else {
            std::time::Duration::from_millis(750)
        }
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: IndexMap<String, String>,
}

impl Palette {
    /// Color for `branch_key`, or the `DEFAULT` entry when the key has no color.
    pub fn color(&self, branch_key: &str) -> &str {
        self.colors
            .get(branch_key)
            .or_else(|| self.colors.get(DEFAULT_BRANCH))
            .map(String::as_str)
            .unwrap_or("#333333")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionMode {
    #[default]
    Expanded,
    /// Collapse everything, keeping the root open.
    Collapsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpansionPolicy {
    #[serde(default)]
    pub mode: ExpansionMode,
    /// `/`-separated name paths from the root; every node on a path is expanded.
    #[serde(default)]
    pub paths: Vec<String>,
}
