use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use vek::Vec3;

/// A single configuration value handed to a node's `set`.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub enum Value {
    Bool(bool),
    Float(f32),
    Str(String),
    Vec3([f32; 3]),
    /// 2x3 affine transform, row-major: `s' = a*s + b*t + c`, `t' = d*s + e*t + f`.
    Transform([f32; 6]),
    /// Reference to a scalar node by registry name.
    Scalar(String),
    /// Reference to a shader node by registry name.
    Shader(String),
    /// Reference to a texture by registry name.
    Texture(String),
    /// Accumulated entries of a repeated key.
    List(Vec<Value>),
}

impl Value {
    /// Interprets the value as a yes/no flag. Strings accept the scene
    /// description spellings `yes`/`no`, `true`/`false` and `on`/`off`.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(val) => Some(*val),
            Value::Float(val) => Some(*val != 0.0),
            Value::Str(val) => match val.to_ascii_lowercase().as_str() {
                "yes" | "true" | "on" | "1" => Some(true),
                "no" | "false" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(val) => write!(f, "{}", if *val { "yes" } else { "no" }),
            Value::Float(val) => write!(f, "{:.6}", val),
            Value::Str(val) => write!(f, "\"{}\"", val),
            Value::Vec3(val) => write!(f, "[{}, {}, {}]", val[0], val[1], val[2]),
            Value::Transform(val) => write!(
                f,
                "[{}, {}, {}; {}, {}, {}]",
                val[0], val[1], val[2], val[3], val[4], val[5]
            ),
            Value::Scalar(val) => write!(f, "scalar '{}'", val),
            Value::Shader(val) => write!(f, "shader '{}'", val),
            Value::Texture(val) => write!(f, "texture '{}'", val),
            Value::List(val) => {
                write!(f, "[")?;
                for (i, v) in val.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// The permissive key/value bag every node is configured from.
///
/// Lookups of unknown keys or of a key holding the wrong kind of value fall
/// back to the caller's default; nothing here ever fails.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ValueContainer {
    values: FxHashMap<String, Value>,
}

impl Default for ValueContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueContainer {
    // Create a new, empty ValueContainer
    pub fn new() -> Self {
        ValueContainer {
            values: FxHashMap::default(),
        }
    }

    /// Builder style `set`, handy in tests and scene construction code.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.set(key, value);
        self
    }

    // Add or update a value
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Appends to a repeated key. A plain value already stored under the key
    /// becomes the first list entry.
    pub fn append(&mut self, key: &str, value: Value) {
        match self.values.remove(key) {
            Some(Value::List(mut list)) => {
                list.push(value);
                self.values.insert(key.to_string(), Value::List(list));
            }
            Some(prev) => {
                self.values
                    .insert(key.to_string(), Value::List(vec![prev, value]));
            }
            None => {
                self.values
                    .insert(key.to_string(), Value::List(vec![value]));
            }
        }
    }

    // Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The first of `keys` present in the container, or the first of `keys`
    /// when none is. Lets a node accept older spellings of a parameter.
    pub fn first_key<'a>(&self, keys: &[&'a str]) -> &'a str {
        keys.iter()
            .copied()
            .find(|key| self.contains(key))
            .or_else(|| keys.first().copied())
            .unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::to_bool)
    }

    pub fn get_bool_default(&self, key: &str, def: bool) -> bool {
        self.get_bool(key).unwrap_or(def)
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.values.get(key).and_then(|v| {
            if let Value::Float(val) = v {
                Some(*val)
            } else {
                None
            }
        })
    }

    pub fn get_float_default(&self, key: &str, def: f32) -> f32 {
        self.get_float(key).unwrap_or(def)
    }

    pub fn get_vec3(&self, key: &str) -> Option<Vec3<f32>> {
        self.values.get(key).and_then(|v| {
            if let Value::Vec3(val) = v {
                Some(Vec3::new(val[0], val[1], val[2]))
            } else {
                None
            }
        })
    }

    pub fn get_vec3_default(&self, key: &str, def: Vec3<f32>) -> Vec3<f32> {
        self.get_vec3(key).unwrap_or(def)
    }

    pub fn get_transform(&self, key: &str) -> Option<[f32; 6]> {
        self.values.get(key).and_then(|v| {
            if let Value::Transform(val) = v {
                Some(*val)
            } else {
                None
            }
        })
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| {
            if let Value::Str(val) = v {
                Some(val.as_str())
            } else {
                None
            }
        })
    }

    pub fn get_str_default<'a>(&'a self, key: &str, def: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(def)
    }

    pub fn get_scalar_ref(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| {
            if let Value::Scalar(val) = v {
                Some(val.as_str())
            } else {
                None
            }
        })
    }

    pub fn get_shader_ref(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| {
            if let Value::Shader(val) = v {
                Some(val.as_str())
            } else {
                None
            }
        })
    }

    pub fn get_texture_ref(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| {
            if let Value::Texture(val) = v {
                Some(val.as_str())
            } else {
                None
            }
        })
    }

    /// All entries of a repeated key in insertion order. A key that was only
    /// `set` once yields a single entry.
    pub fn get_list(&self, key: &str) -> Vec<&Value> {
        match self.values.get(key) {
            Some(Value::List(list)) => list.iter().collect(),
            Some(v) => vec![v],
            None => vec![],
        }
    }

    // Remove a value by key
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    // Get all keys
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for ValueContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(f, "{}: {}", key, self.values[key])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_and_mistyped_keys() {
        let params = ValueContainer::new().with("sfreq", Value::Str("three".into()));
        assert_eq!(params.get_float_default("sfreq", 1.0), 1.0);
        assert_eq!(params.get_float_default("tfreq", 2.0), 2.0);
        assert!(params.get_scalar_ref("sfreq").is_none());
    }

    #[test]
    fn test_yes_no_strings() {
        let params = ValueContainer::new()
            .with("randomize", Value::Str("yes".into()))
            .with("darken", Value::Str("No".into()))
            .with("spline", Value::Str("maybe".into()));
        assert!(params.get_bool_default("randomize", false));
        assert!(!params.get_bool_default("darken", true));
        assert!(params.get_bool_default("spline", true));
    }

    #[test]
    fn test_first_key_prefers_present_alias() {
        let params = ValueContainer::new().with("theSFreq", Value::Float(3.0));
        assert_eq!(params.first_key(&["sfreq", "theSFreq"]), "theSFreq");
        assert_eq!(params.first_key(&["tfreq", "theTFreq"]), "tfreq");

        let both = params.clone().with("sfreq", Value::Float(2.0));
        assert_eq!(both.first_key(&["sfreq", "theSFreq"]), "sfreq");
        assert_eq!(ValueContainer::new().first_key(&[]), "");
    }

    #[test]
    fn test_append_accumulates_in_order() {
        let mut params = ValueContainer::new();
        params.append("color", Value::Vec3([1.0, 0.0, 0.0]));
        params.append("color", Value::Vec3([0.0, 1.0, 0.0]));
        params.append("color", Value::Vec3([0.0, 0.0, 1.0]));
        let list = params.get_list("color");
        assert_eq!(list.len(), 3);
        assert_eq!(*list[1], Value::Vec3([0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_append_after_set_keeps_first_value() {
        let mut params = ValueContainer::new().with("shader", Value::Shader("a".into()));
        params.append("shader", Value::Shader("b".into()));
        let list = params.get_list("shader");
        assert_eq!(list.len(), 2);
        assert_eq!(*list[0], Value::Shader("a".into()));
    }
}
