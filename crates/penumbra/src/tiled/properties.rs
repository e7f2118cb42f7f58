use std::collections::HashMap;

use crate::core::color::Rgba;

/// A typed Tiled custom property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Color(Rgba),
    /// Path relative to the map file.
    File(String),
}

/// Custom properties of a map, layer, tile or object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: HashMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        self.values.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Ints widen to floats.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String and file properties.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(s) | PropertyValue::File(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_color(&self, name: &str) -> Option<Rgba> {
        match self.get(name)? {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Copy in every property of `parent` that is not already set here.
    pub fn merge_from(&mut self, parent: &Properties) {
        for (name, value) in &parent.values {
            self.values
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters() {
        let props = Properties::new()
            .with("solid", PropertyValue::Bool(true))
            .with("damage", PropertyValue::Int(3))
            .with("speed", PropertyValue::Float(1.5))
            .with("music", PropertyValue::File("cave.ogg".into()))
            .with("tint", PropertyValue::Color(Rgba::RED));

        assert_eq!(props.get_bool("solid"), Some(true));
        assert_eq!(props.get_int("damage"), Some(3));
        assert_eq!(props.get_float("damage"), Some(3.0));
        assert_eq!(props.get_float("speed"), Some(1.5));
        assert_eq!(props.get_str("music"), Some("cave.ogg"));
        assert_eq!(props.get_color("tint"), Some(Rgba::RED));
        // Wrong type is a miss, not a conversion.
        assert_eq!(props.get_bool("damage"), None);
        assert_eq!(props.get_int("speed"), None);
    }

    #[test]
    fn merge_keeps_own_values() {
        let parent = Properties::new()
            .with("solid", PropertyValue::Bool(true))
            .with("name", PropertyValue::String("parent".into()));
        let mut child = Properties::new().with("name", PropertyValue::String("child".into()));
        child.merge_from(&parent);

        assert_eq!(child.len(), 2);
        assert_eq!(child.get_str("name"), Some("child"));
        assert_eq!(child.get_bool("solid"), Some(true));
    }
}
