//! Key/value attributes carried by entities and the world.

use glam::DVec3;
use serde::{Deserialize, Serialize};

pub type AttributeName = String;
pub type AttributeValue = String;

/// Well-known attribute names.
pub mod names {
    pub const CLASSNAME: &str = "classname";
    pub const ORIGIN: &str = "origin";
    pub const TARGET: &str = "target";
    pub const TARGETNAME: &str = "targetname";
    pub const MODS: &str = "_mod";
    pub const ENTITY_DEFINITIONS: &str = "_def";
    pub const WAD: &str = "wad";
    pub const WAL: &str = "_wal";
}

/// Classname of the world entity.
pub const WORLDSPAWN: &str = "worldspawn";

/// Whether `name` may be added, renamed or removed on the world.
///
/// The classname, mod list, entity definition source and texture archive references are
/// fixed once the world exists.
pub fn is_world_attribute_mutable(name: &str) -> bool {
    !matches!(
        name,
        names::CLASSNAME | names::MODS | names::ENTITY_DEFINITIONS | names::WAD | names::WAL
    )
}

/// A single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: AttributeName,
    pub value: AttributeValue,
}

/// Ordered attribute list with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs; later duplicates overwrite earlier ones.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut attributes = Self::new();
        for (name, value) in pairs {
            attributes.set(name, value);
        }
        attributes
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|a| a.name == name)
    }

    /// Set or replace a value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.entries.push(Attribute { name, value });
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.entries.iter().position(|a| a.name == name)?;
        Some(self.entries.remove(pos).value)
    }

    /// Rename in place, keeping the attribute's position. Returns false if `old_name` is absent.
    pub fn rename(&mut self, old_name: &str, new_name: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|a| a.name == old_name) {
            Some(attribute) => {
                attribute.name = new_name.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn classname(&self) -> Option<&str> {
        self.get(names::CLASSNAME)
    }

    /// Parsed `origin`, if present and well-formed.
    pub fn origin(&self) -> Option<DVec3> {
        self.get(names::ORIGIN).and_then(parse_vec3)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Parse a whitespace separated `x y z` triple.
pub fn parse_vec3(value: &str) -> Option<DVec3> {
    let mut parts = value.split_whitespace().map(str::parse::<f64>);
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(DVec3::new(x, y, z))
}

pub fn format_vec3(v: DVec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_and_keeps_order() {
        let mut attributes = Attributes::from_pairs([("classname", "light"), ("light", "300")]);
        assert_eq!(attributes.set("classname", "light_spot"), Some("light".to_string()));
        let names: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["classname", "light"]);
    }

    #[test]
    fn test_rename_keeps_value() {
        let mut attributes = Attributes::from_pairs([("target", "door1")]);
        assert!(attributes.rename("target", "killtarget"));
        assert_eq!(attributes.get("killtarget"), Some("door1"));
        assert!(!attributes.contains("target"));
        assert!(!attributes.rename("missing", "other"));
    }

    #[test]
    fn test_world_policy() {
        assert!(!is_world_attribute_mutable("classname"));
        assert!(!is_world_attribute_mutable("wad"));
        assert!(!is_world_attribute_mutable("_mod"));
        assert!(is_world_attribute_mutable("message"));
        assert!(is_world_attribute_mutable("sounds"));
    }

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1 -2 3.5"), Some(DVec3::new(1.0, -2.0, 3.5)));
        assert_eq!(parse_vec3("1 2"), None);
        assert_eq!(parse_vec3("1 2 3 4"), None);
        assert_eq!(parse_vec3("a b c"), None);
        assert_eq!(format_vec3(DVec3::new(8.0, 0.0, -16.0)), "8 0 -16");
    }

    #[test]
    fn test_serializes_as_list() {
        let attributes = Attributes::from_pairs([("classname", "info_null")]);
        let json = serde_json::to_string(&attributes).unwrap();
        assert_eq!(json, r#"[{"name":"classname","value":"info_null"}]"#);
    }
}
