// Location domain model - canal locations and their display keys
use super::format::alpha_key;

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub key: String,
    pub color: Option<String>,
}

impl Location {
    pub fn new(name: String, key: Option<String>, color: Option<String>) -> Self {
        let key = key.unwrap_or_else(|| Self::derive_key(&name));
        Self { name, key, color }
    }

    /// Fallback key for names missing from the table, e.g. "Dow's Lake" -> "dowslake".
    pub fn derive_key(name: &str) -> String {
        alpha_key(name)
    }
}

/// Ordered set of monitored locations. The first one drives chart labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationTable {
    locations: Vec<Location>,
}

impl LocationTable {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn find(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Element key for a location name; total over any name.
    pub fn key_for(&self, name: &str) -> String {
        match self.find(name) {
            Some(location) => location.key.clone(),
            None => Location::derive_key(name),
        }
    }

    pub fn color_for(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(|l| l.color.as_deref())
    }
}
