use serde::{Deserialize, Serialize};

use super::ids::Id;

/// A taxonomic family, optionally narrowed to a subfamily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: Id<Family>,
    pub family_name: String,
    pub subfamily_name: Option<String>,
}

impl Family {
    pub fn create(family_name: String, subfamily_name: Option<String>) -> Self {
        Self {
            id: Id::generate(),
            family_name,
            subfamily_name,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.subfamily_name {
            Some(sub) => format!("{} - {}", self.family_name, sub),
            None => self.family_name.clone(),
        }
    }
}

/// A bird species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bird {
    pub id: Id<Bird>,
    pub english_name: String,
    pub latin_name: Option<String>,
    pub french_name: Option<String>,
    pub species_status: Option<String>,
    pub family_id: Option<Id<Family>>,
}

impl Bird {
    pub fn create(english_name: String) -> Self {
        Self {
            id: Id::generate(),
            english_name,
            latin_name: None,
            french_name: None,
            species_status: None,
            family_id: None,
        }
    }

    /// "English (Latin)", or just the English name.
    pub fn display_name(&self) -> String {
        match &self.latin_name {
            Some(latin) => format!("{} ({})", self.english_name, latin),
            None => self.english_name.clone(),
        }
    }
}
