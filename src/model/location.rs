use serde::{Deserialize, Serialize};

use super::ids::Id;

/// Separator used when rendering a location's full path.
pub const PATH_SEPARATOR: &str = " > ";

/// A birding location. Locations nest through `parent_id`
/// (e.g. "UK > Norfolk > Cley Marshes").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Id<Location>,
    pub location_name: String,
    pub parent_id: Option<Id<Location>>,
}

impl Location {
    pub fn create(location_name: String, parent_id: Option<Id<Location>>) -> Self {
        Self {
            id: Id::generate(),
            location_name,
            parent_id,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Joins a root-first list of names into a display path.
pub fn join_path(names: &[String]) -> String {
    names.join(PATH_SEPARATOR)
}
