pub mod family_ops;
pub mod bird_ops;
pub mod location_ops;
pub mod trip_ops;
pub mod sighting_ops;

use serde::Serialize;

/// Names removed by a successful bulk delete.
#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<String>,
}

impl BulkDeleteOutcome {
    pub fn message(&self, noun: &str) -> String {
        format!(
            "Successfully deleted {} {}(s): {}.",
            self.deleted.len(),
            noun,
            self.deleted.join(", ")
        )
    }
}
