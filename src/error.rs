use thiserror::Error;

#[derive(Debug, Error)]
pub enum BirdError {
    #[error("{field} cannot be blank")]
    BlankField { field: String },

    #[error("{field} must be positive")]
    NonPositive { field: String },

    #[error("{field} cannot be empty")]
    EmptySet { field: String },

    #[error("End date cannot be before start date")]
    InvalidDateRange,

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Cannot delete \"{name}\" because it has {count} {dependents}. {hint}")]
    HasDependents {
        name: String,
        count: i64,
        dependents: String,
        hint: String,
    },

    #[error("{0}")]
    BulkDeleteBlocked(String),

    #[error("Cannot set parent location: this would create a circular reference")]
    CircularParent,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("{0}")]
    Other(String),
}

pub type BirdResult<T> = Result<T, BirdError>;

impl From<figment::Error> for BirdError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl BirdError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// True for errors caused by the caller's input rather than by storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::BlankField { .. }
                | Self::NonPositive { .. }
                | Self::EmptySet { .. }
                | Self::InvalidDateRange
        )
    }

    /// True for requests refused because of existing data.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::HasDependents { .. } | Self::BulkDeleteBlocked(_) | Self::CircularParent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_dependents_message() {
        let err = BirdError::HasDependents {
            name: "Robin".into(),
            count: 3,
            dependents: "sighting(s)".into(),
            hint: "Please delete the sightings first.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete \"Robin\" because it has 3 sighting(s). Please delete the sightings first."
        );
        assert!(err.is_conflict());
        assert!(!err.is_validation());
    }

    #[test]
    fn not_found_message() {
        let err = BirdError::not_found("Bird", "abc");
        assert_eq!(err.to_string(), "Bird not found: abc");
    }

    #[test]
    fn blank_field_is_validation() {
        let err = BirdError::BlankField { field: "name".into() };
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "name cannot be blank");
    }

    #[test]
    fn from_rusqlite_error() {
        let err: BirdError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, BirdError::Database(_)));
    }
}
