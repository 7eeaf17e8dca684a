pub mod period;
pub mod list_queries;
pub mod location_queries;
pub mod bird_queries;
pub mod family_queries;
pub mod trip_queries;
pub mod sighting_queries;
pub mod stats_queries;

pub use period::Period;
