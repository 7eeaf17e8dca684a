pub mod ids;
pub mod taxonomy;
pub mod location;
pub mod trip;
pub mod sighting;

// Re-exports for convenience
pub use ids::Id;
pub use taxonomy::{Bird, Family};
pub use location::Location;
pub use trip::Trip;
pub use sighting::{Sighting, SightingDetail};
