//! Where the weather is fetched for: place lookups and the stored setting.

pub mod places;
pub mod stored;

pub use places::{MAX_SEARCH_RESULTS, PlacesClient, UNKNOWN_LOCATION_NAME, reduce_hierarchy};
pub use stored::{AUTOMATIC_DISPLAY_VALUE, StoredLocation};
