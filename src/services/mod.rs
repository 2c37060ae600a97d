pub mod availability;
pub use availability::{
    AvailabilityCache, AvailabilityRequest, AvailabilityResponse, AvailabilityService,
    AvailabilitySource, StoreAvailabilityCache,
};

pub mod mood;
pub use mood::{DiscoverySource, MoodError, MoodQuery, MoodResults, MoodService};

pub mod offers;
pub use offers::normalize_offers;
