pub use super::availability_cache::Entity as AvailabilityCache;
pub use super::mood_genre_map::Entity as MoodGenreMap;
pub use super::moods::Entity as Moods;
pub use super::movies::Entity as Movies;
