pub mod prelude;

pub mod availability_cache;
pub mod mood_genre_map;
pub mod moods;
pub mod movies;
