pub mod streaming;
pub mod tmdb;
