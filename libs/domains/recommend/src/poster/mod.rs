mod provider;
mod tmdb;

pub use provider::{Poster, PosterProvider};
pub use tmdb::{TmdbConfig, TmdbProvider};

#[cfg(test)]
pub use provider::MockPosterProvider;
