pub mod emotion;
pub mod movie;

pub use movie::{dedup_by_id, MovieId, MovieRecord, TmdbMovie};
