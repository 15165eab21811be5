pub mod classifier;
pub mod providers;
pub mod recommender;
pub mod resolver;
