pub mod favorites;
pub mod reconcile;
pub mod recommender;
pub mod visits;

pub use recommender::RecommendationBridge;
