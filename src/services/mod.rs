pub mod library;
pub mod recommender;

pub use recommender::Recommender;
