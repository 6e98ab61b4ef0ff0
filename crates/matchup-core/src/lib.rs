pub mod config;
pub mod export;
pub mod graph;
pub mod model;
pub mod ops;
pub mod source;

pub use config::Config;
pub use graph::GraphStore;
pub use model::{CharacterProfile, MatchupKind};
