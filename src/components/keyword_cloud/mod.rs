//! 3D keyword cloud laid out by embedding similarity.
//!
//! Keywords are embedded by an external provider, linked when their cosine
//! similarity clears a threshold, and relaxed by a force simulation into 3D
//! positions that the canvas component renders as shaded spheres:
//!
//! - [`similarity`] builds the weighted graph
//! - [`simulation`] owns the physics as an explicit state machine
//! - [`pipeline`] chains provider, builder and simulation, and guards against
//!   stale results
//! - [`KeywordCloud`] is the Leptos component
//!
//! # Example
//!
//! ```ignore
//! use keyword_cloud::{Keyword, KeywordCloud};
//!
//! let keywords = vec![Keyword::new("microgravity", 42), Keyword::new("bone loss", 17)];
//!
//! view! { <KeywordCloud keywords=Signal::derive(move || keywords.clone()) /> }
//! ```

mod component;
pub mod config;
pub mod embedding;
pub mod pipeline;
mod render;
pub mod scale;
pub mod similarity;
pub mod simulation;
mod state;
pub mod theme;
mod types;

pub use component::KeywordCloud;
pub use config::{CloudConfig, LayoutMode};
pub use embedding::{EmbeddingError, EmbeddingProvider, HttpEmbeddingProvider};
pub use pipeline::{LayoutGeneration, LayoutTicket, compute_layout, prepare_simulation};
pub use similarity::{GraphConfig, SimilarityGraphBuilder, cosine_similarity};
pub use simulation::{Simulation, SimulationConfig, SimulationState};
pub use theme::Theme;
pub use types::{
	Embedding, Keyword, KeywordGraph, KeywordNode, KeywordSelection, PositionedNode,
	SimilarityEdge, Vec3,
};
