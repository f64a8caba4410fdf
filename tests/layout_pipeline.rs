//! End-to-end layout runs against in-memory embedding providers.

#![allow(unused_crate_dependencies)]

use std::cell::Cell;
use std::collections::HashSet;

use futures::executor::block_on;
use keyword_cloud::components::keyword_cloud::{
	Embedding, EmbeddingError, EmbeddingProvider, LayoutGeneration, Vec3, prepare_simulation,
};
use keyword_cloud::{CloudConfig, Keyword, PositionedNode, compute_layout};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Serves fixed vectors and counts how often it was asked.
struct FixedProvider {
	vectors: Vec<(&'static str, Vec<f32>)>,
	calls: Cell<usize>,
}

impl FixedProvider {
	fn new(vectors: Vec<(&'static str, Vec<f32>)>) -> Self {
		Self {
			vectors,
			calls: Cell::new(0),
		}
	}
}

impl EmbeddingProvider for FixedProvider {
	async fn embed(&self, keywords: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
		self.calls.set(self.calls.get() + 1);
		Ok(self
			.vectors
			.iter()
			.filter(|(name, _)| keywords.iter().any(|k| k == name))
			.map(|(name, vector)| Embedding {
				keyword: name.to_string(),
				vector: vector.clone(),
			})
			.collect())
	}
}

struct FailingProvider;

impl EmbeddingProvider for FailingProvider {
	async fn embed(&self, _keywords: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
		Err(EmbeddingError::Status {
			status: 503,
			message: "model loading".into(),
		})
	}
}

/// Two tight clusters with no similarity between them.
fn clustered() -> (Vec<Keyword>, FixedProvider) {
	let keywords = vec![
		Keyword::new("microgravity", 40),
		Keyword::new("spaceflight", 31),
		Keyword::new("weightlessness", 12),
		Keyword::new("arabidopsis", 25),
		Keyword::new("root growth", 9),
		Keyword::new("gravitropism", 6),
	];
	let provider = FixedProvider::new(vec![
		("microgravity", vec![1.0, 0.05, 0.0]),
		("spaceflight", vec![0.95, 0.1, 0.0]),
		("weightlessness", vec![1.0, 0.0, 0.1]),
		("arabidopsis", vec![0.0, 1.0, 0.05]),
		("root growth", vec![0.05, 0.95, 0.0]),
		("gravitropism", vec![0.0, 1.0, 0.1]),
	]);
	(keywords, provider)
}

fn centroid(nodes: &[PositionedNode]) -> Vec3 {
	let sum = nodes
		.iter()
		.fold(Vec3::ZERO, |acc, n| acc + n.position());
	sum * (1.0 / nodes.len() as f64)
}

#[test]
fn every_keyword_with_an_embedding_is_placed_once() {
	let (keywords, provider) = clustered();
	let mut rng = StdRng::seed_from_u64(7);
	let nodes = block_on(compute_layout(&provider, &keywords, &CloudConfig::default(), &mut rng));

	assert_eq!(nodes.len(), keywords.len());
	let ids: HashSet<_> = nodes.iter().map(|n| n.id.as_str()).collect();
	assert_eq!(ids.len(), nodes.len());
	for keyword in &keywords {
		let node = nodes.iter().find(|n| n.id == keyword.name).unwrap();
		assert_eq!(node.count, keyword.count);
		assert!(node.position().is_finite(), "{} diverged", node.id);
	}
}

#[test]
fn layout_is_centered() {
	let (keywords, provider) = clustered();
	let mut rng = StdRng::seed_from_u64(11);
	let nodes = block_on(compute_layout(&provider, &keywords, &CloudConfig::default(), &mut rng));

	assert!(centroid(&nodes).length() < 1.0);
}

#[test]
fn similar_keywords_end_up_closer() {
	let (keywords, provider) = clustered();
	let mut rng = StdRng::seed_from_u64(3);
	let nodes = block_on(compute_layout(&provider, &keywords, &CloudConfig::default(), &mut rng));
	let at = |id: &str| nodes.iter().find(|n| n.id == id).unwrap().position();

	let within = at("microgravity").distance(at("spaceflight"));
	let across = at("microgravity").distance(at("arabidopsis"));
	assert!(within < across, "within {within} vs across {across}");
}

#[test]
fn empty_keywords_skip_the_provider() {
	let (_, provider) = clustered();
	let mut rng = StdRng::seed_from_u64(1);
	let nodes = block_on(compute_layout(&provider, &[], &CloudConfig::default(), &mut rng));

	assert!(nodes.is_empty());
	assert_eq!(provider.calls.get(), 0);
}

#[test]
fn provider_failure_yields_empty_layout() {
	let (keywords, _) = clustered();
	let mut rng = StdRng::seed_from_u64(1);
	let nodes = block_on(compute_layout(
		&FailingProvider,
		&keywords,
		&CloudConfig::default(),
		&mut rng,
	));

	assert!(nodes.is_empty());
}

#[test]
fn keywords_without_embeddings_are_left_out() {
	let (mut keywords, provider) = clustered();
	keywords.push(Keyword::new("unembedded", 50));
	let mut rng = StdRng::seed_from_u64(5);
	let nodes = block_on(compute_layout(&provider, &keywords, &CloudConfig::default(), &mut rng));

	assert_eq!(nodes.len(), keywords.len() - 1);
	assert!(nodes.iter().all(|n| n.id != "unembedded"));
	assert_eq!(provider.calls.get(), 1);
}

#[test]
fn stepping_matches_the_tick_budget() {
	let (keywords, provider) = clustered();
	let mut config = CloudConfig::default();
	config.simulation.ticks = 50;
	let mut rng = StdRng::seed_from_u64(9);
	let mut simulation = block_on(prepare_simulation(&provider, &keywords, &config, &mut rng)).unwrap();

	let mut steps = 0;
	while !simulation.is_finished() {
		simulation.step();
		steps += 1;
		assert!(steps <= 50);
	}
	assert_eq!(simulation.ticks_run(), steps);
	assert!(simulation.positioned().iter().all(|n| n.position().is_finite()));
}

#[test]
fn stale_layouts_are_discarded() {
	let (keywords, provider) = clustered();
	let generation = LayoutGeneration::new();
	let config = CloudConfig::default();
	let mut rng = StdRng::seed_from_u64(2);

	let first = generation.begin();
	let stale = block_on(compute_layout(&provider, &keywords[..3], &config, &mut rng));
	let second = generation.begin();
	let fresh = block_on(compute_layout(&provider, &keywords, &config, &mut rng));

	let mut shown: Vec<PositionedNode> = Vec::new();
	generation.apply_if_current(second, fresh, |nodes| shown = nodes);
	generation.apply_if_current(first, stale, |nodes| shown = nodes);

	assert_eq!(shown.len(), keywords.len());
}

#[test]
fn invalid_page_config_still_lays_out() {
	let (keywords, provider) = clustered();
	let config = CloudConfig::from_json(
		r#"{"simulation":{"alpha_min":-0.01,"velocity_decay":3},"scale":{"min_distance":500,"max_distance":100}}"#,
	)
	.unwrap();
	let mut rng = StdRng::seed_from_u64(13);
	let nodes = block_on(compute_layout(&provider, &keywords, &config, &mut rng));

	assert_eq!(nodes.len(), keywords.len());
	assert!(nodes.iter().all(|n| n.position().is_finite()));
	assert!(config.scale.zoom(config.scale.camera_distance, true).is_finite());
}
