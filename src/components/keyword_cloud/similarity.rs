//! Builds the weighted keyword graph from embeddings.
//!
//! Every unordered pair of keywords is compared by cosine similarity and linked
//! when the similarity clears the threshold. This is an exact O(N²) pass over
//! the pairs, which stays cheap for the few hundred distinct keywords a
//! dashboard holds; larger inputs would want an approximate neighbor search.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use rand::Rng;
use serde::Deserialize;

use super::types::{Embedding, Keyword, KeywordGraph, KeywordNode, SimilarityEdge, Vec3};

/// Graph construction parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Pairs must have similarity strictly above this to be linked.
	pub similarity_threshold: f64,
	/// Initial positions are drawn from `[-extent, extent]` on each axis.
	pub initial_extent: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			similarity_threshold: 0.5,
			initial_extent: 100.0,
		}
	}
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ,
/// so degenerate embeddings never produce an edge.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
	for (&x, &y) in a.iter().zip(b) {
		let (x, y) = (x as f64, y as f64);
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	let denom = norm_a.sqrt() * norm_b.sqrt();
	if denom == 0.0 || !denom.is_finite() {
		return 0.0;
	}
	(dot / denom).clamp(-1.0, 1.0)
}

/// Turns keyword records and their embeddings into a [`KeywordGraph`].
#[derive(Clone, Debug, Default)]
pub struct SimilarityGraphBuilder {
	config: GraphConfig,
}

impl SimilarityGraphBuilder {
	/// Builder using the given thresholds.
	pub fn new(config: GraphConfig) -> Self {
		Self { config }
	}

	/// Build the graph. Keywords without a usable embedding are left out.
	///
	/// An embedding is unusable when it is missing, empty, contains non-finite
	/// values, or has a different dimensionality from the first accepted one.
	/// Repeated keyword names keep their first occurrence.
	pub fn build<R: Rng>(
		&self,
		keywords: &[Keyword],
		embeddings: &[Embedding],
		rng: &mut R,
	) -> KeywordGraph {
		let by_keyword: HashMap<&str, &[f32]> = embeddings
			.iter()
			.map(|e| (e.keyword.as_str(), e.vector.as_slice()))
			.collect();

		let extent = self.config.initial_extent.abs();
		let mut seen = HashSet::new();
		let mut dimension = None;
		let mut nodes = Vec::with_capacity(keywords.len());

		for keyword in keywords {
			if !seen.insert(keyword.name.as_str()) {
				debug!("keyword-cloud: duplicate keyword {:?} skipped", keyword.name);
				continue;
			}
			let Some(&vector) = by_keyword.get(keyword.name.as_str()) else {
				warn!("keyword-cloud: no embedding for {:?}, skipping", keyword.name);
				continue;
			};
			if vector.is_empty() || vector.iter().any(|v| !v.is_finite()) {
				warn!("keyword-cloud: malformed embedding for {:?}, skipping", keyword.name);
				continue;
			}
			match dimension {
				None => dimension = Some(vector.len()),
				Some(d) if d != vector.len() => {
					warn!(
						"keyword-cloud: embedding for {:?} has {} dimensions, expected {}",
						keyword.name,
						vector.len(),
						d
					);
					continue;
				}
				Some(_) => {}
			}

			let position = if extent > 0.0 {
				Vec3::new(
					rng.gen_range(-extent..=extent),
					rng.gen_range(-extent..=extent),
					rng.gen_range(-extent..=extent),
				)
			} else {
				Vec3::ZERO
			};

			nodes.push(KeywordNode {
				id: keyword.name.clone(),
				count: keyword.count,
				embedding: vector.to_vec(),
				position,
				velocity: Vec3::ZERO,
			});
		}

		let edges = self.link(&nodes);
		debug!(
			"keyword-cloud: graph built with {} nodes, {} edges",
			nodes.len(),
			edges.len()
		);
		KeywordGraph { nodes, edges }
	}

	fn link(&self, nodes: &[KeywordNode]) -> Vec<SimilarityEdge> {
		let mut edges = Vec::new();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let similarity = cosine_similarity(&nodes[i].embedding, &nodes[j].embedding);
				if similarity > self.config.similarity_threshold {
					edges.push(SimilarityEdge {
						source: i,
						target: j,
						weight: similarity,
					});
				}
			}
		}
		edges
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn emb(keyword: &str, vector: &[f32]) -> Embedding {
		Embedding {
			keyword: keyword.to_string(),
			vector: vector.to_vec(),
		}
	}

	#[test]
	fn cosine_of_identical_vectors_is_one() {
		let v = [0.3, -0.2, 0.9];
		assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
	}

	#[test]
	fn cosine_is_symmetric() {
		let a = [1.0, 2.0, 3.0];
		let b = [-0.5, 4.0, 0.25];
		assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
	}

	#[test]
	fn zero_vector_has_no_similarity() {
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
	}

	#[test]
	fn mismatched_lengths_have_no_similarity() {
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
	}

	#[test]
	fn threshold_is_strict() {
		// cos(60°) is 0.5 to within rounding; nudge either side of it.
		let base = [1.0f32, 0.0];
		let at = [0.5f32, 0.75f32.sqrt()];
		let above = [0.6f32, 0.8];
		let keywords = vec![Keyword::new("base", 3), Keyword::new("above", 3)];
		let mut rng = StdRng::seed_from_u64(7);

		let graph = SimilarityGraphBuilder::default().build(
			&keywords,
			&[emb("base", &base), emb("above", &above)],
			&mut rng,
		);
		assert_eq!(graph.edges.len(), 1);

		let exact = SimilarityGraphBuilder::new(GraphConfig {
			similarity_threshold: cosine_similarity(&base, &at),
			..GraphConfig::default()
		});
		let graph = exact.build(
			&[Keyword::new("base", 3), Keyword::new("at", 3)],
			&[emb("base", &base), emb("at", &at)],
			&mut rng,
		);
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn missing_and_malformed_embeddings_are_skipped() {
		let keywords = vec![
			Keyword::new("spaceflight", 12),
			Keyword::new("microgravity", 9),
			Keyword::new("radiation", 4),
			Keyword::new("bone", 3),
			Keyword::new("muscle", 3),
		];
		let embeddings = vec![
			emb("spaceflight", &[1.0, 0.0, 0.0]),
			emb("microgravity", &[0.9, 0.1, 0.0]),
			// radiation missing
			emb("bone", &[f32::NAN, 0.0, 1.0]),
			emb("muscle", &[0.0, 1.0]),
		];
		let mut rng = StdRng::seed_from_u64(1);
		let graph = SimilarityGraphBuilder::default().build(&keywords, &embeddings, &mut rng);

		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["spaceflight", "microgravity"]);
		assert_eq!(graph.edges.len(), 1);
	}

	#[test]
	fn duplicate_keywords_keep_first() {
		let keywords = vec![Keyword::new("cells", 5), Keyword::new("cells", 2)];
		let mut rng = StdRng::seed_from_u64(3);
		let graph = SimilarityGraphBuilder::default().build(
			&keywords,
			&[emb("cells", &[1.0, 1.0])],
			&mut rng,
		);
		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.nodes[0].count, 5);
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn initial_positions_stay_inside_cube() {
		let keywords: Vec<_> = (0..50).map(|i| Keyword::new(format!("k{i}"), 3)).collect();
		let embeddings: Vec<_> = (0..50)
			.map(|i| emb(&format!("k{i}"), &[i as f32 + 1.0, 1.0]))
			.collect();
		let mut rng = StdRng::seed_from_u64(11);
		let graph = SimilarityGraphBuilder::default().build(&keywords, &embeddings, &mut rng);

		for node in &graph.nodes {
			for c in [node.position.x, node.position.y, node.position.z] {
				assert!((-100.0..=100.0).contains(&c));
			}
		}
		// Not all stacked at one point.
		let first = graph.nodes[0].position;
		assert!(graph.nodes.iter().any(|n| n.position != first));
	}

	#[test]
	fn edges_have_no_self_loops_or_duplicates() {
		let keywords: Vec<_> = (0..20).map(|i| Keyword::new(format!("k{i}"), 3)).collect();
		let embeddings: Vec<_> = (0..20)
			.map(|i| {
				let angle = i as f32 * 0.2;
				emb(&format!("k{i}"), &[angle.cos(), angle.sin(), 0.1])
			})
			.collect();
		let mut rng = StdRng::seed_from_u64(5);
		let graph = SimilarityGraphBuilder::default().build(&keywords, &embeddings, &mut rng);

		let mut pairs = HashSet::new();
		for edge in &graph.edges {
			assert_ne!(edge.source, edge.target);
			let key = (edge.source.min(edge.target), edge.source.max(edge.target));
			assert!(pairs.insert(key));
			assert!(edge.weight > 0.5 && edge.weight <= 1.0);
		}

		for i in 0..graph.nodes.len() {
			for j in (i + 1)..graph.nodes.len() {
				let linked = pairs.contains(&(i, j));
				let sim =
					cosine_similarity(&graph.nodes[i].embedding, &graph.nodes[j].embedding);
				assert_eq!(linked, sim > 0.5);
			}
		}
	}
}
