//! Keyword list to positioned nodes: embed, build the similarity graph, relax.
//!
//! Every failure here is recovered locally. A provider error or an empty
//! keyword list yields an empty layout, never a panic.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info, warn};
use rand::Rng;

use super::config::CloudConfig;
use super::embedding::EmbeddingProvider;
use super::similarity::SimilarityGraphBuilder;
use super::simulation::Simulation;
use super::types::{Keyword, PositionedNode};

/// Fetch embeddings and build a ready-to-run simulation.
///
/// Returns `None` when there is nothing to lay out: no keywords, a provider
/// failure, or no keyword with a usable embedding.
pub async fn prepare_simulation<P, R>(
	provider: &P,
	keywords: &[Keyword],
	config: &CloudConfig,
	rng: &mut R,
) -> Option<Simulation>
where
	P: EmbeddingProvider,
	R: Rng,
{
	if keywords.is_empty() {
		debug!("keyword-cloud: no keywords, skipping layout");
		return None;
	}

	let names: Vec<String> = keywords.iter().map(|k| k.name.clone()).collect();
	let embeddings = match provider.embed(&names).await {
		Ok(embeddings) => embeddings,
		Err(e) => {
			warn!("keyword-cloud: embedding fetch failed, skipping layout: {}", e);
			return None;
		}
	};
	if embeddings.is_empty() {
		warn!("keyword-cloud: provider returned no embeddings");
		return None;
	}

	let graph = SimilarityGraphBuilder::new(config.graph.clone()).build(keywords, &embeddings, rng);
	if graph.is_empty() {
		warn!("keyword-cloud: no keyword had a usable embedding");
		return None;
	}
	info!(
		"keyword-cloud: laying out {} of {} keywords with {} links",
		graph.nodes.len(),
		keywords.len(),
		graph.edges.len()
	);

	Some(Simulation::new(
		graph,
		config.simulation.clone(),
		&config.scale.radius,
	))
}

/// Run the whole pipeline up front and return the final node positions.
pub async fn compute_layout<P, R>(
	provider: &P,
	keywords: &[Keyword],
	config: &CloudConfig,
	rng: &mut R,
) -> Vec<PositionedNode>
where
	P: EmbeddingProvider,
	R: Rng,
{
	match prepare_simulation(provider, keywords, config, rng).await {
		Some(mut simulation) => {
			simulation.run();
			simulation.positioned()
		}
		None => Vec::new(),
	}
}

/// Issues tickets so that only the most recently started layout is applied.
///
/// Each keyword-set change calls [`begin`](Self::begin); a finished
/// computation checks [`is_current`](Self::is_current) with its ticket before
/// publishing and drops its result otherwise.
#[derive(Clone, Debug, Default)]
pub struct LayoutGeneration {
	current: Rc<Cell<u64>>,
}

/// Identifies one layout computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutTicket(u64);

impl LayoutGeneration {
	/// A fresh counter with no ticket issued.
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a new computation, invalidating every earlier ticket.
	pub fn begin(&self) -> LayoutTicket {
		let next = self.current.get().wrapping_add(1);
		self.current.set(next);
		LayoutTicket(next)
	}

	/// Whether `ticket` belongs to the most recent computation.
	pub fn is_current(&self, ticket: LayoutTicket) -> bool {
		self.current.get() == ticket.0
	}

	/// Hand `value` to `apply` only if `ticket` is still current.
	/// Returns whether it was applied.
	pub fn apply_if_current<T>(&self, ticket: LayoutTicket, value: T, apply: impl FnOnce(T)) -> bool {
		if self.is_current(ticket) {
			apply(value);
			true
		} else {
			debug!("keyword-cloud: discarding stale layout {:?}", ticket);
			false
		}
	}
}
