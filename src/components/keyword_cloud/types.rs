//! Keyword, embedding and graph data structures shared by the layout pipeline.

use serde::{Deserialize, Serialize};

/// A keyword and how many articles carry it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Keyword {
	/// Unique keyword text. Doubles as the node id.
	pub name: String,
	/// Number of articles tagged with this keyword.
	pub count: u32,
}

impl Keyword {
	/// Keyword with the given article count.
	pub fn new(name: impl Into<String>, count: u32) -> Self {
		Self {
			name: name.into(),
			count,
		}
	}
}

/// A semantic vector for one keyword, as returned by the embedding provider.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Embedding {
	/// Keyword this vector belongs to.
	pub keyword: String,
	/// Embedding components.
	#[serde(rename = "embedding")]
	pub vector: Vec<f32>,
}

/// A point or direction in layout space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
	/// X coordinate.
	pub x: f64,
	/// Y coordinate.
	pub y: f64,
	/// Z coordinate.
	pub z: f64,
}

impl Vec3 {
	/// The origin.
	pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

	/// Vector from components.
	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	/// Squared Euclidean length.
	pub fn length_squared(self) -> f64 {
		self.x * self.x + self.y * self.y + self.z * self.z
	}

	/// Euclidean length.
	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	/// Distance to another point.
	pub fn distance(self, other: Vec3) -> f64 {
		(self - other).length()
	}

	/// Whether every component is finite.
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
	}
}

impl std::ops::Add for Vec3 {
	type Output = Vec3;

	fn add(self, rhs: Vec3) -> Vec3 {
		Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
	}
}

impl std::ops::Sub for Vec3 {
	type Output = Vec3;

	fn sub(self, rhs: Vec3) -> Vec3 {
		Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
	}
}

impl std::ops::Mul<f64> for Vec3 {
	type Output = Vec3;

	fn mul(self, rhs: f64) -> Vec3 {
		Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
	}
}

impl std::ops::AddAssign for Vec3 {
	fn add_assign(&mut self, rhs: Vec3) {
		self.x += rhs.x;
		self.y += rhs.y;
		self.z += rhs.z;
	}
}

impl std::ops::SubAssign for Vec3 {
	fn sub_assign(&mut self, rhs: Vec3) {
		self.x -= rhs.x;
		self.y -= rhs.y;
		self.z -= rhs.z;
	}
}

impl std::ops::MulAssign<f64> for Vec3 {
	fn mul_assign(&mut self, rhs: f64) {
		self.x *= rhs;
		self.y *= rhs;
		self.z *= rhs;
	}
}

/// A keyword placed in the simulation.
#[derive(Clone, Debug)]
pub struct KeywordNode {
	/// Keyword name, unique within a graph.
	pub id: String,
	/// Article count of the keyword.
	pub count: u32,
	/// Embedding the node was linked by.
	pub embedding: Vec<f32>,
	/// Current layout position.
	pub position: Vec3,
	/// Per-tick displacement, owned by the simulation.
	pub velocity: Vec3,
}

/// An undirected similarity link between two nodes, by index into the node list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityEdge {
	/// Index of the first endpoint in [`KeywordGraph::nodes`].
	pub source: usize,
	/// Index of the second endpoint.
	pub target: usize,
	/// Cosine similarity of the endpoint embeddings, above the inclusion threshold.
	pub weight: f64,
}

/// Nodes plus the sparse similarity edge set.
#[derive(Clone, Debug, Default)]
pub struct KeywordGraph {
	/// One node per accepted keyword.
	pub nodes: Vec<KeywordNode>,
	/// Links between similar keywords.
	pub edges: Vec<SimilarityEdge>,
}

impl KeywordGraph {
	/// Whether there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of edges touching each node, indexed like `nodes`.
	pub fn degrees(&self) -> Vec<usize> {
		let mut degrees = vec![0; self.nodes.len()];
		for edge in &self.edges {
			degrees[edge.source] += 1;
			degrees[edge.target] += 1;
		}
		degrees
	}
}

/// Final layout output handed to the renderer. Edges are not included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionedNode {
	/// Keyword text.
	pub id: String,
	/// Article count.
	pub count: u32,
	/// X coordinate.
	pub x: f64,
	/// Y coordinate.
	pub y: f64,
	/// Z coordinate.
	pub z: f64,
}

impl PositionedNode {
	/// Position as a vector.
	pub fn position(&self) -> Vec3 {
		Vec3::new(self.x, self.y, self.z)
	}
}

impl From<&KeywordNode> for PositionedNode {
	fn from(node: &KeywordNode) -> Self {
		Self {
			id: node.id.clone(),
			count: node.count,
			x: node.position.x,
			y: node.position.y,
			z: node.position.z,
		}
	}
}

/// Payload delivered to hover and click callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordSelection {
	/// Keyword text.
	pub name: String,
	/// Article count.
	pub count: u32,
}
