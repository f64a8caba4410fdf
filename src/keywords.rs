//! Keyword frequency counting over article tag lists.
//!
//! Each article carries a `;`-separated tag string. Tags are trimmed and lose
//! one trailing period, so `"Microgravity."` and `" Microgravity"` count as
//! the same keyword. Matching is case-sensitive for counting and
//! case-insensitive for lookups.

use std::collections::HashMap;

use serde::Deserialize;

use crate::components::keyword_cloud::Keyword;

/// A research article summary as embedded in the page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Article {
	/// Article title.
	pub title: String,
	/// Link to the full article.
	pub link: String,
	/// Short abstract.
	pub summary: String,
	/// `;`-separated keyword tags.
	pub keywords: String,
}

/// Page dataset.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArticleData {
	/// All articles on the page.
	pub articles: Vec<Article>,
}

/// Split a tag string into normalized, non-empty tags.
pub fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
	tags.split(';')
		.map(|tag| {
			let tag = tag.trim();
			tag.strip_suffix('.').unwrap_or(tag)
		})
		.filter(|tag| !tag.is_empty())
}

/// Count tags across articles, keeping keywords seen at least `min_count`
/// times, most frequent first (ties by name).
pub fn count_keywords<'a>(
	articles: impl IntoIterator<Item = &'a Article>,
	min_count: u32,
) -> Vec<Keyword> {
	let mut counts: HashMap<&str, u32> = HashMap::new();
	for article in articles {
		for tag in split_tags(&article.keywords) {
			*counts.entry(tag).or_insert(0) += 1;
		}
	}

	let mut keywords: Vec<Keyword> = counts
		.into_iter()
		.filter(|&(_, count)| count >= min_count.max(1))
		.map(|(name, count)| Keyword::new(name, count))
		.collect();
	keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
	keywords
}

/// Whether an article is tagged with `keyword`, ignoring case.
pub fn article_has_keyword(article: &Article, keyword: &str) -> bool {
	let needle = keyword.trim().to_lowercase();
	split_tags(&article.keywords).any(|tag| tag.to_lowercase() == needle)
}
