//! keyword-cloud: Interactive 3D keyword cloud for a research article dashboard.
//!
//! This crate provides a WASM-based visualization that embeds article keywords,
//! links semantically similar ones, and relaxes them into a rotatable 3D cloud
//! with hover tooltips and click selection.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

// Only pulled in to enable the `js` entropy source for `rand` on wasm32.
#[cfg(target_arch = "wasm32")]
use getrandom as _;

pub mod components;
pub mod keywords;

pub use components::keyword_cloud::{
	CloudConfig, Keyword, KeywordCloud, KeywordSelection, LayoutMode, PositionedNode, Theme,
	compute_layout,
};
pub use keywords::{Article, ArticleData, article_has_keyword, count_keywords};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("keyword-cloud: logging initialized");
}

/// Parse the JSON body of a `<script>` element by id.
fn load_script_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("keyword-cloud: failed to parse #{}: {}", id, e);
			None
		}
	}
}

/// Load articles from a script element with id="keyword-data".
/// Expected format: JSON with { articles: [{ title, link, summary, keywords }] }
fn load_article_data() -> Option<ArticleData> {
	let data: ArticleData = load_script_json("keyword-data")?;
	info!("keyword-cloud: loaded {} articles", data.articles.len());
	Some(data)
}

/// Load configuration overrides from a script element with id="keyword-cloud-config".
fn load_config() -> CloudConfig {
	load_script_json::<CloudConfig>("keyword-cloud-config")
		.map(CloudConfig::validated)
		.unwrap_or_default()
}

/// Main application component.
/// Loads articles from DOM, counts their keywords and renders the cloud.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let articles = load_article_data().unwrap_or_default().articles;
	let keywords = count_keywords(&articles, config.min_keyword_count);
	info!(
		"keyword-cloud: {} keywords seen at least {} times",
		keywords.len(),
		config.min_keyword_count
	);
	let keyword_signal = Signal::derive(move || keywords.clone());

	let selected = RwSignal::new(None::<KeywordSelection>);
	let on_keyword_click = Callback::new(move |selection: KeywordSelection| {
		selected.update(|current| {
			*current = match current.take() {
				Some(prev) if prev.name == selection.name => None,
				_ => Some(selection),
			};
		});
	});

	let matching = move || {
		selected.get().map(|s| {
			let n = articles
				.iter()
				.filter(|a| article_has_keyword(a, &s.name))
				.count();
			(s, n)
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Keyword Cloud" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="keyword-cloud">
			<KeywordCloud keywords=keyword_signal on_keyword_click=on_keyword_click config=config />
			<div class="keyword-overlay">
				<h1>"Keyword Cloud"</h1>
				<p class="subtitle">"Drag to rotate. Scroll to zoom. Click a keyword to select it."</p>
				{move || {
					matching()
						.map(|(s, n)| {
							view! {
								<p class="selection">
									<strong>{s.name}</strong>
									{format!(" appears {} times, {} matching articles", s.count, n)}
								</p>
							}
						})
				}}
			</div>
		</div>
	}
}
