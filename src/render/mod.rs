//! HTML rendering of a graph model
//!
//! Layout and drawing happen in the browser (vis-network); this module only
//! serialises the model and the rendering options into an embedded page
//! template.

use crate::cloud::EntryPredicate;
use crate::model::GraphModel;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(RustEmbed)]
#[folder = "src/render/templates/"]
struct Templates;

const PAGE_TEMPLATE: &str = "network.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template {0} is not embedded")]
    MissingTemplate(&'static str),

    #[error("Template is not valid UTF-8")]
    TemplateEncoding(#[from] std::str::Utf8Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Physics engine used by the layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Physics {
    /// vis-network default
    BarnesHut,
    ForceAtlas2Based {
        gravity: f64,
        central_gravity: f64,
        spring_length: f64,
        spring_strength: f64,
        damping: f64,
        overlap: f64,
    },
}

impl Physics {
    /// ForceAtlas2 with the usual defaults
    pub fn force_atlas_2_based() -> Self {
        Physics::ForceAtlas2Based {
            gravity: -50.0,
            central_gravity: 0.01,
            spring_length: 100.0,
            spring_strength: 0.08,
            damping: 0.4,
            overlap: 0.0,
        }
    }

    fn to_options(self) -> Value {
        match self {
            Physics::BarnesHut => json!({ "enabled": true, "solver": "barnesHut" }),
            Physics::ForceAtlas2Based {
                gravity,
                central_gravity,
                spring_length,
                spring_strength,
                damping,
                overlap,
            } => json!({
                "enabled": true,
                "solver": "forceAtlas2Based",
                "forceAtlas2Based": {
                    "gravitationalConstant": gravity,
                    "centralGravity": central_gravity,
                    "springLength": spring_length,
                    "springConstant": spring_strength,
                    "damping": damping,
                    "avoidOverlap": overlap,
                }
            }),
        }
    }
}

/// Global rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// CSS height of the canvas
    pub height: String,
    /// CSS width of the canvas
    pub width: String,
    pub physics: Physics,
    /// Show the interactive physics/layout controls
    pub show_buttons: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            height: "1500px".to_string(),
            width: "1500px".to_string(),
            physics: Physics::BarnesHut,
            show_buttons: true,
        }
    }
}

impl RenderConfig {
    /// Taxon runs keep the default solver; family and host runs use
    /// ForceAtlas2
    pub fn for_predicate(predicate: &EntryPredicate, height: &str, width: &str) -> Self {
        let physics = match predicate {
            EntryPredicate::TaxonSubstring { .. } => Physics::BarnesHut,
            EntryPredicate::Family { .. } | EntryPredicate::HostGenus { .. } => {
                Physics::force_atlas_2_based()
            }
        };
        Self {
            height: height.to_string(),
            width: width.to_string(),
            physics,
            show_buttons: true,
        }
    }

    /// vis-network options object
    pub fn to_options(&self) -> Value {
        json!({
            "physics": self.physics.to_options(),
            "configure": { "enabled": self.show_buttons },
            "edges": { "smooth": { "enabled": true, "type": "dynamic" } },
            "interaction": { "dragNodes": true, "hideEdgesOnDrag": false, "hideNodesOnDrag": false },
        })
    }
}

/// JSON safe to drop inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> RenderResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Substitute `{{key}}` placeholders in one pass
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Writes graph models as self-contained vis-network pages
#[derive(Debug, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, model: &GraphModel, config: &RenderConfig, title: &str) -> RenderResult<String> {
        let template = Templates::get(PAGE_TEMPLATE).ok_or(RenderError::MissingTemplate(PAGE_TEMPLATE))?;
        let template = std::str::from_utf8(template.data.as_ref())?;

        let values = [
            ("title", html_escape::encode_text(title).to_string()),
            ("height", config.height.clone()),
            ("width", config.width.clone()),
            ("nodes", script_json(&model.nodes)?),
            ("edges", script_json(&model.edges)?),
            ("options", script_json(&config.to_options())?),
        ];
        Ok(fill_template(template, &values))
    }

    /// Render and write to `path`
    pub fn write(
        &self,
        model: &GraphModel,
        config: &RenderConfig,
        title: &str,
        path: impl AsRef<Path>,
    ) -> RenderResult<PathBuf> {
        let path = path.as_ref();
        let html = self.render(model, config, title)?;
        std::fs::write(path, html).map_err(|source| RenderError::Write {
            path: path.display().to_string(),
            source,
        })?;
        info!(
            "Saved {} node(s) and {} edge(s) to {:?}",
            model.nodes.len(),
            model.edges.len(),
            path
        );
        Ok(path.to_path_buf())
    }
}
