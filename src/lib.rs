//! # Subcomponent — build-then-render component trees
//!
//! `subcomponent` lets a template author declare reusable, nestable
//! components: tree nodes that collect named values (locals) and named,
//! repeatable child nodes (sub-components) during a build step, then expose
//! those values for read during a render step. It performs no template
//! evaluation itself — evaluating markup, deciding whether a named partial
//! exists, and escaping output all belong to the host engine behind the
//! [`TemplateHost`] trait.
//!
//! - **Arena tree**: every node of one build/render pass lives in a
//!   [`ComponentTree`]; children are ordered [`NodeId`] groups and the
//!   parent link is a non-owning id used only for base-name lookup.
//! - **Two capabilities**: [`ComponentBuilder`] mutates (set locals, spawn
//!   children, depth-first) and only exists inside a capture window;
//!   [`ComponentView`] reads (lookup, `require`, `render_all`,
//!   `copy_components`, index and captured-content access) and is handed to
//!   the host's render callback.
//! - **Partial resolution**: a node renders `components/{base}/{name}` when
//!   the host says that partial exists, falling back to
//!   `components/{name}`; `base` is the root ancestor's name.
//!
//! # Quick start
//!
//! ```
//! use subcomponent::{
//!     locals_from, render_component_with, ComponentResult, ComponentView, Locals, TemplateHost,
//! };
//! use serde_json::json;
//!
//! struct Host;
//!
//! impl TemplateHost for Host {
//!     fn render(
//!         &self,
//!         partial: &str,
//!         view: &mut ComponentView<'_>,
//!         locals: &Locals,
//!         _captured: Option<&str>,
//!     ) -> ComponentResult<String> {
//!         match partial {
//!             "components/card" => Ok(format!(
//!                 "<div>{}</div>",
//!                 view.render_all("item")?.unwrap_or_default()
//!             )),
//!             _ => Ok(locals
//!                 .get("label")
//!                 .and_then(|v| v.as_str())
//!                 .unwrap_or_default()
//!                 .to_string()),
//!         }
//!     }
//!
//!     fn partial_exists(&self, _partial: &str) -> bool {
//!         false
//!     }
//! }
//!
//! let html = render_component_with(&Host, "card", Locals::new(), |c| {
//!     c.child("item", locals_from(json!({ "label": "A" })))?;
//!     c.child("item", locals_from(json!({ "label": "B" })))?;
//!     Ok(None)
//! })
//! .unwrap();
//! assert_eq!(html, "<div>AB</div>");
//! ```

pub mod component;
pub mod error;
pub mod helper;
pub mod host;

pub use component::{
    locals_from, ComponentBuilder, ComponentTree, ComponentView, Locals, NodeId, Resolved,
};
pub use error::{ComponentError, ComponentResult};
pub use helper::{render_component, render_component_with};
pub use host::{block, BlockFn, TemplateHost};
