//! The component arena.
//!
//! All nodes of one build/render pass live in a single [`ComponentTree`];
//! children are referenced by owning [`NodeId`] handles in ordered per-key
//! groups, and the parent link is a non-owning id used only to find the root
//! ancestor's name. The tree's lifetime is scoped to the render call that
//! created its root.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::component::builder::ComponentBuilder;
use crate::component::view::ComponentView;
use crate::error::{ComponentError, ComponentResult};
use crate::host::{BlockFn, TemplateHost};

/// Named values bound into a component for its own render-time use.
/// Key order is preserved (serde_json `preserve_order`).
pub type Locals = Map<String, Value>;

/// Coerce a JSON value into a locals map. Objects become the map itself;
/// anything else yields an empty map.
pub fn locals_from(value: Value) -> Locals {
    match value {
        Value::Object(map) => map,
        _ => Locals::new(),
    }
}

/// Handle to a node inside a [`ComponentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Result of a render-phase name lookup. A local and a child group may share
/// a bare name; the local wins — documented behavior, not to be "fixed".
#[derive(Debug)]
pub enum Resolved<'a> {
    Local(&'a Value),
    Components(&'a [NodeId]),
}

pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) locals: Locals,
    /// Ordered, repeatable child groups. Group insertion order and the order
    /// within each group are both significant.
    pub(crate) children: IndexMap<String, Vec<NodeId>>,
    pub(crate) block: Option<Rc<BlockFn>>,
    pub(crate) captured: Option<String>,
    /// True only strictly within this node's own capture window.
    pub(crate) building: bool,
    /// Last position assigned by a `render_all` pass; 0 if never assigned.
    pub(crate) index: usize,
    /// Memoized resolved partial identifier.
    pub(crate) partial: Option<String>,
}

/// Arena owning every component node of one build/render pass.
#[derive(Default)]
pub struct ComponentTree {
    nodes: Vec<NodeData>,
}

impl ComponentTree {
    pub fn new() -> Self {
        ComponentTree { nodes: Vec::new() }
    }

    /// Allocate a node. The node is inert until [`ComponentTree::capture`]
    /// runs its deferred block.
    pub fn insert(
        &mut self,
        name: &str,
        locals: Locals,
        parent: Option<NodeId>,
        block: Option<Rc<BlockFn>>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.to_string(),
            parent,
            locals,
            children: IndexMap::new(),
            block,
            captured: None,
            building: false,
            index: 0,
            partial: None,
        });
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn local(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.node(id).locals.get(key)
    }

    pub fn locals(&self, id: NodeId) -> &Locals {
        &self.node(id).locals
    }

    /// The ordered child group for `key`, or an empty slice.
    pub fn components(&self, id: NodeId, key: &str) -> &[NodeId] {
        self.node(id)
            .children
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True iff `key` names a local or a child group.
    pub fn has(&self, id: NodeId, key: &str) -> bool {
        let node = self.node(id);
        node.locals.contains_key(key) || node.children.contains_key(key)
    }

    /// Render-phase name lookup; locals take precedence over a same-named
    /// child group.
    pub fn resolve(&self, id: NodeId, key: &str) -> Option<Resolved<'_>> {
        let node = self.node(id);
        if let Some(value) = node.locals.get(key) {
            return Some(Resolved::Local(value));
        }
        node.children
            .get(key)
            .map(|ids| Resolved::Components(ids.as_slice()))
    }

    pub fn index(&self, id: NodeId) -> usize {
        self.node(id).index
    }

    /// The fragment produced by the node's own deferred block, if any.
    pub fn captured(&self, id: NodeId) -> Option<&str> {
        self.node(id).captured.as_deref()
    }

    pub fn is_building(&self, id: NodeId) -> bool {
        self.node(id).building
    }

    /// Fail with a configuration error unless every key is present as a
    /// local or a child group.
    pub fn require(&self, id: NodeId, keys: &[&str]) -> ComponentResult<()> {
        let missing: Vec<&str> = keys
            .iter()
            .copied()
            .filter(|key| !self.has(id, key))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ComponentError::MissingRequirements {
                component: self.name(id).to_string(),
                missing: missing.join(", "),
            })
        }
    }

    /// Name of the root ancestor, found by walking parent links.
    pub fn base_name(&self, id: NodeId) -> &str {
        let mut on = id;
        while let Some(parent) = self.node(on).parent {
            on = parent;
        }
        &self.node(on).name
    }

    /// Run the node's capture step: open the build window, execute the
    /// deferred block under the host's capture callback, and store whatever
    /// fragment it produced. The build window closes on every exit path,
    /// including an `Err` from the block.
    pub fn capture(&mut self, host: &dyn TemplateHost, id: NodeId) -> ComponentResult<()> {
        let block = self.node(id).block.clone();
        debug!(
            component = %self.node(id).name,
            has_block = block.is_some(),
            "capturing component"
        );
        self.node_mut(id).building = true;
        let result = match &block {
            Some(block) => {
                let mut builder = ComponentBuilder::new(self, host, id);
                host.capture(&mut builder, block.as_ref())
            }
            None => Ok(None),
        };
        self.node_mut(id).building = false;
        self.node_mut(id).captured = result?;
        Ok(())
    }

    /// The render-self step: resolve the partial identifier and hand the
    /// node to the host's render callback. Template evaluation itself is the
    /// host's responsibility.
    pub fn render_node(&mut self, host: &dyn TemplateHost, id: NodeId) -> ComponentResult<String> {
        let partial = self.resolve_partial(host, id);
        let locals = self.node(id).locals.clone();
        let captured = self.node(id).captured.clone();
        let mut view = ComponentView::new(self, host, id);
        host.render(&partial, &mut view, &locals, captured.as_deref())
    }

    /// Resolve the partial identifier, memoized once per node: prefer
    /// `components/{base_name}/{name}` when the host reports it present,
    /// otherwise fall back to `components/{name}`.
    pub fn resolve_partial(&mut self, host: &dyn TemplateHost, id: NodeId) -> String {
        if let Some(partial) = &self.node(id).partial {
            return partial.clone();
        }
        let namespaced = format!("components/{}/{}", self.base_name(id), self.node(id).name);
        let partial = if host.partial_exists(&namespaced) {
            namespaced
        } else {
            format!("components/{}", self.node(id).name)
        };
        trace!(component = %self.node(id).name, partial = %partial, "resolved partial");
        self.node_mut(id).partial = Some(partial.clone());
        partial
    }

    /// Duplicate every node under `from`, preserving order, and install the
    /// duplicate list under `to`, overwriting any prior entries there. Each
    /// duplicate is a fresh node carrying copies of the original's locals
    /// and its already-computed captured output; the deferred block is never
    /// re-invoked for a duplicate. Lets one logical set of children render
    /// twice under two different partial-naming contexts.
    pub fn copy_components(&mut self, id: NodeId, from: &str, to: &str) {
        let originals = self.components(id, from).to_vec();
        let mut copies = Vec::with_capacity(originals.len());
        for original in originals {
            copies.push(self.duplicate(original, to, Some(id)));
        }
        self.node_mut(id).children.insert(to.to_string(), copies);
    }

    /// Deep-copy a node under a new name. Descendant groups are duplicated
    /// too, so copy and original share no handles.
    fn duplicate(&mut self, id: NodeId, name: &str, parent: Option<NodeId>) -> NodeId {
        let source = self.node(id);
        let locals = source.locals.clone();
        let block = source.block.clone();
        let captured = source.captured.clone();
        let groups: Vec<(String, Vec<NodeId>)> = source
            .children
            .iter()
            .map(|(key, ids)| (key.clone(), ids.clone()))
            .collect();

        let copy = self.insert(name, locals, parent, block);
        self.node_mut(copy).captured = captured;
        for (key, ids) in groups {
            let mut duplicates = Vec::with_capacity(ids.len());
            for child in ids {
                let child_name = self.node(child).name.clone();
                duplicates.push(self.duplicate(child, &child_name, Some(copy)));
            }
            self.node_mut(copy).children.insert(key, duplicates);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::block;
    use serde_json::json;

    struct NullHost;

    impl TemplateHost for NullHost {
        fn render(
            &self,
            _partial: &str,
            _view: &mut ComponentView<'_>,
            _locals: &Locals,
            _captured: Option<&str>,
        ) -> ComponentResult<String> {
            Ok(String::new())
        }

        fn partial_exists(&self, _partial: &str) -> bool {
            false
        }
    }

    struct FixedPartials(Vec<String>);

    impl TemplateHost for FixedPartials {
        fn render(
            &self,
            _partial: &str,
            _view: &mut ComponentView<'_>,
            _locals: &Locals,
            _captured: Option<&str>,
        ) -> ComponentResult<String> {
            Ok(String::new())
        }

        fn partial_exists(&self, partial: &str) -> bool {
            self.0.iter().any(|p| p == partial)
        }
    }

    #[test]
    fn test_set_then_read_local() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "header",
            Locals::new(),
            None,
            Some(block(|c| {
                c.set("title", "Hello")?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();
        assert_eq!(tree.local(root, "title"), Some(&json!("Hello")));
    }

    #[test]
    fn test_child_ordering_preserved() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "list",
            Locals::new(),
            None,
            Some(block(|c| {
                for label in ["A", "B", "C"] {
                    c.child("item", locals_from(json!({ "label": label })))?;
                }
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();

        let items = tree.components(root, "item");
        assert_eq!(items.len(), 3);
        let labels: Vec<&Value> = items
            .iter()
            .map(|id| tree.local(*id, "label").unwrap())
            .collect();
        assert_eq!(labels, vec![&json!("A"), &json!("B"), &json!("C")]);
    }

    #[test]
    fn test_has_predicate() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "card",
            Locals::new(),
            None,
            Some(block(|c| {
                c.set("title", "t")?;
                c.child("header", Locals::new())?;
                Ok(None)
            })),
        );
        assert!(!tree.has(root, "title"));
        tree.capture(&NullHost, root).unwrap();
        assert!(tree.has(root, "title"));
        assert!(tree.has(root, "header"));
        assert!(!tree.has(root, "footer"));
    }

    #[test]
    fn resolve_prefers_local_over_children() {
        // A local and a child group may share a bare name; the local wins.
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "card",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child("header", Locals::new())?;
                c.set("header", "a plain local")?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();
        match tree.resolve(root, "header") {
            Some(Resolved::Local(value)) => assert_eq!(value, &json!("a plain local")),
            other => panic!("expected local precedence, got {:?}", other),
        }
    }

    #[test]
    fn test_require_missing_and_satisfied() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "card",
            Locals::new(),
            None,
            Some(block(|c| {
                c.set("title", "t")?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();

        assert!(tree.require(root, &["title"]).is_ok());
        let err = tree.require(root, &["title", "body", "footer"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The card component requires body, footer local(s) or component(s)"
        );
    }

    #[test]
    fn test_building_flag_resets_on_capture_error() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "broken",
            Locals::new(),
            None,
            Some(block(|_| Err(ComponentError::Capture("boom".into())))),
        );
        let err = tree.capture(&NullHost, root).unwrap_err();
        assert!(matches!(err, ComponentError::Capture(_)));
        assert!(!tree.is_building(root));
        assert_eq!(tree.captured(root), None);
    }

    #[test]
    fn test_failed_child_capture_leaves_child_unattached() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "card",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child_with("header", Locals::new(), |_| {
                    Err(ComponentError::Capture("boom".into()))
                })?;
                Ok(None)
            })),
        );
        assert!(tree.capture(&NullHost, root).is_err());
        assert!(tree.components(root, "header").is_empty());
        assert!(!tree.is_building(root));
    }

    #[test]
    fn test_base_name_walks_to_root() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "card",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child_with("body", Locals::new(), |c| {
                    c.child("row", Locals::new())?;
                    Ok(None)
                })?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();

        let body = tree.components(root, "body")[0];
        let row = tree.components(body, "row")[0];
        assert_eq!(tree.base_name(root), "card");
        assert_eq!(tree.base_name(body), "card");
        assert_eq!(tree.base_name(row), "card");
    }

    #[test]
    fn test_partial_resolution_and_memoization() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "card",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child("header", Locals::new())?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();
        let header = tree.components(root, "header")[0];

        let namespaced = FixedPartials(vec!["components/card/header".into()]);
        assert_eq!(
            tree.resolve_partial(&namespaced, header),
            "components/card/header"
        );
        // Memoized: a host without the namespaced partial no longer matters.
        assert_eq!(
            tree.resolve_partial(&NullHost, header),
            "components/card/header"
        );

        assert_eq!(tree.resolve_partial(&NullHost, root), "components/card");
    }

    #[test]
    fn test_partial_fallback_without_namespaced_template() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "card",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child("header", Locals::new())?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();
        let header = tree.components(root, "header")[0];
        assert_eq!(tree.resolve_partial(&NullHost, header), "components/header");
    }

    #[test]
    fn test_copy_components_is_independent() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "nav",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child("links", locals_from(json!({ "href": "/a" })))?;
                c.child("links", locals_from(json!({ "href": "/b" })))?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();

        tree.copy_components(root, "links", "mobile_links");

        let originals = tree.components(root, "links").to_vec();
        let copies = tree.components(root, "mobile_links").to_vec();
        assert_eq!(copies.len(), originals.len());
        for (original, copy) in originals.iter().zip(&copies) {
            assert_ne!(original, copy);
            assert_eq!(tree.name(*copy), "mobile_links");
            assert_eq!(tree.locals(*copy), tree.locals(*original));
        }

        // Mutating a copy's locals must not touch the original.
        tree.node_mut(copies[0])
            .locals
            .insert("href".into(), json!("/mobile"));
        assert_eq!(tree.local(originals[0], "href"), Some(&json!("/a")));
        assert_eq!(tree.local(copies[0], "href"), Some(&json!("/mobile")));
    }

    #[test]
    fn test_copy_components_reuses_captured_output() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "nav",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child_with("links", Locals::new(), |_| Ok(Some("fragment".into())))?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();

        tree.copy_components(root, "links", "mobile_links");
        let copy = tree.components(root, "mobile_links")[0];
        // The block is not re-invoked; the captured output travels with the copy.
        assert_eq!(tree.captured(copy), Some("fragment"));
    }

    #[test]
    fn test_copy_components_overwrites_destination() {
        let mut tree = ComponentTree::new();
        let root = tree.insert(
            "nav",
            Locals::new(),
            None,
            Some(block(|c| {
                c.child("links", Locals::new())?;
                c.child("stale", Locals::new())?;
                Ok(None)
            })),
        );
        tree.capture(&NullHost, root).unwrap();

        tree.copy_components(root, "links", "stale");
        assert_eq!(tree.components(root, "stale").len(), 1);
        assert_eq!(tree.name(tree.components(root, "stale")[0]), "stale");

        // Absent source installs an empty group: present, but with nothing in it.
        tree.copy_components(root, "missing", "stale");
        assert!(tree.components(root, "stale").is_empty());
        assert!(tree.has(root, "stale"));
    }
}
