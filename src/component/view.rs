//! Render-phase capability.
//!
//! A [`ComponentView`] is what a component's own render-time logic works
//! with: it reads locals and child groups, checks requirements, and drives
//! the render-self step for itself or its children. Views are handed to
//! [`TemplateHost::render`](crate::host::TemplateHost::render) by the
//! engine; they are never available during a build window.

use serde_json::Value;

use crate::component::tree::{ComponentTree, Locals, NodeId, Resolved};
use crate::error::{ComponentError, ComponentResult};
use crate::host::TemplateHost;

pub struct ComponentView<'t> {
    tree: &'t mut ComponentTree,
    host: &'t dyn TemplateHost,
    id: NodeId,
}

impl<'t> ComponentView<'t> {
    pub(crate) fn new(
        tree: &'t mut ComponentTree,
        host: &'t dyn TemplateHost,
        id: NodeId,
    ) -> Self {
        debug_assert!(
            !tree.is_building(id),
            "render-phase view created inside a build window"
        );
        ComponentView { tree, host, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.tree.name(self.id)
    }

    pub fn tree(&self) -> &ComponentTree {
        self.tree
    }

    /// A view of another node in the same tree, typically one of this
    /// node's children.
    pub fn at(&mut self, id: NodeId) -> ComponentView<'_> {
        ComponentView::new(self.tree, self.host, id)
    }

    /// True iff `key` names a local or a child group.
    pub fn has(&self, key: &str) -> bool {
        self.tree.has(self.id, key)
    }

    /// Name lookup; locals take precedence over a same-named child group.
    pub fn resolve(&self, key: &str) -> Option<Resolved<'_>> {
        self.tree.resolve(self.id, key)
    }

    pub fn local(&self, key: &str) -> Option<&Value> {
        self.tree.local(self.id, key)
    }

    pub fn locals(&self) -> &Locals {
        self.tree.locals(self.id)
    }

    /// The ordered child group for `key`, or an empty slice.
    pub fn components(&self, key: &str) -> &[NodeId] {
        self.tree.components(self.id, key)
    }

    /// Fail with a configuration error unless every key is present as a
    /// local or a child group. Called defensively at the top of a
    /// component's own render-time logic.
    pub fn require(&self, keys: &[&str]) -> ComponentResult<()> {
        self.tree.require(self.id, keys)
    }

    /// Position last assigned to this node by a `render_all` pass, or 0.
    pub fn index(&self) -> usize {
        self.tree.index(self.id)
    }

    /// The fragment produced by this node's own deferred block, used to
    /// embed caller-supplied content not captured into a named local or
    /// sub-component.
    pub fn captured(&self) -> Option<&str> {
        self.tree.captured(self.id)
    }

    /// Render this node in place. Legal only on a nested node; a root is
    /// rendered by the factory that built it, never through this call.
    pub fn render(&mut self) -> ComponentResult<String> {
        if self.tree.parent(self.id).is_none() {
            return Err(ComponentError::RenderWithoutKey {
                component: self.name().to_string(),
            });
        }
        self.tree.render_node(self.host, self.id)
    }

    /// Render the first child under `key` in insertion order; an absent key
    /// or empty group yields `Ok(None)`, never an error.
    pub fn render_child(&mut self, key: &str) -> ComponentResult<Option<String>> {
        let first = self.components(key).first().copied();
        match first {
            Some(child) => self.tree.render_node(self.host, child).map(Some),
            None => Ok(None),
        }
    }

    /// Render every child under `key` in insertion order, assigning each a
    /// zero-based index first, and concatenate the outputs into one
    /// fragment. An absent key yields `Ok(None)`.
    pub fn render_all(&mut self, key: &str) -> ComponentResult<Option<String>> {
        let Some(children) = self.tree.node(self.id).children.get(key).cloned() else {
            return Ok(None);
        };
        let mut out = String::new();
        for (position, child) in children.into_iter().enumerate() {
            self.tree.node_mut(child).index = position;
            out.push_str(&self.tree.render_node(self.host, child)?);
        }
        Ok(Some(out))
    }

    /// See [`ComponentTree::copy_components`].
    pub fn copy_components(&mut self, from: &str, to: &str) {
        self.tree.copy_components(self.id, from, to);
    }
}
