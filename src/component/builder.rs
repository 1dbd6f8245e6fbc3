//! Build-phase capability.
//!
//! A [`ComponentBuilder`] only exists inside a node's capture window: the
//! deferred block receives one, writes locals, and spawns child components
//! depth-first. Render-time reads go through
//! [`ComponentView`](crate::component::ComponentView) instead.

use std::rc::Rc;

use serde::Serialize;
use tracing::trace;

use crate::component::tree::{ComponentTree, Locals, NodeId};
use crate::error::ComponentResult;
use crate::host::{BlockFn, TemplateHost};

pub struct ComponentBuilder<'t> {
    tree: &'t mut ComponentTree,
    host: &'t dyn TemplateHost,
    id: NodeId,
}

impl<'t> ComponentBuilder<'t> {
    pub(crate) fn new(
        tree: &'t mut ComponentTree,
        host: &'t dyn TemplateHost,
        id: NodeId,
    ) -> Self {
        ComponentBuilder { tree, host, id }
    }

    pub fn name(&self) -> &str {
        self.tree.name(self.id)
    }

    /// Bind a named value into the component. No node is created.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> ComponentResult<()> {
        debug_assert!(
            self.tree.is_building(self.id),
            "set() outside the build window"
        );
        let value = serde_json::to_value(value)?;
        self.tree.node_mut(self.id).locals.insert(key.into(), value);
        Ok(())
    }

    /// Add a sub-component with no deferred block.
    pub fn child(&mut self, name: &str, locals: Locals) -> ComponentResult<()> {
        self.spawn(name, locals, None)
    }

    /// Add a sub-component whose block runs immediately, depth-first, with
    /// the new child as the build target.
    pub fn child_with<F>(&mut self, name: &str, locals: Locals, block: F) -> ComponentResult<()>
    where
        F: Fn(&mut ComponentBuilder<'_>) -> ComponentResult<Option<String>> + 'static,
    {
        let block: Rc<BlockFn> = Rc::new(block);
        self.spawn(name, locals, Some(block))
    }

    fn spawn(
        &mut self,
        name: &str,
        locals: Locals,
        block: Option<Rc<BlockFn>>,
    ) -> ComponentResult<()> {
        debug_assert!(
            self.tree.is_building(self.id),
            "child() outside the build window"
        );
        let child = self.tree.insert(name, locals, Some(self.id), block);
        // Capture first; a child that fails to build is never attached.
        self.tree.capture(self.host, child)?;
        self.tree
            .node_mut(self.id)
            .children
            .entry(name.to_string())
            .or_insert_with(Vec::new)
            .push(child);
        trace!(parent = %self.tree.name(self.id), child = name, "attached sub-component");
        Ok(())
    }
}
