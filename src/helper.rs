//! The per-call entry point a host framework wires into its view layer:
//! build a root component, capture it, render it, return the output.

use std::rc::Rc;

use tracing::debug;

use crate::component::{ComponentBuilder, ComponentTree, Locals};
use crate::error::ComponentResult;
use crate::host::{BlockFn, TemplateHost};

/// Build and render a root component with no deferred block.
pub fn render_component(
    host: &dyn TemplateHost,
    name: &str,
    locals: Locals,
) -> ComponentResult<String> {
    render_root(host, name, locals, None)
}

/// Build and render a root component whose block populates locals and
/// sub-components before the render-self step runs.
pub fn render_component_with<F>(
    host: &dyn TemplateHost,
    name: &str,
    locals: Locals,
    block: F,
) -> ComponentResult<String>
where
    F: Fn(&mut ComponentBuilder<'_>) -> ComponentResult<Option<String>> + 'static,
{
    let block: Rc<BlockFn> = Rc::new(block);
    render_root(host, name, locals, Some(block))
}

fn render_root(
    host: &dyn TemplateHost,
    name: &str,
    locals: Locals,
    block: Option<Rc<BlockFn>>,
) -> ComponentResult<String> {
    debug!(component = name, "rendering root component");
    let mut tree = ComponentTree::new();
    let root = tree.insert(name, locals, None, block);
    tree.capture(host, root)?;
    tree.render_node(host, root)
}
