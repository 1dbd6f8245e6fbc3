//! Host contracts supplied by the surrounding template engine.
//!
//! The engine performs no template evaluation itself; everything that touches
//! markup goes through a [`TemplateHost`]. Hosts are passed explicitly into
//! the capture and render steps, so there is no ambient "current component"
//! state anywhere in the crate.

use std::rc::Rc;

use crate::component::{ComponentBuilder, ComponentView, Locals};
use crate::error::ComponentResult;

/// A deferred block: runs with the new component as the build target and
/// returns the fragment its body produced, if any.
pub type BlockFn =
    dyn Fn(&mut ComponentBuilder<'_>) -> ComponentResult<Option<String>> + 'static;

/// Wrap a closure as a shareable deferred block.
pub fn block<F>(f: F) -> Rc<BlockFn>
where
    F: Fn(&mut ComponentBuilder<'_>) -> ComponentResult<Option<String>> + 'static,
{
    Rc::new(f)
}

/// The three behavioral contracts a host template engine must supply.
pub trait TemplateHost {
    /// Run `block` with `builder` as the build-phase dispatch target and
    /// return the captured fragment. The default implementation simply
    /// invokes the block; hosts with output buffering override this to
    /// collect markup emitted around the builder calls.
    ///
    /// Only ever called when the component was given a block.
    fn capture(
        &self,
        builder: &mut ComponentBuilder<'_>,
        block: &BlockFn,
    ) -> ComponentResult<Option<String>> {
        block(builder)
    }

    /// Evaluate the named partial with the given locals, exposing `captured`
    /// as default slot content. `view` is the component being rendered; its
    /// render-time helpers (`render_all`, `render_child`, `require`, …) are
    /// available to the template body through it.
    fn render(
        &self,
        partial: &str,
        view: &mut ComponentView<'_>,
        locals: &Locals,
        captured: Option<&str>,
    ) -> ComponentResult<String>;

    /// Report whether a named partial exists. Used only by partial
    /// identifier resolution.
    fn partial_exists(&self, partial: &str) -> bool;
}
