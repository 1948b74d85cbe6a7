use crate::error::LifecycleError;
use crate::host::RenderPass;
use render_tree::{ComponentId, FrameBuilder};
use std::error::Error as StdError;

/// A unit of UI that writes its output into a [`RenderContext`].
pub trait Component {
    fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), LifecycleError>;
}

impl<F> Component for F
where
    F: FnMut(&mut RenderContext<'_>) -> Result<(), LifecycleError>,
{
    fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), LifecycleError> {
        self(cx)
    }
}

/// Per-component view of a running render pass.
pub struct RenderContext<'p> {
    id: ComponentId,
    frames: FrameBuilder,
    pass: &'p mut RenderPass,
}

impl<'p> RenderContext<'p> {
    pub(crate) fn new(id: ComponentId, pass: &'p mut RenderPass) -> Self {
        Self {
            id,
            frames: FrameBuilder::new(),
            pass,
        }
    }

    pub(crate) fn into_frames(self) -> FrameBuilder {
        self.frames
    }

    /// Identity assigned to the component being rendered.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn frames(&mut self) -> &mut FrameBuilder {
        &mut self.frames
    }

    /// Renders `child` as a nested component and references it from the
    /// current position of this component's tree.
    pub fn mount(&mut self, child: &mut dyn Component) -> Result<ComponentId, LifecycleError> {
        let child_id = self.pass.allocate_id();
        self.frames.open_component(child_id).close_component();
        self.pass.render_component(child_id, child)?;
        Ok(child_id)
    }

    /// Wraps `source` as a failure of this component.
    pub fn fail(&self, source: impl Into<Box<dyn StdError + Send + Sync>>) -> LifecycleError {
        LifecycleError::Failed {
            component: self.id,
            source: source.into(),
        }
    }
}

/// Page chrome rendered around a body component.
pub trait LayoutTemplate {
    /// Renders the layout; the body appears wherever `cx.mount(body)` is called.
    fn render(
        &mut self,
        cx: &mut RenderContext<'_>,
        body: &mut dyn Component,
    ) -> Result<(), LifecycleError>;
}

impl<F> LayoutTemplate for F
where
    F: FnMut(&mut RenderContext<'_>, &mut dyn Component) -> Result<(), LifecycleError>,
{
    fn render(
        &mut self,
        cx: &mut RenderContext<'_>,
        body: &mut dyn Component,
    ) -> Result<(), LifecycleError> {
        self(cx, body)
    }
}

/// A body component wrapped in a layout template.
pub struct Layout<T, B> {
    template: T,
    body: B,
}

impl<T: LayoutTemplate, B: Component> Layout<T, B> {
    pub fn new(template: T, body: B) -> Self {
        Self { template, body }
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }
}

impl<T: LayoutTemplate, B: Component> Component for Layout<T, B> {
    fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), LifecycleError> {
        self.template.render(cx, &mut self.body)
    }
}
