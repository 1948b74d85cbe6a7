use crate::cancel::CancelToken;
use crate::component::{Component, RenderContext};
use crate::error::{LifecycleError, RenderError};
use frame_html::{HtmlSerializer, SerializerConfig};
use render_tree::{ComponentId, FrameStore, RenderTree, TreeSource};
use std::any::Any;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

const LOG_TARGET: &str = "component_host";

/// Identity of the component passed to [`ComponentHost::render`].
pub const ROOT_COMPONENT: ComponentId = ComponentId(1);

#[derive(Clone, Debug, Default)]
pub struct HostConfig {
    pub serializer: SerializerConfig,
}

/// Runs render passes for one component hierarchy and serializes the result.
///
/// The frame store doubles as the render gate: a pass holds the lock from
/// the moment it clears the store until serialization has finished, so at
/// most one render is in flight per host.
#[derive(Debug, Default)]
pub struct ComponentHost {
    config: HostConfig,
    store: Mutex<FrameStore>,
    renders: AtomicU64,
}

impl ComponentHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HostConfig) -> Self {
        Self {
            config,
            store: Mutex::new(FrameStore::new()),
            renders: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Renders `root` and returns its HTML, waiting for any render already
    /// in flight on this host.
    pub fn render(
        &self,
        root: &mut dyn Component,
        cancel: &CancelToken,
    ) -> Result<String, RenderError> {
        let mut store = self.lock_store();
        self.render_locked(&mut store, root, cancel)
    }

    /// Like [`render`](Self::render), but fails with [`RenderError::Busy`]
    /// instead of waiting.
    pub fn try_render(
        &self,
        root: &mut dyn Component,
        cancel: &CancelToken,
    ) -> Result<String, RenderError> {
        let mut store = match self.store.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                log::warn!(target: LOG_TARGET, "render rejected: host busy");
                return Err(RenderError::Busy);
            }
        };
        self.render_locked(&mut store, root, cancel)
    }

    /// Number of passes that completed with output.
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }

    /// Settled tree of `id` from the last successful pass.
    pub fn current_tree(&self, id: ComponentId) -> Option<RenderTree> {
        self.lock_store().frames(id).cloned()
    }

    pub fn component_count(&self) -> usize {
        self.lock_store().len()
    }

    // The store is only written between a successful pass and the guard's
    // release, so a poisoned lock still holds a consistent store.
    fn lock_store(&self) -> MutexGuard<'_, FrameStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render_locked(
        &self,
        store: &mut FrameStore,
        root: &mut dyn Component,
        cancel: &CancelToken,
    ) -> Result<String, RenderError> {
        if cancel.is_cancelled() {
            log::warn!(target: LOG_TARGET, "render cancelled before start");
            return Err(RenderError::Cancelled);
        }
        log::debug!(target: LOG_TARGET, "render pass started");

        store.clear();
        let mut pass = RenderPass::new(mem::take(store), cancel.clone());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let id = pass.allocate_id();
            pass.render_component(id, root)
        }));
        let outcome = match outcome {
            Ok(result) => result,
            Err(payload) => Err(LifecycleError::Panicked {
                component: pass.active.last().copied().unwrap_or(ROOT_COMPONENT),
                message: panic_message(payload.as_ref()),
            }),
        };
        *store = pass.store;

        if let Err(err) = outcome {
            store.clear();
            log::warn!(target: LOG_TARGET, "render pass failed: {err}");
            return Err(err.into());
        }
        if cancel.is_cancelled() {
            store.clear();
            log::warn!(target: LOG_TARGET, "render cancelled before serialization");
            return Err(RenderError::Cancelled);
        }

        let html = HtmlSerializer::with_config(&*store, self.config.serializer.clone())
            .serialize(ROOT_COMPONENT)?;
        let count = self.renders.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!(
            target: LOG_TARGET,
            "render pass {count} finished: {} component(s), {} bytes",
            store.len(),
            html.len()
        );
        Ok(html)
    }
}

/// State of one render pass: the store being filled, identity allocation,
/// and the stack of components currently inside `render`.
pub(crate) struct RenderPass {
    store: FrameStore,
    cancel: CancelToken,
    next_id: u32,
    active: Vec<ComponentId>,
}

impl RenderPass {
    fn new(store: FrameStore, cancel: CancelToken) -> Self {
        Self {
            store,
            cancel,
            next_id: ROOT_COMPONENT.0,
            active: Vec::new(),
        }
    }

    pub(crate) fn allocate_id(&mut self) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn render_component(
        &mut self,
        id: ComponentId,
        component: &mut dyn Component,
    ) -> Result<(), LifecycleError> {
        if self.cancel.is_cancelled() {
            return Err(LifecycleError::Cancelled);
        }
        self.active.push(id);

        let mut cx = RenderContext::new(id, self);
        component.render(&mut cx)?;
        let tree = cx.into_frames().build().map_err(|source| {
            LifecycleError::InvalidTree {
                component: id,
                source,
            }
        })?;

        self.active.pop();
        self.store.replace(id, tree);
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Layout, RenderContext};

    struct Item(usize);

    impl Component for Item {
        fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), LifecycleError> {
            cx.frames()
                .open_element("li")
                .add_text(&self.0.to_string())
                .close_element();
            Ok(())
        }
    }

    struct List {
        items: usize,
    }

    impl Component for List {
        fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), LifecycleError> {
            cx.frames().open_element("ul");
            for index in 0..self.items {
                cx.mount(&mut Item(index))?;
            }
            cx.frames().close_element();
            Ok(())
        }
    }

    fn render(host: &ComponentHost, root: &mut dyn Component) -> Result<String, RenderError> {
        host.render(root, &CancelToken::new())
    }

    #[test]
    fn renders_nested_components() {
        let host = ComponentHost::new();
        let html = render(&host, &mut List { items: 2 }).unwrap();
        assert_eq!(html, "<ul><li>0</li><li>1</li></ul>");
        assert_eq!(host.render_count(), 1);
        assert_eq!(host.component_count(), 3);
    }

    #[test]
    fn rerender_replaces_every_tree() {
        let host = ComponentHost::new();
        let mut list = List { items: 2 };
        render(&host, &mut list).unwrap();
        assert_eq!(host.component_count(), 3);

        list.items = 1;
        let html = render(&host, &mut list).unwrap();
        assert_eq!(html, "<ul><li>0</li></ul>");
        assert_eq!(host.component_count(), 2);
        assert!(host.current_tree(ComponentId(3)).is_none());
        assert_eq!(host.render_count(), 2);
    }

    #[test]
    fn lifecycle_failure_names_the_failing_child() {
        let host = ComponentHost::new();
        let mut child = |cx: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            Err(cx.fail("database offline"))
        };
        let mut root = |cx: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            cx.frames().open_element("main");
            cx.mount(&mut child)?;
            cx.frames().close_element();
            Ok(())
        };

        let err = render(&host, &mut root).unwrap_err();
        match err {
            RenderError::Lifecycle(LifecycleError::Failed { component, source }) => {
                assert_eq!(component, ComponentId(2));
                assert_eq!(source.to_string(), "database offline");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(host.render_count(), 0);
        assert_eq!(host.component_count(), 0);
    }

    #[test]
    fn panic_is_captured_as_lifecycle_error() {
        let host = ComponentHost::new();
        let mut child = |_: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            panic!("exploded");
        };
        let mut root = |cx: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            cx.mount(&mut child)?;
            Ok(())
        };

        match render(&host, &mut root).unwrap_err() {
            RenderError::Lifecycle(LifecycleError::Panicked { component, message }) => {
                assert_eq!(component, ComponentId(2));
                assert_eq!(message, "exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The host stays usable after a captured panic.
        assert_eq!(
            render(&host, &mut List { items: 0 }).unwrap(),
            "<ul></ul>"
        );
    }

    #[test]
    fn unbalanced_output_is_an_invalid_tree() {
        let host = ComponentHost::new();
        let mut root = |cx: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            cx.frames().open_element("div");
            Ok(())
        };
        match render(&host, &mut root).unwrap_err() {
            RenderError::Lifecycle(LifecycleError::InvalidTree { component, .. }) => {
                assert_eq!(component, ROOT_COMPONENT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cancelled_token_skips_the_pass() {
        let host = ComponentHost::new();
        let token = CancelToken::new();
        token.cancel();
        let mut rendered = false;
        let mut root = |_: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            rendered = true;
            Ok(())
        };
        assert!(matches!(
            host.render(&mut root, &token),
            Err(RenderError::Cancelled)
        ));
        assert!(!rendered);
    }

    #[test]
    fn cancellation_is_checked_on_mount() {
        let host = ComponentHost::new();
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut root = |cx: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            trigger.cancel();
            cx.mount(&mut Item(0))?;
            Ok(())
        };
        assert!(matches!(
            host.render(&mut root, &token),
            Err(RenderError::Cancelled)
        ));
        assert_eq!(host.component_count(), 0);
    }

    #[test]
    fn cancellation_after_the_pass_withholds_output() {
        let host = ComponentHost::new();
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut root = |cx: &mut RenderContext<'_>| -> Result<(), LifecycleError> {
            cx.frames().add_text("never shown");
            trigger.cancel();
            Ok(())
        };
        assert!(matches!(
            host.render(&mut root, &token),
            Err(RenderError::Cancelled)
        ));
        assert_eq!(host.render_count(), 0);
    }

    #[test]
    fn layout_wraps_the_body() {
        let template = |cx: &mut RenderContext<'_>,
                        body: &mut dyn Component|
         -> Result<(), LifecycleError> {
            cx.frames()
                .add_markup("<!DOCTYPE html>")
                .open_element("html")
                .open_element("head")
                .open_element("title")
                .add_text("Layout")
                .close_element()
                .close_element()
                .open_element("body");
            cx.mount(body)?;
            cx.frames().close_element().close_element();
            Ok(())
        };
        struct Greeting {
            name: &'static str,
        }
        impl Component for Greeting {
            fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), LifecycleError> {
                cx.frames()
                    .open_element("p")
                    .add_text(&format!("Name = {}!", self.name))
                    .close_element();
                Ok(())
            }
        }

        let host = ComponentHost::new();
        let mut page = Layout::new(template, Greeting { name: "Test" });
        let html = render(&host, &mut page).unwrap();
        assert_eq!(
            html,
            "<!DOCTYPE html><html><head><title>Layout</title></head>\
             <body><p>Name = Test!</p></body></html>"
        );

        page.body_mut().name = "Again";
        let html = render(&host, &mut page).unwrap();
        assert!(html.contains("<body><p>Name = Again!</p></body>"), "{html}");
    }

    #[test]
    fn serializer_config_is_applied() {
        let host = ComponentHost::with_config(HostConfig {
            serializer: SerializerConfig {
                max_nesting_depth: 2,
                ..SerializerConfig::default()
            },
        });
        assert_eq!(host.config().serializer.max_nesting_depth, 2);
        struct Chain(u32);
        impl Component for Chain {
            fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), LifecycleError> {
                if self.0 > 0 {
                    cx.mount(&mut Chain(self.0 - 1))?;
                }
                Ok(())
            }
        }
        assert!(render(&host, &mut Chain(1)).is_ok());
        assert!(matches!(
            render(&host, &mut Chain(2)),
            Err(RenderError::Serialize(frame_html::SerializeError::DepthLimitExceeded {
                max_depth: 2,
                ..
            }))
        ));
    }
}
