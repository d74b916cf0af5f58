/// Component tests - lifecycle hooks, prop updates and queued update requests
use crate::*;
use sprig_dom::{handler, Document, NodeId};

#[cfg(test)]
mod component_tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn setup() -> (Renderer, NodeId) {
        let renderer = Renderer::with_config(
            Document::new(),
            RendererConfig::default().with_debug_checks(true),
        );
        let root = renderer.document().body();
        (renderer, root)
    }

    fn html(renderer: &Renderer, root: NodeId) -> String {
        renderer.document().inner_html(root)
    }

    // ========================================================================
    // Fixtures
    // ========================================================================

    /// Records its hooks; optionally renders a nested probe
    struct Probe {
        name: &'static str,
        log: Log,
        inner: Option<&'static str>,
    }

    impl Probe {
        fn element(name: &'static str, log: &Log, inner: Option<&'static str>) -> VirtualElement {
            VirtualElement::component(
                Probe {
                    name,
                    log: log.clone(),
                    inner,
                },
                props!(),
            )
        }
    }

    impl Component for Probe {
        fn render(&mut self, _props: &Props, _updater: &UpdateHandle) -> VirtualElement {
            self.log.borrow_mut().push(format!("render {}", self.name));
            let section = VirtualElement::tag("section").with_child(self.name.into());
            match self.inner {
                Some(inner) => section.with_child(Probe::element(inner, &self.log, None)),
                None => section,
            }
        }

        fn mounted(&mut self, _updater: &UpdateHandle) {
            self.log.borrow_mut().push(format!("mounted {}", self.name));
        }

        fn unmounted(&mut self) {
            self.log.borrow_mut().push(format!("unmounted {}", self.name));
        }
    }

    /// Button showing `label:clicks`; a click requests a re-render
    struct Counter {
        clicks: Rc<Cell<i32>>,
        renders: Rc<Cell<usize>>,
    }

    impl Component for Counter {
        fn render(&mut self, props: &Props, updater: &UpdateHandle) -> VirtualElement {
            self.renders.set(self.renders.get() + 1);
            let label = props.get("label").map(PropValue::to_text).unwrap_or_default();
            let clicks = self.clicks.clone();
            let updater = updater.clone();
            VirtualElement::tag("button")
                .with_handler(
                    "onClick",
                    handler(move |_, _| {
                        clicks.set(clicks.get() + 1);
                        updater.request_update();
                        Ok(())
                    }),
                )
                .with_child(format!("{}:{}", label, self.clicks.get()).into())
        }
    }

    #[derive(Default, Clone)]
    struct CounterState {
        clicks: Rc<Cell<i32>>,
        renders: Rc<Cell<usize>>,
    }

    impl CounterState {
        fn element(&self, label: &str) -> VirtualElement {
            VirtualElement::component(
                Counter {
                    clicks: self.clicks.clone(),
                    renders: self.renders.clone(),
                },
                props!("label" => label),
            )
        }
    }

    /// Never re-renders for new props; keeps its handle for forced updates
    struct Frozen {
        handle: Rc<RefCell<Option<UpdateHandle>>>,
    }

    impl Component for Frozen {
        fn render(&mut self, props: &Props, _updater: &UpdateHandle) -> VirtualElement {
            props.get("label").map(PropValue::to_text).unwrap_or_default().into()
        }

        fn mounted(&mut self, updater: &UpdateHandle) {
            *self.handle.borrow_mut() = Some(updater.clone());
        }

        fn should_update(&self, _previous: &Props, _next: &Props) -> bool {
            false
        }
    }

    /// Renders an empty fragment until shown, by prop or by its shared flag
    struct Reveal {
        shown: Rc<Cell<bool>>,
        handle: Rc<RefCell<Option<UpdateHandle>>>,
    }

    impl Component for Reveal {
        fn render(&mut self, props: &Props, _updater: &UpdateHandle) -> VirtualElement {
            let on = self.shown.get() || props.get("on") == Some(&PropValue::from(true));
            if on {
                VirtualElement::fragment(vec![VirtualElement::tag("span")])
            } else {
                VirtualElement::fragment(vec![])
            }
        }

        fn mounted(&mut self, updater: &UpdateHandle) {
            *self.handle.borrow_mut() = Some(updater.clone());
        }
    }

    #[derive(Default, Clone)]
    struct RevealState {
        shown: Rc<Cell<bool>>,
        handle: Rc<RefCell<Option<UpdateHandle>>>,
    }

    impl RevealState {
        fn element(&self, on: bool) -> VirtualElement {
            VirtualElement::component(
                Reveal {
                    shown: self.shown.clone(),
                    handle: self.handle.clone(),
                },
                props!("on" => on),
            )
        }

        fn show(&self) {
            self.shown.set(true);
            if let Some(handle) = self.handle.borrow().as_ref() {
                handle.request_update();
            }
        }
    }

    fn frozen(label: &str, handle: &Rc<RefCell<Option<UpdateHandle>>>) -> VirtualElement {
        VirtualElement::component(
            Frozen {
                handle: handle.clone(),
            },
            props!("label" => label),
        )
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[test]
    fn test_component_output_is_mounted() {
        let (mut renderer, root) = setup();
        let state = CounterState::default();

        let stats = renderer
            .render(Some(VirtualElement::tag("div").with_child(state.element("n"))), root)
            .unwrap();

        assert_eq!(html(&renderer, root), "<div><button>n:0</button></div>");
        assert_eq!(stats.components_rendered, 1);
        assert_eq!(renderer.mounted_components(), 1);
    }

    #[test]
    fn test_mounted_hooks_run_children_first_after_the_pass() {
        let (mut renderer, root) = setup();
        let log = Log::default();

        renderer
            .render(Some(Probe::element("outer", &log, Some("inner"))), root)
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["render outer", "render inner", "mounted inner", "mounted outer"]
        );
        assert_eq!(
            html(&renderer, root),
            "<section>outer<section>inner</section></section>"
        );
    }

    #[test]
    fn test_unmount_runs_hooks_and_unregisters() {
        let (mut renderer, root) = setup();
        let log = Log::default();
        renderer
            .render(Some(Probe::element("outer", &log, Some("inner"))), root)
            .unwrap();
        log.borrow_mut().clear();

        let stats = renderer.render(None, root).unwrap();

        assert_eq!(*log.borrow(), vec!["unmounted outer", "unmounted inner"]);
        assert_eq!(html(&renderer, root), "");
        assert_eq!(renderer.mounted_components(), 0);
        assert!(stats.unmounted >= 1);
    }

    #[test]
    fn test_component_type_change_remounts() {
        let (mut renderer, root) = setup();
        let log = Log::default();
        let state = CounterState::default();
        renderer.render(Some(Probe::element("a", &log, None)), root).unwrap();

        renderer.render(Some(state.element("n")), root).unwrap();

        assert!(log.borrow().contains(&"unmounted a".to_string()));
        assert_eq!(html(&renderer, root), "<button>n:0</button>");
        assert_eq!(renderer.mounted_components(), 1);
    }

    #[test]
    fn test_key_change_remounts_component() {
        let (mut renderer, root) = setup();
        let log = Log::default();
        renderer
            .render(Some(Probe::element("a", &log, None).with_key("1")), root)
            .unwrap();
        log.borrow_mut().clear();

        renderer
            .render(Some(Probe::element("a", &log, None).with_key("2")), root)
            .unwrap();

        assert_eq!(*log.borrow(), vec!["render a", "unmounted a", "mounted a"]);
    }

    #[test]
    fn test_replacement_renders_before_old_component_unmounts() {
        struct Echo {
            log: Log,
        }

        impl Component for Echo {
            fn render(&mut self, _props: &Props, _updater: &UpdateHandle) -> VirtualElement {
                self.log.borrow_mut().push("render echo".into());
                VirtualElement::tag("p")
            }
        }

        let (mut renderer, root) = setup();
        let log = Log::default();
        let view = |child: VirtualElement| VirtualElement::tag("div").with_child(child).with_child("end".into());
        renderer.render(Some(view(Probe::element("a", &log, None))), root).unwrap();
        log.borrow_mut().clear();

        renderer
            .render(Some(view(VirtualElement::component(Echo { log: log.clone() }, props!()))), root)
            .unwrap();

        assert_eq!(*log.borrow(), vec!["render echo", "unmounted a"]);
        assert_eq!(html(&renderer, root), "<div><p></p>end</div>");
        assert_eq!(renderer.mounted_components(), 1);
    }

    // ========================================================================
    // Prop updates
    // ========================================================================

    #[test]
    fn test_equal_props_skip_render() {
        let (mut renderer, root) = setup();
        let state = CounterState::default();
        renderer.render(Some(state.element("n")), root).unwrap();

        let stats = renderer.render(Some(state.element("n")), root).unwrap();

        assert_eq!(state.renders.get(), 1);
        assert_eq!(stats.components_rendered, 0);
        assert_eq!(renderer.mounted_components(), 1);
    }

    #[test]
    fn test_changed_props_rerender_retained_instance() {
        let (mut renderer, root) = setup();
        let state = CounterState::default();
        renderer.render(Some(state.element("a")), root).unwrap();
        let button = renderer.document().children(root)[0];

        let stats = renderer.render(Some(state.element("b")), root).unwrap();

        assert_eq!(stats.components_rendered, 1);
        assert_eq!(state.renders.get(), 2);
        assert_eq!(html(&renderer, root), "<button>b:0</button>");
        assert_eq!(renderer.document().children(root), &[button]);
    }

    #[test]
    fn test_declined_update_keeps_new_props_for_forced_render() {
        let (mut renderer, root) = setup();
        let handle = Rc::new(RefCell::new(None));
        renderer.render(Some(frozen("a", &handle)), root).unwrap();

        renderer.render(Some(frozen("b", &handle)), root).unwrap();
        assert_eq!(html(&renderer, root), "a");

        handle.borrow().as_ref().unwrap().request_update();
        renderer.flush_updates().unwrap();
        assert_eq!(html(&renderer, root), "b");
    }

    // ========================================================================
    // Update requests
    // ========================================================================

    #[test]
    fn test_update_request_waits_for_flush() {
        let (mut renderer, root) = setup();
        let state = CounterState::default();
        renderer
            .render(Some(VirtualElement::tag("div").with_child(state.element("n"))), root)
            .unwrap();
        let div = renderer.document().children(root)[0];
        let button = renderer.document().children(div)[0];

        renderer.document_mut().dispatch(button, "click").unwrap();
        assert_eq!(renderer.pending_updates(), 1);
        assert_eq!(html(&renderer, root), "<div><button>n:0</button></div>");

        let stats = renderer.flush_updates().unwrap();

        assert_eq!(stats.components_rendered, 1);
        assert_eq!(renderer.pending_updates(), 0);
        assert_eq!(html(&renderer, root), "<div><button>n:1</button></div>");
        assert_eq!(renderer.document().children(div), &[button]);
    }

    #[test]
    fn test_repeated_requests_coalesce() {
        let (mut renderer, root) = setup();
        let state = CounterState::default();
        renderer.render(Some(state.element("n")), root).unwrap();
        let button = renderer.document().children(root)[0];

        renderer.document_mut().dispatch(button, "click").unwrap();
        renderer.document_mut().dispatch(button, "click").unwrap();
        assert_eq!(renderer.pending_updates(), 1);

        renderer.flush_updates().unwrap();

        assert_eq!(state.renders.get(), 2);
        assert_eq!(html(&renderer, root), "<button>n:2</button>");
    }

    #[test]
    fn test_request_from_mounted_hook() {
        struct Loader {
            loaded: bool,
        }

        impl Component for Loader {
            fn render(&mut self, _props: &Props, _updater: &UpdateHandle) -> VirtualElement {
                VirtualElement::text(if self.loaded { "ready" } else { "loading" })
            }

            fn mounted(&mut self, updater: &UpdateHandle) {
                self.loaded = true;
                updater.request_update();
            }
        }

        let (mut renderer, root) = setup();
        renderer
            .render(Some(VirtualElement::component(Loader { loaded: false }, props!())), root)
            .unwrap();
        assert_eq!(html(&renderer, root), "loading");
        assert_eq!(renderer.pending_updates(), 1);

        renderer.flush_updates().unwrap();
        assert_eq!(html(&renderer, root), "ready");
    }

    #[test]
    fn test_request_after_unmount_is_dropped() {
        let (mut renderer, root) = setup();
        let handle = Rc::new(RefCell::new(None));
        renderer.render(Some(frozen("a", &handle)), root).unwrap();
        renderer.render(None, root).unwrap();

        handle.borrow().as_ref().unwrap().request_update();
        let stats = renderer.flush_updates().unwrap();

        assert_eq!(stats.components_rendered, 0);
        assert_eq!(renderer.pending_updates(), 0);
        assert_eq!(html(&renderer, root), "");
    }

    #[test]
    fn test_nested_update_rerenders_only_the_requester() {
        struct Shell {
            inner: CounterState,
            renders: Rc<Cell<usize>>,
        }

        impl Component for Shell {
            fn render(&mut self, _props: &Props, _updater: &UpdateHandle) -> VirtualElement {
                self.renders.set(self.renders.get() + 1);
                VirtualElement::tag("div")
                    .with_child(VirtualElement::tag("h1").with_child("title".into()))
                    .with_child(self.inner.element("n"))
            }
        }

        let (mut renderer, root) = setup();
        let inner = CounterState::default();
        let shell_renders = Rc::new(Cell::new(0));
        let shell = VirtualElement::component(
            Shell {
                inner: inner.clone(),
                renders: shell_renders.clone(),
            },
            props!(),
        );
        renderer.render(Some(shell), root).unwrap();
        let div = renderer.document().children(root)[0];
        let button = renderer.document().children(div)[1];

        renderer.dispatch_event(button, "click").unwrap();

        assert_eq!(shell_renders.get(), 1);
        assert_eq!(inner.renders.get(), 2);
        assert_eq!(
            html(&renderer, root),
            "<div><h1>title</h1><button>n:1</button></div>"
        );
    }

    #[test]
    fn test_flushed_update_fills_empty_slot_in_place() {
        let (mut renderer, root) = setup();
        let state = RevealState::default();
        renderer
            .render(
                Some(VirtualElement::tag("div").with_child(state.element(false)).with_child(VirtualElement::tag("p"))),
                root,
            )
            .unwrap();
        assert_eq!(html(&renderer, root), "<div><p></p></div>");

        state.show();
        let stats = renderer.flush_updates().unwrap();

        assert_eq!(stats.components_rendered, 1);
        assert_eq!(html(&renderer, root), "<div><span></span><p></p></div>");
    }

    #[test]
    fn test_flushed_update_fills_slot_nested_in_fragment() {
        let (mut renderer, root) = setup();
        let state = RevealState::default();
        let tree = VirtualElement::tag("div")
            .with_child(VirtualElement::fragment(vec![state.element(false)]))
            .with_child(VirtualElement::tag("p"))
            .with_child(VirtualElement::tag("i"));
        renderer.render(Some(tree), root).unwrap();

        state.show();
        renderer.flush_updates().unwrap();

        assert_eq!(html(&renderer, root), "<div><span></span><p></p><i></i></div>");
    }

    // ========================================================================
    // Components in fast lists
    // ========================================================================

    /// List row showing `id:clicks`
    #[derive(Default)]
    struct Row {
        clicks: Rc<Cell<i32>>,
    }

    impl Component for Row {
        fn render(&mut self, props: &Props, updater: &UpdateHandle) -> VirtualElement {
            let id = props.get("id").map(PropValue::to_text).unwrap_or_default();
            let clicks = self.clicks.clone();
            let updater = updater.clone();
            VirtualElement::tag("li")
                .with_handler(
                    "onClick",
                    handler(move |_, _| {
                        clicks.set(clicks.get() + 1);
                        updater.request_update();
                        Ok(())
                    }),
                )
                .with_child(format!("{}:{}", id, self.clicks.get()).into())
        }
    }

    fn rows(ids: &[&str]) -> VirtualElement {
        VirtualElement::tag("ul").with_fast_list().with_children(ids.iter().map(|id| {
            VirtualElement::component(Row::default(), props!("id" => *id)).with_key(*id)
        }))
    }

    fn row_node(renderer: &Renderer, ul: NodeId, text: &str) -> NodeId {
        let doc = renderer.document();
        doc.children(ul)
            .iter()
            .copied()
            .find(|&li| doc.text_content(li) == text)
            .unwrap()
    }

    #[test]
    fn test_unchanged_rows_still_move() {
        let (mut renderer, root) = setup();
        renderer.render(Some(rows(&["a", "b", "c"])), root).unwrap();
        let ul = renderer.document().children(root)[0];
        let c = row_node(&renderer, ul, "c:0");

        let stats = renderer.render(Some(rows(&["c", "a", "b"])), root).unwrap();

        assert_eq!(stats.components_rendered, 0);
        assert_eq!(stats.moved, 1);
        assert_eq!(renderer.document().text_content(ul), "c:0a:0b:0");
        assert_eq!(renderer.document().children(ul)[0], c);
    }

    #[test]
    fn test_update_after_reorder_targets_current_slot() {
        let (mut renderer, root) = setup();
        renderer.render(Some(rows(&["a", "b", "c"])), root).unwrap();
        let ul = renderer.document().children(root)[0];
        renderer.render(Some(rows(&["c", "a", "b"])), root).unwrap();
        let a = row_node(&renderer, ul, "a:0");

        renderer.dispatch_event(a, "click").unwrap();

        assert_eq!(
            html(&renderer, root),
            "<ul><li>c:0</li><li>a:1</li><li>b:0</li></ul>"
        );
        assert_eq!(renderer.document().children(ul)[1], a);
    }

    #[test]
    fn test_removed_row_update_is_dropped() {
        let (mut renderer, root) = setup();
        renderer.render(Some(rows(&["a", "b"])), root).unwrap();
        let ul = renderer.document().children(root)[0];
        let b = row_node(&renderer, ul, "b:0");

        // queue the request, then remove the row before flushing
        renderer.document_mut().dispatch(b, "click").unwrap();
        renderer.render(Some(rows(&["a"])), root).unwrap();
        let stats = renderer.flush_updates().unwrap();

        assert_eq!(stats.components_rendered, 0);
        assert_eq!(html(&renderer, root), "<ul><li>a:0</li></ul>");
        assert_eq!(renderer.mounted_components(), 1);
    }

    #[test]
    fn test_empty_row_fills_in_place() {
        let (mut renderer, root) = setup();
        let state = RevealState::default();
        let list = |on: bool| {
            VirtualElement::tag("ul")
                .with_fast_list()
                .with_child(VirtualElement::tag("li").with_key("a").with_child("a".into()))
                .with_child(state.element(on).with_key("b"))
                .with_child(VirtualElement::tag("li").with_key("c").with_child("c".into()))
        };
        renderer.render(Some(list(false)), root).unwrap();
        assert_eq!(html(&renderer, root), "<ul><li>a</li><li>c</li></ul>");

        renderer.render(Some(list(true)), root).unwrap();

        assert_eq!(
            html(&renderer, root),
            "<ul><li>a</li><span></span><li>c</li></ul>"
        );
    }

    #[test]
    fn test_empty_leading_row_fills_in_place() {
        let (mut renderer, root) = setup();
        let state = RevealState::default();
        let list = |on: bool| {
            VirtualElement::tag("ul")
                .with_fast_list()
                .with_child(state.element(on).with_key("a"))
                .with_child(VirtualElement::tag("li").with_key("b").with_child("b".into()))
        };
        renderer.render(Some(list(false)), root).unwrap();

        renderer.render(Some(list(true)), root).unwrap();

        assert_eq!(html(&renderer, root), "<ul><span></span><li>b</li></ul>");
    }
}
