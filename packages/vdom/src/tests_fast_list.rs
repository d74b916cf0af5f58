/// Fast list tests - keyed children reconciliation, moves and batching
use crate::*;
use sprig_dom::{Document, MutationRecord, NodeId};

#[cfg(test)]
mod fast_list_tests {
    use super::*;

    fn setup() -> (Renderer, NodeId) {
        let renderer = Renderer::with_config(
            Document::new(),
            RendererConfig::default().with_debug_checks(true),
        );
        let root = renderer.document().body();
        (renderer, root)
    }

    fn keyed_list(keys: &[&str]) -> VirtualElement {
        VirtualElement::tag("ul").with_fast_list().with_children(
            keys.iter()
                .map(|k| VirtualElement::tag("li").with_key(*k).with_child((*k).into())),
        )
    }

    fn list_node(renderer: &Renderer, root: NodeId) -> NodeId {
        renderer.tree(root).and_then(VirtualElement::target).unwrap()
    }

    /// `li` node currently showing `label`
    fn item(renderer: &Renderer, ul: NodeId, label: &str) -> NodeId {
        let doc = renderer.document();
        doc.children(ul)
            .iter()
            .copied()
            .find(|&li| doc.text_content(li) == label)
            .unwrap()
    }

    fn render_observed(renderer: &mut Renderer, tree: VirtualElement, root: NodeId) -> Vec<MutationRecord> {
        renderer.document_mut().observe();
        renderer.render(Some(tree), root).unwrap();
        renderer.document_mut().disconnect()
    }

    #[test]
    fn test_rotation_moves_one_node() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["a", "b", "c"])), root).unwrap();
        let ul = list_node(&renderer, root);
        let nodes: Vec<_> = ["a", "b", "c"].iter().map(|l| item(&renderer, ul, l)).collect();

        let records = render_observed(&mut renderer, keyed_list(&["c", "a", "b"]), root);

        assert_eq!(records.iter().filter(|r| r.is_move()).count(), 1);
        assert!(!records.iter().any(|r| r.is_insertion() || r.is_removal()));
        assert_eq!(renderer.document().text_content(ul), "cab");
        assert_eq!(renderer.document().children(ul), &[nodes[2], nodes[0], nodes[1]]);
    }

    #[test]
    fn test_removal_keeps_identity_without_moves() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["a", "b", "c", "d"])), root).unwrap();
        let ul = list_node(&renderer, root);
        let kept: Vec<_> = ["a", "c", "d"].iter().map(|l| item(&renderer, ul, l)).collect();
        let removed = item(&renderer, ul, "b");

        let records = render_observed(&mut renderer, keyed_list(&["a", "c", "d"]), root);

        assert_eq!(renderer.document().children(ul), kept.as_slice());
        assert!(!renderer.document().contains(removed));
        assert_eq!(records.iter().filter(|r| r.is_removal()).count(), 1);
        assert!(!records.iter().any(MutationRecord::is_move));
    }

    #[test]
    fn test_prepended_run_is_inserted_once() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["c"])), root).unwrap();
        let ul = list_node(&renderer, root);
        let c = item(&renderer, ul, "c");

        let records = render_observed(&mut renderer, keyed_list(&["a", "b", "c"]), root);

        let into_ul = records
            .iter()
            .filter(|r| matches!(r, MutationRecord::Inserted { parent, .. } if *parent == ul))
            .count();
        assert_eq!(into_ul, 2);
        assert!(!records.iter().any(MutationRecord::is_move));
        assert_eq!(renderer.document().text_content(ul), "abc");
        assert_eq!(renderer.document().children(ul)[2], c);
    }

    #[test]
    fn test_single_insert_in_the_middle() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["a", "c"])), root).unwrap();
        let ul = list_node(&renderer, root);

        let records = render_observed(&mut renderer, keyed_list(&["a", "b", "c"]), root);

        assert_eq!(renderer.document().text_content(ul), "abc");
        assert!(!records.iter().any(MutationRecord::is_move));
    }

    #[test]
    fn test_reverse_order() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["a", "b", "c", "d"])), root).unwrap();
        let ul = list_node(&renderer, root);
        let a = item(&renderer, ul, "a");

        let records = render_observed(&mut renderer, keyed_list(&["d", "c", "b", "a"]), root);

        assert_eq!(renderer.document().text_content(ul), "dcba");
        assert_eq!(renderer.document().children(ul)[3], a);
        assert_eq!(records.iter().filter(|r| r.is_move()).count(), 3);
    }

    #[test]
    fn test_mixed_insert_remove_and_move() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["a", "b", "c", "d", "e"])), root).unwrap();
        let ul = list_node(&renderer, root);
        let e = item(&renderer, ul, "e");

        renderer.render(Some(keyed_list(&["x", "e", "a", "y", "c"])), root).unwrap();

        assert_eq!(renderer.document().text_content(ul), "xeayc");
        assert_eq!(item(&renderer, ul, "e"), e);
    }

    fn ordered_list(entries: &[(&str, i64)]) -> VirtualElement {
        VirtualElement::tag("ul")
            .with_fast_list()
            .with_children(entries.iter().map(|(k, order)| {
                VirtualElement::tag("li")
                    .with_key(*k)
                    .with_order_key(*order)
                    .with_child((*k).into())
            }))
    }

    #[test]
    fn test_equal_order_key_suppresses_move() {
        let (mut renderer, root) = setup();
        renderer.render(Some(ordered_list(&[("a", 1), ("b", 2)])), root).unwrap();
        let ul = list_node(&renderer, root);

        let records = render_observed(&mut renderer, ordered_list(&[("b", 2), ("a", 1)]), root);

        assert!(!records.iter().any(MutationRecord::is_move));
        assert_eq!(renderer.document().text_content(ul), "ab");
    }

    #[test]
    fn test_changed_order_key_allows_move() {
        let (mut renderer, root) = setup();
        renderer.render(Some(ordered_list(&[("a", 1), ("b", 2)])), root).unwrap();
        let ul = list_node(&renderer, root);

        let records = render_observed(&mut renderer, ordered_list(&[("b", 3), ("a", 1)]), root);

        assert_eq!(records.iter().filter(|r| r.is_move()).count(), 1);
        assert_eq!(renderer.document().text_content(ul), "ba");
    }

    #[test]
    fn test_remount_moved_to_end_as_component() {
        struct Badge;

        impl Component for Badge {
            fn render(&mut self, props: &Props, _updater: &UpdateHandle) -> VirtualElement {
                let label = props.get("label").map(PropValue::to_text).unwrap_or_default();
                VirtualElement::tag("span").with_child(label.into())
            }
        }

        let (mut renderer, root) = setup();
        renderer.render(Some(ordered_list(&[("a", 1), ("b", 2)])), root).unwrap();
        let ul = list_node(&renderer, root);
        let b = item(&renderer, ul, "b");

        // "b" keeps its order key and stays; "a" lost its order key and goes last
        let tree = VirtualElement::tag("ul")
            .with_fast_list()
            .with_child(VirtualElement::tag("li").with_key("b").with_order_key(2).with_child("b".into()))
            .with_child(VirtualElement::component(Badge, props!("label" => "a")).with_key("a"));
        renderer.render(Some(tree), root).unwrap();

        assert_eq!(renderer.document().inner_html(ul), "<li>b</li><span>a</span>");
        assert_eq!(renderer.document().children(ul)[0], b);
    }

    #[test]
    fn test_unkeyed_children_match_by_index() {
        let (mut renderer, root) = setup();
        let list = |labels: &[&str]| {
            VirtualElement::tag("div")
                .with_fast_list()
                .with_children(labels.iter().map(|l| VirtualElement::tag("span").with_child((*l).into())))
        };

        renderer.render(Some(list(&["x", "y"])), root).unwrap();
        let div = list_node(&renderer, root);
        let spans = renderer.document().children(div).to_vec();

        renderer.render(Some(list(&["x2", "y", "z"])), root).unwrap();

        assert_eq!(renderer.document().text_content(div), "x2yz");
        assert_eq!(&renderer.document().children(div)[..2], spans.as_slice());
    }

    #[test]
    fn test_keyed_tag_change_remounts_in_place() {
        let (mut renderer, root) = setup();
        let list = |second: &str| {
            VirtualElement::tag("ul")
                .with_fast_list()
                .with_child(VirtualElement::tag("li").with_key("a").with_child("a".into()))
                .with_child(VirtualElement::tag(second).with_key("b").with_child("b".into()))
                .with_child(VirtualElement::tag("li").with_key("c").with_child("c".into()))
        };

        renderer.render(Some(list("li")), root).unwrap();
        renderer.render(Some(list("p")), root).unwrap();

        assert_eq!(
            renderer.document().inner_html(root),
            "<ul><li>a</li><p>b</p><li>c</li></ul>"
        );
    }

    #[test]
    fn test_fragment_child_is_rejected() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["a"])), root).unwrap();

        let tree = VirtualElement::tag("ul")
            .with_fast_list()
            .with_child(VirtualElement::fragment(vec!["x".into()]));

        assert_eq!(
            renderer.render(Some(tree), root),
            Err(RenderError::Structural(StructuralViolation::FragmentInFastList))
        );
    }

    #[test]
    fn test_emptying_and_refilling() {
        let (mut renderer, root) = setup();
        renderer.render(Some(keyed_list(&["a", "b"])), root).unwrap();
        let ul = list_node(&renderer, root);

        renderer.render(Some(keyed_list(&[])), root).unwrap();
        assert!(renderer.document().children(ul).is_empty());

        renderer.render(Some(keyed_list(&["b", "c"])), root).unwrap();
        assert_eq!(renderer.document().text_content(ul), "bc");
    }
}
