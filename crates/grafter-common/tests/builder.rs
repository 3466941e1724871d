use expect_test::expect;
use grafter_common::{CommonToken, CommonTreeBuilder, NodeId};
use grafter_tree::{NodeStore as _, RootSource, TreeError};

const ID: i32 = 4;
const BLOCK: i32 = 10;
const DECL: i32 = 11;

fn leaf(builder: &mut CommonTreeBuilder, text: &str) -> NodeId {
    builder.create(CommonToken::new(ID, text)).unwrap()
}

fn node(builder: &mut CommonTreeBuilder, text: &str, kids: &[&str]) -> NodeId {
    let root = leaf(builder, text);
    for kid in kids {
        let kid = leaf(builder, kid);
        builder.store_mut().add_child(root, kid).unwrap();
    }
    root
}

fn nil(builder: &mut CommonTreeBuilder, kids: &[&str]) -> NodeId {
    let list = builder.nil().unwrap();
    for kid in kids {
        let kid = leaf(builder, kid);
        builder.store_mut().add_child(list, kid).unwrap();
    }
    list
}

fn tree(builder: &CommonTreeBuilder, node: NodeId) -> String {
    builder.store().to_string_tree(node)
}

fn token(text: &str) -> RootSource<NodeId, CommonToken> {
    RootSource::Token(CommonToken::new(ID, text))
}

#[test]
fn nil_old_root_absorbs_pending_kids() {
    let mut builder = CommonTreeBuilder::default();
    let old_root = nil(&mut builder, &["A", "B"]);
    let c = leaf(&mut builder, "C");
    let mut kids = vec![leaf(&mut builder, "D")];

    let root = builder.become_root_with_kids(old_root, RootSource::Node(c), &mut kids).unwrap();

    assert_eq!(root, old_root);
    assert!(builder.store().is_nil(root));
    assert!(kids.is_empty());
    expect!["A B D"].assert_eq(&tree(&builder, root));
    builder.store().check_links(root).unwrap();
}

#[test]
fn rooted_old_root_is_demoted() {
    let mut builder = CommonTreeBuilder::default();
    let x = node(&mut builder, "X", &["W"]);
    let mut kids = vec![leaf(&mut builder, "Z")];

    let root = builder.become_root_with_kids(x, token("Y"), &mut kids).unwrap();

    assert!(kids.is_empty());
    assert_ne!(root, x);
    assert_eq!(builder.store().children(root), &[x]);
    assert_eq!(builder.store().parent(x), Some(root));
    assert_eq!(builder.store().child_index(x), Some(0));
    expect!["(Y (X W Z))"].assert_eq(&tree(&builder, root));
    builder.store().check_links(root).unwrap();
}

#[test]
fn become_root_unwraps_single_child_nil() {
    let mut builder = CommonTreeBuilder::default();
    let new_root = nil(&mut builder, &["R"]);
    let r = builder.store().children(new_root)[0];
    let s = node(&mut builder, "S", &["T"]);

    let root = builder.become_root(RootSource::Node(new_root), Some(s)).unwrap();

    assert_eq!(root, r);
    assert_eq!(builder.store().parent(r), None);
    assert_eq!(builder.store().child_index(r), None);
    assert_eq!(builder.store().child_count(new_root), 0);
    expect!["(R (S T))"].assert_eq(&tree(&builder, root));
    builder.store().check_links(root).unwrap();
}

#[test]
fn become_root_rejects_nil_with_several_children() {
    let mut builder = CommonTreeBuilder::default();
    let new_root = nil(&mut builder, &["R1", "R2"]);
    let s = leaf(&mut builder, "S");

    let err = builder.become_root(RootSource::Node(new_root), Some(s)).unwrap_err();

    assert_eq!(err, TreeError::MalformedRoot { children: 2 });
    expect!["more than one node as root (2 children under a nil root)"]
        .assert_eq(&err.to_string());
}

#[test]
fn become_root_splices_nil_old_root() {
    let mut builder = CommonTreeBuilder::default();
    let old_root = nil(&mut builder, &["a", "b", "c"]);

    let root = builder.become_root(token("r"), Some(old_root)).unwrap();
    expect!["(r a b c)"].assert_eq(&tree(&builder, root));

    let old_root = node(&mut builder, "a", &["b", "c"]);
    let root = builder.become_root(token("r"), Some(old_root)).unwrap();
    expect!["(r (a b c))"].assert_eq(&tree(&builder, root));

    let old_root = nil(&mut builder, &["a", "b", "c"]);
    let new_root = nil(&mut builder, &["r"]);
    let root = builder.become_root(RootSource::Node(new_root), Some(old_root)).unwrap();
    expect!["(r a b c)"].assert_eq(&tree(&builder, root));
    builder.store().check_links(root).unwrap();
}

#[test]
fn become_root_without_old_root_is_identity() {
    let mut builder = CommonTreeBuilder::default();
    let new_root = nil(&mut builder, &["r"]);

    let root = builder.become_root(RootSource::Node(new_root), None).unwrap();

    assert_eq!(root, new_root);
    expect!["r"].assert_eq(&tree(&builder, root));
}

#[test]
fn become_root_with_empty_nil_keeps_the_container() {
    let mut builder = CommonTreeBuilder::default();
    let new_root = builder.nil().unwrap();
    let old_root = leaf(&mut builder, "a");

    let root = builder.become_root(RootSource::Node(new_root), Some(old_root)).unwrap();

    assert_eq!(root, new_root);
    assert!(builder.store().is_nil(root));
    assert_eq!(builder.store().children(root), &[old_root]);
}

#[test]
fn post_processing_without_root() {
    let mut builder = CommonTreeBuilder::default();

    let mut kids = Vec::new();
    assert_eq!(builder.rule_post_processing_with_kids(None, &mut kids), Ok(None));

    let holder = node(&mut builder, "h", &["x"]);
    let x = builder.store().children(holder)[0];
    let mut kids = vec![x];
    let result = builder.rule_post_processing_with_kids(None, &mut kids).unwrap();
    assert_eq!(result, Some(x));
    assert!(kids.is_empty());
    assert_eq!(builder.store().parent(x), None);
    assert_eq!(builder.store().child_index(x), None);
    assert!(builder.store().children(holder).is_empty());
    builder.store().check_links(holder).unwrap();

    let x = leaf(&mut builder, "x");
    let y = leaf(&mut builder, "y");
    let mut kids = vec![x, y];
    let result = builder.rule_post_processing_with_kids(None, &mut kids).unwrap().unwrap();
    assert!(builder.store().is_nil(result));
    assert_eq!(builder.store().children(result), &[x, y]);
    assert!(kids.is_empty());
}

#[test]
fn promoted_kid_has_a_single_owner() {
    let mut builder = CommonTreeBuilder::default();
    let holder = node(&mut builder, "h", &["a", "x", "b"]);
    let x = builder.store().children(holder)[1];
    let other = leaf(&mut builder, "o");

    let mut kids = vec![x];
    let result = builder.rule_post_processing_with_kids(None, &mut kids).unwrap();
    assert_eq!(result, Some(x));
    builder.store_mut().add_child(other, x).unwrap();

    expect!["(h a b)"].assert_eq(&tree(&builder, holder));
    expect!["(o x)"].assert_eq(&tree(&builder, other));
    builder.store().check_links(holder).unwrap();
    builder.store().check_links(other).unwrap();
}

#[test]
fn post_processing_keeps_root_identity() {
    let mut builder = CommonTreeBuilder::default();
    let root = node(&mut builder, "r", &["a"]);
    let mut kids = vec![leaf(&mut builder, "b"), leaf(&mut builder, "c")];

    let result = builder.rule_post_processing_with_kids(Some(root), &mut kids).unwrap();

    assert_eq!(result, Some(root));
    assert!(kids.is_empty());
    expect!["(r a b c)"].assert_eq(&tree(&builder, root));
}

#[test]
fn post_processing_collapses_nil() {
    let mut builder = CommonTreeBuilder::default();
    assert_eq!(builder.rule_post_processing(None), None);

    let empty = builder.nil().unwrap();
    assert_eq!(builder.rule_post_processing(Some(empty)), None);

    let single = nil(&mut builder, &["x"]);
    let x = builder.store().children(single)[0];
    assert_eq!(builder.rule_post_processing(Some(single)), Some(x));
    assert_eq!(builder.store().parent(x), None);
    assert_eq!(builder.store().child_index(x), None);

    let several = nil(&mut builder, &["x", "y"]);
    assert_eq!(builder.rule_post_processing(Some(several)), Some(several));

    let rooted = node(&mut builder, "r", &["x"]);
    assert_eq!(builder.rule_post_processing(Some(rooted)), Some(rooted));
}

#[test]
fn dup_tree_is_isomorphic_and_independent() {
    let mut builder = CommonTreeBuilder::default();
    let root = node(&mut builder, "r", &["b"]);
    let sub = node(&mut builder, "a", &["x", "y"]);
    builder.store_mut().add_child(root, sub).unwrap();

    let copy = builder.dup_tree(Some(root)).unwrap().unwrap();

    assert_ne!(copy, root);
    assert_eq!(tree(&builder, copy), tree(&builder, root));
    assert_eq!(builder.store().parent(copy), None);
    assert_eq!(builder.store().child_index(copy), None);
    builder.store().check_links(copy).unwrap();

    let copied_sub = builder.store().children(copy)[1];
    assert_ne!(copied_sub, sub);
    assert_eq!(builder.store().child_count(copied_sub), 2);
    builder.store_mut().set_text(copied_sub, Some("changed".to_owned())).unwrap();
    let first = builder.store().children(copied_sub)[0];
    builder.store_mut().delete_child(copied_sub, 0);
    builder.store_mut().add_child(copy, first).unwrap();

    expect!["(r b (a x y))"].assert_eq(&tree(&builder, root));
    expect!["(r b (changed y) x)"].assert_eq(&tree(&builder, copy));
    builder.store().check_links(root).unwrap();
}

#[test]
fn dup_subtree_keeps_child_index() {
    let mut builder = CommonTreeBuilder::default();
    let root = node(&mut builder, "r", &["a", "b"]);
    let b = builder.store().children(root)[1];
    let parent = leaf(&mut builder, "p");

    let copy = builder.dup_tree_with_parent(Some(b), Some(parent)).unwrap().unwrap();

    assert_eq!(builder.store().child_index(copy), Some(1));
    assert_eq!(builder.store().parent(copy), Some(parent));
    assert_eq!(builder.dup_tree(None), Ok(None));
}

#[test]
fn create_typed_derives_tokens() {
    let mut builder = CommonTreeBuilder::default();
    let lc = CommonToken::new(ID, "{").with_index(7);

    let block = builder.create_typed(BLOCK, Some(&lc), None).unwrap();
    assert_eq!(builder.store().token_type(block), BLOCK);
    assert_eq!(builder.store().text(block), Some("{"));
    assert_eq!(builder.store().token_start_index(block), Some(7));

    let renamed = builder.create_typed(BLOCK, Some(&lc), Some("BLOCK")).unwrap();
    assert_eq!(builder.store().text(renamed), Some("BLOCK"));

    let decl = builder.create_typed(DECL, None, Some("DECL")).unwrap();
    assert_eq!(builder.store().token_type(decl), DECL);
    assert_eq!(builder.store().text(decl), Some("DECL"));
    assert_eq!(builder.store().token_start_index(decl), None);
}

#[test]
fn add_child_skips_missing_nodes() {
    let mut builder = CommonTreeBuilder::default();
    let root = leaf(&mut builder, "r");
    let kid = leaf(&mut builder, "k");

    builder.add_child(None, Some(kid)).unwrap();
    builder.add_child(Some(root), None).unwrap();
    builder.add_children(None, [kid]).unwrap();
    assert_eq!(builder.store().child_count(root), 0);

    builder.add_child(Some(root), Some(kid)).unwrap();
    expect!["(r k)"].assert_eq(&tree(&builder, root));
}

#[test]
fn unique_ids_are_dense_and_never_reused() {
    let mut builder = CommonTreeBuilder::default();
    let mut seen = Vec::new();
    for round in 0..10 {
        // nodes from earlier rounds are dropped from every tree
        let root = nil(&mut builder, &["a", "b", "c"]);
        let kids = builder.store_mut().take_children(root);
        for node in std::iter::once(root).chain(kids) {
            seen.push(builder.unique_id(node));
        }
        assert_eq!(seen.len(), (round + 1) * 4);
    }
    let expected: Vec<u32> = (1..=40).collect();
    assert_eq!(seen, expected);

    let first = builder.nil().unwrap();
    let id = builder.unique_id(first);
    assert_eq!(id, 41);
    assert_eq!(builder.unique_id(first), id);

    builder.reset_unique_ids();
    assert_eq!(builder.unique_id(first), 1);
}

#[test]
fn rule_marker_builds_rooted_rule() {
    // A^ B^ C
    let mut builder = CommonTreeBuilder::default();
    let mut rule = builder.start_rule();
    let a = leaf(&mut builder, "A");
    rule.root(&mut builder, RootSource::Node(a)).unwrap();
    rule.root(&mut builder, token("B")).unwrap();
    let c = leaf(&mut builder, "C");
    rule.child(c);

    let result = rule.finish(&mut builder).unwrap().unwrap();
    expect!["(B A C)"].assert_eq(&tree(&builder, result));
    builder.store().check_links(result).unwrap();
}

#[test]
fn rule_marker_root_absorbs_earlier_kids() {
    // A B^ C
    let mut builder = CommonTreeBuilder::default();
    let mut rule = builder.start_rule();
    let a = leaf(&mut builder, "A");
    rule.child(a);
    rule.root(&mut builder, token("B")).unwrap();
    let c = leaf(&mut builder, "C");
    rule.child(c);

    let result = rule.finish(&mut builder).unwrap().unwrap();
    expect!["(B A C)"].assert_eq(&tree(&builder, result));
}

#[test]
fn rule_marker_promotes_rule_results() {
    // A r^ B, with r = (C D)
    let mut builder = CommonTreeBuilder::default();
    let mut rule = builder.start_rule();
    let a = leaf(&mut builder, "A");
    rule.child(a);
    let r = node(&mut builder, "C", &["D"]);
    rule.root(&mut builder, RootSource::Node(r)).unwrap();
    let b = leaf(&mut builder, "B");
    rule.child(b);
    let result = rule.finish(&mut builder).unwrap().unwrap();
    expect!["(C D A B)"].assert_eq(&tree(&builder, result));

    // A r^ B, with r = (nil C D)
    let mut rule = builder.start_rule();
    let a = leaf(&mut builder, "A");
    rule.child(a);
    let r = nil(&mut builder, &["C", "D"]);
    rule.root(&mut builder, RootSource::Node(r)).unwrap();
    assert_eq!(rule.root_node(), Some(r));
    assert!(rule.pending().is_empty());
    let b = leaf(&mut builder, "B");
    rule.child(b);
    let result = rule.finish(&mut builder).unwrap().unwrap();
    assert!(builder.store().is_nil(result));
    expect!["A C D B"].assert_eq(&tree(&builder, result));
}

#[test]
fn rule_marker_without_root() {
    let mut builder = CommonTreeBuilder::default();

    let rule = builder.start_rule();
    assert_eq!(rule.finish(&mut builder), Ok(None));

    let mut rule = builder.start_rule();
    let a = leaf(&mut builder, "A");
    rule.child(a);
    assert_eq!(rule.finish(&mut builder), Ok(Some(a)));

    let mut rule = builder.start_rule();
    let a = leaf(&mut builder, "A");
    let b = leaf(&mut builder, "B");
    rule.child(a);
    rule.child(b);
    let result = rule.finish(&mut builder).unwrap().unwrap();
    expect!["A B"].assert_eq(&tree(&builder, result));

    let mut rule = builder.start_rule();
    rule.child(a);
    rule.abandon();
}

#[test]
#[should_panic(expected = "RuleMarker must be either finished or abandoned")]
fn unfinished_rule_marker_panics() {
    let builder = CommonTreeBuilder::default();
    let _rule = builder.start_rule();
}
