use super::*;
use pretty_assertions::assert_eq;

fn chain(tree: &mut Tree, attrs: &[Attribute]) -> Vec<NodeId> {
    let ids: Vec<_> = attrs
        .iter()
        .map(|&a| tree.new_node(a, Name::EMPTY, Span::DUMMY))
        .collect();
    for pair in ids.windows(2) {
        tree.link(pair[0], pair[1]);
    }
    tree.top = ids.first().copied();
    ids
}

fn attrs_of(tree: &Tree, p: Option<NodeId>) -> Vec<Attribute> {
    tree.siblings(p).map(|n| tree.attribute(n)).collect()
}

#[test]
fn test_make_sub_wraps_range_in_place() {
    use Attribute::*;
    let mut tree = Tree::new();
    let ids = chain(&mut tree, &[SemiSymbol, Identifier, AssignSymbol, IntDenotation, SemiSymbol]);

    let head = tree.make_sub(ids[1], ids[3], Assignation);

    assert_eq!(head, ids[1]);
    assert_eq!(attrs_of(&tree, tree.top), vec![SemiSymbol, Assignation, SemiSymbol]);
    assert_eq!(
        attrs_of(&tree, tree.sub(head)),
        vec![Identifier, AssignSymbol, IntDenotation]
    );
    assert_eq!(tree.previous(ids[4]), Some(head));
    let first_child = tree.sub(head).map(|c| tree.next(c));
    assert_eq!(first_child, Some(Some(ids[2])));
    assert_eq!(tree.previous(ids[2]), tree.sub(head));
}

#[test]
fn test_make_sub_single_node() {
    use Attribute::*;
    let mut tree = Tree::new();
    let ids = chain(&mut tree, &[Identifier, SemiSymbol]);
    tree.make_sub(ids[0], ids[0], Primary);
    assert_eq!(attrs_of(&tree, tree.top), vec![Primary, SemiSymbol]);
    assert_eq!(attrs_of(&tree, tree.sub(ids[0])), vec![Identifier]);
}

#[test]
fn test_replace_with_chain() {
    use Attribute::*;
    let mut tree = Tree::new();
    let ids = chain(&mut tree, &[BeginSymbol, Identifier, EndSymbol]);
    let body = chain(&mut tree, &[SkipSymbol, SemiSymbol, SkipSymbol]);
    tree.top = Some(ids[0]);

    tree.replace_with(ids[1], body[0], body[2]);

    assert_eq!(
        attrs_of(&tree, tree.top),
        vec![BeginSymbol, SkipSymbol, SemiSymbol, SkipSymbol, EndSymbol]
    );
}

#[test]
fn test_preorder_visits_children_before_siblings() {
    use Attribute::*;
    let mut tree = Tree::new();
    let ids = chain(&mut tree, &[Identifier, AssignSymbol, IntDenotation]);
    tree.make_sub(ids[0], ids[2], Assignation);
    let order: Vec<_> = tree.preorder(tree.top).iter().map(|&n| tree.attribute(n)).collect();
    assert_eq!(order, vec![Assignation, Identifier, AssignSymbol, IntDenotation]);
}
