use linebook::domain::{LineId, NodeData, NodeKind, TreeNode};

/// Every node of `kind` under `roots`, depth-first.
pub fn nodes_of_kind(roots: &[TreeNode], kind: NodeKind) -> Vec<&TreeNode> {
    roots
        .iter()
        .flat_map(TreeNode::descendants)
        .filter(|node| node.kind() == kind)
        .collect()
}

/// Settlement ids of every wager-eligible selection in the tree.
pub fn eligible_ids(roots: &[TreeNode]) -> Vec<LineId> {
    nodes_of_kind(roots, NodeKind::Selection)
        .into_iter()
        .filter_map(|node| match node.data {
            NodeData::Selection(ref data) => data.external_id.clone(),
            _ => None,
        })
        .collect()
}

/// The market node with `id`.
pub fn market<'a>(roots: &'a [TreeNode], id: &str) -> &'a TreeNode {
    nodes_of_kind(roots, NodeKind::Market)
        .into_iter()
        .find(|node| node.id == id)
        .unwrap_or_else(|| panic!("market {id} not in tree"))
}
