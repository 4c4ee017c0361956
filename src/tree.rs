use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::error::{BuildError, BuildResult};
use crate::records::{FlatRecord, weight_of};

pub const MIN_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = 6;
pub const ROOT_NAME: &str = "root";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub name: String,
    /// `0` for the synthetic root, otherwise the record level.
    pub level: i64,
    pub parent: Option<NodeId>,
    pub source: Option<String>,
    pub value: Option<f64>,
    pub children: Vec<NodeId>,
    /// Name chain from the top-level ancestor down to this node, unique per tree.
    pub lineage_id: String,
}

impl TreeNode {
    pub fn weight(&self) -> f64 {
        weight_of(self.value)
    }
}

/// Immutable hierarchy built from flat records. Node 0 is the synthetic root.
#[derive(Clone, Debug)]
pub struct BubbleTree {
    nodes: Vec<TreeNode>,
    index_by_name: HashMap<String, NodeId>,
    orphans: Vec<NodeId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    OnPath,
    Done,
}

#[instrument(level = "debug", skip(records), fields(records = records.len()))]
pub fn build(records: &[FlatRecord]) -> BuildResult<BubbleTree> {
    if let Some(record) = records
        .iter()
        .find(|record| !(MIN_LEVEL..=MAX_LEVEL).contains(&record.level))
    {
        return Err(BuildError::LevelOutOfRange {
            name: record.name.clone(),
            level: record.level,
        });
    }

    let id_for = |offset: usize| NodeId(offset + 1);

    let mut index_by_name = HashMap::with_capacity(records.len());
    for (offset, record) in records.iter().enumerate() {
        if let Some(previous) = index_by_name.insert(record.name.clone(), id_for(offset)) {
            warn!(
                name = %record.name,
                shadowed = previous.index(),
                "duplicate record name; lookups resolve to the later record"
            );
        }
    }

    let mut orphans = Vec::new();
    let mut parents = Vec::with_capacity(records.len());
    for (offset, record) in records.iter().enumerate() {
        let id = id_for(offset);
        if record.level == MIN_LEVEL {
            parents.push(NodeId::ROOT);
            continue;
        }

        let resolved = record
            .parent
            .as_deref()
            .and_then(|parent| index_by_name.get(parent).copied())
            .filter(|parent| *parent != id);

        match resolved {
            Some(parent) => parents.push(parent),
            None => {
                warn!(
                    name = %record.name,
                    parent = record.parent.as_deref().unwrap_or("<none>"),
                    "unresolved parent; attaching to root"
                );
                orphans.push(id);
                parents.push(NodeId::ROOT);
            }
        }
    }

    break_parent_cycles(records, &mut parents, &mut orphans);

    let mut nodes = Vec::with_capacity(records.len() + 1);
    nodes.push(TreeNode {
        name: ROOT_NAME.to_owned(),
        level: 0,
        parent: None,
        source: None,
        value: None,
        children: Vec::new(),
        lineage_id: ROOT_NAME.to_owned(),
    });
    for (record, parent) in records.iter().zip(parents.iter()) {
        nodes.push(TreeNode {
            name: record.name.clone(),
            level: record.level,
            parent: Some(*parent),
            source: record.source.clone(),
            value: record.value,
            children: Vec::new(),
            lineage_id: String::new(),
        });
    }
    for (offset, parent) in parents.iter().enumerate() {
        nodes[parent.index()].children.push(id_for(offset));
    }

    assign_lineage_ids(&mut nodes);

    orphans.sort_unstable();
    orphans.dedup();

    debug!(nodes = records.len(), orphans = orphans.len(), "built bubble tree");

    Ok(BubbleTree {
        nodes,
        index_by_name,
        orphans,
    })
}

/// Parent names can form loops (A -> B -> A). The node at which a walk re-enters
/// its own path is re-attached to root.
fn break_parent_cycles(records: &[FlatRecord], parents: &mut [NodeId], orphans: &mut Vec<NodeId>) {
    let mut state = vec![Visit::Unvisited; parents.len()];
    let mut path = Vec::new();

    for start in 0..parents.len() {
        path.clear();
        let mut cursor = start;

        loop {
            match state[cursor] {
                Visit::Done => break,
                Visit::OnPath => {
                    warn!(
                        name = %records[cursor].name,
                        "parent chain forms a cycle; attaching to root"
                    );
                    parents[cursor] = NodeId::ROOT;
                    orphans.push(NodeId(cursor + 1));
                    break;
                }
                Visit::Unvisited => {
                    state[cursor] = Visit::OnPath;
                    path.push(cursor);
                    let parent = parents[cursor];
                    if parent.is_root() {
                        break;
                    }
                    cursor = parent.index() - 1;
                }
            }
        }

        for &visited in &path {
            state[visited] = Visit::Done;
        }
    }
}

fn assign_lineage_ids(nodes: &mut [TreeNode]) {
    let mut issued = HashSet::with_capacity(nodes.len());
    issued.insert(ROOT_NAME.to_owned());

    let mut stack = nodes[NodeId::ROOT.index()]
        .children
        .iter()
        .rev()
        .copied()
        .collect::<Vec<_>>();

    while let Some(id) = stack.pop() {
        let node = &nodes[id.index()];
        let base = match node.parent {
            Some(parent) if !parent.is_root() => {
                format!("{}/{}", nodes[parent.index()].lineage_id, node.name)
            }
            _ => node.name.clone(),
        };

        let mut lineage = base.clone();
        let mut suffix = 2usize;
        while issued.contains(&lineage) {
            lineage = format!("{base}#{suffix}");
            suffix += 1;
        }
        issued.insert(lineage.clone());

        stack.extend(node.children.iter().rev().copied());
        nodes[id.index()].lineage_id = lineage;
    }
}

impl BubbleTree {
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of record nodes, excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.index_by_name.get(name).copied()
    }

    pub fn find_lineage(&self, lineage_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.lineage_id == lineage_id)
            .map(NodeId)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    pub fn grandchild_count(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .map(|child| self.children(*child).len())
            .sum()
    }

    /// Ancestors nearest first; ends at root for every record node.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.parent(parent);
        }
        chain
    }

    /// Root first, ending with `id` itself.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id);
        path
    }

    pub fn orphans(&self) -> &[NodeId] {
        &self.orphans
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (1..self.nodes.len()).map(NodeId)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> + '_ {
        self.nodes.iter().enumerate().skip(1).map(|(index, node)| (NodeId(index), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &BubbleTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|id| tree.node(*id).name.clone()).collect()
    }

    #[test]
    fn parent_lookup_does_not_depend_on_order() {
        let records = vec![
            FlatRecord::new("Style", 3).with_parent("Art"),
            FlatRecord::new("Art", 2).with_parent("Kusama"),
            FlatRecord::new("Kusama", 1),
        ];

        let tree = build(&records).unwrap();

        let kusama = tree.find("Kusama").unwrap();
        let art = tree.find("Art").unwrap();
        assert_eq!(names(&tree, tree.children(tree.root())), vec!["Kusama"]);
        assert_eq!(names(&tree, tree.children(kusama)), vec!["Art"]);
        assert_eq!(names(&tree, tree.children(art)), vec!["Style"]);
        assert!(tree.orphans().is_empty());
    }

    #[test]
    fn level_one_ignores_parent_field() {
        let records = vec![
            FlatRecord::new("A", 1),
            FlatRecord::new("B", 1).with_parent("A"),
        ];
        let tree = build(&records).unwrap();
        assert_eq!(names(&tree, tree.children(tree.root())), vec!["A", "B"]);
    }

    #[test]
    fn self_parent_and_missing_parent_are_orphans() {
        let records = vec![
            FlatRecord::new("Loop", 2).with_parent("Loop"),
            FlatRecord::new("NoParent", 3),
        ];
        let tree = build(&records).unwrap();

        assert_eq!(names(&tree, tree.children(tree.root())), vec!["Loop", "NoParent"]);
        assert_eq!(names(&tree, tree.orphans()), vec!["Loop", "NoParent"]);
    }

    #[test]
    fn parent_cycles_are_broken_at_root() {
        let records = vec![
            FlatRecord::new("A", 2).with_parent("B"),
            FlatRecord::new("B", 3).with_parent("C"),
            FlatRecord::new("C", 4).with_parent("A"),
        ];
        let tree = build(&records).unwrap();

        for id in tree.ids() {
            assert_eq!(tree.ancestors(id).last(), Some(&NodeId::ROOT));
        }
        assert_eq!(tree.orphans().len(), 1);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn duplicate_names_keep_every_node_and_resolve_to_the_last() {
        let records = vec![
            FlatRecord::new("Tokyo", 1),
            FlatRecord::new("Store", 2).with_parent("Tokyo"),
            FlatRecord::new("Store", 2).with_parent("Tokyo"),
            FlatRecord::new("Item", 3).with_parent("Store"),
        ];
        let tree = build(&records).unwrap();

        assert_eq!(tree.len(), 4);
        let tokyo = tree.find("Tokyo").unwrap();
        let stores = tree.children(tokyo).to_vec();
        assert_eq!(stores.len(), 2);
        assert_eq!(tree.find("Store"), Some(stores[1]));
        assert!(tree.children(stores[0]).is_empty());
        assert_eq!(names(&tree, tree.children(stores[1])), vec!["Item"]);
    }

    #[test]
    fn lineage_ids_disambiguate_repeated_leaf_names() {
        let records = vec![
            FlatRecord::new("Tokyo", 1),
            FlatRecord::new("Paris", 1),
            FlatRecord::new("TokyoStore", 2).with_parent("Tokyo"),
            FlatRecord::new("Store", 3).with_parent("TokyoStore"),
            FlatRecord::new("Store", 2).with_parent("Paris"),
            FlatRecord::new("Store", 2).with_parent("Paris"),
        ];
        let tree = build(&records).unwrap();

        let lineages = tree
            .nodes()
            .map(|(_, node)| node.lineage_id.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            lineages,
            vec![
                "Tokyo",
                "Paris",
                "Tokyo/TokyoStore",
                "Tokyo/TokyoStore/Store",
                "Paris/Store",
                "Paris/Store#2",
            ]
        );
        assert_eq!(tree.node(tree.root()).lineage_id, ROOT_NAME);
        assert_eq!(tree.find_lineage("Paris/Store#2").map(NodeId::index), Some(6));
    }

    #[test]
    fn path_to_starts_at_root() {
        let records = vec![
            FlatRecord::new("A", 1),
            FlatRecord::new("B", 2).with_parent("A"),
            FlatRecord::new("C", 3).with_parent("B"),
        ];
        let tree = build(&records).unwrap();
        let c = tree.find("C").unwrap();

        assert_eq!(names(&tree, &tree.path_to(c)), vec!["root", "A", "B", "C"]);
        assert_eq!(tree.grandchild_count(tree.find("A").unwrap()), 1);
    }

    #[test]
    fn rejects_levels_outside_range() {
        for level in [0, 7, -1] {
            let err = build(&[FlatRecord::new("X", level)]).unwrap_err();
            assert_eq!(
                err,
                BuildError::LevelOutOfRange {
                    name: "X".to_owned(),
                    level,
                }
            );
        }
    }

    #[test]
    fn empty_input_builds_bare_root() {
        let tree = build(&[]).unwrap();
        assert!(tree.is_empty());
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn node_weight_matches_record_weight() {
        let records = [
            FlatRecord::new("A", 1).with_value(4.5),
            FlatRecord::new("B", 2).with_parent("A").with_value(-1.0),
            FlatRecord::new("C", 2).with_parent("A"),
        ];
        let tree = build(&records).unwrap();

        for record in &records {
            let node = tree.node(tree.find(&record.name).unwrap());
            assert_eq!(node.weight(), record.weight());
        }
        assert_eq!(tree.node(tree.root()).weight(), 1.0);
    }
}
