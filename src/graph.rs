//! The implication graph records why every assigned literal holds.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Forward edges are kept per head and
//! carry the clause that justifies the implication; each node also keeps the ordered list of its
//! parents, so no node owns another.

use crate::formula::{Clause, Literal, Variable};
use log::{trace, warn};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};
use thiserror::Error;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default)]
pub struct DecisionLevel(pub usize);

impl DecisionLevel {
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for DecisionLevel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node is identified by the literal it asserts and the decision level it was asserted at.
/// `Root` stands for the level-0 facts and `Conflict` is the sink falsified clauses point at.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Node {
    Root,
    Assigned(Literal, DecisionLevel),
    Conflict,
}

impl Node {
    pub fn new(literal: Literal, level: DecisionLevel) -> Self {
        Node::Assigned(literal, level)
    }

    pub fn literal(&self) -> Option<&Literal> {
        match self {
            Node::Assigned(literal, _) => Some(literal),
            _ => None,
        }
    }

    pub fn level(&self) -> DecisionLevel {
        match self {
            Node::Assigned(_, level) => *level,
            _ => DecisionLevel(0),
        }
    }

    fn is_sentinel(&self) -> bool {
        !matches!(self, Node::Assigned(..))
    }

    fn sort_key(&self) -> (u8, DecisionLevel, &str, bool) {
        match self {
            Node::Root => (0, DecisionLevel(0), "", false),
            Node::Assigned(literal, level) => (1, *level, literal.variable().name(), literal.is_positive()),
            Node::Conflict => (2, DecisionLevel(0), "", false),
        }
    }
}

/// Root first, then assigned nodes by decision level and variable name, then the conflict sink.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Node::Root => f.write_str("root"),
            Node::Assigned(literal, level) => write!(f, "{}@{}", literal, level),
            Node::Conflict => f.write_str("conflict"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} is not in the implication graph")]
    NodeNotFound(Node),
    #[error("no node in the implication graph assigns {0}")]
    LiteralNotFound(Literal),
    #[error("no node in the implication graph assigns variable {0}")]
    VariableNotFound(Variable),
    #[error("no decision was made at level {0}")]
    NoDecision(DecisionLevel),
    #[error("the conflict node has no parents")]
    NoConflict,
    #[error("the conflict is not reachable from the decision at level {0}")]
    ConflictUnreachable(DecisionLevel),
    #[error("slot {0} of the implication graph no longer holds a node")]
    StaleNode(usize),
    #[error("dominators of {0} were needed before they were computed")]
    MissingDominators(Node),
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Edge {
    tail: NodeId,
    clause: Clause,
}

#[derive(Debug)]
struct NodeData {
    node: Node,
    parents: Vec<NodeId>,
}

#[derive(Debug)]
pub struct ImplicationGraph {
    nodes: Vec<Option<NodeData>>,
    free: Vec<usize>,
    index: HashMap<Node, NodeId>,
    edges: HashMap<NodeId, Vec<Edge>>,
    root: NodeId,
    conflict: NodeId,
}

impl Default for ImplicationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ImplicationGraph {
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: vec![],
            free: vec![],
            index: HashMap::new(),
            edges: HashMap::new(),
            root: NodeId(0),
            conflict: NodeId(0),
        };
        graph.root = graph.get_or_create(&Node::Root);
        graph.conflict = graph.get_or_create(&Node::Conflict);
        graph
    }

    fn slot(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.slot(id).ok_or(GraphError::StaleNode(id.0))
    }

    fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        Ok(&self.data(id)?.node)
    }

    fn live(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|data| (NodeId(i), data)))
    }

    fn get_or_create(&mut self, node: &Node) -> NodeId {
        if let Some(&id) = self.index.get(node) {
            return id;
        }
        let data = NodeData {
            node: node.clone(),
            parents: vec![],
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(data);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(data));
                NodeId(self.nodes.len() - 1)
            }
        };
        let _ = self.index.insert(node.clone(), id);
        id
    }

    fn lookup(&self, node: &Node) -> Result<NodeId, GraphError> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(node.clone()))
    }

    fn link(&mut self, head: NodeId, tail: NodeId, clause: &Clause) -> Result<(), GraphError> {
        let _ = self.data(head)?;
        if self.edges.get(&head).map_or(false, |out| out.iter().any(|e| e.tail == tail)) {
            return Ok(());
        }
        self.slot_mut(tail)
            .ok_or(GraphError::StaleNode(tail.0))?
            .parents
            .push(head);
        self.edges.entry(head).or_insert_with(Vec::new).push(Edge {
            tail,
            clause: clause.clone(),
        });
        Ok(())
    }

    /// Drop the edge `head -> tail`. Returns whether the edge existed.
    fn unlink(&mut self, head: NodeId, tail: NodeId) -> bool {
        let removed = match self.edges.get_mut(&head) {
            Some(out) => match out.iter().position(|e| e.tail == tail) {
                Some(pos) => {
                    let _ = out.remove(pos);
                    true
                }
                None => false,
            },
            None => false,
        };
        if let (true, Some(data)) = (removed, self.slot_mut(tail)) {
            data.parents.retain(|&p| p != head);
        }
        removed
    }

    /// Delete `id` and, transitively, every child that is left without parents. Returns the
    /// deleted nodes.
    fn remove_orphan(&mut self, id: NodeId) -> Vec<Node> {
        let mut removed = vec![];
        let mut worklist = vec![id];
        while let Some(id) = worklist.pop() {
            match self.slot(id) {
                Some(data) if !data.node.is_sentinel() && data.parents.is_empty() => {}
                _ => continue,
            }
            for edge in self.edges.remove(&id).unwrap_or_default() {
                if let Some(data) = self.slot_mut(edge.tail) {
                    data.parents.retain(|&p| p != id);
                }
                worklist.push(edge.tail);
            }
            if let Some(data) = self.nodes[id.0].take() {
                let _ = self.index.remove(&data.node);
                self.free.push(id.0);
                removed.push(data.node);
            }
        }
        removed
    }

    /// Add `head -> tail` labelled by `clause`, creating either node if needed. Adding an edge
    /// that already exists does nothing.
    pub fn add_edge(&mut self, head: &Node, tail: &Node, clause: &Clause) -> Result<(), GraphError> {
        let head = self.get_or_create(head);
        let tail = self.get_or_create(tail);
        self.link(head, tail, clause)
    }

    /// Record a branching decision: a new node reached from root through an empty-clause edge.
    pub fn add_decision_node(&mut self, literal: Literal, level: DecisionLevel) -> Result<(), GraphError> {
        let node = self.get_or_create(&Node::new(literal, level));
        let root = self.root;
        self.link(root, node, &Clause::empty())
    }

    /// Point an existing node at the conflict sink.
    pub fn add_conflict_edge(&mut self, node: &Node, clause: &Clause) -> Result<(), GraphError> {
        let head = self.lookup(node)?;
        let conflict = self.conflict;
        self.link(head, conflict, clause)
    }

    /// Remove `head -> tail`. If `tail` loses its last parent it is deleted, along with any
    /// descendants orphaned by that. A missing edge is only logged; returns whether it existed.
    pub fn remove_edge(&mut self, head: &Node, tail: &Node) -> bool {
        let (head_id, tail_id) = match (self.lookup(head), self.lookup(tail)) {
            (Ok(h), Ok(t)) => (h, t),
            _ => {
                warn!("trying to remove edge {} -> {} which is not in the graph", head, tail);
                return false;
            }
        };
        if !self.unlink(head_id, tail_id) {
            warn!("trying to remove edge {} -> {} which is not in the graph", head, tail);
            return false;
        }
        let removed = self.remove_orphan(tail_id);
        trace!("removed edge {} -> {}, dropped {} nodes", head, tail, removed.len());
        true
    }

    /// Undo everything above decision level `level`: drop every edge leaving or entering a node
    /// above that level and every edge into the conflict sink, then delete the nodes left without
    /// parents. Returns the deleted nodes.
    pub fn backtrack(&mut self, level: DecisionLevel) -> Result<Vec<Node>, GraphError> {
        let mut doomed = vec![];
        for (&head, out) in &self.edges {
            let head_above = self.node(head)?.level() > level;
            for edge in out {
                if head_above || edge.tail == self.conflict || self.node(edge.tail)?.level() > level {
                    doomed.push((head, edge.tail));
                }
            }
        }
        for (head, tail) in doomed {
            let _ = self.unlink(head, tail);
        }

        let orphans: Vec<NodeId> = self
            .live()
            .filter(|(_, data)| !data.node.is_sentinel() && data.parents.is_empty())
            .map(|(id, _)| id)
            .collect();
        let mut removed = vec![];
        for id in orphans {
            removed.extend(self.remove_orphan(id));
        }
        trace!("backtrack to level {} removed {} nodes", level, removed.len());
        Ok(removed)
    }

    pub fn is_conflict(&self) -> bool {
        self.slot(self.conflict).map_or(false, |data| !data.parents.is_empty())
    }

    /// The clause labelling the first edge into the conflict sink.
    pub fn current_conflict_clause(&self) -> Result<&Clause, GraphError> {
        let head = *self.data(self.conflict)?.parents.first().ok_or(GraphError::NoConflict)?;
        self.edges
            .get(&head)
            .and_then(|out| out.iter().find(|e| e.tail == self.conflict))
            .map(|e| &e.clause)
            .ok_or(GraphError::NoConflict)
    }

    pub fn find_decision_level_of_variable(&self, variable: &Variable) -> Result<DecisionLevel, GraphError> {
        self.live()
            .find_map(|(_, data)| match &data.node {
                Node::Assigned(l, level) if l.variable() == variable => Some(*level),
                _ => None,
            })
            .ok_or_else(|| GraphError::VariableNotFound(variable.clone()))
    }

    pub fn get_decision_level_of_literal(&self, literal: &Literal) -> Result<DecisionLevel, GraphError> {
        self.find_decision_level_of_variable(literal.variable())
    }

    /// The live node asserting `literal`, whatever its level.
    pub fn node_of_literal(&self, literal: &Literal) -> Result<Node, GraphError> {
        self.live()
            .find(|(_, data)| data.node.literal() == Some(literal))
            .map(|(_, data)| data.node.clone())
            .ok_or_else(|| GraphError::LiteralNotFound(literal.clone()))
    }

    fn decision_node(&self, level: DecisionLevel) -> Result<NodeId, GraphError> {
        self.edges
            .get(&self.root)
            .and_then(|out| {
                out.iter().find(|e| {
                    e.clause.is_empty() && self.slot(e.tail).map_or(false, |data| data.node.level() == level)
                })
            })
            .map(|e| e.tail)
            .ok_or(GraphError::NoDecision(level))
    }

    fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.get(&id).into_iter().flat_map(|out| out.iter().map(|e| e.tail))
    }

    /// The first unique implication point of the conflict at `level`.
    ///
    /// Dominators are computed over the sub-graph reachable from the decision at `level`, with
    /// each node's set being the intersection of its in-sub-graph parents' sets plus itself. The
    /// result is the second-largest member of the conflict's dominator set under [`Node`]'s order.
    pub fn get_first_uip(&self, level: DecisionLevel) -> Result<Node, GraphError> {
        let decision = self.decision_node(level)?;

        let mut reachable = HashSet::new();
        let mut queue = VecDeque::new();
        let _ = reachable.insert(decision);
        queue.push_back(decision);
        while let Some(id) = queue.pop_front() {
            for child in self.children(id) {
                if reachable.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        if !reachable.contains(&self.conflict) {
            return Err(GraphError::ConflictUnreachable(level));
        }

        // A node is ready once every parent inside the sub-graph has its dominators.
        let mut pending: HashMap<NodeId, usize> = HashMap::with_capacity(reachable.len());
        for &id in &reachable {
            let inside = self.data(id)?.parents.iter().filter(|p| reachable.contains(*p)).count();
            let _ = pending.insert(id, inside);
        }
        let mut dominators: HashMap<NodeId, BTreeSet<Node>> = HashMap::new();
        let mut ready = VecDeque::new();
        ready.push_back(decision);
        while let Some(id) = ready.pop_front() {
            let mut doms: Option<BTreeSet<Node>> = None;
            for parent in self.data(id)?.parents.iter().filter(|p| reachable.contains(*p)) {
                let parent_doms = match dominators.get(parent) {
                    Some(doms) => doms,
                    None => return Err(GraphError::MissingDominators(self.node(*parent)?.clone())),
                };
                doms = Some(match doms {
                    None => parent_doms.clone(),
                    Some(d) => d.intersection(parent_doms).cloned().collect(),
                });
            }
            let mut doms = doms.unwrap_or_default();
            let _ = doms.insert(self.node(id)?.clone());
            let _ = dominators.insert(id, doms);

            for child in self.children(id) {
                if let Some(count) = pending.get_mut(&child) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }

        let conflict_doms = dominators
            .get(&self.conflict)
            .ok_or(GraphError::ConflictUnreachable(level))?;
        trace!(
            "dominators of conflict at level {}: {}",
            level,
            conflict_doms.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
        );
        conflict_doms
            .iter()
            .rev()
            .nth(1)
            .cloned()
            .ok_or(GraphError::ConflictUnreachable(level))
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(node)
    }

    /// Number of live nodes, sentinels included.
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn parents(&self, node: &Node) -> Result<Vec<Node>, GraphError> {
        let id = self.lookup(node)?;
        self.data(id)?
            .parents
            .iter()
            .map(|&p| self.node(p).map(Node::clone))
            .collect()
    }

    /// Write the graph in Graphviz format. Decisions are drawn with a double border.
    pub fn to_dot<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "digraph implications {{")?;
        let mut live: Vec<_> = self.live().collect();
        live.sort_by(|a, b| a.1.node.cmp(&b.1.node));
        for (id, data) in &live {
            let decision = data.parents.contains(&self.root) && data.node.level() > DecisionLevel(0);
            let style = if decision { ",peripheries=2" } else { "" };
            writeln!(w, "  n{} [label=\"{}\"{}];", id.0, data.node, style)?;
        }
        for (id, _) in &live {
            if let Some(out) = self.edges.get(id) {
                for edge in out {
                    writeln!(w, "  n{} -> n{} [label=\"{}\"];", id.0, edge.tail.0, edge.clause)?;
                }
            }
        }
        writeln!(w, "}}")
    }
}

impl Display for ImplicationGraph {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut live: Vec<_> = self.live().collect();
        live.sort_by(|a, b| a.1.node.cmp(&b.1.node));
        for (id, data) in &live {
            let children = self.edges.get(id).map_or(0, |out| out.len());
            writeln!(
                f,
                "{} with {} children and {} parents.",
                data.node,
                children,
                data.parents.len()
            )?;
        }
        write!(f, "{} nodes stored.", live.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{n, p};
    use std::io::Read;
    use test_env_log::test;

    fn at(literal: Literal, level: usize) -> Node {
        Node::new(literal, DecisionLevel(level))
    }

    struct Example {
        graph: ImplicationGraph,
        c1: Clause,
        c2: Clause,
        c3: Clause,
    }

    // (!x1 | x2) & (!x2 | !x3 | x4) & (!x2 | !x4), x1 decided at 1 and x3 decided at 2
    fn example() -> Example {
        let c1 = Clause::new(vec![n(1), p(2)]);
        let c2 = Clause::new(vec![n(2), n(3), p(4)]);
        let c3 = Clause::new(vec![n(2), n(4)]);

        let mut graph = ImplicationGraph::new();
        graph.add_decision_node(p(1), DecisionLevel(1)).unwrap();
        graph.add_edge(&at(p(1), 1), &at(p(2), 1), &c1).unwrap();
        graph.add_decision_node(p(3), DecisionLevel(2)).unwrap();
        graph.add_edge(&at(p(3), 2), &at(p(4), 2), &c2).unwrap();
        graph.add_edge(&at(p(2), 1), &at(p(4), 2), &c2).unwrap();
        graph.add_conflict_edge(&at(p(2), 1), &c3).unwrap();
        graph.add_conflict_edge(&at(p(4), 2), &c3).unwrap();
        Example { graph, c1, c2, c3 }
    }

    #[test]
    fn build_and_query() {
        let Example { graph, c3, .. } = example();
        assert_eq!(graph.node_count(), 6);
        assert!(graph.is_conflict());
        assert_eq!(graph.current_conflict_clause().unwrap(), &c3);
        assert_eq!(
            graph.find_decision_level_of_variable(&Variable::numbered(4)).unwrap(),
            DecisionLevel(2)
        );
        assert_eq!(graph.get_decision_level_of_literal(&n(2)).unwrap(), DecisionLevel(1));
        assert_eq!(
            graph.parents(&at(p(4), 2)).unwrap(),
            vec![at(p(3), 2), at(p(2), 1)]
        );
        assert_eq!(
            graph.find_decision_level_of_variable(&Variable::numbered(9)),
            Err(GraphError::VariableNotFound(Variable::numbered(9)))
        );
    }

    #[test]
    fn duplicate_edges_are_ignored() {
        let Example { mut graph, c1, .. } = example();
        graph.add_edge(&at(p(1), 1), &at(p(2), 1), &c1).unwrap();
        assert_eq!(graph.parents(&at(p(2), 1)).unwrap(), vec![at(p(1), 1)]);
    }

    #[test]
    fn remove_edge_cascades() {
        let Example { mut graph, .. } = example();

        // x2 loses its only parent; x4 still has x3
        assert!(graph.remove_edge(&at(p(1), 1), &at(p(2), 1)));
        assert!(!graph.contains(&at(p(2), 1)));
        assert!(graph.contains(&at(p(4), 2)));
        assert_eq!(graph.parents(&at(p(4), 2)).unwrap(), vec![at(p(3), 2)]);

        assert!(graph.remove_edge(&at(p(3), 2), &at(p(4), 2)));
        assert!(!graph.contains(&at(p(4), 2)));
        assert!(!graph.is_conflict());
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn remove_missing_edge_is_not_fatal() {
        let Example { mut graph, .. } = example();
        assert!(!graph.remove_edge(&at(p(1), 1), &at(p(4), 2)));
        assert!(!graph.remove_edge(&at(p(7), 1), &at(p(4), 2)));
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn backtrack_removes_higher_levels() {
        let Example { mut graph, .. } = example();
        let mut removed = graph.backtrack(DecisionLevel(1)).unwrap();
        removed.sort();
        assert_eq!(removed, vec![at(p(3), 2), at(p(4), 2)]);
        assert!(!graph.is_conflict());
        assert!(graph.contains(&at(p(2), 1)));
        assert!(graph.contains(&Node::Conflict));
        assert_eq!(graph.current_conflict_clause(), Err(GraphError::NoConflict));

        let removed = graph.backtrack(DecisionLevel(0)).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn deleted_node_slots_report_errors() {
        let Example { mut graph, .. } = example();
        let x2 = graph.lookup(&at(p(2), 1)).unwrap();
        let x4 = graph.lookup(&at(p(4), 2)).unwrap();
        let root = graph.root;

        assert!(graph.remove_edge(&at(p(1), 1), &at(p(2), 1)));
        assert!(!graph.contains(&at(p(2), 1)));
        assert_eq!(graph.node(x2).err(), Some(GraphError::StaleNode(x2.0)));
        assert!(!graph.unlink(x2, x4));
        assert_eq!(graph.link(root, x2, &Clause::empty()), Err(GraphError::StaleNode(x2.0)));
        assert_eq!(graph.parents(&at(p(4), 2)).unwrap(), vec![at(p(3), 2)]);

        // the freed slot is handed out again
        graph.add_decision_node(p(5), DecisionLevel(3)).unwrap();
        assert_eq!(graph.lookup(&at(p(5), 3)), Ok(x2));
        assert_eq!(graph.node(x2), Ok(&at(p(5), 3)));
    }

    #[test]
    fn first_uip_of_example() {
        let Example { graph, .. } = example();
        assert_eq!(graph.get_first_uip(DecisionLevel(2)).unwrap(), at(p(4), 2));
    }

    #[test]
    fn first_uip_through_diamond() {
        // d -> a, d -> b, a -> u, b -> u, u -> conflict: u dominates, a and b do not
        let c = Clause::new(vec![n(1), p(2)]);
        let mut graph = ImplicationGraph::new();
        graph.add_decision_node(p(1), DecisionLevel(1)).unwrap();
        graph.add_edge(&at(p(1), 1), &at(p(2), 1), &c).unwrap();
        graph.add_edge(&at(p(1), 1), &at(p(3), 1), &c).unwrap();
        graph.add_edge(&at(p(2), 1), &at(p(4), 1), &c).unwrap();
        graph.add_edge(&at(p(3), 1), &at(p(4), 1), &c).unwrap();
        graph.add_edge(&at(p(4), 1), &at(p(5), 1), &c).unwrap();
        graph.add_edge(&at(p(3), 1), &at(p(5), 1), &c).unwrap();
        graph.add_conflict_edge(&at(p(5), 1), &c).unwrap();
        graph.add_conflict_edge(&at(p(4), 1), &c).unwrap();
        assert_eq!(graph.get_first_uip(DecisionLevel(1)).unwrap(), at(p(1), 1));

        let mut graph2 = ImplicationGraph::new();
        graph2.add_decision_node(p(1), DecisionLevel(1)).unwrap();
        graph2.add_edge(&at(p(1), 1), &at(p(2), 1), &c).unwrap();
        graph2.add_edge(&at(p(1), 1), &at(p(3), 1), &c).unwrap();
        graph2.add_edge(&at(p(2), 1), &at(p(4), 1), &c).unwrap();
        graph2.add_edge(&at(p(3), 1), &at(p(4), 1), &c).unwrap();
        graph2.add_conflict_edge(&at(p(4), 1), &c).unwrap();
        assert_eq!(graph2.get_first_uip(DecisionLevel(1)).unwrap(), at(p(4), 1));
    }

    #[test]
    fn first_uip_requires_decision_and_conflict() {
        let Example { mut graph, .. } = example();
        assert_eq!(
            graph.get_first_uip(DecisionLevel(3)),
            Err(GraphError::NoDecision(DecisionLevel(3)))
        );
        let _ = graph.backtrack(DecisionLevel(2)).unwrap();
        assert_eq!(
            graph.get_first_uip(DecisionLevel(2)),
            Err(GraphError::ConflictUnreachable(DecisionLevel(2)))
        );
    }

    #[test]
    fn conflict_edge_needs_existing_node() {
        let Example { mut graph, c3, .. } = example();
        assert_eq!(
            graph.add_conflict_edge(&at(p(9), 1), &c3),
            Err(GraphError::NodeNotFound(at(p(9), 1)))
        );
    }

    #[test]
    fn node_order() {
        let mut nodes = vec![Node::Conflict, at(p(2), 1), at(n(1), 2), Node::Root, at(p(1), 1)];
        nodes.sort();
        assert_eq!(
            nodes,
            vec![Node::Root, at(p(1), 1), at(p(2), 1), at(n(1), 2), Node::Conflict]
        );
    }

    #[test]
    fn display_and_dot() {
        let Example { graph, c2, .. } = example();
        let text = graph.to_string();
        assert!(text.contains("x4@2 with 1 children and 2 parents."));
        assert!(text.ends_with("6 nodes stored."));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        graph.to_dot(file.as_file_mut()).unwrap();
        let mut dot = String::new();
        let _ = file.reopen().unwrap().read_to_string(&mut dot).unwrap();
        assert!(dot.starts_with("digraph implications {"));
        assert!(dot.contains(&format!("[label=\"{}\"]", c2)));
        assert!(dot.contains("label=\"x3@2\",peripheries=2"));
    }
}
