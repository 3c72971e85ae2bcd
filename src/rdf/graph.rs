//! Graphs, datasets and blank node allocation.

use crate::rdf::{BlankNode, Iri, Subject, Term, Triple};
use crate::vocab::trellis;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Set of triples with deterministic iteration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple; returns false if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples using `predicate`, in graph order.
    pub fn with_predicate<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| t.predicate == predicate)
    }

    /// Objects of `(subject, predicate, ?o)`.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Subject,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Remove every triple matching the predicate closure.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Triple) -> bool,
    {
        self.triples.retain(keep);
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Graph {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

/// Dataset partition key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphName {
    Default,
    Named(Iri),
}

impl GraphName {
    pub fn user_managed() -> Self {
        GraphName::Named(Iri::new(trellis::PREFER_USER_MANAGED))
    }

    pub fn server_managed() -> Self {
        GraphName::Named(Iri::new(trellis::PREFER_SERVER_MANAGED))
    }

    pub fn audit() -> Self {
        GraphName::Named(Iri::new(trellis::PREFER_AUDIT))
    }
}

/// Named-graph partitioned triples.
///
/// The user-managed graph holds client triples; the server-managed graph holds
/// type, containment and membership triples and is only written by the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    graphs: BTreeMap<GraphName, Graph>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset whose user-managed graph is `graph`.
    pub fn from_user_graph(graph: Graph) -> Self {
        let mut dataset = Dataset::new();
        dataset.set_graph(GraphName::user_managed(), graph);
        dataset
    }

    pub fn graph(&self, name: &GraphName) -> Option<&Graph> {
        self.graphs.get(name)
    }

    pub fn graph_mut(&mut self, name: GraphName) -> &mut Graph {
        self.graphs.entry(name).or_default()
    }

    pub fn set_graph(&mut self, name: GraphName, graph: Graph) {
        if graph.is_empty() {
            self.graphs.remove(&name);
        } else {
            self.graphs.insert(name, graph);
        }
    }

    /// User-managed triples (empty graph if absent).
    pub fn user_graph(&self) -> Graph {
        self.graph(&GraphName::user_managed())
            .cloned()
            .unwrap_or_default()
    }

    pub fn server_graph(&self) -> Graph {
        self.graph(&GraphName::server_managed())
            .cloned()
            .unwrap_or_default()
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &GraphName> {
        self.graphs.keys()
    }

    /// Quads in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&GraphName, &Triple)> {
        self.graphs
            .iter()
            .flat_map(|(name, graph)| graph.iter().map(move |t| (name, t)))
    }

    pub fn len(&self) -> usize {
        self.graphs.values().map(Graph::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.values().all(Graph::is_empty)
    }
}

/// Blank node allocator scoped to a single parse or write operation.
///
/// Labels are interned per arena: the same label yields the same handle within
/// one arena and never collides with a handle from another arena.
#[derive(Debug)]
pub struct BlankNodeArena {
    scope: u64,
    next: u32,
    labels: HashMap<String, BlankNode>,
}

impl BlankNodeArena {
    pub fn with_scope(scope: u64) -> Self {
        Self {
            scope,
            next: 0,
            labels: HashMap::new(),
        }
    }

    pub fn scope(&self) -> u64 {
        self.scope
    }

    /// Allocate a fresh, unlabeled blank node.
    pub fn fresh(&mut self) -> BlankNode {
        let node = BlankNode::new(self.scope, self.next);
        self.next += 1;
        node
    }

    /// Handle for a document-local label such as `_:b0`.
    pub fn labeled(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.labels.get(label) {
            return *node;
        }
        let node = self.fresh();
        self.labels.insert(label.to_string(), node);
        node
    }

    pub fn len(&self) -> usize {
        self.next as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }
}

/// Hands out arena scopes, one per arena.
///
/// A source seeded with [`new`](Self::new) starts from the clock and process
/// id, so blank nodes persisted by an earlier run never alias fresh ones.
#[derive(Debug)]
pub struct ScopeSource {
    next: AtomicU64,
}

impl ScopeSource {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::starting_at(nanos ^ ((std::process::id() as u64) << 32))
    }

    pub fn starting_at(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }

    /// Empty arena with a scope no earlier arena from this source used.
    pub fn arena(&self) -> BlankNodeArena {
        BlankNodeArena::with_scope(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ScopeSource {
    fn default() -> Self {
        Self::new()
    }
}
