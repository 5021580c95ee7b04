//! Colour space conversion graph.
//!
//! Nodes are colour space names qualified by the transform type that
//! produces or consumes them, e.g. `IDT/Alexa-v3-logC-EI800`, except for the
//! reference colour spaces which stay unqualified. Edges are transforms.
//!
//! ```text
//!   IDT/Alexa-v3-logC-EI800 ──┐
//!                              ├──> ACES2065-1 ──> OCES ──> ODT/DCDM
//!   ACEScsc/ACEScc ───────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ocio_aces_discover::{TransformFormat, classify_directory, filter_transforms_default};
//! use ocio_aces_graph::{ConversionGraph, GraphOptions};
//!
//! let profile = TransformFormat::Ctl.profile();
//! let taxonomy = classify_directory(Path::new("aces-dev/transforms/ctl"), &profile)?;
//! let records = filter_transforms_default(&taxonomy, &profile);
//!
//! let graph = ConversionGraph::build(&records, &GraphOptions::default());
//! for (from, to) in graph.conversion_path("IDT/Alexa-v3-raw-EI800-CCT6500", "ODT/DCDM")? {
//!     println!("{from} -> {to}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;

use ocio_aces_discover::{
    Filterer, REFERENCE_OUTPUT, REFERENCE_SCENE, TransformId, TransformRecord, TransformType,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::debug;

use crate::error::{GraphError, GraphResult};

/// Separator between transform type and colour space in node names.
pub const NODE_NAME_SEPARATOR: &str = "/";

/// Graph construction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// Colour spaces kept unqualified.
    pub reference_nodes: Vec<String>,
    /// Families whose transforms convert toward a reference; those starting
    /// from a reference are skipped.
    pub toward_reference_families: Vec<String>,
    /// Families whose transforms convert from a reference; those ending on
    /// a reference are skipped.
    pub from_reference_families: Vec<String>,
    /// Separator between transform type and colour space.
    pub separator: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            reference_nodes: vec![REFERENCE_SCENE.into(), REFERENCE_OUTPUT.into()],
            toward_reference_families: vec!["csc".into(), "input_transform".into(), "lmt".into()],
            from_reference_families: vec!["output_transform".into()],
            separator: NODE_NAME_SEPARATOR.into(),
        }
    }
}

impl GraphOptions {
    fn is_reference(&self, space: &str) -> bool {
        self.reference_nodes.iter().any(|r| r == space)
    }

    fn qualify(&self, kind: TransformType, space: &str) -> String {
        let node = if self.is_reference(space) {
            space.to_string()
        } else {
            format!("{kind}{}{space}", self.separator)
        };
        match node.strip_prefix("Inv") {
            Some(stripped) => stripped.to_string(),
            None => node,
        }
    }

    /// Returns the `(source, target)` nodes of a record, or `None` if the
    /// record does not belong in the graph.
    pub fn endpoints(&self, record: &TransformRecord) -> Option<(String, String)> {
        let (Some(mut source), Some(mut target)) = (record.source(), record.target()) else {
            debug!(
                "\"{record}\" has either a missing source or target colourspace and won't be \
                 included in the conversion graph!"
            );
            return None;
        };

        let kind = record.transform_type();
        let name = record.name().unwrap_or_default();
        if kind == TransformType::Look && source == REFERENCE_SCENE {
            source = name;
        } else if kind == TransformType::InvLook && target == REFERENCE_SCENE {
            target = name;
        }

        let family = record.family();
        if self.is_reference(source) && self.toward_reference_families.iter().any(|f| f == family) {
            debug!("\"{record}\" starts from a reference colourspace, skipping!");
            return None;
        }
        if self.is_reference(target) && self.from_reference_families.iter().any(|f| f == family) {
            debug!("\"{record}\" ends on a reference colourspace, skipping!");
            return None;
        }

        Some((self.qualify(kind, source), self.qualify(kind, target)))
    }
}

/// Directed graph of colour spaces connected by transforms.
#[derive(Debug, Clone, Default)]
pub struct ConversionGraph {
    graph: DiGraph<String, TransformRecord>,
    index_map: HashMap<String, NodeIndex>,
    records: BTreeMap<String, TransformRecord>,
    options: GraphOptions,
}

impl ConversionGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of the given records.
    ///
    /// Records are visited in path order. A node keeps the record that
    /// first defined it; later definitions are logged and skipped.
    pub fn build(records: &[TransformRecord], options: &GraphOptions) -> Self {
        let mut sorted: Vec<&TransformRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.path().cmp(b.path()));

        let mut graph = Self {
            options: options.clone(),
            ..Self::default()
        };
        for record in sorted {
            let Some((source, target)) = options.endpoints(record) else {
                continue;
            };

            let from = graph.add_node(&source, record);
            let to = graph.add_node(&target, record);
            if graph.graph.find_edge(from, to).is_none() {
                graph.graph.add_edge(from, to, record.clone());
            }
        }

        graph
    }

    fn add_node(&mut self, node: &str, record: &TransformRecord) -> NodeIndex {
        if let Some(&idx) = self.index_map.get(node) {
            if let Some(existing) = self.records.get(node) {
                debug!(
                    "\"{node}\" node was already added to the conversion graph by the \
                     \"{existing}\" transform, skipping!"
                );
            }
            return idx;
        }

        let idx = self.graph.add_node(node.to_string());
        self.index_map.insert(node.to_string(), idx);
        self.records.insert(node.to_string(), record.clone());
        idx
    }

    /// Returns the options the graph was built with.
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the node exists.
    pub fn contains_node(&self, node: &str) -> bool {
        self.index_map.contains_key(node)
    }

    /// Returns the node names, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    /// Returns the `(source, target)` node pairs of all edges, sorted.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .graph
            .edge_references()
            .map(|e| (self.graph[e.source()].as_str(), self.graph[e.target()].as_str()))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Returns the transform of the edge between two nodes.
    pub fn edge_record(&self, from: &str, to: &str) -> Option<&TransformRecord> {
        let edge = self.graph.find_edge(*self.index_map.get(from)?, *self.index_map.get(to)?)?;
        self.graph.edge_weight(edge)
    }

    /// Returns the record that defined a node.
    pub fn node_to_record(&self, node: &str) -> GraphResult<&TransformRecord> {
        self.records.get(node).ok_or_else(|| GraphError::NodeNotFound {
            node: node.to_string(),
        })
    }

    /// Returns the first node, in insertion order, defined by the given
    /// record.
    pub fn record_to_node(&self, record: &TransformRecord) -> Option<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .find(|node| self.records.get(*node) == Some(record))
    }

    /// Returns the nodes whose record is accepted by every filterer.
    pub fn filter_nodes(&self, filterers: &[Filterer]) -> Vec<&str> {
        self.records
            .iter()
            .filter(|(_, record)| filterers.iter().all(|f| f.accepts(record)))
            .map(|(node, _)| node.as_str())
            .collect()
    }

    /// Returns the shortest conversion path between two nodes as
    /// consecutive `(from, to)` edges.
    ///
    /// Neighbours are explored in name order, so ties between paths of
    /// equal length resolve deterministically.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for unknown nodes and
    /// [`GraphError::NoPath`] if `target` is unreachable from `source`.
    pub fn conversion_path(&self, source: &str, target: &str) -> GraphResult<Vec<(String, String)>> {
        let start = self.index(source)?;
        let end = self.index(target)?;

        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut found = start == end;

        while let Some(idx) = queue.pop_front() {
            if found {
                break;
            }
            let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
            neighbors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            neighbors.dedup();

            for next in neighbors {
                if next == start || previous.contains_key(&next) {
                    continue;
                }
                previous.insert(next, idx);
                if next == end {
                    found = true;
                    break;
                }
                queue.push_back(next);
            }
        }

        if !found {
            return Err(GraphError::NoPath {
                from: source.to_string(),
                to: target.to_string(),
            });
        }

        let mut path = Vec::new();
        let mut current = end;
        while let Some(&prev) = previous.get(&current) {
            path.push((self.graph[prev].clone(), self.graph[current].clone()));
            current = prev;
        }
        path.reverse();

        Ok(path)
    }

    fn index(&self, node: &str) -> GraphResult<NodeIndex> {
        self.index_map
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound {
                node: node.to_string(),
            })
    }

    /// Returns a serializable summary of the graph.
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self
                .records
                .iter()
                .map(|(name, record)| NodeExport {
                    name: name.clone(),
                    path: record.path().to_path_buf(),
                    id: record.id().clone(),
                    family: record.family().to_string(),
                    genus: record.genus().to_string(),
                })
                .collect(),
            edges: self
                .edges()
                .into_iter()
                .filter_map(|(source, target)| {
                    let record = self.edge_record(source, target)?;
                    Some(EdgeExport {
                        source: source.to_string(),
                        target: target.to_string(),
                        id: record.id().clone(),
                    })
                })
                .collect(),
        }
    }

    /// Serializes [`ConversionGraph::export`] as pretty printed JSON.
    pub fn export_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }
}

/// Serializable graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeExport {
    /// Node name.
    pub name: String,
    /// Path of the defining transform.
    pub path: PathBuf,
    /// Identifier of the defining transform.
    pub id: TransformId,
    /// Family of the defining transform.
    pub family: String,
    /// Genus of the defining transform.
    pub genus: String,
}

/// Serializable graph edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeExport {
    /// Source node.
    pub source: String,
    /// Target node.
    pub target: String,
    /// Identifier of the transform.
    pub id: TransformId,
}

/// Serializable graph summary for external visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphExport {
    /// Nodes, sorted by name.
    pub nodes: Vec<NodeExport>,
    /// Edges, sorted by source and target.
    pub edges: Vec<EdgeExport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocio_aces_discover::{Information, TransformFormat, TransformHeader};

    fn record(path: &str, id: &str, family: &str) -> TransformRecord {
        let header = TransformHeader {
            id: TransformId::parse(id).unwrap(),
            user_name: None,
            description: String::new(),
            input_descriptor: None,
            output_descriptor: None,
            information: Information::default(),
        };
        TransformRecord::new(path, TransformFormat::Ctl, "", header)
            .with_classification(family, "undefined")
    }

    fn aces(id: &str) -> String {
        format!("urn:ampas:aces:transformId:v1.5:{id}")
    }

    #[test]
    fn qualified_nodes() {
        let options = GraphOptions::default();

        let idt = record("/idt/a.ctl", &aces("IDT.ARRI.LogC.a1.v1"), "input_transform");
        assert_eq!(
            options.endpoints(&idt),
            Some(("IDT/LogC".into(), REFERENCE_SCENE.into()))
        );

        let inv = record("/odt/b.ctl", &aces("InvODT.Academy.DCDM.a1.0.3"), "inverse");
        assert_eq!(
            options.endpoints(&inv),
            Some(("ODT/DCDM".into(), REFERENCE_OUTPUT.into()))
        );
    }

    #[test]
    fn reference_exclusions() {
        let options = GraphOptions::default();

        let csc = record("/csc/a.ctl", &aces("ACEScsc.Academy.ACES_to_ACEScc.a1.0.3"), "csc");
        assert_eq!(options.endpoints(&csc), None);

        let inv = record("/odt/b.ctl", &aces("InvODT.Academy.DCDM.a1.0.3"), "output_transform");
        assert_eq!(options.endpoints(&inv), None);

        let lib = record("/lib/c.ctl", &aces("ACESlib.Utilities.a1.0.3"), "lib");
        assert_eq!(options.endpoints(&lib), None);
    }

    #[test]
    fn looks_use_their_name() {
        let options = GraphOptions::default();
        let look = record(
            "/look/a.ctl",
            "urn:ampas:aces:transformId:v2.0:Look.Academy.ReferenceGamutCompress.a2.v1",
            "look",
        );
        let inverse = record(
            "/look/b.ctl",
            "urn:ampas:aces:transformId:v2.0:InvLook.Academy.ReferenceGamutCompress.a2.v1",
            "look",
        );

        assert_eq!(
            options.endpoints(&look),
            Some(("Look/ReferenceGamutCompress".into(), REFERENCE_SCENE.into()))
        );
        assert_eq!(
            options.endpoints(&inverse),
            Some((REFERENCE_SCENE.into(), "Look/ReferenceGamutCompress".into()))
        );
    }

    #[test]
    fn first_writer_wins() {
        let first = record("/a/first.ctl", &aces("ODT.Academy.DCDM.a1.0.3"), "output_transform");
        let second = record("/b/second.ctl", &aces("ODT.Academy.DCDM.a1.0.3"), "output_transform");

        let graph = ConversionGraph::build(&[second.clone(), first.clone()], &GraphOptions::default());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_to_record("ODT/DCDM").unwrap(), &first);
        assert_eq!(graph.edge_record(REFERENCE_OUTPUT, "ODT/DCDM"), Some(&first));
        assert_eq!(graph.record_to_node(&first), Some("OCES"));
        assert_eq!(graph.record_to_node(&second), None);
    }

    #[test]
    fn record_nodes_follow_insertion_order() {
        let idt = record(
            "/idt/IDT.Vendor.Zeta.ctl",
            &aces("IDT.Vendor.Zeta.a1.v1"),
            "input_transform",
        );
        let odt = record("/odt/ODT.Academy.DCDM.ctl", &aces("ODT.Academy.DCDM.a1.0.3"), "output_transform");

        let graph = ConversionGraph::build(std::slice::from_ref(&idt), &GraphOptions::default());
        assert_eq!(graph.record_to_node(&idt), Some("IDT/Zeta"));

        let graph = ConversionGraph::build(&[odt.clone(), idt.clone()], &GraphOptions::default());
        assert_eq!(graph.record_to_node(&idt), Some("IDT/Zeta"));
        assert_eq!(graph.record_to_node(&odt), Some("OCES"));
    }

    #[test]
    fn unknown_nodes() {
        let graph = ConversionGraph::new();
        assert!(matches!(
            graph.node_to_record("ODT/DCDM"),
            Err(GraphError::NodeNotFound { .. })
        ));
        assert!(matches!(
            graph.conversion_path("A", "B"),
            Err(GraphError::NodeNotFound { .. })
        ));
    }
}
