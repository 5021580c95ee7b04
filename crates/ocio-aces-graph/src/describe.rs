//! Declarative config description built from a conversion graph.
//!
//! The description lists colour spaces, displays, views and roles; turning
//! it into an actual `.ocio` file is the job of a [`crate::ConfigSink`].
//! Each colour space carries the chain of transforms converting it to or
//! from the scene reference, as found by
//! [`ConversionGraph::conversion_path`].

use std::collections::BTreeMap;

use ocio_aces_discover::{REFERENCE_OUTPUT, REFERENCE_SCENE, TransformId, TransformRecord};
use serde::Serialize;
use tracing::{debug, warn};

use crate::amf::AmfComponents;
use crate::error::GraphError;
use crate::graph::ConversionGraph;

/// Separator between family and colour space in colour space names.
pub const COLORSPACE_NAME_SEPARATOR: &str = " - ";

/// Name of the data colour space.
pub const RAW_COLORSPACE: &str = "Utility - Raw";

/// One elementary transform of a conversion chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformStep {
    /// Source node.
    pub from: String,
    /// Target node.
    pub to: String,
    /// Identifier of the transform.
    pub id: TransformId,
    /// Equivalent OCIO builtin transform, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
}

/// A colour space of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorspaceDescription {
    /// Colour space name, e.g. `Input - Alexa-v3-logC-EI800`.
    pub name: String,
    /// Family, e.g. `Input/arri`.
    pub family: String,
    /// Description, enriched with identifiers and AMF components.
    pub description: String,
    /// Whether the colour space holds non-colour data.
    pub is_data: bool,
    /// Transforms converting the colour space to the scene reference.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to_reference: Vec<TransformStep>,
    /// Transforms converting the scene reference to the colour space.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub from_reference: Vec<TransformStep>,
}

impl ColorspaceDescription {
    fn reference(name: &str, description: &str) -> Self {
        Self {
            name: format!("ACES{COLORSPACE_NAME_SEPARATOR}{name}"),
            family: "ACES".into(),
            description: description.into(),
            is_data: false,
            to_reference: Vec::new(),
            from_reference: Vec::new(),
        }
    }

    /// Whether a conversion chain to or from the reference is known.
    pub fn has_reference_chain(&self) -> bool {
        !self.to_reference.is_empty() || !self.from_reference.is_empty()
    }
}

/// A view of a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewDescription {
    /// Display name.
    pub display: String,
    /// View name.
    pub view: String,
    /// Colour space shown by the view.
    pub colorspace: String,
}

/// Declarative OCIO config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDescription {
    /// Config name.
    pub name: String,
    /// Config description.
    pub description: String,
    /// Name of the scene reference colour space.
    pub reference: String,
    /// Role to colour space mapping.
    pub roles: BTreeMap<String, String>,
    /// Colour spaces.
    pub colorspaces: Vec<ColorspaceDescription>,
    /// Active displays, `sRGB` first when present.
    pub displays: Vec<String>,
    /// Views.
    pub views: Vec<ViewDescription>,
}

impl ConfigDescription {
    /// Looks a colour space up by name.
    pub fn colorspace(&self, name: &str) -> Option<&ColorspaceDescription> {
        self.colorspaces.iter().find(|cs| cs.name == name)
    }
}

/// Config description settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeOptions {
    /// Config name.
    pub name: String,
    /// Config description.
    pub description: String,
    /// Families turned into colour spaces, in output order.
    pub families: Vec<String>,
    /// Keep full transform descriptions instead of their first line.
    pub complete_description: bool,
    /// Role to colour space mapping.
    pub roles: BTreeMap<String, String>,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        let reference = format!("ACES{COLORSPACE_NAME_SEPARATOR}{REFERENCE_SCENE}");
        Self {
            name: "aces-reference".into(),
            description: "The \"Academy Color Encoding System\" reference config.".into(),
            families: ["csc", "input_transform", "lmt", "output_transform"]
                .map(String::from)
                .to_vec(),
            complete_description: true,
            roles: BTreeMap::from([
                ("aces_interchange".to_string(), reference.clone()),
                ("reference".to_string(), reference),
                ("scene_linear".to_string(), format!("ACES{COLORSPACE_NAME_SEPARATOR}ACEScg")),
            ]),
        }
    }
}

/// Returns the colour space family of a record.
pub fn colorspace_family(record: &TransformRecord) -> String {
    match record.family() {
        "csc" if record.namespace() == Some("Academy") => "ACES".into(),
        "csc" => "CSC".into(),
        "input_transform" => format!("Input/{}", record.genus()),
        "output_transform" => "Output".into(),
        "lmt" => "LMT".into(),
        other => other.into(),
    }
}

/// Returns the description of a record enriched with its identifier and
/// AMF components.
pub fn enriched_description(
    record: &TransformRecord,
    components: &AmfComponents,
    complete: bool,
) -> String {
    let mut description = if complete {
        record.description().to_string()
    } else {
        record.description().lines().next().unwrap_or_default().to_string()
    };

    if !description.is_empty() {
        description.push_str("\n\n");
    }
    description.push_str(&format!("{}: {}", record.id().scheme().tag(), record.id()));

    if let Some(related) = components.get(record.id().as_str()) {
        description.push_str("\n\nAMF Components\n--------------");
        for id in related {
            description.push('\n');
            description.push_str(id);
        }
    }

    description
}

/// Builds the chain of transforms along the shortest path between nodes.
///
/// Returns an empty chain when the nodes are not connected.
fn chain(graph: &ConversionGraph, from: &str, to: &str) -> Vec<TransformStep> {
    let path = match graph.conversion_path(from, to) {
        Ok(path) => path,
        Err(GraphError::NoPath { .. }) => {
            debug!("no conversion path from \"{from}\" to \"{to}\"");
            return Vec::new();
        }
        Err(e) => {
            warn!("cannot compute conversion path: {e}");
            return Vec::new();
        }
    };

    path.into_iter()
        .filter_map(|(from, to)| {
            let record = graph.edge_record(&from, &to)?;
            Some(TransformStep {
                builtin: record.information().builtin_transform.clone(),
                id: record.id().clone(),
                from,
                to,
            })
        })
        .collect()
}

/// Builds the config description of a conversion graph.
pub fn describe_graph(
    graph: &ConversionGraph,
    components: &AmfComponents,
    options: &DescribeOptions,
) -> ConfigDescription {
    let separator = graph.options().separator.as_str();
    let scene = graph.contains_node(REFERENCE_SCENE);

    let mut colorspaces = vec![
        ColorspaceDescription::reference(
            REFERENCE_SCENE,
            "The \"Academy Color Encoding System\" reference colorspace.",
        ),
        ColorspaceDescription::reference(
            REFERENCE_OUTPUT,
            "The \"Output Color Encoding Specification\" colorspace.",
        ),
    ];
    let mut views = Vec::new();
    let mut displays: Vec<String> = Vec::new();

    for family in &options.families {
        for node in graph.nodes() {
            if graph.options().reference_nodes.iter().any(|r| r == node) {
                continue;
            }
            let Ok(record) = graph.node_to_record(node) else {
                continue;
            };
            if record.family() != family {
                continue;
            }

            let space = node.split_once(separator).map_or(node, |(_, space)| space);
            let colorspace_family = colorspace_family(record);
            let prefix = colorspace_family.split('/').next().unwrap_or_default();
            let name = format!("{prefix}{COLORSPACE_NAME_SEPARATOR}{space}");

            let (to_reference, from_reference) = if scene {
                let to_reference = chain(graph, node, REFERENCE_SCENE);
                let from_reference = if to_reference.is_empty() {
                    chain(graph, REFERENCE_SCENE, node)
                } else {
                    Vec::new()
                };
                (to_reference, from_reference)
            } else {
                (Vec::new(), Vec::new())
            };

            if family == "output_transform" {
                let display = record.genus().to_string();
                if !displays.contains(&display) {
                    displays.push(display.clone());
                }
                views.push(ViewDescription {
                    display,
                    view: space.to_string(),
                    colorspace: name.clone(),
                });
            }

            colorspaces.push(ColorspaceDescription {
                name,
                family: colorspace_family,
                description: enriched_description(record, components, options.complete_description),
                is_data: false,
                to_reference,
                from_reference,
            });
        }
    }

    colorspaces.push(ColorspaceDescription {
        name: RAW_COLORSPACE.into(),
        family: "Utility".into(),
        description: "The utility \"Raw\" colorspace.".into(),
        is_data: true,
        to_reference: Vec::new(),
        from_reference: Vec::new(),
    });

    displays.sort();
    if let Some(position) = displays.iter().position(|d| d == "sRGB") {
        let srgb = displays.remove(position);
        displays.insert(0, srgb);
    }
    views.sort_by(|a, b| (&a.display, &a.view).cmp(&(&b.display, &b.view)));
    for display in &displays {
        views.push(ViewDescription {
            display: display.clone(),
            view: "Raw".into(),
            colorspace: RAW_COLORSPACE.into(),
        });
    }

    ConfigDescription {
        name: options.name.clone(),
        description: options.description.clone(),
        reference: format!("ACES{COLORSPACE_NAME_SEPARATOR}{REFERENCE_SCENE}"),
        roles: options.roles.clone(),
        colorspaces,
        displays,
        views,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocio_aces_discover::{Information, TransformFormat, TransformHeader};

    fn record(id: &str, family: &str, genus: &str, description: &str) -> TransformRecord {
        let header = TransformHeader {
            id: TransformId::parse(id).unwrap(),
            user_name: None,
            description: description.into(),
            input_descriptor: None,
            output_descriptor: None,
            information: Information::default(),
        };
        TransformRecord::new("/a.ctl", TransformFormat::Ctl, "", header).with_classification(family, genus)
    }

    #[test]
    fn families() {
        let aces = record(
            "urn:ampas:aces:transformId:v1.5:ACEScsc.Academy.ACEScc_to_ACES.a1.0.3",
            "csc",
            "ACEScc",
            "",
        );
        let vendor = record(
            "urn:ampas:aces:transformId:v1.5:ACEScsc.Sony.SLog3_to_ACES.a1.v1",
            "csc",
            "sony",
            "",
        );
        let idt = record(
            "urn:ampas:aces:transformId:v1.5:IDT.ARRI.Alexa-v3-logC-EI800.a1.v2",
            "input_transform",
            "arri",
            "",
        );

        assert_eq!(colorspace_family(&aces), "ACES");
        assert_eq!(colorspace_family(&vendor), "CSC");
        assert_eq!(colorspace_family(&idt), "Input/arri");
    }

    #[test]
    fn descriptions() {
        let id = "urn:ampas:aces:transformId:v1.5:ODT.Academy.DCDM.a1.0.3";
        let inverse = "urn:ampas:aces:transformId:v1.5:InvODT.Academy.DCDM.a1.0.3";
        let odt = record(id, "output_transform", "dcdm", "Output - DCDM\nX'Y'Z' encoding.");
        let components = AmfComponents::from([(id.to_string(), vec![inverse.to_string()])]);

        assert_eq!(
            enriched_description(&odt, &AmfComponents::new(), false),
            format!("Output - DCDM\n\nACEStransformID: {id}")
        );
        assert_eq!(
            enriched_description(&odt, &components, true),
            format!(
                "Output - DCDM\nX'Y'Z' encoding.\n\nACEStransformID: {id}\n\n\
                 AMF Components\n--------------\n{inverse}"
            )
        );
    }

    #[test]
    fn empty_graph() {
        let config = describe_graph(
            &ConversionGraph::new(),
            &AmfComponents::new(),
            &DescribeOptions::default(),
        );

        assert_eq!(config.colorspaces.len(), 3);
        assert!(config.colorspace(RAW_COLORSPACE).unwrap().is_data);
        assert!(config.displays.is_empty());
        assert!(config.views.is_empty());
    }
}
