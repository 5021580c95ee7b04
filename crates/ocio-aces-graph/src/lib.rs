//! Conversion graphs and config descriptions for ACES transforms.
//!
//! Builds on the records classified by [`ocio_aces_discover`]:
//! - Connect colour spaces through transforms in a directed graph
//! - Find the shortest conversion path between two colour spaces
//! - Cluster interchangeable transforms into AMF components
//! - Describe and write an OpenColorIO config
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use ocio_aces_discover::{TransformFormat, classify_directory, filter_transforms_default};
//! use ocio_aces_graph::{
//!     AmfOptions, AmfRelations, ConfigSink, ConversionGraph, DescribeOptions, GraphOptions,
//!     YamlSink, describe_graph, generate_components,
//! };
//!
//! let profile = TransformFormat::Ctl.profile();
//! let taxonomy = classify_directory(Path::new("aces-dev/transforms/ctl"), &profile)?;
//! let records = filter_transforms_default(&taxonomy, &profile);
//!
//! let graph = ConversionGraph::build(&records, &GraphOptions::default());
//! let components = generate_components(&records, &AmfRelations::new(), &AmfOptions::default())?;
//! let config = describe_graph(&graph, &components, &DescribeOptions::default());
//!
//! let mut sink = YamlSink::create("config.yaml")?;
//! if sink.validate(&config) {
//!     sink.write(&config)?;
//! }
//! # Ok::<(), ocio_aces_graph::GraphError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod graph;

pub mod amf;
pub mod describe;
pub mod sink;
pub mod validate;

// Re-exports
pub use error::{GraphError, GraphResult};
pub use graph::{
    ConversionGraph, EdgeExport, GraphExport, GraphOptions, NODE_NAME_SEPARATOR, NodeExport,
};
pub use amf::{AmfComponents, AmfHeader, AmfOptions, AmfRelations, generate_components};
pub use describe::{
    ColorspaceDescription, ConfigDescription, DescribeOptions, TransformStep, ViewDescription,
    colorspace_family, describe_graph, enriched_description,
};
pub use sink::{ConfigSink, YamlSink, to_yaml_string};
pub use validate::{Issue, IssueCategory, Severity, check, has_errors, has_warnings, max_severity};
