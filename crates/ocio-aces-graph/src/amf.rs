//! AMF components: clusters of related transform identifiers.
//!
//! An ACES Metadata File references transforms by identifier. Transforms
//! that can stand in for one another, e.g. a forward transform and its
//! inverse, or a CTL transform and its CLF counterpart, form a component.
//! Relations come from record siblings and from a declared relation file:
//!
//! ```json
//! {
//!     "header": { "schema_version": "1.0.0" },
//!     "data": {
//!         "urn:ampas:aces:transformId:v1.5:IDT.ARRI.Alexa-v3-logC-EI800.a1.v2": [
//!             "urn:aswf:ocio:transformId:1.0:ARRI:Input:ARRI_LogC3_EI800_to_ACES2065-1:1.0"
//!         ]
//!     }
//! }
//! ```
//!
//! Propagation is a single pass: every identifier and its direct relations
//! become mutually related, but chains longer than two hops are not closed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use ocio_aces_discover::TransformRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{GraphError, GraphResult};

/// Major schema version of supported relation files.
pub const AMF_SCHEMA_MAJOR_VERSION: &str = "1";

/// Identifier to related identifiers mapping, both sorted.
pub type AmfComponents = BTreeMap<String, Vec<String>>;

/// Relation file header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmfHeader {
    /// Semantic version of the file schema.
    pub schema_version: String,
}

/// Declared AMF relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmfRelations {
    /// File header.
    pub header: AmfHeader,
    /// Identifier to related identifiers mapping.
    #[serde(default)]
    pub data: BTreeMap<String, Vec<String>>,
}

impl AmfRelations {
    /// Creates an empty relation set of the supported schema.
    pub fn new() -> Self {
        Self {
            header: AmfHeader {
                schema_version: "1.0.0".into(),
            },
            data: BTreeMap::new(),
        }
    }

    /// Parses a relation file.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnsupportedSchema`] if the schema major version
    /// is not supported.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let relations: Self = serde_json::from_str(json)?;

        let major = relations.header.schema_version.split('.').next().unwrap_or_default();
        if major != AMF_SCHEMA_MAJOR_VERSION {
            return Err(GraphError::UnsupportedSchema {
                version: relations.header.schema_version,
            });
        }

        Ok(relations)
    }

    /// Reads a relation file.
    pub fn from_file(path: &Path) -> GraphResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Declares that `id` relates to `related`.
    pub fn relate(&mut self, id: impl Into<String>, related: impl Into<String>) {
        self.data.entry(id.into()).or_default().push(related.into());
    }
}

impl Default for AmfRelations {
    fn default() -> Self {
        Self::new()
    }
}

/// AMF component generation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmfOptions {
    /// Fail on declared relations without matching transform instead of
    /// logging and skipping them.
    pub raise_exception: bool,
}

/// Builds the AMF components of the given records.
///
/// Relations are keyed by effective transform identifier; declared
/// identifiers also match a record's raw, unpatched identifier.
///
/// # Errors
///
/// With [`AmfOptions::raise_exception`] set, returns
/// [`GraphError::MissingRelation`] for the first declared identifier
/// without matching record.
pub fn generate_components(
    records: &[TransformRecord],
    relations: &AmfRelations,
    options: &AmfOptions,
) -> GraphResult<AmfComponents> {
    let mut known: HashMap<&str, &str> = HashMap::new();
    for record in records {
        let id = record.id();
        known.insert(id.raw(), id.as_str());
        known.insert(id.as_str(), id.as_str());
    }

    let resolve = |id: &str| -> GraphResult<Option<String>> {
        match known.get(id) {
            Some(resolved) => Ok(Some(resolved.to_string())),
            None if options.raise_exception => Err(GraphError::MissingRelation { id: id.to_string() }),
            None => {
                error!(severity = "critical", id, "\"{id}\" does not match any transform!");
                Ok(None)
            }
        }
    };

    let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for record in records {
        for sibling in record.siblings() {
            adjacency
                .entry(record.id().to_string())
                .or_default()
                .insert(sibling.id.to_string());
        }
    }

    for (id, related) in &relations.data {
        let source = resolve(id)?;
        for other in related {
            let target = resolve(other)?;
            if let (Some(source), Some(target)) = (&source, target) {
                adjacency.entry(source.clone()).or_default().insert(target);
            }
        }
    }

    let snapshot = adjacency.clone();
    for (id, related) in snapshot {
        let mut cluster = related;
        cluster.insert(id);
        for member in &cluster {
            let entry = adjacency.entry(member.clone()).or_default();
            entry.extend(cluster.iter().filter(|m| *m != member).cloned());
        }
    }

    let components: AmfComponents = adjacency
        .into_iter()
        .map(|(id, mut related)| {
            related.remove(&id);
            (id, related.into_iter().collect::<Vec<_>>())
        })
        .filter(|(_, related)| !related.is_empty())
        .collect();

    debug!(components = components.len(), "AMF components generated");

    Ok(components)
}
