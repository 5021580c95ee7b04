//! Transform records: one transform file with its parsed header and
//! classification.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::error::DiscoverResult;
use crate::format::TransformFormat;
use crate::header::{HeaderReader, Information, TransformHeader};
use crate::id::{TransformId, TransformType};

/// Lightweight reference to the paired transform of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sibling {
    /// Path of the sibling transform file.
    pub path: PathBuf,
    /// Identifier of the sibling transform.
    pub id: TransformId,
}

/// A transform file with its parsed header and classification.
///
/// Identifier fields are exposed through delegating accessors, e.g.
/// [`TransformRecord::source`]. Two records are equal when their paths are
/// equal.
#[derive(Debug, Clone)]
pub struct TransformRecord {
    path: PathBuf,
    root: Option<PathBuf>,
    format: TransformFormat,
    code: String,
    header: TransformHeader,
    family: String,
    genus: String,
    siblings: Vec<Sibling>,
}

impl TransformRecord {
    /// Creates a record from already parsed parts.
    pub fn new(
        path: impl Into<PathBuf>,
        format: TransformFormat,
        code: impl Into<String>,
        header: TransformHeader,
    ) -> Self {
        Self {
            path: path.into(),
            root: None,
            format,
            code: code.into(),
            header,
            family: String::new(),
            genus: String::new(),
            siblings: Vec::new(),
        }
    }

    /// Reads and parses a transform file.
    pub fn load(path: &Path, reader: &HeaderReader) -> DiscoverResult<Self> {
        let (code, header) = reader.read(path)?;
        Ok(Self::new(path, reader.format(), code, header))
    }

    /// Sets the classification.
    pub fn with_classification(mut self, family: impl Into<String>, genus: impl Into<String>) -> Self {
        self.family = family.into();
        self.genus = genus.into();
        self
    }

    /// Sets the directory paths are displayed relative to.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Records the paired transform of this record.
    pub fn add_sibling(&mut self, sibling: &TransformRecord) {
        self.siblings.push(Sibling {
            path: sibling.path.clone(),
            id: sibling.header.id.clone(),
        });
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path relative to the transforms root, if one was set.
    pub fn relative_path(&self) -> &Path {
        self.root
            .as_deref()
            .and_then(|root| self.path.strip_prefix(root).ok())
            .unwrap_or(self.path.as_path())
    }

    /// Returns the file stem, e.g. `ODT.Academy.DCDM`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Returns the file format.
    pub fn format(&self) -> TransformFormat {
        self.format
    }

    /// Returns the file content.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the parsed header.
    pub fn header(&self) -> &TransformHeader {
        &self.header
    }

    /// Returns the transform identifier.
    pub fn id(&self) -> &TransformId {
        &self.header.id
    }

    /// Returns the user facing name.
    pub fn user_name(&self) -> Option<&str> {
        self.header.user_name.as_deref()
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.header.description
    }

    /// Returns the input descriptor.
    pub fn input_descriptor(&self) -> Option<&str> {
        self.header.input_descriptor.as_deref()
    }

    /// Returns the output descriptor.
    pub fn output_descriptor(&self) -> Option<&str> {
        self.header.output_descriptor.as_deref()
    }

    /// Returns the additional information.
    pub fn information(&self) -> &Information {
        &self.header.information
    }

    /// Returns the family, e.g. `output_transform`.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the genus, e.g. `dcdm`.
    pub fn genus(&self) -> &str {
        &self.genus
    }

    /// Returns the paired transforms.
    pub fn siblings(&self) -> &[Sibling] {
        &self.siblings
    }

    /// Returns the transform type.
    pub fn transform_type(&self) -> TransformType {
        self.header.id.transform_type()
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.header.id.namespace()
    }

    /// Returns the identifier name.
    pub fn name(&self) -> Option<&str> {
        self.header.id.name()
    }

    /// Returns the source colour space.
    pub fn source(&self) -> Option<&str> {
        self.header.id.source()
    }

    /// Returns the target colour space.
    pub fn target(&self) -> Option<&str> {
        self.header.id.target()
    }
}

impl PartialEq for TransformRecord {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for TransformRecord {}

impl Hash for TransformRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Display for TransformRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}('{}')",
            self.format.record_label(),
            self.relative_path().display()
        )
    }
}

/// Forward and inverse transforms of one basename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformPair {
    /// Forward transform.
    pub forward: Option<TransformRecord>,
    /// Inverse transform.
    pub inverse: Option<TransformRecord>,
}

impl TransformPair {
    /// Creates a pair, linking both records as siblings of each other.
    pub fn linked(mut forward: TransformRecord, mut inverse: TransformRecord) -> Self {
        forward.add_sibling(&inverse);
        inverse.add_sibling(&forward);
        Self {
            forward: Some(forward),
            inverse: Some(inverse),
        }
    }

    /// Iterates over the present records, forward first.
    pub fn records(&self) -> impl Iterator<Item = &TransformRecord> {
        self.forward.iter().chain(self.inverse.iter())
    }
}

impl fmt::Display for TransformPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self
            .records()
            .next()
            .map(|r| r.format().record_label())
            .unwrap_or("Transform");
        write!(f, "{label}Pair(")?;
        for (i, record) in [&self.forward, &self.inverse].into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match record {
                Some(record) => write!(f, "{record}")?,
                None => f.write_str("None")?,
            }
        }
        f.write_str(")")
    }
}

/// Taxonomy leaf: a standalone transform or a forward/inverse pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyEntry {
    /// Standalone transform.
    Single(TransformRecord),
    /// Forward and inverse transforms.
    Pair(TransformPair),
}

impl TaxonomyEntry {
    /// Iterates over the records of the entry.
    pub fn records(&self) -> Box<dyn Iterator<Item = &TransformRecord> + '_> {
        match self {
            Self::Single(record) => Box::new(std::iter::once(record)),
            Self::Pair(pair) => Box::new(pair.records()),
        }
    }

    /// Consumes the entry, returning its records.
    pub fn into_records(self) -> Vec<TransformRecord> {
        match self {
            Self::Single(record) => vec![record],
            Self::Pair(pair) => pair.forward.into_iter().chain(pair.inverse).collect(),
        }
    }
}

impl fmt::Display for TaxonomyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(record) => write!(f, "{record}"),
            Self::Pair(pair) => write!(f, "{pair}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Information;

    fn record(path: &str, id: &str) -> TransformRecord {
        let header = TransformHeader {
            id: TransformId::parse(id).unwrap(),
            user_name: None,
            description: String::new(),
            input_descriptor: None,
            output_descriptor: None,
            information: Information::default(),
        };
        TransformRecord::new(path, TransformFormat::Clf, "", header)
    }

    #[test]
    fn equality_by_path() {
        let a = record(
            "/t/utility/AP0_to_AP1.clf",
            "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0",
        );
        let b = record(
            "/t/utility/AP0_to_AP1.clf",
            "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP1_to_AP0:1.0",
        );
        let c = record(
            "/t/utility/other.clf",
            "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0",
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn delegating_accessors() {
        let r = record(
            "/t/utility/AP0_to_AP1.clf",
            "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0",
        )
        .with_classification("Utility", "undefined");

        assert_eq!(r.source(), Some("AP0"));
        assert_eq!(r.target(), Some("AP1"));
        assert_eq!(r.transform_type(), TransformType::Utility);
        assert_eq!(r.namespace(), Some("OCIO"));
        assert_eq!(r.family(), "Utility");
        assert_eq!(r.genus(), "undefined");
        assert_eq!(r.stem(), "AP0_to_AP1");
    }

    #[test]
    fn relative_display() {
        let r = record(
            "/t/utility/AP0_to_AP1.clf",
            "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0",
        );
        assert_eq!(r.to_string(), "CLFTransform('/t/utility/AP0_to_AP1.clf')");

        let r = r.with_root("/t");
        assert_eq!(
            r.to_string(),
            format!("CLFTransform('{}')", Path::new("utility/AP0_to_AP1.clf").display())
        );
    }

    #[test]
    fn linked_pair() {
        let forward = record(
            "/t/AP0_to_AP1.clf",
            "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0",
        );
        let inverse = record(
            "/t/AP1_to_AP0.clf",
            "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP1_to_AP0:1.0",
        );
        let pair = TransformPair::linked(forward, inverse);

        let forward = pair.forward.as_ref().unwrap();
        let inverse = pair.inverse.as_ref().unwrap();
        assert_eq!(forward.siblings()[0].path, inverse.path());
        assert_eq!(&inverse.siblings()[0].id, forward.id());
        assert_eq!(pair.records().count(), 2);
        assert_eq!(TaxonomyEntry::Pair(pair).into_records().len(), 2);
    }
}
