//! Config sinks persisting a [`ConfigDescription`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::describe::ConfigDescription;
use crate::error::GraphResult;
use crate::validate::{check, has_errors};

/// Destination of a config description.
pub trait ConfigSink {
    /// Value produced by a successful write.
    type Output;

    /// Persists the description.
    fn write(&mut self, config: &ConfigDescription) -> GraphResult<Self::Output>;

    /// Whether the description is free of validation errors.
    fn validate(&self, config: &ConfigDescription) -> bool {
        !has_errors(&check(config))
    }
}

/// Serializes a config description as YAML.
pub fn to_yaml_string(config: &ConfigDescription) -> GraphResult<String> {
    Ok(serde_yaml::to_string(config)?)
}

/// Sink writing YAML to any writer.
#[derive(Debug)]
pub struct YamlSink<W: Write> {
    writer: W,
}

impl<W: Write> YamlSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl YamlSink<BufWriter<File>> {
    /// Creates a sink writing to a new file at `path`.
    pub fn create(path: impl AsRef<Path>) -> GraphResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ConfigSink for YamlSink<W> {
    type Output = usize;

    /// Writes the description and returns the number of bytes written.
    fn write(&mut self, config: &ConfigDescription) -> GraphResult<usize> {
        let yaml = to_yaml_string(config)?;
        self.writer.write_all(yaml.as_bytes())?;
        self.writer.flush()?;
        debug!(
            config = %config.name,
            colorspaces = config.colorspaces.len(),
            "config written"
        );
        Ok(yaml.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{ColorspaceDescription, DescribeOptions};
    use std::collections::BTreeMap;

    fn config() -> ConfigDescription {
        let options = DescribeOptions::default();
        ConfigDescription {
            name: options.name,
            description: options.description,
            reference: "ACES - ACES2065-1".into(),
            roles: BTreeMap::from([("reference".to_string(), "ACES - ACES2065-1".to_string())]),
            colorspaces: vec![ColorspaceDescription {
                name: "ACES - ACES2065-1".into(),
                family: "ACES".into(),
                description: String::new(),
                is_data: false,
                to_reference: Vec::new(),
                from_reference: Vec::new(),
            }],
            displays: Vec::new(),
            views: Vec::new(),
        }
    }

    #[test]
    fn yaml_sink_writes() {
        let mut sink = YamlSink::new(Vec::new());
        let written = sink.write(&config()).unwrap();

        let yaml = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, yaml.len());
        assert!(yaml.contains("name: aces-reference"));
        assert!(yaml.contains("ACES2065-1"));
        assert!(!yaml.contains("to_reference"));
    }

    #[test]
    fn default_validation() {
        let sink = YamlSink::new(Vec::new());
        let mut config = config();
        assert!(sink.validate(&config));

        config.roles.insert("scene_linear".into(), "ACES - ACEScg".into());
        assert!(!sink.validate(&config));
    }

    #[test]
    fn file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut sink = YamlSink::create(&path).unwrap();
        sink.write(&config()).unwrap();
        drop(sink);

        let yaml = std::fs::read_to_string(&path).unwrap();
        assert!(yaml.starts_with("name: aces-reference"));
    }
}
