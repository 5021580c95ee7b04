//! Transform file header extraction.
//!
//! CTL transforms carry their metadata in the leading `//` comment block:
//!
//! ```text
//! // <ACEStransformID>urn:ampas:aces:transformId:v1.5:ODT.Academy.DCDM.a1.0.3</ACEStransformID>
//! // <ACESuserName>ACES 1.0 Output - DCDM</ACESuserName>
//! //
//! // Output Device Transform - DCDM (X'Y'Z')
//! ```
//!
//! CLF transforms are XML documents whose `ProcessList` root carries the
//! `CLFtransformID` in its `id` attribute:
//!
//! ```xml
//! <ProcessList id="urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0"
//!              name="AP0 to AP1" compCLFversion="3.0">
//!     <Description>Convert ACES2065-1 to ACEScg</Description>
//!     <InputDescriptor>ACES2065-1</InputDescriptor>
//!     <OutputDescriptor>ACEScg</OutputDescriptor>
//!     <Info>
//!         <ACEStransformID>urn:ampas:aces:transformId:v1.5:ACEScsc.Academy.ACES_to_ACEScg.a1.0.3</ACEStransformID>
//!         <BuiltinTransform>ACES-AP0_to_AP1</BuiltinTransform>
//!     </Info>
//! </ProcessList>
//! ```

use std::fmt;
use std::fs;
use std::io::BufRead;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use regex::Regex;

use crate::error::{DiscoverError, DiscoverResult};
use crate::format::{FormatProfile, TransformFormat};
use crate::id::TransformId;

/// Optional `Info` element content of a CLF transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Information {
    /// `ACEStransformID` of the CTL transform the CLF was derived from.
    pub aces_transform_id: Option<TransformId>,
    /// Name of the equivalent OCIO builtin transform.
    pub builtin_transform: Option<String>,
}

/// Metadata extracted from a transform file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformHeader {
    /// Transform identifier.
    pub id: TransformId,
    /// User facing name.
    pub user_name: Option<String>,
    /// Free text description.
    pub description: String,
    /// Input descriptor, CLF only.
    pub input_descriptor: Option<String>,
    /// Output descriptor, CLF only.
    pub output_descriptor: Option<String>,
    /// Additional information, CLF only.
    pub information: Information,
}

/// Returns the text enclosed by `<tag>` and the last `</tag>` of a line.
fn tag_content<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = line.find(&open)? + open.len();
    let end = line.rfind(&close)?;
    line.get(start..end)
}

/// Reads transform file headers of one format.
///
/// Description substitution patterns are compiled once on construction.
#[derive(Debug, Clone)]
pub struct HeaderReader {
    format: TransformFormat,
    patterns: Vec<(Regex, String)>,
}

impl HeaderReader {
    /// Creates a reader for the given profile.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoverError::InvalidPattern`] if a description pattern
    /// does not compile.
    pub fn new(profile: &FormatProfile) -> DiscoverResult<Self> {
        let patterns = profile
            .description_patterns
            .iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, replacement.clone())))
            .collect::<DiscoverResult<Vec<_>>>()?;

        Ok(Self {
            format: profile.format,
            patterns,
        })
    }

    /// Returns the format this reader parses.
    pub fn format(&self) -> TransformFormat {
        self.format
    }

    /// Reads a transform file, returning its content and parsed header.
    pub fn read(&self, path: &Path) -> DiscoverResult<(String, TransformHeader)> {
        let code = fs::read_to_string(path).map_err(|source| DiscoverError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let header = match self.format {
            TransformFormat::Ctl => self.parse_ctl(path, &code)?,
            TransformFormat::Clf => parse_clf(path, code.as_bytes())?,
        };

        Ok((code, header))
    }

    /// Parses the leading comment block of a CTL transform.
    pub fn parse_ctl(&self, path: &Path, code: &str) -> DiscoverResult<TransformHeader> {
        let mut id = None;
        let mut user_name = None;
        let mut description = String::new();

        for line in code.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(raw) = tag_content(line, "ACEStransformID") {
                id = Some(TransformId::parse(raw)?);
                continue;
            }

            if let Some(name) = tag_content(line, "ACESuserName") {
                user_name = Some(name.to_string());
                continue;
            }

            let Some(comment) = line.strip_prefix("//") else {
                break;
            };

            let mut comment = comment.trim().to_string();
            for (pattern, replacement) in &self.patterns {
                comment = pattern.replace_all(&comment, replacement.as_str()).into_owned();
            }
            description.push_str(&comment);
            description.push('\n');
        }

        let id = id.ok_or_else(|| DiscoverError::MissingIdentifier {
            path: path.to_path_buf(),
        })?;

        Ok(TransformHeader {
            id,
            user_name,
            description: description.trim().to_string(),
            input_descriptor: None,
            output_descriptor: None,
            information: Information::default(),
        })
    }
}

fn xml_error(path: &Path, reason: impl fmt::Display) -> DiscoverError {
    DiscoverError::Xml {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_root_attributes(
    path: &Path,
    e: &BytesStart<'_>,
    id: &mut Option<String>,
    name: &mut Option<String>,
) -> DiscoverResult<()> {
    for attr in e.attributes().flatten() {
        let slot = match attr.key.as_ref() {
            b"id" => &mut *id,
            b"name" => &mut *name,
            _ => continue,
        };
        let value = attr.unescape_value().map_err(|e| xml_error(path, e))?;
        *slot = Some(value.into_owned());
    }
    Ok(())
}

/// Appends the replacement text of a character or predefined entity
/// reference. Unknown entities are kept verbatim.
fn push_reference(path: &Path, e: &BytesRef<'_>, text: &mut String) -> DiscoverResult<()> {
    if let Some(ch) = e.resolve_char_ref().map_err(|e| xml_error(path, e))? {
        text.push(ch);
        return Ok(());
    }

    let entity = e.decode().map_err(|e| xml_error(path, e))?;
    match resolve_predefined_entity(&entity) {
        Some(value) => text.push_str(value),
        None => {
            text.push('&');
            text.push_str(&entity);
            text.push(';');
        }
    }
    Ok(())
}

/// Parses the `ProcessList` metadata of a CLF document.
///
/// Only first-level `Description`, `InputDescriptor`, `OutputDescriptor`
/// and `Info` elements are considered; process nodes are skipped. Entity
/// references are resolved and element text is trimmed once complete.
pub fn parse_clf<R: BufRead>(path: &Path, reader: R) -> DiscoverResult<TransformHeader> {
    let mut xml = Reader::from_reader(reader);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();

    let mut id = None;
    let mut user_name = None;
    let mut description = None;
    let mut input_descriptor = None;
    let mut output_descriptor = None;
    let mut information = Information::default();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) => {
                if stack.is_empty() && e.name().as_ref() == b"ProcessList" {
                    read_root_attributes(path, e, &mut id, &mut user_name)?;
                }
            }
            Ok(Event::Start(ref e)) => {
                if stack.is_empty() && e.name().as_ref() == b"ProcessList" {
                    read_root_attributes(path, e, &mut id, &mut user_name)?;
                }
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                text.clear();
            }
            Ok(Event::Text(ref e)) => {
                text.push_str(&e.decode().map_err(|e| xml_error(path, e))?);
            }
            Ok(Event::GeneralRef(ref e)) => push_reference(path, e, &mut text)?,
            Ok(Event::End(_)) => {
                let value = std::mem::take(&mut text).trim().to_string();
                let scope: Vec<&str> = stack.iter().map(String::as_str).collect();
                match scope.as_slice() {
                    ["ProcessList", "Description"] if description.is_none() => {
                        description = Some(value);
                    }
                    ["ProcessList", "InputDescriptor"] if input_descriptor.is_none() => {
                        input_descriptor = Some(value);
                    }
                    ["ProcessList", "OutputDescriptor"] if output_descriptor.is_none() => {
                        output_descriptor = Some(value);
                    }
                    ["ProcessList", "Info", "ACEStransformID"]
                        if information.aces_transform_id.is_none() =>
                    {
                        information.aces_transform_id = Some(TransformId::parse_aces(&value)?);
                    }
                    ["ProcessList", "Info", "BuiltinTransform"]
                        if information.builtin_transform.is_none() =>
                    {
                        information.builtin_transform = Some(value);
                    }
                    _ => {}
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(path, e)),
            _ => {}
        }
        buf.clear();
    }

    let id = id.ok_or_else(|| DiscoverError::MissingIdentifier {
        path: path.to_path_buf(),
    })?;

    Ok(TransformHeader {
        id: TransformId::parse_clf(&id)?,
        user_name,
        description: description.unwrap_or_default(),
        input_descriptor,
        output_descriptor,
        information,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TransformType;

    const ODT_DCDM: &str = r#"
// <ACEStransformID>urn:ampas:aces:transformId:v1.5:ODT.Academy.DCDM.a1.0.3</ACEStransformID>
// <ACESuserName>ACES 1.0 Output - DCDM</ACESuserName>

//
// Output Device Transform - DCDM (X'Y'Z')
//
// ============ CONSTANTS ============ //

import "ACESlib.Utilities";
// Not part of the header.
"#;

    fn ctl_reader() -> HeaderReader {
        HeaderReader::new(&TransformFormat::Ctl.profile()).unwrap()
    }

    #[test]
    fn ctl_header() {
        let header = ctl_reader().parse_ctl(Path::new("ODT.Academy.DCDM.ctl"), ODT_DCDM).unwrap();

        assert_eq!(header.id.transform_type(), TransformType::Odt);
        assert_eq!(header.user_name.as_deref(), Some("ACES 1.0 Output - DCDM"));
        assert_eq!(header.description, "Output Device Transform - DCDM (X'Y'Z')");
        assert!(header.input_descriptor.is_none());
    }

    #[test]
    fn ctl_without_identifier() {
        let err = ctl_reader()
            .parse_ctl(Path::new("broken.ctl"), "// Just a comment\nvoid main() {}")
            .unwrap_err();
        assert!(matches!(err, DiscoverError::MissingIdentifier { .. }));
    }

    #[test]
    fn ctl_malformed_identifier() {
        let code = "// <ACEStransformID>urn:ampas:aces:transformId:v1.5:XYZ.a.b.c</ACEStransformID>";
        let err = ctl_reader().parse_ctl(Path::new("bad.ctl"), code).unwrap_err();
        assert!(matches!(err, DiscoverError::MalformedIdentifier { .. }));
    }

    #[test]
    fn invalid_description_pattern() {
        let mut profile = TransformFormat::Ctl.profile();
        profile.description_patterns.push(("(unclosed".into(), String::new()));
        assert!(matches!(
            HeaderReader::new(&profile),
            Err(DiscoverError::InvalidPattern(_))
        ));
    }

    #[test]
    fn clf_header() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ProcessList id="urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0" name="AP0 to AP1" compCLFversion="3.0">
    <Description>Convert ACES2065-1 to ACEScg</Description>
    <Description>Second description is ignored</Description>
    <InputDescriptor>ACES2065-1</InputDescriptor>
    <OutputDescriptor>ACEScg</OutputDescriptor>
    <Info>
        <ACEStransformID>urn:ampas:aces:transformId:v1.5:ACEScsc.Academy.ACES_to_ACEScg.a1.0.3</ACEStransformID>
        <BuiltinTransform>ACES-AP0_to_AP1</BuiltinTransform>
    </Info>
    <Matrix inBitDepth="32f" outBitDepth="32f">
        <Description>Node description</Description>
        <Array dim="3 3">1 0 0 0 1 0 0 0 1</Array>
    </Matrix>
</ProcessList>
"#;
        let header = parse_clf(Path::new("AP0_to_AP1.clf"), xml.as_bytes()).unwrap();

        assert_eq!(header.id.source(), Some("AP0"));
        assert_eq!(header.id.target(), Some("AP1"));
        assert_eq!(header.user_name.as_deref(), Some("AP0 to AP1"));
        assert_eq!(header.description, "Convert ACES2065-1 to ACEScg");
        assert_eq!(header.input_descriptor.as_deref(), Some("ACES2065-1"));
        assert_eq!(header.output_descriptor.as_deref(), Some("ACEScg"));
        assert_eq!(
            header.information.builtin_transform.as_deref(),
            Some("ACES-AP0_to_AP1")
        );
        let aces = header.information.aces_transform_id.unwrap();
        assert_eq!(aces.transform_type(), TransformType::AcesCsc);
        assert_eq!(aces.target(), Some("ACEScg"));
    }

    #[test]
    fn clf_entities() {
        let xml = r#"<ProcessList id="urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_AP1:1.0" name="a &amp; b">
    <Description>
        ACES &amp; ACEScg &lt;linear&gt; &#x41;P1
    </Description>
    <InputDescriptor>ACES2065-1 &quot;AP0&quot;</InputDescriptor>
</ProcessList>"#;
        let header = parse_clf(Path::new("AP0_to_AP1.clf"), xml.as_bytes()).unwrap();

        assert_eq!(header.user_name.as_deref(), Some("a & b"));
        assert_eq!(header.description, "ACES & ACEScg <linear> AP1");
        assert_eq!(header.input_descriptor.as_deref(), Some("ACES2065-1 \"AP0\""));
    }

    #[test]
    fn clf_without_identifier() {
        let xml = r#"<ProcessList name="nameless"><Description>x</Description></ProcessList>"#;
        let err = parse_clf(Path::new("nameless.clf"), xml.as_bytes()).unwrap_err();
        assert!(matches!(err, DiscoverError::MissingIdentifier { .. }));
    }

    #[test]
    fn clf_broken_xml() {
        let xml = r#"<ProcessList id="x"><Description>x</Info></ProcessList>"#;
        let err = parse_clf(Path::new("broken.clf"), xml.as_bytes()).unwrap_err();
        assert!(matches!(err, DiscoverError::Xml { .. }));
    }
}
