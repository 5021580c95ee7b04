//! Transform identifier parsing.
//!
//! Two identifier schemes are supported:
//!
//! ```text
//! urn:ampas:aces:transformId:v1.5:ODT.Academy.DCDM.a1.0.3
//! |-------------URN-------------|:|----------ID---------|
//!
//! urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_sRGB-Rec709:1.0
//! |-------------URN-----------|:|----------------ID---------------|
//! ```
//!
//! The first one, `ACEStransformID`, is embedded in the CTL reference
//! implementation; its ID part is dot-delimited. The second one,
//! `CLFtransformID`, is used by CLF transforms; its ID part is
//! colon-delimited with a dotted version.
//!
//! # Example
//!
//! ```
//! use ocio_aces_discover::{TransformId, TransformType};
//!
//! let id = TransformId::parse(
//!     "urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_sRGB-Rec709:1.0",
//! ).unwrap();
//!
//! assert_eq!(id.namespace(), Some("OCIO"));
//! assert_eq!(id.transform_type(), TransformType::Utility);
//! assert_eq!(id.source(), Some("AP0"));
//! assert_eq!(id.target(), Some("sRGB-Rec709"));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{DiscoverError, DiscoverResult};
use crate::patch::patch_aces_transform_id;

/// `ACEStransformID` URN prefix shared by every aces-dev release.
pub const ACES_URN_PREFIX: &str = "urn:ampas:aces:transformId:";

/// `ACEStransformID` URN of the aces-dev v1 transforms.
pub const ACES_URN: &str = "urn:ampas:aces:transformId:v1.5";

/// `ACEStransformID` URN of the aces-dev v2 transforms.
pub const ACES_URN_V2: &str = "urn:ampas:aces:transformId:v2.0";

/// Separator between the URN and the ID part of an `ACEStransformID`.
pub const ACES_URN_SEPARATOR: char = ':';

/// Separator tokenizing the ID part of an `ACEStransformID`.
pub const ACES_ID_SEPARATOR: char = '.';

/// `CLFtransformID` URN.
pub const CLF_URN: &str = "urn:aswf:ocio:transformId:1.0";

/// Separator tokenizing the ID part of a `CLFtransformID`.
pub const CLF_ID_SEPARATOR: char = ':';

/// Separator tokenizing the version of a `CLFtransformID`.
pub const CLF_VERSION_SEPARATOR: char = '.';

/// Namespace of the official A.M.P.A.S. transforms.
pub const ACES_NAMESPACE: &str = "Academy";

/// Namespace of the OCIO authored CLF transforms.
pub const CLF_NAMESPACE: &str = "OCIO";

/// Scene-referred reference colour space.
pub const REFERENCE_SCENE: &str = "ACES2065-1";

/// Output-encoded reference colour space.
pub const REFERENCE_OUTPUT: &str = "OCES";

/// Token standing for the scene-referred reference in transform names.
pub const REFERENCE_TOKEN: &str = "ACES";

/// Name of identity transforms mapping the reference onto itself.
pub const UNITY_NAME: &str = "Unity";

/// Token splitting a transform name into source and target.
pub const NAME_SPLIT_TOKEN: &str = "_to_";

/// Transform kind, constrained to the closed set of known transform types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransformType {
    /// Input Device Transform (aces-dev v1).
    Idt,
    /// Look Modification Transform (aces-dev v1).
    Lmt,
    /// Output Device Transform.
    Odt,
    /// Reference Rendering Transform.
    Rrt,
    /// Combined RRT and ODT.
    RrtOdt,
    /// Inverse RRT.
    InvRrt,
    /// Inverse ODT.
    InvOdt,
    /// Inverse combined RRT and ODT.
    InvRrtOdt,
    /// Shared CTL library.
    AcesLib,
    /// Colour space conversion (aces-dev v1).
    AcesCsc,
    /// Utility (aces-dev v1).
    AcesUtil,
    /// Colour space conversion (aces-dev v2).
    Csc,
    /// Input transform.
    Input,
    /// Output transform (aces-dev v2).
    Output,
    /// Inverse output transform (aces-dev v2).
    InvOutput,
    /// Look (aces-dev v2).
    Look,
    /// Inverse look (aces-dev v2).
    InvLook,
    /// Shared library (aces-dev v2).
    Lib,
    /// Utility.
    Utility,
    /// Empty type token, allowed by `CLFtransformID`.
    Unspecified,
}

/// Transform types allowed in an `ACEStransformID`.
pub const ACES_TYPES: &[TransformType] = &[
    TransformType::Idt,
    TransformType::Lmt,
    TransformType::Odt,
    TransformType::Rrt,
    TransformType::RrtOdt,
    TransformType::InvRrt,
    TransformType::InvOdt,
    TransformType::InvRrtOdt,
    TransformType::AcesLib,
    TransformType::AcesCsc,
    TransformType::AcesUtil,
    TransformType::Csc,
    TransformType::Input,
    TransformType::Output,
    TransformType::InvOutput,
    TransformType::Look,
    TransformType::InvLook,
    TransformType::Lib,
    TransformType::Utility,
];

/// Transform types allowed in a `CLFtransformID`.
pub const CLF_TYPES: &[TransformType] = &[
    TransformType::Unspecified,
    TransformType::Input,
    TransformType::Utility,
];

impl TransformType {
    /// Parses a type token, returning `None` for unknown tokens.
    pub fn parse(s: &str) -> Option<Self> {
        let kind = match s {
            "IDT" => Self::Idt,
            "LMT" => Self::Lmt,
            "ODT" => Self::Odt,
            "RRT" => Self::Rrt,
            "RRTODT" => Self::RrtOdt,
            "InvRRT" => Self::InvRrt,
            "InvODT" => Self::InvOdt,
            "InvRRTODT" => Self::InvRrtOdt,
            "ACESlib" => Self::AcesLib,
            "ACEScsc" => Self::AcesCsc,
            "ACESutil" => Self::AcesUtil,
            "CSC" => Self::Csc,
            "Input" => Self::Input,
            "Output" => Self::Output,
            "InvOutput" => Self::InvOutput,
            "Look" => Self::Look,
            "InvLook" => Self::InvLook,
            "Lib" => Self::Lib,
            "Utility" => Self::Utility,
            "" => Self::Unspecified,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the token used in identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idt => "IDT",
            Self::Lmt => "LMT",
            Self::Odt => "ODT",
            Self::Rrt => "RRT",
            Self::RrtOdt => "RRTODT",
            Self::InvRrt => "InvRRT",
            Self::InvOdt => "InvODT",
            Self::InvRrtOdt => "InvRRTODT",
            Self::AcesLib => "ACESlib",
            Self::AcesCsc => "ACEScsc",
            Self::AcesUtil => "ACESutil",
            Self::Csc => "CSC",
            Self::Input => "Input",
            Self::Output => "Output",
            Self::InvOutput => "InvOutput",
            Self::Look => "Look",
            Self::InvLook => "InvLook",
            Self::Lib => "Lib",
            Self::Utility => "Utility",
            Self::Unspecified => "",
        }
    }

    /// Whether the type denotes the inverse direction of another type.
    #[inline]
    pub fn is_inverse(&self) -> bool {
        self.as_str().starts_with("Inv")
    }
}

impl Serialize for TransformType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for TransformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier scheme an identifier was parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdScheme {
    /// `ACEStransformID`, embedded in CTL transforms.
    Aces,
    /// `CLFtransformID`, embedded in CLF transforms.
    Clf,
}

impl IdScheme {
    /// Returns the tag naming identifiers of this scheme.
    pub fn tag(&self) -> &'static str {
        match self {
            IdScheme::Aces => "ACEStransformID",
            IdScheme::Clf => "CLFtransformID",
        }
    }
}

/// Parsed transform identifier.
///
/// Immutable once parsed. Equality and hashing use the effective identifier,
/// i.e. the string after known upstream defects were patched, so that
/// re-parsing [`TransformId::to_string`] yields an equal value.
#[derive(Debug, Clone)]
pub struct TransformId {
    raw: String,
    id: String,
    scheme: IdScheme,
    urn: String,
    kind: TransformType,
    namespace: Option<String>,
    name: Option<String>,
    major_version: Option<String>,
    minor_version: Option<String>,
    patch_version: Option<String>,
    source: Option<String>,
    target: Option<String>,
}

impl TransformId {
    /// Parses an identifier, selecting the scheme from its URN.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoverError::MalformedIdentifier`] when the URN is unknown
    /// or the identifier violates the grammar of its scheme.
    pub fn parse(raw: &str) -> DiscoverResult<Self> {
        if raw.starts_with(CLF_URN) {
            Self::parse_clf(raw)
        } else if raw.starts_with(ACES_URN_PREFIX) {
            Self::parse_aces(raw)
        } else {
            Err(DiscoverError::malformed(raw, "unknown URN"))
        }
    }

    /// Parses an `ACEStransformID`.
    ///
    /// Known upstream defects are patched before parsing, see
    /// [`patch_aces_transform_id`].
    pub fn parse_aces(raw: &str) -> DiscoverResult<Self> {
        let id = patch_aces_transform_id(raw).into_owned();

        let (urn, components) = id
            .rsplit_once(ACES_URN_SEPARATOR)
            .ok_or_else(|| DiscoverError::malformed(raw, "missing URN separator"))?;

        if urn != ACES_URN && urn != ACES_URN_V2 {
            return Err(DiscoverError::malformed(raw, format!("URN {urn} is invalid")));
        }

        let mut components = components.split(ACES_ID_SEPARATOR);
        let token = components.next().unwrap_or_default();
        let kind = TransformType::parse(token)
            .filter(|kind| ACES_TYPES.contains(kind))
            .ok_or_else(|| DiscoverError::malformed(raw, format!("type '{token}' is invalid")))?;

        let components: Vec<&str> = components.collect();
        if components.iter().any(|c| c.is_empty()) {
            return Err(DiscoverError::malformed(raw, "empty component"));
        }

        fn owned(s: &str) -> Option<String> {
            Some(s.to_string())
        }

        let (namespace, name, major, minor, patch) = match (urn, components.as_slice()) {
            (ACES_URN_V2, [namespace, name, major, minor]) => {
                (owned(namespace), owned(name), owned(major), owned(minor), None)
            }
            (ACES_URN_V2, _) => {
                return Err(DiscoverError::malformed(
                    raw,
                    format!("expected 4 components after type, found {}", components.len()),
                ));
            }
            (_, [major, minor, patch]) => (None, None, owned(major), owned(minor), owned(patch)),
            (_, [name, major, minor, patch])
                if matches!(kind, TransformType::AcesLib | TransformType::AcesUtil) =>
            {
                (None, owned(name), owned(major), owned(minor), owned(patch))
            }
            (_, [namespace, name, major, minor]) => {
                (owned(namespace), owned(name), owned(major), owned(minor), None)
            }
            (_, [namespace, name, major, minor, patch]) => (
                owned(namespace),
                owned(name),
                owned(major),
                owned(minor),
                owned(patch),
            ),
            _ => {
                return Err(DiscoverError::malformed(
                    raw,
                    format!("expected 3 to 5 components after type, found {}", components.len()),
                ));
            }
        };

        let (source, target) = aces_endpoints(kind, name.as_deref());
        let urn = urn.to_string();

        Ok(Self {
            raw: raw.to_string(),
            urn,
            id,
            scheme: IdScheme::Aces,
            kind,
            namespace,
            name,
            major_version: major,
            minor_version: minor,
            patch_version: patch,
            source,
            target,
        })
    }

    /// Parses a `CLFtransformID`.
    pub fn parse_clf(raw: &str) -> DiscoverResult<Self> {
        let components = raw
            .strip_prefix(CLF_URN)
            .ok_or_else(|| DiscoverError::malformed(raw, format!("URN is not {CLF_URN}")))?
            .strip_prefix(CLF_ID_SEPARATOR)
            .ok_or_else(|| DiscoverError::malformed(raw, "missing URN separator"))?;

        let components: Vec<&str> = components.split(CLF_ID_SEPARATOR).collect();
        let [namespace, token, name, version] = components.as_slice() else {
            return Err(DiscoverError::malformed(
                raw,
                format!("expected 4 fields, found {}", components.len()),
            ));
        };

        let kind = TransformType::parse(token)
            .filter(|kind| CLF_TYPES.contains(kind))
            .ok_or_else(|| DiscoverError::malformed(raw, format!("type '{token}' is invalid")))?;

        if version.matches(CLF_VERSION_SEPARATOR).count() != 1 {
            return Err(DiscoverError::malformed(raw, format!("version '{version}' is invalid")));
        }
        let (major, minor) = version
            .split_once(CLF_VERSION_SEPARATOR)
            .ok_or_else(|| DiscoverError::malformed(raw, "version is invalid"))?;

        let (source, target) = split_name(name);

        Ok(Self {
            raw: raw.to_string(),
            id: raw.to_string(),
            scheme: IdScheme::Clf,
            urn: CLF_URN.to_string(),
            kind,
            namespace: Some(namespace.to_string()),
            name: Some(name.to_string()),
            major_version: Some(major.to_string()),
            minor_version: Some(minor.to_string()),
            patch_version: None,
            source,
            target,
        })
    }

    /// Returns the identifier exactly as it was given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the effective identifier, after patching.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Whether the identifier was rewritten by the patch pass.
    pub fn is_patched(&self) -> bool {
        self.raw != self.id
    }

    /// Returns the identifier scheme.
    pub fn scheme(&self) -> IdScheme {
        self.scheme
    }

    /// Returns the URN, e.g. `urn:ampas:aces:transformId:v1.5`.
    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// Returns the transform type.
    pub fn transform_type(&self) -> TransformType {
        self.kind
    }

    /// Returns the namespace, e.g. `Academy`.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the name, e.g. `DCDM`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the major version, e.g. `a1`.
    pub fn major_version(&self) -> Option<&str> {
        self.major_version.as_deref()
    }

    /// Returns the minor version.
    pub fn minor_version(&self) -> Option<&str> {
        self.minor_version.as_deref()
    }

    /// Returns the patch version, only present in some `ACEStransformID`.
    pub fn patch_version(&self) -> Option<&str> {
        self.patch_version.as_deref()
    }

    /// Returns the source colour space.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns the target colour space.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl PartialEq for TransformId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TransformId {}

impl Hash for TransformId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl Serialize for TransformId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

impl FromStr for TransformId {
    type Err = DiscoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn canonical(space: &str) -> String {
    if space == REFERENCE_TOKEN {
        REFERENCE_SCENE.to_string()
    } else {
        space.to_string()
    }
}

/// Splits a `source_to_target` name once on its first `_to_`.
fn split_name(name: &str) -> (Option<String>, Option<String>) {
    if name == UNITY_NAME {
        return (Some(REFERENCE_SCENE.into()), Some(REFERENCE_SCENE.into()));
    }
    match name.split_once(NAME_SPLIT_TOKEN) {
        Some((source, target)) => (Some(canonical(source)), Some(canonical(target))),
        None => (None, None),
    }
}

fn aces_endpoints(kind: TransformType, name: Option<&str>) -> (Option<String>, Option<String>) {
    use TransformType as T;

    let scene = || Some(REFERENCE_SCENE.to_string());
    let output = || Some(REFERENCE_OUTPUT.to_string());

    match (kind, name) {
        (T::Rrt, None) => (scene(), output()),
        (T::InvRrt, None) => (output(), scene()),
        (_, None) => (None, None),
        (T::Look | T::InvLook, Some(_)) => (scene(), scene()),
        (T::Input, Some(name)) if name.contains(NAME_SPLIT_TOKEN) => split_name(name),
        (T::Idt | T::Lmt | T::Input, Some(name)) => (Some(name.into()), scene()),
        (T::Odt, Some(name)) => (output(), Some(name.into())),
        (T::InvOdt, Some(name)) => (Some(name.into()), output()),
        (T::RrtOdt | T::Output, Some(name)) => (scene(), Some(name.into())),
        (T::InvRrtOdt | T::InvOutput, Some(name)) => (Some(name.into()), scene()),
        (_, Some(name)) => split_name(name),
    }
}
