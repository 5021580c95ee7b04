//! Transform file formats and their classification profiles.
//!
//! A [`FormatProfile`] gathers everything discovery and classification need
//! to know about one format: file extension, directory to family mapping,
//! default genus, description clean-up patterns and default filterers.
//! Profiles are plain values; callers adjust them before classification
//! instead of mutating any global state.
//!
//! # Example
//!
//! ```
//! use ocio_aces_discover::TransformFormat;
//!
//! let mut profile = TransformFormat::Ctl.profile();
//! profile.families.insert("vendorSupplied".into(), "vendor".into());
//!
//! assert_eq!(profile.family_for("idt"), "input_transform");
//! assert_eq!(profile.family_for("vendorSupplied"), "vendor");
//! assert_eq!(profile.family_for("unmapped"), "unmapped");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::pairs::{AcesNamingConvention, Pairing};
use crate::record::TransformRecord;

/// Default genus of transforms living directly in a family directory.
pub const DEFAULT_GENUS: &str = "undefined";

/// Transform file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransformFormat {
    /// aces-dev Colour Transformation Language reference implementation.
    Ctl,
    /// Common LUT Format.
    Clf,
}

impl TransformFormat {
    /// Returns the lowercase file extension, without dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ctl => "ctl",
            Self::Clf => "clf",
        }
    }

    /// Returns the name used when displaying records of this format.
    pub fn record_label(&self) -> &'static str {
        match self {
            Self::Ctl => "CTLTransform",
            Self::Clf => "CLFTransform",
        }
    }

    /// Builds the default profile of this format.
    pub fn profile(&self) -> FormatProfile {
        match self {
            Self::Ctl => FormatProfile {
                format: *self,
                families: table(&[
                    ("csc", "csc"),
                    ("idt", "input_transform"),
                    ("lib", "lib"),
                    ("lmt", "lmt"),
                    ("odt", "output_transform"),
                    ("outputTransforms", "output_transform"),
                    ("rrt", "rrt"),
                    ("utilities", "utility"),
                ]),
                default_genus: DEFAULT_GENUS.to_string(),
                description_patterns: vec![
                    (r"============ CONSTANTS ============ //".into(), String::new()),
                    (r"Written by .*_IDT_maker\.py v.* on .*".into(), String::new()),
                ],
                root_env: "OPENCOLORIO_CONFIG_ACES__ACES_CTL_TRANSFORMS_ROOT",
                default_root: PathBuf::from("aces-dev/transforms/ctl"),
                pairing: Pairing::Convention(Arc::new(AcesNamingConvention)),
                filterers: vec![Filterer::new(exclude_arri_idts)],
            },
            Self::Clf => FormatProfile {
                format: *self,
                families: table(&[("input", "Input"), ("utility", "Utility")]),
                default_genus: DEFAULT_GENUS.to_string(),
                description_patterns: Vec::new(),
                root_env: "OPENCOLORIO_CONFIG_ACES__CLF_TRANSFORMS_ROOT",
                default_root: PathBuf::from("transforms/clf"),
                pairing: Pairing::Reciprocal,
                filterers: Vec::new(),
            },
        }
    }
}

impl fmt::Display for TransformFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ctl => "CTL",
            Self::Clf => "CLF",
        })
    }
}

fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Predicate deciding whether a transform record is kept.
#[derive(Clone)]
pub struct Filterer(Arc<dyn Fn(&TransformRecord) -> bool + Send + Sync>);

impl Filterer {
    /// Wraps a predicate.
    pub fn new(predicate: impl Fn(&TransformRecord) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Whether the record passes the predicate.
    #[inline]
    pub fn accepts(&self, record: &TransformRecord) -> bool {
        (self.0)(record)
    }
}

impl fmt::Debug for Filterer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filterer(..)")
    }
}

/// Excludes the ARRI Alexa IDTs except the `Alexa-v3-raw-EI800` variants
/// without ND filter.
pub fn exclude_arri_idts(record: &TransformRecord) -> bool {
    let path = record.path().to_string_lossy();

    if !path.contains("Alexa") {
        return true;
    }

    path.contains("Alexa-v3-raw-EI800") && !path.contains("ND1pt3")
}

/// Discovery and classification settings for one transform format.
#[derive(Debug, Clone)]
pub struct FormatProfile {
    /// Format the profile applies to.
    pub format: TransformFormat,
    /// Directory name to family name mapping; unmapped names pass through.
    pub families: BTreeMap<String, String>,
    /// Genus given to transforms without sub-directory.
    pub default_genus: String,
    /// Regex and replacement pairs applied to every description line.
    pub description_patterns: Vec<(String, String)>,
    /// Environment variable overriding the root directory.
    pub root_env: &'static str,
    /// Root directory used when the environment variable is unset.
    pub default_root: PathBuf,
    /// Forward and inverse pairing strategy.
    pub pairing: Pairing,
    /// Filterers applied by [`crate::filter_transforms_default`].
    pub filterers: Vec<Filterer>,
}

impl FormatProfile {
    /// Maps a directory name to its family name.
    pub fn family_for<'a>(&'a self, directory: &'a str) -> &'a str {
        self.families
            .get(directory)
            .map(String::as_str)
            .unwrap_or(directory)
    }
}
