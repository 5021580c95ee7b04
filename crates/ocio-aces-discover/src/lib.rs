//! Discovery and classification of ACES transforms.
//!
//! This crate walks directory trees of aces-dev CTL transforms or CLF
//! transforms and organizes them for OpenColorIO config generation:
//! - Parse `ACEStransformID` and `CLFtransformID` identifiers
//! - Extract transform file headers
//! - Pair forward and inverse transforms
//! - Classify transforms into a family / genus taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use ocio_aces_discover::{Context, TransformFormat, classify_directory, print_taxonomy};
//!
//! let profile = TransformFormat::Ctl.profile();
//! let root = Context::new().transforms_root(&profile);
//!
//! let taxonomy = classify_directory(&root, &profile)?;
//! print_taxonomy(&taxonomy);
//! # Ok::<(), ocio_aces_discover::DiscoverError>(())
//! ```
//!
//! # Identifiers
//!
//! ```
//! use ocio_aces_discover::TransformId;
//!
//! let id = TransformId::parse("urn:ampas:aces:transformId:v1.5:ODT.Academy.DCDM.a1.0.3")?;
//! assert_eq!(id.source(), Some("OCES"));
//! assert_eq!(id.target(), Some("DCDM"));
//! # Ok::<(), ocio_aces_discover::DiscoverError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod context;
mod discover;
mod record;
mod utilities;

pub mod classify;
pub mod format;
pub mod header;
pub mod id;
pub mod pairs;
pub mod patch;

// Re-exports
pub use error::{DiscoverError, DiscoverResult};
pub use context::Context;
pub use discover::{Discovered, discover};
pub use record::{Sibling, TaxonomyEntry, TransformPair, TransformRecord};
pub use utilities::{message_box, paths_common_ancestor};
pub use classify::{
    Taxonomy, TransformSource,
    classify, classify_directory, unclassify,
    filter_transforms, filter_transforms_default,
    format_taxonomy, print_taxonomy,
};
pub use format::{DEFAULT_GENUS, Filterer, FormatProfile, TransformFormat, exclude_arri_idts};
pub use header::{HeaderReader, Information, TransformHeader};
pub use id::{
    IdScheme, TransformId, TransformType,
    REFERENCE_OUTPUT, REFERENCE_SCENE,
};
pub use pairs::{AcesNamingConvention, NamingConvention, PairSide, Pairing, PathPair};
pub use patch::patch_aces_transform_id;
