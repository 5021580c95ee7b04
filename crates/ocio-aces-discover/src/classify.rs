//! Transform classification into a family / genus taxonomy.
//!
//! Directories relative to the common ancestor of all discovered
//! directories give the classification: the first component, mapped through
//! the profile's family table, is the family and the remaining components
//! joined by `/` form the genus.
//!
//! ```text
//! transforms/ctl/idt/vendorSupplied/arri/alexa/IDT.ARRI.Alexa-v3-logC-EI800.ctl
//!                |-|-------- genus ----------|
//!               family
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ocio_aces_discover::{classify, discover, filter_transforms, TransformFormat};
//!
//! let profile = TransformFormat::Clf.profile();
//! let discovered = discover(Path::new("transforms/clf"), profile.format)?;
//! let taxonomy = classify(&discovered, &profile)?;
//!
//! for record in filter_transforms(&taxonomy, &profile.filterers) {
//!     println!("{record}: {:?} -> {:?}", record.source(), record.target());
//! }
//! # Ok::<(), ocio_aces_discover::DiscoverError>(())
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::discover::{Discovered, discover};
use crate::error::DiscoverResult;
use crate::format::{Filterer, FormatProfile};
use crate::header::HeaderReader;
use crate::pairs::PathPair;
use crate::record::{TaxonomyEntry, TransformPair, TransformRecord};
use crate::utilities::{message_box, paths_common_ancestor};

/// Basename to entry mapping of one genus.
pub type Genus = BTreeMap<String, TaxonomyEntry>;

/// Genus name to genus mapping of one family.
pub type Family = BTreeMap<String, Genus>;

/// Family name to family mapping.
pub type Taxonomy = BTreeMap<String, Family>;

/// Computes the family and genus of a directory.
fn classification(directory: &Path, root: &Path, profile: &FormatProfile) -> (String, String) {
    let relative = match directory.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative,
        _ => Path::new(root.file_name().unwrap_or(root.as_os_str())),
    };

    let mut parts = relative
        .components()
        .map(|c| profile.family_for(&c.as_os_str().to_string_lossy()).to_string());

    let family = parts.next().unwrap_or_default();
    let genus: Vec<String> = parts.collect();
    let genus = if genus.is_empty() {
        profile.default_genus.clone()
    } else {
        genus.join("/")
    };

    (family, genus)
}

/// Classifies discovered transforms.
///
/// Every file is read and parsed; forward and inverse transforms are paired
/// with the profile's pairing strategy and linked as siblings.
///
/// # Errors
///
/// The first file that cannot be read or whose identifier is malformed
/// aborts classification.
pub fn classify(discovered: &Discovered, profile: &FormatProfile) -> DiscoverResult<Taxonomy> {
    let reader = HeaderReader::new(profile)?;
    let root = paths_common_ancestor(discovered.keys().map(PathBuf::as_path));

    let load = |path: &Path, family: &str, genus: &str| -> DiscoverResult<TransformRecord> {
        Ok(TransformRecord::load(path, &reader)?
            .with_classification(family, genus)
            .with_root(&root))
    };

    let mut taxonomy = Taxonomy::new();
    for (directory, files) in discovered {
        let (family, genus) = classification(directory, &root, profile);

        for (basename, pair) in profile.pairing.find_pairs(files) {
            let entry = match pair {
                PathPair {
                    forward: Some(forward),
                    inverse: Some(inverse),
                } => TaxonomyEntry::Pair(TransformPair::linked(
                    load(&forward, &family, &genus)?,
                    load(&inverse, &family, &genus)?,
                )),
                PathPair {
                    forward: Some(path),
                    inverse: None,
                }
                | PathPair {
                    forward: None,
                    inverse: Some(path),
                } => TaxonomyEntry::Single(load(&path, &family, &genus)?),
                PathPair {
                    forward: None,
                    inverse: None,
                } => continue,
            };

            debug!("Classifying \"{entry}\" under \"{genus}\".");

            taxonomy
                .entry(family.clone())
                .or_default()
                .entry(genus.clone())
                .or_default()
                .insert(basename, entry);
        }
    }

    Ok(taxonomy)
}

/// Discovers and classifies the transforms under `root`.
pub fn classify_directory(root: &Path, profile: &FormatProfile) -> DiscoverResult<Taxonomy> {
    classify(&discover(root, profile.format)?, profile)
}

/// Flattens a taxonomy, expanding pairs into their records.
///
/// Records are returned in family, genus and basename order, forward
/// transforms before inverse ones.
pub fn unclassify(taxonomy: &Taxonomy) -> Vec<TransformRecord> {
    taxonomy
        .values()
        .flat_map(BTreeMap::values)
        .flat_map(BTreeMap::values)
        .flat_map(TaxonomyEntry::records)
        .cloned()
        .collect()
}

/// Anything filterers can be applied to: a taxonomy or a list of records.
pub trait TransformSource {
    /// Returns the records of the source.
    fn into_records(self) -> Vec<TransformRecord>;
}

impl TransformSource for &Taxonomy {
    fn into_records(self) -> Vec<TransformRecord> {
        unclassify(self)
    }
}

impl TransformSource for Vec<TransformRecord> {
    fn into_records(self) -> Vec<TransformRecord> {
        self
    }
}

impl TransformSource for &[TransformRecord] {
    fn into_records(self) -> Vec<TransformRecord> {
        self.to_vec()
    }
}

impl TransformSource for &Vec<TransformRecord> {
    fn into_records(self) -> Vec<TransformRecord> {
        self.clone()
    }
}

/// Keeps the records accepted by every filterer.
///
/// An empty filterer list keeps everything.
pub fn filter_transforms(source: impl TransformSource, filterers: &[Filterer]) -> Vec<TransformRecord> {
    source
        .into_records()
        .into_iter()
        .filter(|record| filterers.iter().all(|f| f.accepts(record)))
        .collect()
}

/// Keeps the records accepted by the profile's default filterers.
pub fn filter_transforms_default(source: impl TransformSource, profile: &FormatProfile) -> Vec<TransformRecord> {
    filter_transforms(source, &profile.filterers)
}

fn endpoint(space: Option<&str>) -> &str {
    space.unwrap_or("None")
}

/// Formats a taxonomy as a human readable report.
pub fn format_taxonomy(taxonomy: &Taxonomy) -> Vec<String> {
    let mut lines = Vec::new();

    for (family, genera) in taxonomy {
        lines.extend(message_box(family, 79, 3));
        for (genus, entries) in genera {
            lines.push(format!("[ {genus} ]"));
            for (basename, entry) in entries {
                lines.push(format!("\t( {basename} )"));
                match entry {
                    TaxonomyEntry::Single(record) => {
                        lines.push(format!(
                            "\t\t\"{}\" --> \"{}\"",
                            endpoint(record.source()),
                            endpoint(record.target())
                        ));
                    }
                    TaxonomyEntry::Pair(pair) => {
                        if let Some(forward) = pair.records().next() {
                            lines.push(format!(
                                "\t\t\"{}\" <--> \"{}\"",
                                endpoint(forward.source()),
                                endpoint(forward.target())
                            ));
                        }
                    }
                }
                for record in entry.records() {
                    lines.push(format!("\t\t{}", record.id()));
                }
            }
        }
    }

    lines
}

/// Logs the taxonomy report at info level.
pub fn print_taxonomy(taxonomy: &Taxonomy) {
    for line in format_taxonomy(taxonomy) {
        info!("{line}");
    }
}
