//! Forward and inverse transform pairing.
//!
//! Two strategies exist:
//!
//! - [`Pairing::Convention`] classifies every file stem independently with
//!   a [`NamingConvention`]; aces-dev CTL transforms use
//!   [`AcesNamingConvention`], e.g. `ACEScsc.Academy.ACES_to_ACEScc` and
//!   `ACEScsc.Academy.ACEScc_to_ACES` both map to `ACEScsc.Academy.ACEScc`.
//! - [`Pairing::Reciprocal`] pairs `X_to_Y` with `Y_to_X`, the first stem in
//!   lexical order being the forward transform. Used for CLF transforms.
//!
//! Both are heuristics: a file whose naming does not follow the convention
//! ends up standalone.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::id::NAME_SPLIT_TOKEN;

/// Direction of a transform, with the normalized basename it pairs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairSide {
    /// Forward transform.
    Forward(String),
    /// Inverse transform.
    Inverse(String),
}

/// Strategy deciding the direction of a transform from its file stem.
pub trait NamingConvention: fmt::Debug + Send + Sync {
    /// Classifies a file stem, returning its direction and pairing basename.
    fn classify_pair(&self, stem: &str) -> PairSide;
}

/// aces-dev naming: `Inv` prefixes and `_to_ACES` suffixes denote inverse
/// transforms, `ACES_to_` prefixes are dropped from the basename.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcesNamingConvention;

impl NamingConvention for AcesNamingConvention {
    fn classify_pair(&self, stem: &str) -> PairSide {
        let mut basename = stem.to_string();
        let mut forward = true;

        if basename.starts_with("Inv") {
            basename = basename.replace("Inv", "");
            forward = false;
        }

        if basename.ends_with("_to_ACES") {
            basename = basename.replace("_to_ACES", "");
            forward = false;
        }

        basename = basename.replace("ACES_to_", "");

        if forward {
            PairSide::Forward(basename)
        } else {
            PairSide::Inverse(basename)
        }
    }
}

/// Pairing strategy of a transform format.
#[derive(Debug, Clone)]
pub enum Pairing {
    /// Classify each stem with a naming convention.
    Convention(Arc<dyn NamingConvention>),
    /// Pair reciprocal `X_to_Y` and `Y_to_X` stems.
    Reciprocal,
}

impl Pairing {
    /// Groups paths into pairs.
    pub fn find_pairs(&self, paths: &[PathBuf]) -> BTreeMap<String, PathPair> {
        match self {
            Self::Convention(convention) => find_pairs(paths, convention.as_ref()),
            Self::Reciprocal => find_reciprocal_pairs(paths),
        }
    }
}

/// Paths of the forward and inverse transforms of one basename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPair {
    /// Forward transform path.
    pub forward: Option<PathBuf>,
    /// Inverse transform path.
    pub inverse: Option<PathBuf>,
}

impl PathPair {
    /// Number of present paths.
    pub fn len(&self) -> usize {
        usize::from(self.forward.is_some()) + usize::from(self.inverse.is_some())
    }

    /// Whether no path is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the file stem of a path.
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Groups paths by the basename the naming convention assigns to them.
///
/// A later path of the same direction replaces an earlier one.
pub fn find_pairs(paths: &[PathBuf], convention: &dyn NamingConvention) -> BTreeMap<String, PathPair> {
    let mut pairs: BTreeMap<String, PathPair> = BTreeMap::new();

    for path in paths {
        match convention.classify_pair(&stem(path)) {
            PairSide::Forward(basename) => {
                pairs.entry(basename).or_default().forward = Some(path.clone());
            }
            PairSide::Inverse(basename) => {
                pairs.entry(basename).or_default().inverse = Some(path.clone());
            }
        }
    }

    pairs
}

/// Pairs `X_to_Y` stems with `Y_to_X` stems.
///
/// Paths are visited in stem order; a path whose reversed `(source, target)`
/// tuple was already seen becomes the inverse of that pair, keyed by the
/// forward stem.
pub fn find_reciprocal_pairs(paths: &[PathBuf]) -> BTreeMap<String, PathPair> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort_by_key(|p| stem(p));

    let mut groups: Vec<Vec<&PathBuf>> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();

    for path in sorted {
        let forward: Vec<String> = stem(path)
            .splitn(2, NAME_SPLIT_TOKEN)
            .map(str::to_string)
            .collect();
        let inverse: Vec<String> = forward.iter().rev().cloned().collect();

        if let Some(&i) = index.get(&inverse) {
            groups[i].push(path);
        } else if let Some(&i) = index.get(&forward) {
            groups[i].push(path);
        } else {
            index.insert(forward, groups.len());
            groups.push(vec![path]);
        }
    }

    groups
        .into_iter()
        .map(|group| {
            let pair = PathPair {
                forward: group.first().map(|p| (*p).clone()),
                inverse: group.get(1).map(|p| (*p).clone()),
            };
            (stem(group[0]), pair)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/t").join(n)).collect()
    }

    #[test]
    fn aces_convention() {
        let c = AcesNamingConvention;
        assert_eq!(
            c.classify_pair("ACEScsc.Academy.ACES_to_ACEScc"),
            PairSide::Forward("ACEScsc.Academy.ACEScc".into())
        );
        assert_eq!(
            c.classify_pair("ACEScsc.Academy.ACEScc_to_ACES"),
            PairSide::Inverse("ACEScsc.Academy.ACEScc".into())
        );
        assert_eq!(
            c.classify_pair("InvODT.Academy.DCDM"),
            PairSide::Inverse("ODT.Academy.DCDM".into())
        );
        assert_eq!(
            c.classify_pair("ODT.Academy.DCDM"),
            PairSide::Forward("ODT.Academy.DCDM".into())
        );
    }

    #[test]
    fn convention_pairs() {
        let pairs = find_pairs(
            &paths(&[
                "ODT.Academy.DCDM.ctl",
                "InvODT.Academy.DCDM.ctl",
                "ODT.Academy.P3DCI_48nits.ctl",
            ]),
            &AcesNamingConvention,
        );

        assert_eq!(pairs.len(), 2);
        let dcdm = &pairs["ODT.Academy.DCDM"];
        assert_eq!(dcdm.len(), 2);
        assert_eq!(dcdm.inverse, Some(PathBuf::from("/t/InvODT.Academy.DCDM.ctl")));
        assert_eq!(pairs["ODT.Academy.P3DCI_48nits"].len(), 1);
    }

    #[test]
    fn reciprocal_pairs() {
        let pairs = find_reciprocal_pairs(&paths(&["Y_to_X.clf", "X_to_Y.clf"]));

        assert_eq!(pairs.len(), 1);
        let pair = &pairs["X_to_Y"];
        assert_eq!(pair.forward, Some(PathBuf::from("/t/X_to_Y.clf")));
        assert_eq!(pair.inverse, Some(PathBuf::from("/t/Y_to_X.clf")));
    }

    #[test]
    fn reciprocal_forward_is_first_in_stem_order() {
        let pairs = find_reciprocal_pairs(&paths(&["B_to_A.clf", "A_to_B.clf", "Curve.clf"]));

        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs["A_to_B"].forward,
            Some(PathBuf::from("/t/A_to_B.clf"))
        );
        assert!(pairs["Curve"].inverse.is_none());
    }

    #[test]
    fn reciprocal_only_pairs_exact_reversal() {
        let pairs = find_reciprocal_pairs(&paths(&["A_to_B.clf", "A_to_C.clf", "C_to_B.clf"]));
        assert_eq!(pairs.len(), 3);
        assert!(pairs.values().all(|p| p.len() == 1));
    }
}
