//! Corrections for known defects in upstream `ACEStransformID` strings.
//!
//! A handful of transforms shipped by aces-dev carry identifiers that do not
//! follow the grammar or are inconsistent with their file names. They are
//! rewritten before parsing and every rewrite is reported at critical
//! severity so that the upstream data can be fixed.
//!
//! - <https://github.com/ampas/aces-dev/issues/118>
//! - <https://github.com/ampas/aces-dev/pull/119>

use std::borrow::Cow;

use tracing::error;

use crate::id::NAME_SPLIT_TOKEN;

/// A single textual correction applied when `needle` occurs in an identifier.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierPatch {
    /// Substring identifying the defective identifier.
    pub needle: &'static str,
    /// Text to replace.
    pub find: &'static str,
    /// Replacement text.
    pub replace: &'static str,
    /// Short description of the defect, used for logging.
    pub defect: &'static str,
}

/// Whitelisted naming corrections, tried in order; the first match wins.
pub const IDENTIFIER_PATCHES: &[IdentifierPatch] = &[
    IdentifierPatch {
        needle: "Academy.P3D65_108nits_7.2nits_ST2084",
        find: "7.2",
        replace: "7",
        defect: "has an invalid separator in \"7.2nits\"",
    },
    IdentifierPatch {
        needle: "P3D65_709limit_48nits",
        find: "P3D65_709limit_48nits",
        replace: "P3D65_Rec709limited_48nits",
        defect: "is inconsistently named",
    },
    IdentifierPatch {
        needle: "Rec2020_100nits.a1.1.0",
        find: "Rec2020_100nits",
        replace: "Rec2020_P3D65limited_100nits_dim",
        defect: "is incorrectly named",
    },
];

fn report(id: &str, defect: &str) {
    error!(severity = "critical", id, "\"ACEStransformID\" {defect}, patching!");
}

const CSC_TOKEN: &str = "ACEScsc.";

/// Whether the token following `ACEScsc.` is already the `X_to_Y` name,
/// i.e. the namespace segment is absent.
fn is_missing_namespace(id: &str) -> bool {
    id.split_once(CSC_TOKEN)
        .and_then(|(_, rest)| rest.split('.').next())
        .is_some_and(|token| token.contains(NAME_SPLIT_TOKEN))
}

/// Patches an `ACEStransformID` affected by a known upstream defect.
///
/// Identifiers without any known defect are returned borrowed and untouched.
/// A missing URN is never corrected: that remains a parse error.
pub fn patch_aces_transform_id(id: &str) -> Cow<'_, str> {
    if let Some(patch) = IDENTIFIER_PATCHES.iter().find(|p| id.contains(p.needle)) {
        report(id, patch.defect);
        return Cow::Owned(id.replace(patch.find, patch.replace));
    }

    if !id.contains("ACEScsc") {
        return Cow::Borrowed(id);
    }

    let mut patched = Cow::Borrowed(id);
    if is_missing_namespace(id) {
        report(id, "is missing \"Academy\" namespace");
        patched = Cow::Owned(patched.replacen(CSC_TOKEN, "ACEScsc.Academy.", 1));
    }
    if patched.ends_with("a1.v1") {
        report(id, "version scheme is invalid");
        patched = Cow::Owned(patched.replace("a1.v1", "a1.1.0"));
    }
    patched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_identifier_is_borrowed() {
        let id = "urn:ampas:aces:transformId:v1.5:ODT.Academy.DCDM.a1.0.3";
        assert!(matches!(patch_aces_transform_id(id), Cow::Borrowed(_)));
    }

    #[test]
    fn nits_separator() {
        let id = "urn:ampas:aces:transformId:v1.5:ODT.Academy.P3D65_108nits_7.2nits_ST2084.a1.0.3";
        assert_eq!(
            patch_aces_transform_id(id),
            "urn:ampas:aces:transformId:v1.5:ODT.Academy.P3D65_108nits_7nits_ST2084.a1.0.3"
        );
    }

    #[test]
    fn limited_naming() {
        let id = "urn:ampas:aces:transformId:v1.5:ODT.Academy.P3D65_709limit_48nits.a1.1.0";
        assert_eq!(
            patch_aces_transform_id(id),
            "urn:ampas:aces:transformId:v1.5:ODT.Academy.P3D65_Rec709limited_48nits.a1.1.0"
        );

        let id = "urn:ampas:aces:transformId:v1.5:ODT.Academy.Rec2020_100nits.a1.1.0";
        assert_eq!(
            patch_aces_transform_id(id),
            "urn:ampas:aces:transformId:v1.5:ODT.Academy.Rec2020_P3D65limited_100nits_dim.a1.1.0"
        );
    }

    #[test]
    fn csc_namespace_and_version() {
        let id = "urn:ampas:aces:transformId:v1.5:ACEScsc.ACES_to_ACEScg.a1.v1";
        assert_eq!(
            patch_aces_transform_id(id),
            "urn:ampas:aces:transformId:v1.5:ACEScsc.Academy.ACES_to_ACEScg.a1.1.0"
        );
    }

    #[test]
    fn namespaced_csc_is_kept() {
        let id = "urn:ampas:aces:transformId:v1.5:ACEScsc.Sony.SLog3_SGamut3_to_ACES.a1.0.3";
        assert!(matches!(patch_aces_transform_id(id), Cow::Borrowed(_)));

        let id = "urn:ampas:aces:transformId:v1.5:ACEScsc.Sony.SLog3_to_ACES.a1.v1";
        assert_eq!(
            patch_aces_transform_id(id),
            "urn:ampas:aces:transformId:v1.5:ACEScsc.Sony.SLog3_to_ACES.a1.1.0"
        );

        let id = "urn:ampas:aces:transformId:v1.5:ACEScsc.Academy.ACES_to_ACEScc.a1.0.3";
        assert!(matches!(patch_aces_transform_id(id), Cow::Borrowed(_)));
    }
}
