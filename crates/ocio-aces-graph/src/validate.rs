//! Config description validation.
//!
//! Detects issues that would make the written config unusable or
//! surprising:
//! - Duplicate colour space names
//! - Roles and views referencing missing colour spaces or displays
//! - Colour spaces without a conversion chain to the reference
//!
//! Colour spaces only reachable from the reference are reported at
//! [`Severity::Info`]: the config stays valid but they cannot be used as
//! conversion sources through `to_reference`.
//!
//! # Example
//!
//! ```ignore
//! use ocio_aces_graph::{describe_graph, validate};
//!
//! let config = describe_graph(&graph, &components, &Default::default());
//! for issue in validate::check(&config) {
//!     println!("{issue}");
//! }
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::describe::{ColorspaceDescription, ConfigDescription};

/// Roles every config is expected to define.
pub const RECOMMENDED_ROLES: [&str; 3] = ["aces_interchange", "reference", "scene_linear"];

/// Severity level for validation issues, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Noteworthy but harmless.
    Info,
    /// The config loads but parts of it are unusable.
    Warning,
    /// The config references things it does not define.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        })
    }
}

/// Categories of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCategory {
    /// Missing colour space reference.
    MissingColorSpace,
    /// Missing role definition.
    MissingRole,
    /// Missing display, or view on an undeclared display.
    MissingDisplay,
    /// Conversion chain missing, one-directional, or set on a data colour space.
    ReferenceChain,
    /// Duplicate definition.
    Duplicate,
}

/// A validation issue found in the config description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Severity level.
    pub severity: Severity,
    /// Issue category.
    pub category: IssueCategory,
    /// Human-readable message.
    pub message: String,
    /// Related element (colour space name, role, `display:view`).
    pub context: Option<String>,
}

impl Issue {
    fn new(severity: Severity, category: IssueCategory, message: String) -> Self {
        Self {
            severity,
            category,
            message,
            context: None,
        }
    }

    fn on(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Validates a config description and returns all issues found.
pub fn check(config: &ConfigDescription) -> Vec<Issue> {
    let mut issues = Vec::new();

    check_roles(config, &mut issues);
    check_displays(config, &mut issues);
    check_colorspaces(config, &mut issues);

    issues
}

fn check_roles(config: &ConfigDescription, issues: &mut Vec<Issue>) {
    for role in RECOMMENDED_ROLES.iter().filter(|r| !config.roles.contains_key(**r)) {
        issues.push(
            Issue::new(
                Severity::Warning,
                IssueCategory::MissingRole,
                format!("recommended role '{role}' is not defined"),
            )
            .on(*role),
        );
    }

    for (role, name) in &config.roles {
        if config.colorspace(name).is_none() {
            issues.push(
                Issue::new(
                    Severity::Error,
                    IssueCategory::MissingColorSpace,
                    format!("role '{role}' points to undefined colour space '{name}'"),
                )
                .on(role),
            );
        }
    }
}

fn check_displays(config: &ConfigDescription, issues: &mut Vec<Issue>) {
    if config.displays.is_empty() {
        issues.push(Issue::new(
            Severity::Warning,
            IssueCategory::MissingDisplay,
            "config has no display".to_string(),
        ));
    }

    for view in &config.views {
        let context = format!("{}:{}", view.display, view.view);
        if !config.displays.contains(&view.display) {
            issues.push(
                Issue::new(
                    Severity::Error,
                    IssueCategory::MissingDisplay,
                    format!("view '{context}' is on undeclared display '{}'", view.display),
                )
                .on(&context),
            );
        }
        if config.colorspace(&view.colorspace).is_none() {
            issues.push(
                Issue::new(
                    Severity::Error,
                    IssueCategory::MissingColorSpace,
                    format!("view '{context}' shows undefined colour space '{}'", view.colorspace),
                )
                .on(&context),
            );
        }
    }
}

fn chain_issue(cs: &ColorspaceDescription) -> Option<Issue> {
    let (severity, message) = if cs.is_data {
        if !cs.has_reference_chain() {
            return None;
        }
        (Severity::Warning, format!("data colour space '{}' carries transforms", cs.name))
    } else if cs.family == "ACES" || !cs.to_reference.is_empty() {
        return None;
    } else if cs.from_reference.is_empty() {
        (Severity::Warning, format!("colour space '{}' has no conversion to the reference", cs.name))
    } else {
        (Severity::Info, format!("colour space '{}' is only defined from the reference", cs.name))
    };

    Some(Issue::new(severity, IssueCategory::ReferenceChain, message).on(&cs.name))
}

fn check_colorspaces(config: &ConfigDescription, issues: &mut Vec<Issue>) {
    let mut names: HashSet<&str> = HashSet::new();

    for cs in &config.colorspaces {
        if !names.insert(cs.name.as_str()) {
            issues.push(
                Issue::new(
                    Severity::Error,
                    IssueCategory::Duplicate,
                    format!("colour space '{}' is defined more than once", cs.name),
                )
                .on(&cs.name),
            );
        }
        issues.extend(chain_issue(cs));
    }
}

/// Returns the highest severity among the issues.
pub fn max_severity(issues: &[Issue]) -> Option<Severity> {
    issues.iter().map(|i| i.severity).max()
}

/// Returns true if there are any errors.
pub fn has_errors(issues: &[Issue]) -> bool {
    max_severity(issues) == Some(Severity::Error)
}

/// Returns true if there are any warnings or errors.
pub fn has_warnings(issues: &[Issue]) -> bool {
    max_severity(issues) >= Some(Severity::Warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{DescribeOptions, TransformStep, ViewDescription};
    use ocio_aces_discover::TransformId;

    fn colorspace(name: &str, family: &str) -> ColorspaceDescription {
        ColorspaceDescription {
            name: name.into(),
            family: family.into(),
            description: String::new(),
            is_data: false,
            to_reference: Vec::new(),
            from_reference: Vec::new(),
        }
    }

    fn step(from: &str, to: &str) -> TransformStep {
        TransformStep {
            from: from.into(),
            to: to.into(),
            id: TransformId::parse("urn:ampas:aces:transformId:v1.5:ODT.Academy.DCDM.a1.0.3").unwrap(),
            builtin: None,
        }
    }

    fn config() -> ConfigDescription {
        let options = DescribeOptions::default();
        ConfigDescription {
            name: options.name,
            description: options.description,
            reference: "ACES - ACES2065-1".into(),
            roles: options.roles,
            colorspaces: vec![
                colorspace("ACES - ACES2065-1", "ACES"),
                colorspace("ACES - ACEScg", "ACES"),
            ],
            displays: vec!["sRGB".into()],
            views: vec![ViewDescription {
                display: "sRGB".into(),
                view: "Raw".into(),
                colorspace: "ACES - ACEScg".into(),
            }],
        }
    }

    fn issue_for<'a>(issues: &'a [Issue], context: &str) -> &'a Issue {
        issues
            .iter()
            .find(|i| i.context.as_deref() == Some(context))
            .unwrap_or_else(|| panic!("no issue for '{context}' in {issues:?}"))
    }

    #[test]
    fn valid_config() {
        let issues = check(&config());
        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(max_severity(&issues), None);
    }

    #[test]
    fn empty_config() {
        let mut config = config();
        config.roles.clear();
        config.displays.clear();
        config.views.clear();

        let issues = check(&config);
        assert_eq!(
            issues.iter().filter(|i| i.category == IssueCategory::MissingRole).count(),
            RECOMMENDED_ROLES.len()
        );
        assert!(issues.iter().any(|i| i.category == IssueCategory::MissingDisplay));
        assert_eq!(max_severity(&issues), Some(Severity::Warning));
        assert!(has_warnings(&issues));
        assert!(!has_errors(&issues));
    }

    #[test]
    fn dangling_references() {
        let mut config = config();
        config.roles.insert("scene_linear".into(), "ACES - ACEScct".into());
        config.views.push(ViewDescription {
            display: "P3-D65".into(),
            view: "DCDM".into(),
            colorspace: "Output - DCDM".into(),
        });

        let issues = check(&config);
        assert_eq!(issue_for(&issues, "scene_linear").category, IssueCategory::MissingColorSpace);
        let view: Vec<IssueCategory> = issues
            .iter()
            .filter(|i| i.context.as_deref() == Some("P3-D65:DCDM"))
            .map(|i| i.category)
            .collect();
        assert_eq!(view, [IssueCategory::MissingDisplay, IssueCategory::MissingColorSpace]);
        assert!(has_errors(&issues));
        assert_eq!(
            issue_for(&issues, "scene_linear").to_string(),
            "[ERROR] role 'scene_linear' points to undefined colour space 'ACES - ACEScct'"
        );
    }

    #[test]
    fn duplicate_colorspaces() {
        let mut config = config();
        config.colorspaces.push(colorspace("ACES - ACEScg", "ACES"));

        let issues = check(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::Duplicate);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn reference_chains() {
        let mut config = config();
        config.colorspaces.push(colorspace("Input - LogC", "Input/arri"));

        let mut output = colorspace("Output - DCDM", "Output");
        output.from_reference = vec![step("ACES2065-1", "OCES"), step("OCES", "ODT/DCDM")];
        config.colorspaces.push(output);

        let mut csc = colorspace("CSC - SLog3", "CSC");
        csc.to_reference = vec![step("ACEScsc/SLog3", "ACES2065-1")];
        config.colorspaces.push(csc);

        let mut raw = colorspace("Utility - Raw", "Utility");
        raw.is_data = true;
        raw.to_reference = vec![step("Raw", "ACES2065-1")];
        config.colorspaces.push(raw);

        let issues = check(&config);
        assert_eq!(issues.len(), 3, "{issues:?}");
        assert_eq!(issue_for(&issues, "Input - LogC").severity, Severity::Warning);
        assert_eq!(issue_for(&issues, "Output - DCDM").severity, Severity::Info);
        assert_eq!(issue_for(&issues, "Utility - Raw").severity, Severity::Warning);
        assert!(issues.iter().all(|i| i.category == IssueCategory::ReferenceChain));
    }

    #[test]
    fn informational_issues_are_not_warnings() {
        let mut config = config();
        let mut output = colorspace("Output - DCDM", "Output");
        output.from_reference = vec![step("OCES", "ODT/DCDM")];
        config.colorspaces.push(output);

        let issues = check(&config);
        assert_eq!(max_severity(&issues), Some(Severity::Info));
        assert!(!has_warnings(&issues));
        assert!(issues[0].to_string().starts_with("[INFO] "));
    }
}
