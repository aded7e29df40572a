//! Dependency values: an [`Artifact`] plus scope, optionality, and
//! exclusions. A dependency owns no node; it is a value.

use crate::artifact::Artifact;

/// An artifact requested with a scope, optionality, and exclusion set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub artifact: Artifact,
    pub scope: String,
    pub optional: bool,
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    pub fn new(artifact: Artifact, scope: impl Into<String>) -> Self {
        Self {
            artifact,
            scope: scope.into(),
            optional: false,
            exclusions: Vec::new(),
        }
    }

    /// Return a copy with a different artifact (used when rewriting to a
    /// resolved version, or when following a relocation).
    pub fn with_artifact(&self, artifact: Artifact) -> Self {
        Self {
            artifact,
            ..self.clone()
        }
    }

    /// Whether `candidate` is excluded by any of this dependency's
    /// exclusion patterns. `"*"` matches any value for that field.
    pub fn excludes(&self, candidate: &Artifact) -> bool {
        self.exclusions.iter().any(|e| e.matches(candidate))
    }
}

/// An exclusion pattern: `(group, artifact, classifier, extension)` with
/// `"*"` as wildcard in any field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: String,
    pub extension: String,
}

impl Exclusion {
    /// An exclusion matching any artifact in `group:artifact`, regardless
    /// of classifier/extension — the common shorthand form.
    pub fn group_artifact(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: "*".to_string(),
            extension: "*".to_string(),
        }
    }

    pub fn matches(&self, candidate: &Artifact) -> bool {
        field_matches(&self.group_id, &candidate.group_id)
            && field_matches(&self.artifact_id, &candidate.artifact_id)
            && field_matches(&self.classifier, &candidate.classifier)
            && field_matches(&self.extension, &candidate.extension)
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern == "*" || pattern == value
}
