//! Artifact coordinates.
//!
//! An [`Artifact`] is the immutable 5-tuple `{group, artifact, classifier,
//! extension, version}` plus an opaque property map. Two artifacts are equal
//! iff all five coordinates are equal; the property map is metadata, not
//! identity (see [`Artifact::eq`]).

use std::collections::BTreeMap;
use std::fmt;

/// An immutable Maven-style artifact coordinate.
///
/// Equality and hashing consider only the five coordinate fields. The
/// property map travels with the artifact (descriptor readers stash things
/// like `repositoryOfOrigin` or download-url hints there) but never affects
/// identity.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: String,
    pub extension: String,
    pub version: String,
    pub properties: BTreeMap<String, String>,
}

impl Artifact {
    /// Build a new artifact with an empty property map and the conventional
    /// `jar` extension / empty classifier.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: String::new(),
            extension: "jar".to_string(),
            version: version.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Parse `"group:artifact:version"` or `"group:artifact:extension:version"`
    /// or `"group:artifact:extension:classifier:version"` shorthand.
    pub fn parse(coordinate: &str) -> Option<Self> {
        let parts: Vec<&str> = coordinate.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Some(Self::new(*group, *artifact, *version)),
            [group, artifact, extension, version] => Some(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                classifier: String::new(),
                extension: extension.to_string(),
                version: version.to_string(),
                properties: BTreeMap::new(),
            }),
            [group, artifact, extension, classifier, version] => Some(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                classifier: classifier.to_string(),
                extension: extension.to_string(),
                version: version.to_string(),
                properties: BTreeMap::new(),
            }),
            _ => None,
        }
    }

    /// Return a copy of this artifact with a different version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// The 4-tuple identity ignoring version, used for cycle detection and
    /// conflict grouping.
    pub fn versionless(&self) -> VersionlessKey {
        VersionlessKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            extension: self.extension.clone(),
        }
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.classifier == other.classifier
            && self.extension == other.extension
            && self.version == other.version
    }
}

impl Eq for Artifact {}

impl std::hash::Hash for Artifact {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.classifier.hash(state);
        self.extension.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classifier.is_empty() {
            write!(
                f,
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.extension, self.version
            )
        } else {
            write!(
                f,
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.extension, self.classifier, self.version
            )
        }
    }
}

/// The 4-tuple `(group, artifact, classifier, extension)` used for cycle
/// detection and conflict grouping, i.e. an [`Artifact`] with the version
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionlessKey {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: String,
    pub extension: String,
}

impl fmt::Display for VersionlessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.group_id, self.artifact_id, self.extension, self.classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_properties() {
        let mut a = Artifact::new("g", "a", "1.0");
        let mut b = Artifact::new("g", "a", "1.0");
        a.properties.insert("repositoryOfOrigin".into(), "central".into());
        b.properties.insert("repositoryOfOrigin".into(), "google".into());
        assert_eq!(a, b);
    }

    #[test]
    fn versionless_drops_version_only() {
        let a = Artifact::new("g", "a", "1.0");
        let b = Artifact::new("g", "a", "2.0");
        assert_ne!(a, b);
        assert_eq!(a.versionless(), b.versionless());
    }

    #[test]
    fn parse_short_form() {
        let a = Artifact::parse("org.example:lib:1.0").unwrap();
        assert_eq!(a.group_id, "org.example");
        assert_eq!(a.artifact_id, "lib");
        assert_eq!(a.version, "1.0");
        assert_eq!(a.extension, "jar");
        assert!(a.classifier.is_empty());
    }

    #[test]
    fn parse_with_classifier() {
        let a = Artifact::parse("org.example:lib:jar:tests:1.0").unwrap();
        assert_eq!(a.classifier, "tests");
        assert_eq!(a.extension, "jar");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(Artifact::parse("org.example:lib").is_none());
    }

    #[test]
    fn display_roundtrips_short_form() {
        let a = Artifact::new("g", "a", "1.0");
        assert_eq!(a.to_string(), "g:a:jar:1.0");
    }
}
