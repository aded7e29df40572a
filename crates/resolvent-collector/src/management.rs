//! Premanaged capture: applies a [`crate::policy::DependencyManager`] to a
//! candidate dependency and records, as a bitmask plus an optional verbose
//! snapshot, which fields the manager rewrote.

use std::collections::BTreeMap;

use resolvent_model::{Dependency, Exclusion, ManagedFields};

use crate::policy::{DependencyManager, ManagedDependency};

/// The outcome of applying management to one dependency: the rewritten
/// dependency, the bitmask of fields a manager actually changed, and (in
/// verbose mode) a snapshot of what each changed field held before.
pub struct ManagementOutcome {
    pub dependency: Dependency,
    pub managed: ManagedFields,
    pub premanaged_data: BTreeMap<String, String>,
}

/// Apply `manager` to `dependency` against `managed_dependencies`.
///
/// `disable_version_management` suppresses a version rewrite specifically
/// (the rule for following a same-group-and-artifact relocation); every
/// other field a manager wants to rewrite still applies.
pub fn apply_management(
    manager: &dyn DependencyManager,
    dependency: &Dependency,
    managed_dependencies: &[Dependency],
    disable_version_management: bool,
    verbose: bool,
) -> ManagementOutcome {
    let Some(overrides) = manager.manage(dependency, managed_dependencies) else {
        return ManagementOutcome {
            dependency: dependency.clone(),
            managed: ManagedFields::empty(),
            premanaged_data: BTreeMap::new(),
        };
    };

    let mut result = dependency.clone();
    let mut managed = ManagedFields::empty();
    let mut premanaged_data = BTreeMap::new();

    let ManagedDependency {
        version,
        scope,
        optional,
        exclusions,
        properties,
    } = overrides;

    if let Some(version) = version {
        if !disable_version_management && version != result.artifact.version {
            if verbose {
                premanaged_data.insert("version".to_string(), result.artifact.version.clone());
            }
            result.artifact = result.artifact.with_version(version);
            managed.insert(ManagedFields::VERSION);
        }
    }

    if let Some(scope) = scope {
        if scope != result.scope {
            if verbose {
                premanaged_data.insert("scope".to_string(), result.scope.clone());
            }
            result.scope = scope;
            managed.insert(ManagedFields::SCOPE);
        }
    }

    if let Some(optional) = optional {
        if optional != result.optional {
            if verbose {
                premanaged_data.insert("optional".to_string(), result.optional.to_string());
            }
            result.optional = optional;
            managed.insert(ManagedFields::OPTIONAL);
        }
    }

    if let Some(exclusions) = exclusions {
        if exclusions != result.exclusions {
            if verbose {
                premanaged_data.insert("exclusions".to_string(), format_exclusions(&result.exclusions));
            }
            result.exclusions = exclusions;
            managed.insert(ManagedFields::EXCLUSIONS);
        }
    }

    if let Some(properties) = properties {
        if properties != result.artifact.properties {
            if verbose {
                premanaged_data.insert("properties".to_string(), format_properties(&result.artifact.properties));
            }
            result.artifact.properties = properties;
            managed.insert(ManagedFields::PROPERTIES);
        }
    }

    ManagementOutcome {
        dependency: result,
        managed,
        premanaged_data,
    }
}

fn format_exclusions(exclusions: &[Exclusion]) -> String {
    exclusions
        .iter()
        .map(|e| format!("{}:{}:{}:{}", e.group_id, e.artifact_id, e.classifier, e.extension))
        .collect::<Vec<_>>()
        .join(",")
}

fn format_properties(properties: &BTreeMap<String, String>) -> String {
    properties.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvent_model::Artifact;

    #[derive(Debug)]
    struct AlwaysBump;
    impl DependencyManager for AlwaysBump {
        fn manage(&self, _dependency: &Dependency, _managed: &[Dependency]) -> Option<ManagedDependency> {
            Some(ManagedDependency {
                version: Some("9.9".to_string()),
                scope: None,
                optional: None,
                exclusions: None,
                properties: None,
            })
        }
        fn derive_child(&self, _context: &crate::policy::DeriveContext) -> std::sync::Arc<dyn DependencyManager> {
            std::sync::Arc::new(AlwaysBump)
        }
    }

    #[derive(Debug)]
    struct NoOverrides;
    impl DependencyManager for NoOverrides {
        fn manage(&self, _dependency: &Dependency, _managed: &[Dependency]) -> Option<ManagedDependency> {
            None
        }
        fn derive_child(&self, _context: &crate::policy::DeriveContext) -> std::sync::Arc<dyn DependencyManager> {
            std::sync::Arc::new(NoOverrides)
        }
    }

    #[test]
    fn no_manager_match_leaves_dependency_untouched() {
        let dep = Dependency::new(Artifact::new("g", "a", "1.0"), "compile");
        let outcome = apply_management(&NoOverrides, &dep, &[], false, false);
        assert_eq!(outcome.dependency, dep);
        assert!(outcome.managed.is_empty());
    }

    #[test]
    fn version_rewrite_sets_bitmask_and_verbose_snapshot() {
        let dep = Dependency::new(Artifact::new("g", "a", "1.0"), "compile");
        let outcome = apply_management(&AlwaysBump, &dep, &[], false, true);
        assert_eq!(outcome.dependency.artifact.version, "9.9");
        assert!(outcome.managed.contains(ManagedFields::VERSION));
        assert_eq!(outcome.premanaged_data.get("version"), Some(&"1.0".to_string()));
    }

    #[test]
    fn disabled_version_management_suppresses_version_rewrite_only() {
        let dep = Dependency::new(Artifact::new("g", "a", "1.0"), "compile");
        let outcome = apply_management(&AlwaysBump, &dep, &[], true, false);
        assert_eq!(outcome.dependency.artifact.version, "1.0");
        assert!(!outcome.managed.contains(ManagedFields::VERSION));
    }

    #[test]
    fn non_verbose_mode_keeps_bitmask_without_snapshot() {
        let dep = Dependency::new(Artifact::new("g", "a", "1.0"), "compile");
        let outcome = apply_management(&AlwaysBump, &dep, &[], false, false);
        assert!(outcome.managed.contains(ManagedFields::VERSION));
        assert!(outcome.premanaged_data.is_empty());
    }

    #[derive(Debug)]
    struct OverridesProperties;
    impl DependencyManager for OverridesProperties {
        fn manage(&self, _dependency: &Dependency, _managed: &[Dependency]) -> Option<ManagedDependency> {
            Some(ManagedDependency {
                version: None,
                scope: None,
                optional: None,
                exclusions: None,
                properties: Some(BTreeMap::from([("repositoryOfOrigin".to_string(), "central".to_string())])),
            })
        }
        fn derive_child(&self, _context: &crate::policy::DeriveContext) -> std::sync::Arc<dyn DependencyManager> {
            std::sync::Arc::new(OverridesProperties)
        }
    }

    #[test]
    fn property_rewrite_sets_bitmask_and_verbose_snapshot() {
        let dep = Dependency::new(Artifact::new("g", "a", "1.0"), "compile");
        let outcome = apply_management(&OverridesProperties, &dep, &[], false, true);
        assert_eq!(
            outcome.dependency.artifact.properties.get("repositoryOfOrigin"),
            Some(&"central".to_string())
        );
        assert!(outcome.managed.contains(ManagedFields::PROPERTIES));
        assert_eq!(outcome.premanaged_data.get("properties"), Some(&String::new()));
    }

    #[test]
    fn matching_property_override_leaves_bitmask_untouched() {
        let mut dep = Dependency::new(Artifact::new("g", "a", "1.0"), "compile");
        dep.artifact.properties.insert("repositoryOfOrigin".to_string(), "central".to_string());
        let outcome = apply_management(&OverridesProperties, &dep, &[], false, false);
        assert!(!outcome.managed.contains(ManagedFields::PROPERTIES));
    }
}
