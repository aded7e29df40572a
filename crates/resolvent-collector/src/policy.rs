//! The four depth-derivable policy traits plus a default implementation of
//! each, generalised from scope/optional/exclusion filtering that could
//! otherwise be inlined directly into a resolver loop.

use std::collections::BTreeSet;
use std::sync::Arc;

use resolvent_model::{Artifact, Dependency, Exclusion};

/// Context passed to `derive_child`: the dependency being descended into
/// and its depth (root's direct dependencies are depth 1).
pub struct DeriveContext<'a> {
    pub dependency: &'a Dependency,
    pub depth: usize,
}

/// Decides whether a declared dependency is even considered.
pub trait DependencySelector: std::fmt::Debug {
    fn include(&self, dependency: &Dependency) -> bool;
    fn derive_child(&self, context: &DeriveContext) -> Arc<dyn DependencySelector>;
    /// A stable string representation of this object's value, used as part
    /// of the data pool's children-cache key. `None` means "not
    /// value-comparable" and disables caching for nodes using it.
    fn cache_key(&self) -> Option<String> {
        None
    }
}

/// Drops optional dependencies and any scope named in `excluded_scopes`.
/// Depth-invariant: `derive_child` returns an equivalent instance.
#[derive(Debug, Clone, Default)]
pub struct ScopeDependencySelector {
    excluded_scopes: BTreeSet<String>,
}

impl ScopeDependencySelector {
    pub fn new(excluded_scopes: impl IntoIterator<Item = String>) -> Self {
        Self {
            excluded_scopes: excluded_scopes.into_iter().collect(),
        }
    }

    /// The conventional selector: skip `test`, `provided`, and `system`.
    pub fn runtime() -> Self {
        Self::new(["test".to_string(), "provided".to_string(), "system".to_string()])
    }
}

impl DependencySelector for ScopeDependencySelector {
    fn include(&self, dependency: &Dependency) -> bool {
        !dependency.optional && !self.excluded_scopes.contains(&dependency.scope)
    }

    fn derive_child(&self, _context: &DeriveContext) -> Arc<dyn DependencySelector> {
        Arc::new(self.clone())
    }

    fn cache_key(&self) -> Option<String> {
        let mut scopes: Vec<&String> = self.excluded_scopes.iter().collect();
        scopes.sort();
        Some(format!("scope[{}]", scopes.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",")))
    }
}

/// Accumulates exclusions as it descends: a child selector also excludes
/// everything its parent dependency excluded, mirroring a running
/// `child_exclusions` list carried down a resolution loop.
#[derive(Debug, Clone, Default)]
pub struct ExclusionDependencySelector {
    exclusions: Vec<Exclusion>,
}

impl ExclusionDependencySelector {
    pub fn new(exclusions: Vec<Exclusion>) -> Self {
        Self { exclusions }
    }
}

impl DependencySelector for ExclusionDependencySelector {
    fn include(&self, dependency: &Dependency) -> bool {
        !self.exclusions.iter().any(|e| e.matches(&dependency.artifact))
    }

    fn derive_child(&self, context: &DeriveContext) -> Arc<dyn DependencySelector> {
        let mut merged = self.exclusions.clone();
        merged.extend(context.dependency.exclusions.iter().cloned());
        Arc::new(Self::new(merged))
    }

    fn cache_key(&self) -> Option<String> {
        let mut items: Vec<String> = self
            .exclusions
            .iter()
            .map(|e| format!("{}:{}:{}:{}", e.group_id, e.artifact_id, e.classifier, e.extension))
            .collect();
        items.sort();
        Some(format!("excl[{}]", items.join(",")))
    }
}

/// Propagates Maven's scope-combination table as depth advances, wrapping
/// an inner manager for version/exclusion overrides. `effective_scope` is
/// the scope already in force at this depth (`"compile"` at the root);
/// `manage` always returns a
/// scope override — the combination of `effective_scope` and the
/// dependency's own declared scope — layered on top of whatever the inner
/// manager overrides for version/optional/exclusions.
#[derive(Debug, Clone)]
pub struct ScopeDeriveChildManager {
    inner: Arc<dyn DependencyManager>,
    effective_scope: String,
}

impl ScopeDeriveChildManager {
    pub fn new(inner: Arc<dyn DependencyManager>, effective_scope: impl Into<String>) -> Self {
        Self {
            inner,
            effective_scope: effective_scope.into(),
        }
    }

    /// The conventional root instance: starts propagation from `"compile"`.
    pub fn from_root(inner: Arc<dyn DependencyManager>) -> Self {
        Self::new(inner, "compile")
    }
}

impl DependencyManager for ScopeDeriveChildManager {
    fn manage(&self, dependency: &Dependency, managed_dependencies: &[Dependency]) -> Option<ManagedDependency> {
        let inner_overrides = self.inner.manage(dependency, managed_dependencies);
        let declared_scope = inner_overrides
            .as_ref()
            .and_then(|o| o.scope.as_deref())
            .unwrap_or(dependency.scope.as_str());
        let propagated = propagate_scope(&self.effective_scope, declared_scope);

        let mut overrides = inner_overrides.unwrap_or_default();
        overrides.scope = Some(propagated);
        Some(overrides)
    }

    fn derive_child(&self, context: &DeriveContext) -> Arc<dyn DependencyManager> {
        Arc::new(Self {
            inner: self.inner.derive_child(context),
            effective_scope: context.dependency.scope.clone(),
        })
    }

    fn cache_key(&self) -> Option<String> {
        let inner_key = self.inner.cache_key()?;
        Some(format!("scope-derive[{}]({inner_key})", self.effective_scope))
    }
}

/// Maven's scope-combination table: the effective scope of a transitive
/// dependency given the scope already in force (`parent_scope`) and the
/// dependency's own declared scope (`dep_scope`).
fn propagate_scope(parent_scope: &str, dep_scope: &str) -> String {
    match (parent_scope, dep_scope) {
        ("compile", "compile") => "compile",
        ("compile", "runtime") => "runtime",
        ("runtime", "compile") => "runtime",
        ("runtime", "runtime") => "runtime",
        ("test", _) => "test",
        (_, "test") => "test",
        (_, "provided") => "provided",
        (_, "system") => "system",
        ("provided", _) => "provided",
        ("system", _) => "system",
        _ => "compile",
    }
    .to_string()
}

/// Runs several selectors and requires all of them to include a dependency.
#[derive(Debug, Clone)]
pub struct CompositeDependencySelector {
    selectors: Vec<Arc<dyn DependencySelector>>,
}

impl CompositeDependencySelector {
    pub fn new(selectors: Vec<Arc<dyn DependencySelector>>) -> Self {
        Self { selectors }
    }
}

impl DependencySelector for CompositeDependencySelector {
    fn include(&self, dependency: &Dependency) -> bool {
        self.selectors.iter().all(|s| s.include(dependency))
    }

    fn derive_child(&self, context: &DeriveContext) -> Arc<dyn DependencySelector> {
        Arc::new(Self::new(self.selectors.iter().map(|s| s.derive_child(context)).collect()))
    }

    fn cache_key(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(self.selectors.len());
        for s in &self.selectors {
            parts.push(s.cache_key()?);
        }
        Some(format!("all[{}]", parts.join("|")))
    }
}

/// Overrides a dependency's effective version/scope/optional/exclusions/
/// properties. Any field left `None` is untouched by management.
#[derive(Debug, Clone, Default)]
pub struct ManagedDependency {
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<bool>,
    pub exclusions: Option<Vec<Exclusion>>,
    pub properties: Option<std::collections::BTreeMap<String, String>>,
}

/// Looks up overrides for a declared dependency against the managed-
/// dependencies list inherited at the current depth.
pub trait DependencyManager: std::fmt::Debug {
    fn manage(&self, dependency: &Dependency, managed_dependencies: &[Dependency]) -> Option<ManagedDependency>;
    fn derive_child(&self, context: &DeriveContext) -> Arc<dyn DependencyManager>;
    fn cache_key(&self) -> Option<String> {
        None
    }
}

/// Classic nearest-wins management: the first managed entry sharing the
/// dependency's versionless identity (group/artifact/classifier/extension)
/// overrides version, scope, optional, and exclusions wholesale.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicDependencyManager;

impl DependencyManager for ClassicDependencyManager {
    fn manage(&self, dependency: &Dependency, managed_dependencies: &[Dependency]) -> Option<ManagedDependency> {
        let key = dependency.artifact.versionless();
        let managing = managed_dependencies.iter().find(|m| m.artifact.versionless() == key)?;
        Some(ManagedDependency {
            version: Some(managing.artifact.version.clone()),
            scope: Some(managing.scope.clone()),
            optional: Some(managing.optional),
            exclusions: Some(managing.exclusions.clone()),
            properties: Some(managing.artifact.properties.clone()),
        })
    }

    fn derive_child(&self, _context: &DeriveContext) -> Arc<dyn DependencyManager> {
        Arc::new(*self)
    }

    fn cache_key(&self) -> Option<String> {
        Some("classic".to_string())
    }
}

/// Decides whether a node's own dependencies are worth traversing at all.
pub trait DependencyTraverser: std::fmt::Debug {
    fn traverse(&self, dependency: &Dependency) -> bool;
    fn derive_child(&self, context: &DeriveContext) -> Arc<dyn DependencyTraverser>;
    fn cache_key(&self) -> Option<String> {
        None
    }
}

/// Traverses everything except `system`-scoped dependencies, which name a
/// local file with no descriptor to follow.
#[derive(Debug, Clone, Copy, Default)]
pub struct FatArtifactDependencyTraverser;

impl DependencyTraverser for FatArtifactDependencyTraverser {
    fn traverse(&self, dependency: &Dependency) -> bool {
        dependency.scope != "system"
    }

    fn derive_child(&self, _context: &DeriveContext) -> Arc<dyn DependencyTraverser> {
        Arc::new(*self)
    }

    fn cache_key(&self) -> Option<String> {
        Some("fat".to_string())
    }
}

/// Trims the list of range-resolved candidate versions before the collector
/// iterates them, preserving ascending order.
pub trait VersionFilter: std::fmt::Debug {
    fn filter(&self, artifact: &Artifact, versions: Vec<String>) -> Vec<String>;
    fn derive_child(&self, context: &DeriveContext) -> Arc<dyn VersionFilter>;
    fn cache_key(&self) -> Option<String> {
        None
    }
}

/// Accepts every candidate version unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVersionFilter;

impl VersionFilter for AcceptAllVersionFilter {
    fn filter(&self, _artifact: &Artifact, versions: Vec<String>) -> Vec<String> {
        versions
    }

    fn derive_child(&self, _context: &DeriveContext) -> Arc<dyn VersionFilter> {
        Arc::new(*self)
    }

    fn cache_key(&self) -> Option<String> {
        Some("accept-all".to_string())
    }
}

/// Drops snapshot versions from the candidate list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseOnlyVersionFilter;

impl VersionFilter for ReleaseOnlyVersionFilter {
    fn filter(&self, _artifact: &Artifact, versions: Vec<String>) -> Vec<String> {
        versions.into_iter().filter(|v| !v.ends_with("-SNAPSHOT")).collect()
    }

    fn derive_child(&self, _context: &DeriveContext) -> Arc<dyn VersionFilter> {
        Arc::new(*self)
    }

    fn cache_key(&self) -> Option<String> {
        Some("release-only".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvent_model::Artifact;

    fn dep(scope: &str, optional: bool) -> Dependency {
        Dependency {
            optional,
            ..Dependency::new(Artifact::new("g", "a", "1.0"), scope)
        }
    }

    #[test]
    fn scope_selector_drops_optional_and_excluded_scopes() {
        let sel = ScopeDependencySelector::runtime();
        assert!(!sel.include(&dep("test", false)));
        assert!(!sel.include(&dep("compile", true)));
        assert!(sel.include(&dep("compile", false)));
    }

    #[test]
    fn exclusion_selector_accumulates_on_derive() {
        let base = ExclusionDependencySelector::default();
        let parent_dep = Dependency {
            exclusions: vec![Exclusion::group_artifact("g1", "a1")],
            ..Dependency::new(Artifact::new("g", "a", "1.0"), "compile")
        };
        let ctx = DeriveContext { dependency: &parent_dep, depth: 1 };
        let child = base.derive_child(&ctx);
        assert!(!child.include(&dep_gid("g1", "a1")));
        assert!(child.include(&dep_gid("g2", "a2")));
    }

    fn dep_gid(g: &str, a: &str) -> Dependency {
        Dependency::new(Artifact::new(g, a, "1.0"), "compile")
    }

    #[test]
    fn classic_manager_overrides_matching_identity() {
        let mgr = ClassicDependencyManager;
        let managed = vec![Dependency::new(Artifact::new("g", "a", "2.0"), "provided")];
        let overrides = mgr.manage(&dep_gid("g", "a"), &managed).unwrap();
        assert_eq!(overrides.version.as_deref(), Some("2.0"));
        assert_eq!(overrides.scope.as_deref(), Some("provided"));
    }

    #[test]
    fn classic_manager_carries_managing_artifact_properties() {
        let mgr = ClassicDependencyManager;
        let mut managing_artifact = Artifact::new("g", "a", "2.0");
        managing_artifact.properties.insert("repositoryOfOrigin".to_string(), "central".to_string());
        let managed = vec![Dependency::new(managing_artifact, "compile")];
        let overrides = mgr.manage(&dep_gid("g", "a"), &managed).unwrap();
        assert_eq!(
            overrides.properties.as_ref().and_then(|p| p.get("repositoryOfOrigin")),
            Some(&"central".to_string())
        );
    }

    #[test]
    fn classic_manager_ignores_non_matching_identity() {
        let mgr = ClassicDependencyManager;
        let managed = vec![Dependency::new(Artifact::new("g", "other", "2.0"), "provided")];
        assert!(mgr.manage(&dep_gid("g", "a"), &managed).is_none());
    }

    #[test]
    fn scope_derive_child_manager_propagates_compile_runtime() {
        let mgr = ScopeDeriveChildManager::from_root(Arc::new(ClassicDependencyManager));
        let overrides = mgr.manage(&dep_gid("g", "a"), &[]).unwrap();
        assert_eq!(overrides.scope.as_deref(), Some("compile"));

        let runtime_dep = Dependency::new(Artifact::new("g", "b", "1.0"), "runtime");
        let overrides = mgr.manage(&runtime_dep, &[]).unwrap();
        assert_eq!(overrides.scope.as_deref(), Some("runtime"));
    }

    #[test]
    fn scope_derive_child_manager_pins_provided_for_descendants() {
        let root = ScopeDeriveChildManager::from_root(Arc::new(ClassicDependencyManager));
        let provided_dep = Dependency::new(Artifact::new("g", "a", "1.0"), "provided");
        let overrides = root.manage(&provided_dep, &[]).unwrap();
        assert_eq!(overrides.scope.as_deref(), Some("provided"));

        let managed_provided_dep = Dependency::new(provided_dep.artifact.clone(), overrides.scope.clone().unwrap());
        let ctx = DeriveContext { dependency: &managed_provided_dep, depth: 1 };
        let child = root.derive_child(&ctx);

        let grandchild_dep = Dependency::new(Artifact::new("g", "c", "1.0"), "compile");
        let grandchild_overrides = child.manage(&grandchild_dep, &[]).unwrap();
        assert_eq!(grandchild_overrides.scope.as_deref(), Some("provided"));
    }

    #[test]
    fn scope_derive_child_manager_test_scope_is_sticky() {
        let root = ScopeDeriveChildManager::from_root(Arc::new(ClassicDependencyManager));
        let test_dep = Dependency::new(Artifact::new("g", "a", "1.0"), "test");
        let overrides = root.manage(&test_dep, &[]).unwrap();
        assert_eq!(overrides.scope.as_deref(), Some("test"));
    }

    #[test]
    fn release_only_filter_drops_snapshots() {
        let filter = ReleaseOnlyVersionFilter;
        let versions = filter.filter(&Artifact::new("g", "a", "1.0"), vec!["1.0".into(), "1.1-SNAPSHOT".into()]);
        assert_eq!(versions, vec!["1.0".to_string()]);
    }
}
