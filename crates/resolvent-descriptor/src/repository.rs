//! Maven repository URL layout: the on-disk/on-wire path convention a
//! repository serves POMs, JARs, and metadata documents under. Building a
//! request URL is all this module does — issuing it (HTTP, local cache,
//! or anything else) is the embedder's job.

use resolvent_model::RemoteRepository;

/// Maven Central base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// Google's Maven repository.
pub const GOOGLE_MAVEN_URL: &str = "https://maven.google.com";

/// Construct the default Maven Central [`RemoteRepository`].
pub fn maven_central() -> RemoteRepository {
    RemoteRepository::new("central", MAVEN_CENTRAL_URL)
}

/// Construct the Google Maven [`RemoteRepository`].
pub fn google() -> RemoteRepository {
    RemoteRepository::new("google", GOOGLE_MAVEN_URL)
}

/// Standard Maven layout path for a given coordinate.
///
/// `org.jetbrains.kotlinx:kotlinx-coroutines-core:1.8.0` becomes
/// `org/jetbrains/kotlinx/kotlinx-coroutines-core/1.8.0`
pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
    format!("{}/{}/{}", group.replace('.', "/"), artifact, version)
}

/// Full URL to a specific file within the repository.
pub fn file_url(repo: &RemoteRepository, group: &str, artifact: &str, version: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        repo.url.trim_end_matches('/'),
        coordinate_path(group, artifact, version),
        filename
    )
}

/// URL to the POM file for a given coordinate.
pub fn pom_url(repo: &RemoteRepository, group: &str, artifact: &str, version: &str) -> String {
    let filename = format!("{artifact}-{version}.pom");
    file_url(repo, group, artifact, version, &filename)
}

/// URL to the `maven-metadata.xml` at the artifact level (version listing).
pub fn metadata_url(repo: &RemoteRepository, group: &str, artifact: &str) -> String {
    format!(
        "{}/{}/{}/maven-metadata.xml",
        repo.url.trim_end_matches('/'),
        group.replace('.', "/"),
        artifact
    )
}

/// URL to the `maven-metadata.xml` at the version level (SNAPSHOT resolution).
pub fn snapshot_metadata_url(repo: &RemoteRepository, group: &str, artifact: &str, version: &str) -> String {
    format!(
        "{}/{}/maven-metadata.xml",
        repo.url.trim_end_matches('/'),
        coordinate_path(group, artifact, version)
    )
}
