use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use log::debug;
use crate::error::{ManagerError, Result};
use crate::http::{HttpClient, get_json};
use crate::release::{Release, ReleaseFile, ReleaseType};
use crate::version::VersionNumber;

/// The official Go download catalog.
pub const DEFAULT_RELEASE_LIST_URL: &str = "https://go.dev/dl/?mode=json";
/// Where the catalog's files can be downloaded from.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://go.dev/dl";

/// Answers "which releases exist" for the manager.
pub trait ReleaseResolver {
    /// Where `file` can be downloaded from.
    fn file_url(&self, file: &ReleaseFile) -> String;

    /// All releases visible under `filter`.
    fn list_all(&self, filter: ReleaseType) -> Result<Vec<Release>>;

    /// The release with the highest version number visible under `filter`.
    fn get_latest(&self, filter: ReleaseType) -> Result<Release> {
        self.list_all(filter)?
            .into_iter()
            .filter_map(|release| release.version_number().map(|version| (version, release)))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, release)| release)
            .ok_or(ManagerError::NoReleases { filter })
    }

    /// The release for `version`, if one is visible under `filter`.
    fn get_for_version(&self, filter: ReleaseType, version: &VersionNumber) -> Result<Option<Release>> {
        Ok(self
            .list_all(filter)?
            .into_iter()
            .find(|release| release.version_number().as_ref() == Some(version)))
    }
}

/// Release lists memoized per filter.
///
/// Owned by the resolver instead of living in a global, so tests can reset it.
#[derive(Default)]
pub struct ReleaseCache {
    entries: RefCell<HashMap<ReleaseType, Vec<Release>>>,
}

impl ReleaseCache {
    pub fn get(&self, filter: ReleaseType) -> Option<Vec<Release>> {
        self.entries.borrow().get(&filter).cloned()
    }

    pub fn insert(&self, filter: ReleaseType, releases: Vec<Release>) {
        self.entries.borrow_mut().insert(filter, releases);
    }

    /// Forgets the list for one filter, forcing the next lookup to refetch.
    pub fn invalidate(&self, filter: ReleaseType) {
        self.entries.borrow_mut().remove(&filter);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Reads the JSON release catalog published at go.dev.
pub struct GoReleaseClient {
    client: Rc<dyn HttpClient>,
    release_list_url: String,
    download_url: String,
    cache: ReleaseCache,
}

impl GoReleaseClient {
    pub fn new(
        client: Rc<dyn HttpClient>,
        release_list_url: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            release_list_url: release_list_url.into(),
            download_url: download_url.into(),
            cache: ReleaseCache::default(),
        }
    }

    pub fn cache(&self) -> &ReleaseCache {
        &self.cache
    }

    /// The catalog URL for one filter, e.g. `https://go.dev/dl/?mode=json&include=all`.
    pub fn list_url(&self, filter: ReleaseType) -> String {
        let separator = if self.release_list_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}include={filter}", self.release_list_url)
    }
}

impl ReleaseResolver for GoReleaseClient {
    fn file_url(&self, file: &ReleaseFile) -> String {
        file.url(&self.download_url)
    }

    fn list_all(&self, filter: ReleaseType) -> Result<Vec<Release>> {
        if let Some(releases) = self.cache.get(filter) {
            return Ok(releases);
        }
        let url = self.list_url(filter);
        let releases: Vec<Release> = get_json(self.client.as_ref(), &url)?;
        debug!("catalog lists {} {filter} releases", releases.len());
        self.cache.insert(filter, releases.clone());
        Ok(releases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::{RoutedClient, StaticResponseClient};

    const STABLE: &str = r#"[
        {"version":"go1.15.2","stable":true,"files":[]},
        {"version":"go1.15.10","stable":true,"files":[]}
    ]"#;
    const ALL: &str = r#"[
        {"version":"go1.16rc1","stable":false,"files":[]},
        {"version":"go1.15.10","stable":true,"files":[]},
        {"version":"go1.15.2","stable":true,"files":[]},
        {"version":"go1.12.16","stable":false,"files":[]}
    ]"#;

    fn resolver() -> (GoReleaseClient, Rc<RoutedClient>) {
        let client = Rc::new(
            RoutedClient::new()
                .route("https://go.test/dl/?mode=json&include=stable", 200, STABLE)
                .route("https://go.test/dl/?mode=json&include=all", 200, ALL),
        );
        let resolver = GoReleaseClient::new(client.clone(), "https://go.test/dl/?mode=json", "https://go.test/dl");
        (resolver, client)
    }

    #[test]
    fn test_list_url() {
        let (resolver, _) = resolver();
        assert_eq!(
            resolver.list_url(ReleaseType::All),
            "https://go.test/dl/?mode=json&include=all"
        );
        let plain = GoReleaseClient::new(Rc::new(RoutedClient::new()), "https://mirror.test/releases.json", "https://mirror.test");
        assert_eq!(
            plain.list_url(ReleaseType::Stable),
            "https://mirror.test/releases.json?include=stable"
        );
    }

    #[test]
    fn test_list_all_is_cached_per_filter() {
        let (resolver, client) = resolver();
        assert_eq!(resolver.list_all(ReleaseType::Stable).unwrap().len(), 2);
        assert_eq!(resolver.list_all(ReleaseType::Stable).unwrap().len(), 2);
        assert_eq!(resolver.list_all(ReleaseType::All).unwrap().len(), 4);
        assert_eq!(client.requests().len(), 2);

        resolver.cache().invalidate(ReleaseType::Stable);
        resolver.list_all(ReleaseType::Stable).unwrap();
        assert_eq!(client.requests().len(), 3);
    }

    #[test]
    fn test_get_latest_compares_versions_not_catalog_order() {
        let (resolver, _) = resolver();
        let latest = resolver.get_latest(ReleaseType::Stable).unwrap();
        assert_eq!(latest.version, "go1.15.10");
        let latest = resolver.get_latest(ReleaseType::All).unwrap();
        assert_eq!(latest.version, "go1.16rc1");
    }

    #[test]
    fn test_get_latest_with_empty_catalog() {
        let resolver = GoReleaseClient::new(Rc::new(StaticResponseClient::new(200, "[]")), "https://go.test", "https://go.test/dl");
        let err = resolver.get_latest(ReleaseType::Stable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[test]
    fn test_get_for_version() {
        let (resolver, _) = resolver();
        let version: VersionNumber = "1.12.16".parse().unwrap();
        let release = resolver.get_for_version(ReleaseType::All, &version).unwrap();
        assert_eq!(release.unwrap().version, "go1.12.16");
        assert!(resolver.get_for_version(ReleaseType::Stable, &version).unwrap().is_none());
    }

    #[test]
    fn test_http_failures_are_transfer_errors() {
        let failing = GoReleaseClient::new(Rc::new(StaticResponseClient::failing("failure")), "https://go.test", "https://go.test/dl");
        assert_eq!(failing.list_all(ReleaseType::Stable).unwrap_err().kind(), ErrorKind::Transfer);

        let not_found = GoReleaseClient::new(Rc::new(StaticResponseClient::new(404, "not found")), "https://go.test", "https://go.test/dl");
        assert_eq!(not_found.get_latest(ReleaseType::All).unwrap_err().kind(), ErrorKind::Transfer);
        assert!(not_found.cache().get(ReleaseType::All).is_none());
    }
}
