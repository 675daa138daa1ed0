use ota_common::namespace;

/// Where the asset server is reachable by devices.
pub const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:5000";

/// Builds download URLs from the asset server base and a namespace-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrls {
    base: String,
}

impl AssetUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `{base}/{namespace}/{path}`
    pub fn url(&self, namespace: &str, path: &str) -> String {
        format!("{}/{namespace}/{}", self.base, path.trim_start_matches('/'))
    }

    pub fn image(&self, path: &str) -> String {
        self.url(namespace::IMAGES, path)
    }

    pub fn firmware(&self, path: &str) -> String {
        self.url(namespace::FIRMWARE, path)
    }
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_BASE_URL)
    }
}
