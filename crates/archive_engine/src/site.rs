use archive_core::Username;

pub const DEFAULT_SITE_ROOT: &str = "https://roosterteeth.com";

/// Where per-user listings live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    root: String,
}

impl SiteConfig {
    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            root: root.trim_end_matches('/').to_string(),
        }
    }

    /// Profile page, also the activity feed.
    pub fn user_url(&self, user: &Username) -> String {
        format!("{}/user/{}", self.root, user)
    }

    pub fn gallery_url(&self, user: &Username) -> String {
        format!("{}/images", self.user_url(user))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_ROOT)
    }
}
