use std::fmt;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("malformed thread url {input:?}: {reason}")]
    MalformedUrl { input: String, reason: String },
    #[error("malformed username {input:?}")]
    MalformedUsername { input: String },
}

/// A forum thread address reduced to `scheme://host/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTarget {
    base: Url,
}

impl ThreadTarget {
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let malformed = |reason: &str| TargetError::MalformedUrl {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        let mut url = Url::parse(input.trim()).map_err(|err| malformed(&err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(malformed("scheme must be http or https"));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(malformed("missing host"));
        }
        if url.path().trim_matches('/').is_empty() {
            return Err(malformed("missing path"));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self { base: url })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }
}

impl fmt::Display for ThreadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}

/// An account name that can be placed into a URL path and a directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let name = input.trim();
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(TargetError::MalformedUsername {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
