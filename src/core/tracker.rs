use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sync::SyncError;

/// Connection to a GitHub repository. Absent means no remote sync.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

impl TrackerConfig {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into().trim().to_string(),
            owner: owner.into().trim().to_string(),
            repo: repo.into().trim().to_string(),
        }
    }

    /// Fails on the first empty field, then on an owner or repo that would
    /// escape its URL path segment.
    pub fn ensure_complete(&self) -> Result<(), SyncError> {
        for (field, value) in [
            ("token", &self.token),
            ("owner", &self.owner),
            ("repo", &self.repo),
        ] {
            if value.trim().is_empty() {
                return Err(SyncError::Configuration(field));
            }
        }
        for (field, value) in [("owner", &self.owner), ("repo", &self.repo)] {
            if value.contains(['/', '?', '#']) {
                return Err(SyncError::InvalidName(field));
            }
        }
        Ok(())
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

// Keep the token out of logs.
impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_config_passes() {
        let cfg = TrackerConfig::new("ghp_x", "octo", "hello");
        assert!(cfg.ensure_complete().is_ok());
        assert_eq!(cfg.slug(), "octo/hello");
    }

    #[test]
    fn missing_field_is_named() {
        let cfg = TrackerConfig::new("ghp_x", " ", "hello");
        match cfg.ensure_complete() {
            Err(SyncError::Configuration(field)) => assert_eq!(field, "owner"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn path_breaking_names_are_rejected() {
        for (owner, repo, field) in [
            ("octo/evil", "hello", "owner"),
            ("octo", "hello?state=closed", "repo"),
            ("octo", "hello#x", "repo"),
        ] {
            let cfg = TrackerConfig::new("ghp_x", owner, repo);
            match cfg.ensure_complete() {
                Err(SyncError::InvalidName(f)) => assert_eq!(f, field),
                other => panic!("expected invalid name for {}/{}, got {:?}", owner, repo, other),
            }
        }
        assert!(TrackerConfig::new("ghp_x", "octo-org", "hello.rs").ensure_complete().is_ok());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = TrackerConfig::new("ghp_secret", "octo", "hello");
        let out = format!("{:?}", cfg);
        assert!(!out.contains("ghp_secret"));
        assert!(out.contains("octo"));
    }
}
