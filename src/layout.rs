//! Cache directory layout: identity triple to filenames and versioned paths.

use std::env;
use std::path::{Path, PathBuf};

/// Artifact family cached by this crate. All bundles live under
/// `<base>/builtin-actors/`.
pub const BUNDLE_FAMILY: &str = "builtin-actors";

/// Identity of a single cached bundle: the key that determines both the
/// on-disk placement and the remote release URLs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BundleIdentity {
    pub version: u64,
    pub release: String,
    pub network: String,
}

impl BundleIdentity {
    pub fn new(version: u64, release: &str, network: &str) -> Self {
        Self {
            version,
            release: release.to_string(),
            network: network.to_string(),
        }
    }

    /// `builtin-actors-<network>`
    pub fn bundle_name(&self) -> String {
        format!("{}-{}", BUNDLE_FAMILY, self.network)
    }

    /// `builtin-actors-<network>.car`
    pub fn car_file(&self) -> String {
        format!("{}.car", self.bundle_name())
    }

    /// `builtin-actors-<network>.sha256`
    pub fn digest_file(&self) -> String {
        format!("{}.sha256", self.bundle_name())
    }

    /// Versioned directory under the family root:
    /// `<family_root>/v<version>/<release>/`
    pub fn version_dir(&self, family_root: &Path) -> PathBuf {
        family_root
            .join(format!("v{}", self.version))
            .join(&self.release)
    }
}

/// Returns the default cache base directory. Uses BUNDLE_CACHE_DIR if
/// set; otherwise Windows: %USERPROFILE%\.bundle-cache,
/// Unix: $HOME/.bundle-cache
pub fn default_cache_dir() -> PathBuf {
    if let Ok(dir) = env::var("BUNDLE_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    let base = if cfg!(target_os = "windows") {
        env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string())
    } else {
        env::var("HOME").unwrap_or_else(|_| ".".to_string())
    };
    PathBuf::from(base).join(".bundle-cache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filenames() {
        let id = BundleIdentity::new(8, "v8.0.0", "mainnet");
        assert_eq!(id.bundle_name(), "builtin-actors-mainnet");
        assert_eq!(id.car_file(), "builtin-actors-mainnet.car");
        assert_eq!(id.digest_file(), "builtin-actors-mainnet.sha256");
    }

    #[test]
    fn test_version_dir_layout() {
        let id = BundleIdentity::new(8, "v8.0.0", "mainnet");
        let root = Path::new("/tmp/cache").join(BUNDLE_FAMILY);
        let dir = id.version_dir(&root);
        assert_eq!(dir, Path::new("/tmp/cache/builtin-actors/v8/v8.0.0"));
        assert_eq!(
            dir.join(id.car_file()),
            Path::new("/tmp/cache/builtin-actors/v8/v8.0.0/builtin-actors-mainnet.car")
        );
    }

    #[test]
    fn test_networks_get_disjoint_filenames() {
        let mainnet = BundleIdentity::new(8, "v8.0.0", "mainnet");
        let calibnet = BundleIdentity::new(8, "v8.0.0", "calibrationnet");
        assert_ne!(mainnet.car_file(), calibnet.car_file());
        assert_ne!(mainnet.digest_file(), calibnet.digest_file());
    }

    #[test]
    fn test_default_cache_dir_env_override() {
        env::set_var("BUNDLE_CACHE_DIR", "/tmp/bundle-cache-test");
        assert_eq!(default_cache_dir(), PathBuf::from("/tmp/bundle-cache-test"));
        env::remove_var("BUNDLE_CACHE_DIR");
        assert!(default_cache_dir().ends_with(".bundle-cache"));
    }
}
