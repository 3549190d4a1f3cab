//! Bundle fetcher: obtain a verified CAR bundle for an identity triple,
//! downloading from the release origin only when the cached copy is
//! missing or fails verification.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{error, info, warn};

use crate::error::BundleError;
use crate::http_client::HttpClient;
use crate::layout::{BundleIdentity, BUNDLE_FAMILY};
use crate::verify::verify_bundle;

/// GitHub release origin for builtin-actors bundles.
const DEFAULT_ORIGIN: &str =
    "https://github.com/filecoin-project/builtin-actors/releases/download";

/// Env override for the release origin (mirrors, air-gapped hosts).
const ORIGIN_ENV: &str = "BUNDLE_CACHE_ORIGIN";

/// Outcome of checking an already-cached bundle. `Invalid` is not an
/// error path: the fetcher logs it and falls through to a re-fetch.
enum CacheStatus {
    Verified,
    Invalid(BundleError),
}

/// Owns the family directory under the cache root and serializes
/// fetches per identity triple.
#[derive(Debug)]
pub struct BundleFetcher {
    family_root: PathBuf,
    origin: String,
    client: HttpClient,
    // One lock per identity: overlapping fetches for the same bundle
    // serialize instead of racing on the same files. Different
    // identities touch disjoint directories and proceed in parallel.
    locks: Mutex<HashMap<BundleIdentity, Arc<Mutex<()>>>>,
}

impl BundleFetcher {
    /// Create a fetcher rooted at `<base>/builtin-actors/`, creating the
    /// directory if it does not exist. Origin is the default release
    /// host unless BUNDLE_CACHE_ORIGIN is set.
    pub fn new(base: &Path) -> Result<Self, BundleError> {
        let origin = env::var(ORIGIN_ENV).unwrap_or_else(|_| DEFAULT_ORIGIN.to_string());
        Self::with_origin(base, &origin)
    }

    /// Like [`BundleFetcher::new`], but downloads from `origin` instead
    /// of the default release origin.
    pub fn with_origin(base: &Path, origin: &str) -> Result<Self, BundleError> {
        let family_root = base.join(BUNDLE_FAMILY);
        fs::create_dir_all(&family_root)
            .map_err(|e| BundleError::filesystem(&family_root, e))?;
        Ok(Self {
            family_root,
            origin: origin.trim_end_matches('/').to_string(),
            client: HttpClient::new(),
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Obtain the verified bundle for (version, release, network) and
    /// return its path.
    ///
    /// Cache hit: the existing file verifies against its digest file and
    /// the path is returned with no network access. Cache miss or failed
    /// verification: the digest and bundle files are re-downloaded from
    /// the origin (overwriting in place) and verified again; a failure
    /// on the fresh pair is fatal and surfaced.
    pub fn fetch(
        &self,
        version: u64,
        release: &str,
        network: &str,
    ) -> Result<PathBuf, BundleError> {
        let identity = BundleIdentity::new(version, release, network);
        let lock = self.identity_lock(&identity);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let dir = identity.version_dir(&self.family_root);
        fs::create_dir_all(&dir).map_err(|e| BundleError::filesystem(&dir, e))?;

        let bundle_path = dir.join(identity.car_file());
        let digest_path = dir.join(identity.digest_file());

        if bundle_path.exists() {
            match check_cached(&digest_path, &bundle_path) {
                CacheStatus::Verified => return Ok(bundle_path),
                CacheStatus::Invalid(err) => {
                    warn!(
                        "invalid bundle {}: {}; refetching",
                        identity.bundle_name(),
                        err
                    );
                }
            }
        }

        info!("fetching bundle {}", identity.car_file());
        if let Err(err) = self.retrieve(&identity, &digest_path, &bundle_path) {
            error!("error fetching bundle {}: {}", identity.bundle_name(), err);
            return Err(err);
        }

        if let Err(err) = verify_bundle(&digest_path, &bundle_path) {
            error!("error checking bundle {}: {}", identity.bundle_name(), err);
            return Err(err);
        }

        Ok(bundle_path)
    }

    /// Download the digest file, then the bundle file. The digest comes
    /// first so a dead origin is detected before the large transfer.
    fn retrieve(
        &self,
        identity: &BundleIdentity,
        digest_path: &Path,
        bundle_path: &Path,
    ) -> Result<(), BundleError> {
        let digest_url = self.release_url(&identity.release, &identity.digest_file());
        info!("fetching URL: {}", digest_url);
        self.client.get_to_file(&digest_url, digest_path)?;

        let bundle_url = self.release_url(&identity.release, &identity.car_file());
        info!("fetching URL: {}", bundle_url);
        self.client.get_to_file(&bundle_url, bundle_path)?;

        Ok(())
    }

    fn release_url(&self, release: &str, filename: &str) -> String {
        format!("{}/{}/{}", self.origin, release, filename)
    }

    fn identity_lock(&self, identity: &BundleIdentity) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(identity.clone()).or_default().clone()
    }
}

fn check_cached(digest_path: &Path, bundle_path: &Path) -> CacheStatus {
    match verify_bundle(digest_path, bundle_path) {
        Ok(()) => CacheStatus::Verified,
        Err(err) => CacheStatus::Invalid(err),
    }
}
