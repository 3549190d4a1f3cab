//! Local, content-addressed cache for versioned builtin-actors CAR bundles.
//! One operation: obtain the verified bundle for a (version, release,
//! network) triple, downloading the digest and bundle files from the
//! release origin only when the cached copy is missing or fails its
//! SHA-256 check. Used by the surrounding node software; reusable by
//! other tools that need verified release artifacts on disk.

pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod layout;
pub mod verify;

// Re-export main API for consumers
pub use error::BundleError;
pub use fetcher::BundleFetcher;
pub use layout::{default_cache_dir, BundleIdentity, BUNDLE_FAMILY};
pub use verify::{file_digest, read_expected_digest, verify_bundle};
