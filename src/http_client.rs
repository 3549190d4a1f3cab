//! Blocking HTTP download helper: connection reuse via a single Agent.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::error::BundleError;

const CONNECT_TIMEOUT_MS: u64 = 10_000;
// Per-socket-read timeout, not a whole-transfer deadline: bundle files
// can be hundreds of megabytes on slow links.
const READ_TIMEOUT_MS: u64 = 30_000;

/// HTTP client: one Agent so sequential downloads reuse the connection.
#[derive(Debug)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(CONNECT_TIMEOUT_MS))
            .timeout_read(Duration::from_millis(READ_TIMEOUT_MS))
            .build();
        Self { agent }
    }

    /// GET url and stream the response body to a created/truncated file
    /// at dest. Any non-success status, transport error, or local write
    /// error is a Retrieval error. No retry here: re-fetching is the
    /// caller's decision.
    pub fn get_to_file(&self, url: &str, dest: &Path) -> Result<(), BundleError> {
        let resp = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(BundleError::retrieval(
                    url,
                    format!("http response status is {}", status),
                ));
            }
            Err(e) => return Err(BundleError::retrieval(url, e.to_string())),
        };

        let mut out = File::create(dest).map_err(|e| {
            BundleError::retrieval(url, format!("error opening {} for writing: {}", dest.display(), e))
        })?;
        let mut reader = resp.into_reader();
        io::copy(&mut reader, &mut out).map_err(|e| {
            BundleError::retrieval(url, format!("error writing {}: {}", dest.display(), e))
        })?;
        Ok(())
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
