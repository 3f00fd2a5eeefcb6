use std::fmt;

/// Why a URL was passed over without saving anything
///
/// Every variant is non-fatal: the URL is dropped and the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    // ===== Policy rejections =====
    /// Host or path outside the allow-list
    OutOfScope,

    /// Disallowed by the host's robots.txt
    RobotsDisallowed,

    /// Response was not HTML (frontier) or not a PDF (harvester)
    ContentMismatch,

    // ===== Transient failures =====
    /// Transport failure: timeout, DNS, connection reset
    FetchFailed,

    /// Server answered with a status other than 200
    HttpStatus,
}

impl SkipReason {
    /// Returns true for rejections decided by configuration or robots.txt
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            Self::OutOfScope | Self::RobotsDisallowed | Self::ContentMismatch
        )
    }

    /// Returns true for network-side failures
    pub fn is_failure(&self) -> bool {
        !self.is_policy()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfScope => "out-of-scope",
            Self::RobotsDisallowed => "robots-disallowed",
            Self::ContentMismatch => "content-mismatch",
            Self::FetchFailed => "fetch-failed",
            Self::HttpStatus => "http-status",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
