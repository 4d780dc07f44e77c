// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Safety checks for externally supplied URLs.
//!
//! Gates portfolio demo links before they become an iframe `src` or a
//! new-window target. Never used for the site's own links. Every check
//! fails closed: anything that cannot be parsed or classified is unsafe.

use crate::config::UrlGuardConfig;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Sandbox attribute for iframes that embed URLs accepted by the guard.
pub const IFRAME_SANDBOX: &str =
    "allow-same-origin allow-scripts allow-forms allow-popups allow-popups-to-escape-sandbox";

/// Substrings rejected anywhere in the raw input, independent of how the
/// parser interprets it. Compared against the lowercased input.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    "javascript:",
    "data:",
    "vbscript:",
    "onload=",
    "onerror=",
    "<script",
];

/// Why a URL was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeReason {
    /// Empty, whitespace-only or the `#` placeholder
    Missing,
    /// No usable origin to resolve against
    NoOrigin,
    /// Could not be parsed
    Unparseable,
    /// Scheme other than http/https
    Scheme,
    /// Raw input contains a blocked pattern
    SuspiciousPattern,
    /// Loopback or private-range host in strict mode
    PrivateHost,
}

impl fmt::Display for UnsafeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "URL missing"),
            Self::NoOrigin => write!(f, "No valid origin configured"),
            Self::Unparseable => write!(f, "URL could not be parsed"),
            Self::Scheme => write!(f, "Only http and https URLs are allowed"),
            Self::SuspiciousPattern => write!(f, "URL contains a blocked pattern"),
            Self::PrivateHost => write!(f, "Private or loopback host"),
        }
    }
}

/// Result of a URL check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlVerdict {
    /// Safe to embed or navigate to; carries the resolved URL
    Safe(Url),
    /// Must not be used
    Unsafe(UnsafeReason),
}

impl UrlVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, UrlVerdict::Safe(_))
    }

    pub fn reason(&self) -> Option<UnsafeReason> {
        match self {
            UrlVerdict::Safe(_) => None,
            UrlVerdict::Unsafe(reason) => Some(*reason),
        }
    }
}

/// URL safety checker bound to the page origin.
#[derive(Debug, Clone)]
pub struct UrlGuard {
    origin: Option<Url>,
    block_private_hosts: bool,
}

impl UrlGuard {
    /// Create a guard. An origin that does not parse is logged and leaves
    /// the guard rejecting everything.
    pub fn new(config: UrlGuardConfig) -> Self {
        let origin = match Url::parse(&config.origin) {
            Ok(origin) => Some(origin),
            Err(err) => {
                warn!(origin = %config.origin, error = %err, "Invalid origin, URL guard will reject all input");
                None
            }
        };
        Self {
            origin,
            block_private_hosts: config.block_private_hosts,
        }
    }

    /// Classify a URL, resolving relative input against the origin.
    pub fn check(&self, raw: &str) -> UrlVerdict {
        if raw.trim().is_empty() || raw == "#" {
            return UrlVerdict::Unsafe(UnsafeReason::Missing);
        }

        let Some(origin) = &self.origin else {
            return UrlVerdict::Unsafe(UnsafeReason::NoOrigin);
        };

        let parsed = match origin.join(raw) {
            Ok(url) => url,
            Err(err) => {
                debug!(url_len = raw.len(), error = %err, "URL failed to parse");
                return UrlVerdict::Unsafe(UnsafeReason::Unparseable);
            }
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            debug!(scheme = %parsed.scheme(), "URL scheme rejected");
            return UrlVerdict::Unsafe(UnsafeReason::Scheme);
        }

        if contains_suspicious_pattern(raw) {
            debug!(url_len = raw.len(), "URL contains blocked pattern");
            return UrlVerdict::Unsafe(UnsafeReason::SuspiciousPattern);
        }

        UrlVerdict::Safe(parsed)
    }

    /// Whether a URL may be used as an embed or navigation target.
    pub fn is_safe_url(&self, raw: &str) -> bool {
        self.check(raw).is_safe()
    }

    /// Absolute http(s) URLs only. With `block_private_hosts` set, loopback
    /// and private-range hosts are refused too.
    pub fn check_strict(&self, raw: &str) -> UrlVerdict {
        if raw.trim().is_empty() {
            return UrlVerdict::Unsafe(UnsafeReason::Missing);
        }

        let parsed = match Url::parse(raw) {
            Ok(url) => url,
            Err(_) => return UrlVerdict::Unsafe(UnsafeReason::Unparseable),
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return UrlVerdict::Unsafe(UnsafeReason::Scheme);
        }

        if self.block_private_hosts {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            if is_private_host(&host) {
                debug!(host = %host, "Private host rejected");
                return UrlVerdict::Unsafe(UnsafeReason::PrivateHost);
            }
        }

        UrlVerdict::Safe(parsed)
    }

    pub fn is_valid_url_strict(&self, raw: &str) -> bool {
        self.check_strict(raw).is_safe()
    }
}

fn contains_suspicious_pattern(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    SUSPICIOUS_PATTERNS.iter().any(|p| lowered.contains(p))
}

// Prefix matching on the host string, including the whole of 172.*,
// not only 172.16.0.0/12.
fn is_private_host(host: &str) -> bool {
    host == "localhost"
        || host == "127.0.0.1"
        || host.starts_with("192.168.")
        || host.starts_with("10.")
        || host.starts_with("172.")
}
