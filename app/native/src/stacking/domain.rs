//! Hostname decomposition and grouping keys.
//!
//! Tabs are clustered by a *grouping key*: either the full host
//! (`mail.example.com`) or its base domain (`example.com`), depending on
//! `groupBySubdomain`.
//!
//! # Base Domain
//!
//! The base domain is the last label before the top-level suffix plus the
//! suffix itself:
//!
//! ```text
//! a.b.example.co.uk   (tld = co.uk)  ->  example.co.uk
//! mail.example.com    (tld = com)    ->  example.com
//! localhost           (no tld)       ->  localhost
//! ```
//!
//! When no suffix can be detected the host is returned unchanged.

use std::sync::Arc;

use url::{Host, Url};

use crate::config::StackingConfig;

/// Multi-label public suffixes recognised out of the box.
///
/// Anything not listed here falls back to the host's last label.
pub const DEFAULT_PUBLIC_SUFFIXES: &[&str] = &[
    "ac.jp", "ac.uk", "co.id", "co.in", "co.jp", "co.kr", "co.nz", "co.uk", "co.za", "com.ar",
    "com.au", "com.br", "com.cn", "com.hk", "com.mx", "com.my", "com.sg", "com.tr", "com.tw",
    "edu.au", "go.jp", "gov.au", "gov.uk", "ltd.uk", "me.uk", "ne.jp", "net.au", "net.cn",
    "or.jp", "org.au", "org.cn", "org.nz", "org.uk", "plc.uk",
];

// ============================================================================
// URL Decomposition
// ============================================================================

/// Host and top-level suffix of a URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlFragments {
    /// Full host, lowercased.
    pub host: String,
    /// Top-level suffix (`com`, `co.uk`); empty when none was detected.
    pub tld: String,
}

impl UrlFragments {
    /// Creates fragments from parts.
    #[must_use]
    pub fn new(host: impl Into<String>, tld: impl Into<String>) -> Self {
        Self { host: host.into(), tld: tld.into() }
    }

    /// Returns the base domain (`<name>.<tld>`), or the host if there is none.
    #[must_use]
    pub fn base_domain(&self) -> &str {
        if self.tld.is_empty() || self.host.len() <= self.tld.len() {
            return &self.host;
        }

        let Some(rest) = self
            .host
            .strip_suffix(self.tld.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
        else {
            return &self.host;
        };

        let name_start = rest.rfind('.').map_or(0, |dot| dot + 1);
        if name_start == rest.len() {
            return &self.host;
        }

        &self.host[name_start..]
    }
}

/// Splits URLs into host and top-level suffix.
pub trait UrlDecomposer: Send + Sync {
    /// Decomposes a URL.
    ///
    /// Returns `None` for URLs without a host (`about:blank`, `data:` URLs, ...).
    fn decompose(&self, url: &str) -> Option<UrlFragments>;
}

/// Suffix-list based decomposer.
///
/// Recognises a fixed list of multi-label suffixes and otherwise treats the
/// last label as the top-level domain. IP literals and single-label hosts have
/// no top-level suffix.
#[derive(Clone, Debug)]
pub struct SuffixDecomposer {
    /// Known multi-label suffixes, each without a leading dot.
    suffixes: Vec<String>,
    /// Fall back to the last label when no listed suffix matches.
    last_label_fallback: bool,
}

impl Default for SuffixDecomposer {
    fn default() -> Self { Self::new() }
}

impl SuffixDecomposer {
    /// Creates a decomposer with the built-in suffix list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            suffixes: DEFAULT_PUBLIC_SUFFIXES.iter().map(|s| (*s).to_string()).collect(),
            last_label_fallback: true,
        }
    }

    /// Creates a decomposer that only knows the given suffixes.
    ///
    /// Hosts matching none of them have no top-level suffix.
    #[must_use]
    pub fn with_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes: suffixes.into_iter().map(|s| normalize_suffix(s.as_ref())).collect(),
            last_label_fallback: false,
        }
    }

    /// Creates a decomposer with the built-in list plus `publicSuffixes` from config.
    #[must_use]
    pub fn from_config(config: &StackingConfig) -> Self {
        let mut decomposer = Self::new();
        for suffix in &config.public_suffixes {
            let suffix = normalize_suffix(suffix);
            if !suffix.is_empty() && !decomposer.suffixes.contains(&suffix) {
                decomposer.suffixes.push(suffix);
            }
        }
        decomposer
    }

    /// Finds the top-level suffix of a domain host.
    fn tld_for(&self, host: &str) -> String {
        let listed = self
            .suffixes
            .iter()
            .filter(|suffix| {
                host.len() > suffix.len()
                    && host.ends_with(suffix.as_str())
                    && host.as_bytes()[host.len() - suffix.len() - 1] == b'.'
            })
            .max_by_key(|suffix| suffix.len());

        if let Some(suffix) = listed {
            return suffix.clone();
        }

        if self.last_label_fallback
            && let Some((_, last)) = host.rsplit_once('.')
        {
            return last.to_string();
        }

        String::new()
    }
}

impl UrlDecomposer for SuffixDecomposer {
    fn decompose(&self, url: &str) -> Option<UrlFragments> {
        let parsed = Url::parse(url).ok()?;

        match parsed.host()? {
            Host::Domain(domain) => {
                let host = domain.trim_end_matches('.').to_ascii_lowercase();
                if host.is_empty() {
                    return None;
                }
                let tld = self.tld_for(&host);
                Some(UrlFragments { host, tld })
            }
            Host::Ipv4(addr) => Some(UrlFragments::new(addr.to_string(), "")),
            Host::Ipv6(addr) => Some(UrlFragments::new(addr.to_string(), "")),
        }
    }
}

fn normalize_suffix(suffix: &str) -> String {
    suffix.trim().trim_matches('.').to_ascii_lowercase()
}

// ============================================================================
// Grouping Keys
// ============================================================================

/// Computes grouping keys for tab URLs.
#[derive(Clone)]
pub struct KeyResolver {
    decomposer: Arc<dyn UrlDecomposer>,
    group_by_subdomain: bool,
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("group_by_subdomain", &self.group_by_subdomain)
            .finish_non_exhaustive()
    }
}

impl KeyResolver {
    /// Creates a resolver over the given decomposer.
    #[must_use]
    pub fn new(decomposer: Arc<dyn UrlDecomposer>, group_by_subdomain: bool) -> Self {
        Self { decomposer, group_by_subdomain }
    }

    /// Creates a resolver with a [`SuffixDecomposer`] built from config.
    #[must_use]
    pub fn from_config(config: &StackingConfig) -> Self {
        Self::new(Arc::new(SuffixDecomposer::from_config(config)), config.group_by_subdomain)
    }

    /// Decomposes a URL with the underlying decomposer.
    #[must_use]
    pub fn fragments(&self, url: &str) -> Option<UrlFragments> { self.decomposer.decompose(url) }

    /// Returns the base domain of a URL.
    #[must_use]
    pub fn base_domain(&self, url: &str) -> Option<String> {
        self.fragments(url).map(|f| f.base_domain().to_string())
    }

    /// Returns the grouping key for already decomposed fragments.
    #[must_use]
    pub fn key_for(&self, fragments: &UrlFragments) -> String {
        if self.group_by_subdomain {
            fragments.host.clone()
        } else {
            fragments.base_domain().to_string()
        }
    }

    /// Returns the grouping key of a URL, or `None` if the URL has no host.
    #[must_use]
    pub fn grouping_key(&self, url: &str) -> Option<String> {
        self.fragments(url).map(|f| self.key_for(&f))
    }
}
