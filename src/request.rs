//! Clone requests and the repository specification grammar
//!
//! A repository specification is `<url> [branch=<name>] [commit=<id>]`, with
//! the optional fields separated by whitespace. The command line carries a
//! `;`-separated list of specifications and a dependency descriptor carries
//! one specification per line; both go through [`parse_requests`].
//!
//! The [`VersionPolicy`] is applied exactly once, while a specification is
//! parsed into a [`CloneRequest`]. Requests are immutable afterwards.

use std::fmt;
use std::str::FromStr;

use crate::defaults::TAG_PREFIX;
use crate::error::{Error, Result};

/// A desired version of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    pub branch: Option<String>,
    pub commit: Option<String>,
}

impl CloneRequest {
    /// A request for the newest version of `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: None,
            commit: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    /// True when the branch pin refers to a tag (`branch=tags/<name>`).
    pub fn is_tag(&self) -> bool {
        self.branch
            .as_deref()
            .is_some_and(|branch| branch.starts_with(TAG_PREFIX))
    }

    /// True when the request carries any branch or commit pin.
    pub fn is_pinned(&self) -> bool {
        self.branch.is_some() || self.commit.is_some()
    }

    /// Repository name derived from the URL, see [`repo_name_from_url`].
    pub fn repo_name(&self) -> String {
        repo_name_from_url(&self.url)
    }
}

impl fmt::Display for CloneRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)?;
        if let Some(branch) = &self.branch {
            write!(f, " branch={}", branch)?;
        }
        if let Some(commit) = &self.commit {
            write!(f, " commit={}", commit)?;
        }
        Ok(())
    }
}

/// Where a specification came from. The default policy treats the two
/// differently: pins typed by the caller are honored, pins found in
/// dependency descriptors are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    Root,
    Dependency,
}

/// How branch and commit pins are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    /// Honor pins given on the command line; dependencies follow their
    /// branch but drop tag and commit pins.
    #[default]
    PreferPinElseNewest,
    /// Drop every branch, tag and commit pin.
    AlwaysNewest,
    /// Honor every pin, wherever it was declared.
    AlwaysPinned,
}

impl VersionPolicy {
    /// Apply the policy to a freshly parsed request.
    pub fn apply(self, request: CloneRequest, origin: RequestOrigin) -> CloneRequest {
        match (self, origin) {
            (VersionPolicy::AlwaysNewest, _) => CloneRequest::new(request.url),
            (VersionPolicy::PreferPinElseNewest, RequestOrigin::Dependency) => {
                let branch = if request.is_tag() {
                    None
                } else {
                    request.branch
                };
                CloneRequest {
                    url: request.url,
                    branch,
                    commit: None,
                }
            }
            _ => request,
        }
    }

    /// Numeric code accepted by `--version-action`.
    pub fn code(self) -> u8 {
        match self {
            VersionPolicy::PreferPinElseNewest => 1,
            VersionPolicy::AlwaysNewest => 2,
            VersionPolicy::AlwaysPinned => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VersionPolicy::PreferPinElseNewest => "USE_TARGET_IF_ARGUMENT_ELSE_NEWEST",
            VersionPolicy::AlwaysNewest => "ALL_NEWEST",
            VersionPolicy::AlwaysPinned => "ALWAYS_USE_TARGET",
        }
    }
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VersionPolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "1" | "use_target_if_argument_else_newest" | "prefer_pin" | "prefer_pin_else_newest" => {
                Ok(VersionPolicy::PreferPinElseNewest)
            }
            "2" | "all_newest" | "always_newest" => Ok(VersionPolicy::AlwaysNewest),
            "3" | "always_use_target" | "always_pinned" => Ok(VersionPolicy::AlwaysPinned),
            _ => Err(Error::VersionPolicy {
                value: value.to_string(),
            }),
        }
    }
}

/// Parse a single specification. Returns `None` for blank input.
///
/// Unknown fields are ignored. A repeated field keeps its last value.
pub fn parse_request(spec: &str) -> Option<CloneRequest> {
    let mut parts = spec.split_whitespace();
    let mut request = CloneRequest::new(parts.next()?);

    for part in parts {
        if let Some(branch) = part.strip_prefix("branch=") {
            request.branch = Some(branch.to_string());
        } else if let Some(commit) = part.strip_prefix("commit=") {
            request.commit = Some(commit.to_string());
        }
    }

    Some(request)
}

/// Parse a `delimiter`-separated list of specifications, applying `policy`
/// for requests of the given `origin`. Blank entries are skipped.
pub fn parse_requests(
    input: &str,
    delimiter: char,
    policy: VersionPolicy,
    origin: RequestOrigin,
) -> Vec<CloneRequest> {
    input
        .split(delimiter)
        .filter_map(parse_request)
        .map(|request| policy.apply(request, origin))
        .collect()
}

/// Extract the repository name from its URL.
///
/// The name is the last path segment. When that segment contains `..`,
/// everything up to and including the first `..` is removed, so
/// `https://host/LV32.2020..PPL.Driver` is named `PPL.Driver`.
pub fn repo_name_from_url(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    match last.split_once("..") {
        Some((_, name)) => name.to_string(),
        None => last.to_string(),
    }
}
