//! Free text to [`SteamId`] resolution.
//!
//! Accepted input, tried in order:
//! 1. Any local rendering: Steam64, Steam32, Steam2, Steam3
//! 2. Community profile URLs, `/profiles/<steam64>` or `/id/<vanity>`
//! 3. A bare vanity name, looked up remotely

use std::sync::Arc;
use std::time::Duration;

use tf2bdd_domain::SteamId;
use url::Url;

use crate::infrastructure::ports::VanityResolver;

/// Deadline used by chat commands.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

const VANITY_MIN_LEN: usize = 2;
const VANITY_MAX_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The token can never name a valid account.
    #[error("Invalid steam id: {0}")]
    Invalid(String),
    /// The remote lookup failed, timed out or found nothing.
    #[error("Lookup failed for {token}: {reason}")]
    LookupFailed { token: String, reason: String },
}

impl ResolveError {
    fn lookup_failed(token: &str, reason: impl ToString) -> Self {
        Self::LookupFailed {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}

enum Candidate {
    Resolved(SteamId),
    Vanity(String),
}

pub struct SteamIdResolver {
    vanity: Arc<dyn VanityResolver>,
}

impl SteamIdResolver {
    pub fn new(vanity: Arc<dyn VanityResolver>) -> Self {
        Self { vanity }
    }

    pub async fn resolve(&self, token: &str, deadline: Duration) -> Result<SteamId, ResolveError> {
        let cleaned = token
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim();

        let name = match classify(cleaned).ok_or_else(|| ResolveError::Invalid(token.to_string()))? {
            Candidate::Resolved(steam_id) => return Ok(steam_id),
            Candidate::Vanity(name) => name,
        };

        let lookup = tokio::time::timeout(deadline, self.vanity.resolve_vanity(&name)).await;
        match lookup {
            Err(_) => Err(ResolveError::lookup_failed(token, "timed out")),
            Ok(Err(e)) => Err(ResolveError::lookup_failed(token, e)),
            Ok(Ok(None)) => Err(ResolveError::lookup_failed(token, "no match")),
            Ok(Ok(Some(steam_id))) if steam_id.is_valid() => Ok(steam_id),
            Ok(Ok(Some(steam_id))) => Err(ResolveError::Invalid(steam_id.to_string())),
        }
    }
}

fn classify(token: &str) -> Option<Candidate> {
    if token.is_empty() {
        return None;
    }
    if let Ok(steam_id) = token.parse::<SteamId>() {
        return Some(Candidate::Resolved(steam_id));
    }
    if token.contains("://") || token.contains("steamcommunity.com") {
        return classify_url(token);
    }
    // Numbers that failed to parse are out of range, not vanity names.
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    is_vanity_name(token).then(|| Candidate::Vanity(token.to_string()))
}

fn classify_url(token: &str) -> Option<Candidate> {
    let parsed = if token.contains("://") {
        Url::parse(token).ok()?
    } else {
        Url::parse(&format!("https://{token}")).ok()?
    };

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let kind = segments.next()?;
    let value = segments.next()?;

    match kind {
        "profiles" => value.parse().ok().map(Candidate::Resolved),
        "id" if is_vanity_name(value) => Some(Candidate::Vanity(value.to_string())),
        _ => None,
    }
}

fn is_vanity_name(name: &str) -> bool {
    (VANITY_MIN_LEN..=VANITY_MAX_LEN).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
