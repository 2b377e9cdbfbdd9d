//! Steam account identifiers.
//!
//! A [`SteamId`] is a 64-bit value in the individual-account namespace:
//! universe 1 (public), account type 1 (individual), instance 1 (desktop)
//! and a non-zero 32-bit account number in the low bits. Every other value
//! is rejected at construction, so holding a `SteamId` means holding a
//! valid one.
//!
//! Four textual renderings are supported, all of them parseable back:
//!
//! | form    | example               |
//! |---------|-----------------------|
//! | Steam32 | `43645661`            |
//! | Steam2  | `STEAM_0:1:21822830`  |
//! | Steam3  | `[U:1:43645661]`      |
//! | Steam64 | `76561198003911389`   |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Steam64 value of account number zero in the public individual namespace.
pub const STEAM64_BASE: u64 = 76_561_197_960_265_728;

const PROFILE_URL_BASE: &str = "https://steamcommunity.com/profiles/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "SteamIdRepr", into = "String")]
pub struct SteamId(u64);

impl SteamId {
    /// Validate a raw Steam64 value.
    pub fn new(value: u64) -> Result<Self, DomainError> {
        if Self::is_valid_steam64(value) {
            Ok(Self(value))
        } else {
            Err(DomainError::invalid_id(value.to_string()))
        }
    }

    /// Build from a Steam32 account number.
    pub fn from_account_id(account_id: u32) -> Result<Self, DomainError> {
        if account_id == 0 {
            return Err(DomainError::invalid_id("account number 0"));
        }
        Ok(Self(STEAM64_BASE + u64::from(account_id)))
    }

    /// Structural validity predicate over a raw 64-bit value.
    pub fn is_valid_steam64(value: u64) -> bool {
        value > STEAM64_BASE && value - STEAM64_BASE <= u64::from(u32::MAX)
    }

    /// Always true for a constructed id; kept so callers holding a
    /// resolved id can assert the invariant explicitly.
    pub fn is_valid(&self) -> bool {
        Self::is_valid_steam64(self.0)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The Steam32 account number.
    pub fn account_id(&self) -> u32 {
        // Range-checked at construction, the difference always fits.
        (self.0 - STEAM64_BASE) as u32
    }

    /// Legacy `STEAM_0:Y:Z` rendering.
    pub fn steam2(&self) -> String {
        let account = self.account_id();
        format!("STEAM_0:{}:{}", account & 1, account >> 1)
    }

    /// `[U:1:N]` rendering.
    pub fn steam3(&self) -> String {
        format!("[U:1:{}]", self.account_id())
    }

    pub fn profile_url(&self) -> String {
        format!("{PROFILE_URL_BASE}{}", self.0)
    }

    /// Parse a `STEAM_X:Y:Z` string. The universe digit is ignored, as
    /// older clients render public accounts with either 0 or 1.
    pub fn parse_steam2(input: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::invalid_id(input);
        let rest = input
            .get(..6)
            .filter(|prefix| prefix.eq_ignore_ascii_case("STEAM_"))
            .and_then(|_| input.get(6..))
            .ok_or_else(invalid)?;

        let mut parts = rest.split(':');
        let (Some(universe), Some(low), Some(high), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if !matches!(universe, "0" | "1") {
            return Err(invalid());
        }
        let low: u64 = match low {
            "0" => 0,
            "1" => 1,
            _ => return Err(invalid()),
        };
        let high: u64 = high.parse().map_err(|_| invalid())?;

        let account = high
            .checked_mul(2)
            .and_then(|v| v.checked_add(low))
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(invalid)?;
        Self::from_account_id(account).map_err(|_| invalid())
    }

    /// Parse a `[U:1:N]` string; the brackets are optional.
    pub fn parse_steam3(input: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::invalid_id(input);
        let inner = input
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(input);

        let account = inner
            .strip_prefix("U:1:")
            .or_else(|| inner.strip_prefix("u:1:"))
            .ok_or_else(invalid)?;
        let account: u32 = account.parse().map_err(|_| invalid())?;
        Self::from_account_id(account).map_err(|_| invalid())
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts Steam64, Steam2, Steam3, and bare Steam32 account numbers.
impl FromStr for SteamId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::invalid_id("empty value"));
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let value: u64 = s.parse().map_err(|_| DomainError::invalid_id(s))?;
            if value > STEAM64_BASE {
                return Self::new(value);
            }
            return u32::try_from(value)
                .map_err(|_| DomainError::invalid_id(s))
                .and_then(Self::from_account_id);
        }

        if s.get(..6).is_some_and(|prefix| prefix.eq_ignore_ascii_case("STEAM_")) {
            return Self::parse_steam2(s);
        }

        Self::parse_steam3(s)
    }
}

impl TryFrom<u64> for SteamId {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SteamId> for u64 {
    fn from(id: SteamId) -> u64 {
        id.0
    }
}

impl From<SteamId> for String {
    fn from(id: SteamId) -> String {
        id.0.to_string()
    }
}

/// Wire form: player lists in the wild carry steam ids both as strings and
/// as bare JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum SteamIdRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<SteamIdRepr> for SteamId {
    type Error = DomainError;

    fn try_from(repr: SteamIdRepr) -> Result<Self, Self::Error> {
        match repr {
            SteamIdRepr::Number(value) => Self::new(value),
            SteamIdRepr::Text(text) => text.parse(),
        }
    }
}
