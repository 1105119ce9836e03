//! UI locales and the login path derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Locale used when the current path carries none.
pub const DEFAULT_LOCALE: Locale = Locale::En;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

/// Returned when a string names no supported locale.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locale: {0}")]
pub struct UnknownLocale(pub String);

impl Locale {
    /// Every supported locale.
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Locale named by the first segment of `path`, or [`DEFAULT_LOCALE`].
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        path.split('/')
            .nth(1)
            .and_then(|segment| segment.parse().ok())
            .unwrap_or(DEFAULT_LOCALE)
    }

    /// `/{locale}/login`.
    #[must_use]
    pub fn login_path(self) -> String {
        format!("/{}/login", self.code())
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.code() == s)
            .ok_or_else(|| UnknownLocale(s.to_owned()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
#[path = "locale_test.rs"]
mod tests;
