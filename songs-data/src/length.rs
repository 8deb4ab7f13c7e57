//! Song length scalar
//!
//! In memory a [`Length`] is a plain count of minutes. Its external text form
//! is `<integer> mins`; on the JSON wire that text travels as a string, so a
//! three minute song appears as `"3 mins"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const SUFFIX: &str = "mins";

/// Duration of a song in whole minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Length(pub i32);

impl Length {
    pub fn from_minutes(minutes: i32) -> Self {
        Length(minutes)
    }

    pub fn minutes(self) -> i32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Decode `text` into `self`
    ///
    /// On failure `self` keeps its previous value.
    pub fn decode_into(&mut self, text: &str) -> Result<()> {
        *self = text.parse()?;
        Ok(())
    }
}

impl From<i32> for Length {
    fn from(minutes: i32) -> Self {
        Length(minutes)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, SUFFIX)
    }
}

impl FromStr for Length {
    type Err = Error;

    /// Parse the unquoted `<integer> mins` form
    ///
    /// Exactly one space separates the two tokens; anything else is
    /// [`Error::InvalidFormat`].
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(' ').collect();
        if parts.len() != 2 || parts[1] != SUFFIX {
            return Err(Error::InvalidFormat);
        }

        parts[0]
            .parse::<i32>()
            .map(Length)
            .map_err(|_| Error::InvalidFormat)
    }
}

impl Serialize for Length {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Length {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::from_str(&text).map_err(serde::de::Error::custom)
    }
}
