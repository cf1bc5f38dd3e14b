use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LENGTH: usize = 32;

/// A fixed-width course module identifier.
///
/// Codes are written either as short text (`"CS1010"`), zero-padded on the
/// right, or as `0x`-prefixed hex of at most 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCode {
    #[serde(with = "serialize_module_code")]
    bytes: [u8; LENGTH],
}

impl ModuleCode {
    /// The code with its zero padding removed, if it is printable text that
    /// parses back to the same bytes.
    fn as_text(&self) -> Option<&str> {
        let end = self
            .bytes
            .iter()
            .rposition(|byte| *byte != 0)
            .map(|i| i + 1)?;
        let trimmed = &self.bytes[..end];
        let hex_prefixed = matches!(trimmed, [b'0', b'x' | b'X', ..]);
        if !hex_prefixed && trimmed.iter().all(|byte| byte.is_ascii_graphic()) {
            std::str::from_utf8(trimmed).ok()
        } else {
            None
        }
    }
}

impl Display for ModuleCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(text),
            None => write!(f, "0x{}", HEXLOWER.encode(&self.bytes)),
        }
    }
}

impl Debug for ModuleCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModuleCode({self})")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("module code must not be empty")]
    Empty,
    #[error("module code must be at most {LENGTH} bytes, found {0}")]
    TooLong(usize),
    #[error("module code has invalid hex digits")]
    InvalidHex,
}

impl FromStr for ModuleCode {
    type Err = ParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let raw = match string
            .strip_prefix("0x")
            .or_else(|| string.strip_prefix("0X"))
        {
            Some(hex) => HEXLOWER_PERMISSIVE
                .decode(hex.as_bytes())
                .map_err(|_| ParseError::InvalidHex)?,
            None => string.as_bytes().to_vec(),
        };
        if raw.is_empty() {
            return Err(ParseError::Empty);
        }
        if raw.len() > LENGTH {
            return Err(ParseError::TooLong(raw.len()));
        }
        let mut bytes = [0; LENGTH];
        bytes[..raw.len()].copy_from_slice(&raw);
        Ok(Self { bytes })
    }
}

impl<'a> FromParam<'a> for ModuleCode {
    type Error = ParseError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

/// (De)serialisation of module codes as their display string.
mod serialize_module_code {
    use serde::{
        de::{Error, Unexpected, Visitor},
        Deserializer, Serializer,
    };

    use super::{ModuleCode, LENGTH};

    pub fn serialize<S>(bytes: &[u8; LENGTH], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ModuleCode { bytes: *bytes })
    }

    struct StrVisitor;

    impl<'de> Visitor<'de> for StrVisitor {
        type Value = [u8; LENGTH];

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a module code of at most {} bytes", LENGTH)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            v.parse::<ModuleCode>()
                .map(|code| code.bytes)
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; LENGTH], D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(StrVisitor)
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl ModuleCode {
        /// `CS1010`, quota 1 in the standard fixture.
        pub fn example1() -> Self {
            "CS1010".parse().unwrap()
        }

        /// `MA1101S`, quota 2 in the standard fixture.
        pub fn example2() -> Self {
            "MA1101S".parse().unwrap()
        }
    }
}
