use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WhatsNewError;

/// Fractional digits carried by a [`Version`].
const SCALE_DIGITS: u32 = 4;

/// Units per whole version number.
pub const UNITS_PER_VERSION: i64 = 10_i64.pow(SCALE_DIGITS);

/// A decimal module version such as `7.20` or `2.105`.
///
/// Stored as a fixed-point count of ten-thousandths so that walking a
/// version ladder any number of steps never accumulates rounding error.
/// Renders in canonical numeric form with trailing zeros trimmed (`7.20`
/// displays as `7.2`), which is also the directory name the feature store
/// uses for that version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(i64);

impl Version {
    /// The "never acknowledged" version.
    pub const ZERO: Version = Version(0);

    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    pub const fn units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Version {
    type Err = WhatsNewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WhatsNewError::InvalidVersion(s.to_string());
        let text = s.trim();

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        if fraction.len() > SCALE_DIGITS as usize {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut frac_units: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };
        for _ in fraction.len()..SCALE_DIGITS as usize {
            frac_units *= 10;
        }

        whole
            .checked_mul(UNITS_PER_VERSION)
            .and_then(|w| w.checked_add(frac_units))
            .map(Version)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / UNITS_PER_VERSION as u64;
        let frac = abs % UNITS_PER_VERSION as u64;
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:0width$}", frac, width = SCALE_DIGITS as usize);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VersionVisitor)
    }
}

/// Accepts both `"7.20"` and bare JSON numbers like `7.2`.
struct VersionVisitor;

impl Visitor<'_> for VersionVisitor {
    type Value = Version;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal version number or string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Version, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Version, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Version, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Version, E> {
        self.visit_str(&v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(v("7.20").units(), 72_000);
        assert_eq!(v("7.20").to_string(), "7.2");
        assert_eq!(v("2.105").to_string(), "2.105");
        assert_eq!(v("3").to_string(), "3");
        assert_eq!(v(".5").to_string(), "0.5");
        assert_eq!(Version::from_units(-1_000).to_string(), "-0.1");
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(v("7.10") < v("7.9"));
        assert!(v("7.2") == v("7.20"));
        assert!(v("10") > v("9.99"));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "1.23456", "1,2"] {
            assert!(bad.parse::<Version>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_num: Version = serde_json::from_str("2.105").unwrap();
        let from_str: Version = serde_json::from_str("\"2.105\"").unwrap();
        assert_eq!(from_num, from_str);
        assert_eq!(serde_json::to_string(&from_num).unwrap(), "\"2.105\"");
    }
}
