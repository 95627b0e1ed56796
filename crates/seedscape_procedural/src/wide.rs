//! # Full-Range `u64` in Text Formats
//!
//! TOML integers are signed 64-bit, so a seed or hash at or above 2^63 has
//! no integer form there. These helpers write such values as a `0x` hex
//! string and everything else as a plain integer:
//!
//! ```toml
//! seed = 42
//! terrain = "0xdeadbeefcafebabe"
//! ```
//!
//! Reading accepts an integer, a hex string or a decimal string, with `_`
//! separators allowed in strings. Use it as `#[serde(with = "wide")]` on a
//! `u64` field, or `wide::vec` on a `Vec<u64>`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `u64` that survives formats limited to signed integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WideU64(#[serde(with = "crate::wide")] pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum WideValue {
    Int(u64),
    Text(String),
}

/// Parses `0x`-prefixed hex or decimal text, ignoring `_` separators.
#[must_use]
pub fn parse(text: &str) -> Option<u64> {
    let digits: String = text.trim().chars().filter(|&c| c != '_').collect();
    match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => digits.parse().ok(),
    }
}

/// Writes `value` as an integer if it fits in `i64`, otherwise as hex text.
///
/// # Errors
///
/// Propagates the serializer's error.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if i64::try_from(*value).is_ok() {
        serializer.serialize_u64(*value)
    } else {
        serializer.serialize_str(&format!("{value:#018x}"))
    }
}

/// Reads a value written by [`serialize`], or a decimal string.
///
/// # Errors
///
/// Fails for negative integers, floats and text that is not a `u64`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match WideValue::deserialize(deserializer)? {
        WideValue::Int(value) => Ok(value),
        WideValue::Text(text) => parse(&text).ok_or_else(|| {
            D::Error::custom(format!("`{text}` is not an unsigned 64-bit integer"))
        }),
    }
}

/// The same encoding for every element of a `Vec<u64>`.
pub mod vec {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::WideU64;

    /// Writes each element like [`super::serialize`].
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S>(values: &[u64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().copied().map(WideU64))
    }

    /// Reads each element like [`super::deserialize`].
    ///
    /// # Errors
    ///
    /// Fails if any element is not a `u64`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<WideU64>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        #[serde(with = "crate::wide")]
        seed: u64,
        #[serde(with = "crate::wide::vec")]
        path: Vec<u64>,
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("42"), Some(42));
        assert_eq!(parse("0xDEAD_BEEF_CAFE_BABE"), Some(0xDEAD_BEEF_CAFE_BABE));
        assert_eq!(parse("0Xff"), Some(255));
        assert_eq!(parse("18_446_744_073_709_551_615"), Some(u64::MAX));
        assert_eq!(parse("0x1_0000_0000_0000_0000"), None);
        assert_eq!(parse("-1"), None);
        assert_eq!(parse("not a number"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_small_values_stay_integers() {
        let record = Record { seed: 42, path: vec![3, 1, 4] };
        let text = toml::to_string(&record).expect("small values fit");
        assert!(text.contains("seed = 42"), "{text}");
        assert_eq!(toml::from_str::<Record>(&text).expect("valid record"), record);
    }

    #[test]
    fn test_large_values_become_hex() {
        let record = Record {
            seed: 0xDEAD_BEEF_CAFE_BABE,
            path: vec![0, 0x7FFF_FFFF_FFFF_FFFF, 0x8000_0000_0000_0000, u64::MAX],
        };
        let text = toml::to_string(&record).expect("hex strings fit");
        assert!(text.contains("seed = \"0xdeadbeefcafebabe\""), "{text}");
        assert_eq!(toml::from_str::<Record>(&text).expect("valid record"), record);
    }

    #[test]
    fn test_hand_written_forms() {
        let record: Record = toml::from_str("seed = \"12_345\"\npath = [\"0x10\", 7]")
            .expect("string forms accepted");
        assert_eq!(record, Record { seed: 12_345, path: vec![16, 7] });
        assert!(toml::from_str::<Record>("seed = -1\npath = []").is_err());
        assert!(toml::from_str::<Record>("seed = 1.5\npath = []").is_err());
        assert!(toml::from_str::<Record>("seed = \"0xZZ\"\npath = []").is_err());
    }
}
