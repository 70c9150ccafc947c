use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use lsif_store::Record;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// Ids below this are rejected; 0 doubles as the unresolved-reference
/// sentinel inside stored records.
pub const MIN_ID: i64 = 1;
/// Upper bound on LSIF ids. Ids multiply into file offsets, so an absurd id
/// would otherwise grow a backing file by gigabytes of sparse zeros.
pub const MAX_ID: i64 = 20_000_000;

/// An LSIF vertex/edge identifier.
///
/// Dumps disagree on the wire shape: some emitters write `"id": 42`, others
/// `"id": "42"`. Deserialization accepts both and rejects everything else
/// (floats, negatives, zero, out-of-range values) as a hard error rather
/// than coercing.
///
/// Each id namespace (documents, ranges, result sets) indexes a different
/// backing file, so numerically equal ids from different namespaces never
/// collide.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(i32);

impl Id {
    /// Slot number in an id-keyed record store.
    pub fn slot(self) -> u32 {
        self.0 as u32
    }

    /// True for the zero id, i.e. a `ref_id` that was never back-patched.
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Record for Id {
    const SIZE: usize = 4;

    fn encode(&self, buf: &mut [u8]) {
        LittleEndian::write_i32(buf, self.0);
    }

    fn decode(buf: &[u8]) -> Self {
        Id(LittleEndian::read_i32(buf))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Id, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an integer id or a string of decimal digits")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Id, E> {
                bounded(value)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Id, E> {
                i64::try_from(value)
                    .map_err(|_| de::Error::custom(format!("id {value} is out of range")))
                    .and_then(bounded)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Id, E> {
                let parsed: i64 = value
                    .parse()
                    .map_err(|_| de::Error::custom(format!("id {value:?} is not a number")))?;
                bounded(parsed)
            }
        }

        fn bounded<E: de::Error>(value: i64) -> Result<Id, E> {
            if (MIN_ID..=MAX_ID).contains(&value) {
                Ok(Id(value as i32))
            } else {
                Err(de::Error::custom(format!("id {value} is out of range")))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> serde_json::Result<Id> {
        serde_json::from_str(json)
    }

    #[test]
    fn number_and_digit_string_decode_identically() {
        assert_eq!(decode("42").unwrap(), decode("\"42\"").unwrap());
    }

    #[test]
    fn invalid_shapes_fail_decoding() {
        for bad in ["-1", "0", "\"abc\"", "3.5", "null", "[1]", "20000001"] {
            assert!(decode(bad).is_err(), "{bad} should not decode");
        }
    }

    #[test]
    fn record_round_trip() {
        let id: Id = decode("123").unwrap();
        let mut buf = [0u8; Id::SIZE];
        id.encode(&mut buf);
        assert_eq!(buf, [123, 0, 0, 0]);
        assert_eq!(Id::decode(&buf), id);
    }
}
