/// Serde helper functions for custom serialization/deserialization
use serde::{Deserialize, Deserializer, Serializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Serialize SystemTime as signed microseconds relative to the UNIX epoch
///
/// File timestamps may predate the epoch, so negative values are valid.
pub mod system_time_micros {
    use super::*;

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros = match time.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_micros() as i64,
            Err(before) => -(before.duration().as_micros() as i64),
        };
        serializer.serialize_i64(micros)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = i64::deserialize(deserializer)?;
        let offset = Duration::from_micros(micros.unsigned_abs());
        Ok(if micros >= 0 {
            UNIX_EPOCH + offset
        } else {
            UNIX_EPOCH - offset
        })
    }
}

/// Check if value is default (for skip_serializing_if)
#[inline]
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    value == &T::default()
}

#[inline]
pub fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

#[inline]
pub fn is_false(value: &bool) -> bool {
    !*value
}
