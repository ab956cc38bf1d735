pub mod date;

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default. The backend serializes unset Java fields as null.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
