use serde::{Deserialize, Deserializer};

pub mod airdrop;
pub mod listing;

/// Distinguishes an omitted field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn nullable_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
