use serde::Deserialize;

mod check;
mod failure;
mod level;
mod report;
mod status;

pub use check::CheckResult;
pub use failure::{ApplicationError, CheckFailure, FailureKind, TransportError, ValidationError};
pub use level::Level;
pub use report::{ScanReport, format_timestamp};
pub use status::Status;

/// Decodes a JSON `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}
