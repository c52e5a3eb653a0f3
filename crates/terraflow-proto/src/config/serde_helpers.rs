use serde::{Deserialize, Deserializer, de::Error as _};

/// Deserialize an opacity value, rejecting anything outside `[0.0, 1.0]`.
pub(crate) fn opacity_deserializer<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f32::deserialize(deserializer)?;

    if !value.is_finite() {
        return Err(D::Error::custom("Opacity must be a finite number"));
    }

    if value < 0.0 {
        return Err(D::Error::custom("Opacity cannot be negative"));
    }

    if value > 1.0 {
        return Err(D::Error::custom("Opacity cannot be greater than 1.0"));
    }

    Ok(value)
}

/// Deserialize a millisecond interval that must be strictly positive.
pub(crate) fn interval_ms_deserializer<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u64::deserialize(deserializer)?;

    if value == 0 {
        return Err(D::Error::custom("Interval must be greater than 0 milliseconds"));
    }

    Ok(value)
}
