use std::f32::consts::PI;

use crate::error::{ForestError, Result};

pub fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    a * (1. - t) + b * t
}

/// Pulls `angle` toward the nearest multiple of PI.
/// With `flatness = 0` the angle is untouched, with `flatness = 1` it snaps,
/// so consecutive branches end up on two opposite sides of the axis.
pub fn flatten_angle(angle: f32, flatness: f32) -> f32 {
    let flat = (angle / PI).round() * PI;
    lerp(angle, flat, flatness)
}

pub(crate) fn ensure_finite(field: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ForestError::invalid(field, format!("{value} is not finite")))
    }
}

pub(crate) fn ensure_positive(field: &str, value: f32) -> Result<()> {
    ensure_finite(field, value)?;
    if value > 0. {
        Ok(())
    } else {
        Err(ForestError::invalid(field, format!("{value} must be > 0")))
    }
}

pub(crate) fn ensure_non_negative(field: &str, value: f32) -> Result<()> {
    ensure_finite(field, value)?;
    if value >= 0. {
        Ok(())
    } else {
        Err(ForestError::invalid(field, format!("{value} must be >= 0")))
    }
}
