use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};
use crate::utils::ensure_finite;

/// A 1-D curve given by evenly spaced samples over `x_range`.
///
/// Sampling clamps the input to `x_range` and goes through the samples with a
/// uniform Catmull-Rom spline, so the result can overshoot between samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothCurve {
    pub y_values: Vec<f32>,
    pub x_range: (f32, f32),
}

impl SmoothCurve {
    pub fn new(y_values: Vec<f32>, x_range: (f32, f32)) -> Self {
        Self { y_values, x_range }
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![value], (0., 1.))
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        if self.y_values.is_empty() {
            return Err(ForestError::invalid(field, "curve has no samples"));
        }
        for (i, y) in self.y_values.iter().enumerate() {
            ensure_finite(&format!("{field}.y_values[{i}]"), *y)?;
        }
        let (x0, x1) = self.x_range;
        ensure_finite(&format!("{field}.x_range"), x0)?;
        ensure_finite(&format!("{field}.x_range"), x1)?;
        if x1 <= x0 {
            return Err(ForestError::invalid(
                format!("{field}.x_range"),
                format!("empty range [{x0}, {x1}]"),
            ));
        }
        Ok(())
    }

    pub fn sample(&self, x: f32) -> f32 {
        let points = &self.y_values;
        let n = points.len();
        match n {
            0 => return 0.,
            1 => return points[0],
            _ => {}
        }

        let (x0, x1) = self.x_range;
        let t = ((x - x0) / (x1 - x0)).clamp(0., 1.);
        let position = t * (n - 1) as f32;
        // t == 1 lands on the last segment with r == 1
        let i0 = usize::min(position.floor() as usize, n - 2);
        let r = position - i0 as f32;

        let p = [
            if i0 == 0 {
                2. * points[0] - points[1]
            } else {
                points[i0 - 1]
            },
            points[i0],
            points[i0 + 1],
            if i0 == n - 2 {
                2. * points[n - 1] - points[n - 2]
            } else {
                points[i0 + 2]
            },
        ];

        let r2 = r * r;
        let r3 = r2 * r;
        0.5 * (2. * p[1]
            + (p[2] - p[0]) * r
            + (2. * p[0] - 5. * p[1] + 4. * p[2] - p[3]) * r2
            + (3. * p[1] - p[0] - 3. * p[2] + p[3]) * r3)
    }
}
