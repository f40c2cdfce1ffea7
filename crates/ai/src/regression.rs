//! Ordinary least squares over positional indices.

/// Fitted line `y = intercept + slope * x`, where `x` is the 0-based position
/// of each observation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// Fit against `(0, ys[0]), (1, ys[1]), ...`.
    ///
    /// Returns `None` for fewer than two observations.
    pub fn fit(ys: &[f64]) -> Option<Self> {
        let n = ys.len();
        if n < 2 {
            return None;
        }

        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = mean(ys);

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, y) in ys.iter().enumerate() {
            let dx = i as f64 - x_mean;
            sxy += dx * (y - y_mean);
            sxx += dx * dx;
        }

        // Distinct positional x values always spread, but guard anyway.
        if sxx <= f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            intercept: y_mean - slope * x_mean,
            slope,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Coefficient of determination against the fitted observations, clamped to \[0, 1\].
    ///
    /// A constant series is explained perfectly by a flat line (1.0) and
    /// otherwise not at all (0.0).
    pub fn r_squared(&self, ys: &[f64]) -> f64 {
        if ys.is_empty() {
            return 0.0;
        }
        let y_mean = mean(ys);

        let (ss_res, ss_tot) = ys
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(res, tot), (i, y)| {
                let r = y - self.predict(i as f64);
                let t = y - y_mean;
                (res + r * r, tot + t * t)
            });

        if ss_tot <= f64::EPSILON {
            return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
        }

        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}
