use std::{
    cmp::Ordering,
    fmt,
    ops::{Div, Mul}
};

use serde::{Deserialize, Serialize};

use crate::model::error::ModelError;

/// A one-dimensional gaussian in canonical form: the precision `pi` and the
/// precision-adjusted mean `tau`, where `pi = 1 / sigma^2` and
/// `tau = pi * mu`.
///
/// `pi == 0.0` encodes the improper "no information" state (infinite
/// variance); it is a valid value, not an error. Division may drive `pi`
/// negative while a neighbor's contribution is stripped out of a combined
/// belief, so negative precision is accepted as an intermediate value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pi: f64,
    tau: f64
}

impl Gaussian {
    /// Builds a gaussian directly from its canonical parameters.
    pub fn from_precision(pi: f64, tau: f64) -> Gaussian {
        Gaussian { pi, tau }
    }

    /// Builds a gaussian from its mean and standard deviation.
    ///
    /// `mu` must be finite and `sigma` strictly positive (an infinite sigma
    /// yields the zero-precision state).
    pub fn from_mean(mu: f64, sigma: f64) -> Result<Gaussian, ModelError> {
        if !mu.is_finite() || sigma.is_nan() || sigma <= 0.0 {
            return Err(ModelError::InvalidArgument(format!(
                "gaussian requires a finite mu and a positive sigma, got mu={}, sigma={}",
                mu, sigma
            )));
        }

        let pi = sigma.powi(-2);
        Ok(Gaussian { pi, tau: pi * mu })
    }

    /// The improper zero-precision gaussian carrying no information.
    pub fn uninformative() -> Gaussian {
        Gaussian { pi: 0.0, tau: 0.0 }
    }

    pub fn pi(&self) -> f64 {
        self.pi
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// The mean, defined as `0` for the zero-precision state.
    pub fn mu(&self) -> f64 {
        if self.pi == 0.0 {
            return 0.0;
        }

        self.tau / self.pi
    }

    /// The standard deviation, infinite for the zero-precision state.
    pub fn sigma(&self) -> f64 {
        if self.pi == 0.0 {
            return f64::INFINITY;
        }

        (1.0 / self.pi).sqrt()
    }
}

/// The product of two gaussian densities: precisions and precision-adjusted
/// means add.
impl Mul for Gaussian {
    type Output = Gaussian;

    fn mul(self, rhs: Gaussian) -> Gaussian {
        Gaussian {
            pi: self.pi + rhs.pi,
            tau: self.tau + rhs.tau
        }
    }
}

/// Density division, the exact inverse of the product. Used to strip one
/// neighbor's contribution out of a combined belief; the resulting precision
/// may legally be negative.
impl Div for Gaussian {
    type Output = Gaussian;

    fn div(self, rhs: Gaussian) -> Gaussian {
        Gaussian {
            pi: self.pi - rhs.pi,
            tau: self.tau - rhs.tau
        }
    }
}

/// Gaussians are ordered by mean alone; equality stays exact on `(pi, tau)`.
impl PartialOrd for Gaussian {
    fn partial_cmp(&self, other: &Gaussian) -> Option<Ordering> {
        self.mu().partial_cmp(&other.mu())
    }
}

impl fmt::Display for Gaussian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N(mu={:.2}, sigma={:.2})", self.mu(), self.sigma())
    }
}
