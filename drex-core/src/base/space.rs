//! Action space.
use super::Act;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Set of valid actions of an environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Actions `0..n`.
    Discrete {
        /// Number of actions.
        n: i64,
    },

    /// Real-valued vectors bounded elementwise by `low` and `high`.
    Box {
        /// Lower bounds, flattened.
        low: Vec<f32>,
        /// Upper bounds, flattened.
        high: Vec<f32>,
        /// Shape of an action.
        shape: Vec<usize>,
    },
}

impl Space {
    /// Samples an action uniformly.
    ///
    /// For a [`Space::Box`], bounded components are drawn uniformly from
    /// `[low, high]`. Half-bounded components are drawn from a shifted
    /// exponential distribution and unbounded ones from a Laplace distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Act {
        match self {
            Self::Discrete { n } => Act::Discrete(rng.gen_range(0..*n)),
            Self::Box { low, high, .. } => Act::Continuous(
                low.iter()
                    .zip(high.iter())
                    .map(|(&l, &h)| match (l.is_finite(), h.is_finite()) {
                        (true, true) => uniform(rng, l, h),
                        (true, false) => l + exponential(rng),
                        (false, true) => h - exponential(rng),
                        (false, false) => exponential(rng) - exponential(rng),
                    })
                    .collect(),
            ),
        }
    }

    /// Returns `true` if `act` is a member of the space.
    pub fn contains(&self, act: &Act) -> bool {
        match (self, act) {
            (Self::Discrete { n }, Act::Discrete(a)) => 0 <= *a && a < n,
            (Self::Box { low, high, .. }, Act::Continuous(a)) => {
                a.len() == low.len()
                    && a.iter()
                        .zip(low.iter().zip(high.iter()))
                        .all(|(x, (l, h))| l <= x && x <= h)
            }
            _ => false,
        }
    }

    /// The action issued when no action should be taken: index 0, or the zero vector.
    pub fn no_op(&self) -> Act {
        match self {
            Self::Discrete { .. } => Act::Discrete(0),
            Self::Box { low, .. } => Act::Continuous(vec![0.0; low.len()]),
        }
    }

    /// Number of discrete actions, or the number of components of a continuous action.
    pub fn dim(&self) -> usize {
        match self {
            Self::Discrete { n } => *n as usize,
            Self::Box { shape, .. } => shape.iter().product(),
        }
    }
}

/// Uniform in `[l, h]`.
///
/// The width is computed in `f64` since `h - l` can overflow `f32`.
fn uniform<R: Rng + ?Sized>(rng: &mut R, l: f32, h: f32) -> f32 {
    let u: f64 = rng.gen();
    let x = l as f64 + u * (h as f64 - l as f64);
    (x as f32).max(l).min(h)
}

fn exponential<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u: f32 = rng.gen();
    -(1.0 - u).ln()
}
