use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{Mutex, PoisonError};

/// Stand-in for a payment network: every call is an independent coin flip.
#[cfg_attr(test, mockall::automock)]
pub trait OutcomeSimulator {
    /// `true` keeps a new payment in `NEW`, `false` marks it `ERROR`.
    fn creation_proceeds(&self) -> bool;
    /// `true` settles a payment as `SUCCESS`, `false` as `FAIL`.
    fn processing_succeeds(&self) -> bool;
}

/// Two uniform draws from `[0, upper)` and `[0, lower)`; the outcome is
/// positive when the first draw is strictly greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeBounds {
    pub upper: u32,
    pub lower: u32,
}

pub const CREATION_BOUNDS: OutcomeBounds = OutcomeBounds {
    upper: 60,
    lower: 45,
};

pub const PROCESSING_BOUNDS: OutcomeBounds = OutcomeBounds {
    upper: 60,
    lower: 30,
};

pub fn draw_outcome<R>(rng: &mut R, bounds: OutcomeBounds) -> bool
where
    R: Rng + ?Sized,
{
    let a = rng.gen_range(0..bounds.upper);
    let b = rng.gen_range(0..bounds.lower);
    a > b
}

pub struct RandomOutcomeSimulator {
    rng: Mutex<StdRng>,
}

impl RandomOutcomeSimulator {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw(&self, bounds: OutcomeBounds) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw_outcome(&mut *rng, bounds)
    }
}

impl OutcomeSimulator for RandomOutcomeSimulator {
    fn creation_proceeds(&self) -> bool {
        self.draw(CREATION_BOUNDS)
    }

    fn processing_succeeds(&self) -> bool {
        self.draw(PROCESSING_BOUNDS)
    }
}
