use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Rem};
use std::str::FromStr;

use serde::Deserialize;

/// Index of a SUMO simulation step. One TraCI `simulationStep` advances it by one.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step(pub u64);

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Step {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = s.parse::<u64>()?;
        Ok(Self(step))
    }
}

impl From<u64> for Step {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl From<u32> for Step {
    fn from(f: u32) -> Self {
        Self(f as u64)
    }
}

impl Step {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// True when this step falls on a multiple of `interval`. An interval of zero never fires.
    pub fn is_multiple_of(&self, interval: Step) -> bool {
        interval.0 != 0 && (*self % interval).0 == 0
    }
}

impl Add for Step {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Step {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Rem for Step {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self::Output {
        Self(self.0 % rhs.0)
    }
}
