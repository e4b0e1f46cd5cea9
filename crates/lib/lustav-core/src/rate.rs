use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer};

/// Share of departing vehicles that are turned into autonomous vehicles.
///
/// Always within `[0, 1]`, so the total ordering below never meets a NaN.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PenetrationRate(f64);

impl PenetrationRate {
    pub fn new(rate: f64) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(format!(
                "penetration rate must be within [0, 1], found {}",
                rate
            ));
        }
        Ok(Self(rate))
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Percentage rounded to two decimals, so `0.07` reads as `7` and not `7.000000000000001`.
    pub fn as_percent(&self) -> f64 {
        (self.0 * 10_000.0).round() / 100.0
    }

    /// Rate label used in file rows and plot legends, e.g. `50%` or `12.5%`.
    pub fn label(&self) -> String {
        format!("{}%", self.as_percent())
    }
}

impl Display for PenetrationRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Eq for PenetrationRate {}

impl PartialOrd for PenetrationRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PenetrationRate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for PenetrationRate {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for PenetrationRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        PenetrationRate::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::PenetrationRate;

    #[test]
    fn rejects_rates_outside_unit_interval() {
        assert!(PenetrationRate::new(-0.1).is_err());
        assert!(PenetrationRate::new(1.5).is_err());
        assert!(PenetrationRate::new(f64::NAN).is_err());
        assert!(PenetrationRate::new(0.0).is_ok());
        assert!(PenetrationRate::new(1.0).is_ok());
    }

    #[test]
    fn labels_as_percentage() {
        assert_eq!(PenetrationRate::new(0.5).unwrap().label(), "50%");
        assert_eq!(PenetrationRate::new(0.0).unwrap().label(), "0%");
        assert_eq!(PenetrationRate::new(1.0).unwrap().label(), "100%");
        assert_eq!(PenetrationRate::new(0.07).unwrap().label(), "7%");
        assert_eq!(PenetrationRate::new(0.125).unwrap().label(), "12.5%");
    }
}
