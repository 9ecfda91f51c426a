//! Synthetic "estimated GDP": `population * m / rate` with a fresh random
//! multiplier `m` in `[1000, 2000)` per call. Two refreshes of identical data
//! therefore store different values; the multiplier source is injectable so
//! tests can pin it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::sync::{Arc, Mutex};

pub const MULTIPLIER_RANGE: Range<f64> = 1000.0..2000.0;

/// Supplies the random GDP multiplier.
pub trait MultiplierSource: Send + Sync {
    /// Must return a value within [`MULTIPLIER_RANGE`].
    fn multiplier(&self) -> f64;
}

/// Thread-local OS-seeded RNG; the production source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngMultiplier;

impl MultiplierSource for ThreadRngMultiplier {
    fn multiplier(&self) -> f64 {
        rand::rng().random_range(MULTIPLIER_RANGE)
    }
}

/// Deterministic sequence from a fixed seed.
pub struct SeededMultiplier {
    rng: Mutex<StdRng>,
}

impl SeededMultiplier {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl MultiplierSource for SeededMultiplier {
    fn multiplier(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.random_range(MULTIPLIER_RANGE),
            Err(poisoned) => poisoned.into_inner().random_range(MULTIPLIER_RANGE),
        }
    }
}

/// What a country's currency resolved to against the rate table.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrencyResolution {
    /// The country lists no currencies at all.
    NoCurrency,
    /// A currency is listed but no usable rate exists for it.
    Unpriced { code: Option<String> },
    /// Currency with a positive rate against the base currency.
    Priced { code: String, rate: f64 },
}

impl CurrencyResolution {
    /// `rate` is kept for storage even when it is unusable for GDP.
    pub fn resolve(has_currencies: bool, code: Option<&str>, rate: Option<f64>) -> Self {
        if !has_currencies {
            return Self::NoCurrency;
        }
        match (code, rate) {
            (Some(code), Some(rate)) if rate.is_finite() && rate > 0.0 => Self::Priced {
                code: code.to_string(),
                rate,
            },
            (code, _) => Self::Unpriced {
                code: code.map(str::to_string),
            },
        }
    }
}

#[derive(Clone)]
pub struct GdpEstimator {
    source: Arc<dyn MultiplierSource>,
}

impl Default for GdpEstimator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngMultiplier))
    }
}

impl GdpEstimator {
    pub fn new(source: Arc<dyn MultiplierSource>) -> Self {
        Self { source }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededMultiplier::new(seed)))
    }

    pub fn estimate(&self, population: i64, currency: &CurrencyResolution) -> Option<f64> {
        match currency {
            CurrencyResolution::NoCurrency => Some(0.0),
            CurrencyResolution::Unpriced { .. } => None,
            CurrencyResolution::Priced { rate, .. } => {
                let m = self.source.multiplier();
                Some(population as f64 * m / rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl MultiplierSource for Fixed {
        fn multiplier(&self) -> f64 {
            self.0
        }
    }

    fn priced(rate: f64) -> CurrencyResolution {
        CurrencyResolution::Priced {
            code: "NGN".into(),
            rate,
        }
    }

    #[test]
    fn no_currency_is_zero() {
        let est = GdpEstimator::default();
        assert_eq!(est.estimate(1000, &CurrencyResolution::NoCurrency), Some(0.0));
    }

    #[test]
    fn unpriced_currency_is_null() {
        let est = GdpEstimator::default();
        let unpriced = CurrencyResolution::resolve(true, Some("ZZZ"), None);
        assert_eq!(
            unpriced,
            CurrencyResolution::Unpriced {
                code: Some("ZZZ".into())
            }
        );
        assert_eq!(est.estimate(500, &unpriced), None);
    }

    #[test]
    fn non_positive_rates_are_unpriced() {
        assert!(matches!(
            CurrencyResolution::resolve(true, Some("ABC"), Some(0.0)),
            CurrencyResolution::Unpriced { .. }
        ));
        assert!(matches!(
            CurrencyResolution::resolve(true, None, Some(2.0)),
            CurrencyResolution::Unpriced { code: None }
        ));
        assert_eq!(
            CurrencyResolution::resolve(false, Some("ABC"), Some(2.0)),
            CurrencyResolution::NoCurrency
        );
    }

    #[test]
    fn fixed_multiplier_is_exact() {
        let est = GdpEstimator::new(Arc::new(Fixed(1500.0)));
        assert_eq!(est.estimate(10, &priced(4.0)), Some(3750.0));
    }

    #[test]
    fn random_estimates_stay_within_bounds() {
        let est = GdpEstimator::default();
        let population = 206_139_587_i64;
        let rate = 1600.25;
        let low = population as f64 * 1000.0 / rate;
        let high = population as f64 * 2000.0 / rate;
        for _ in 0..1_000 {
            let gdp = est.estimate(population, &priced(rate)).unwrap();
            assert!(gdp >= low && gdp < high, "{gdp} outside [{low}, {high})");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = GdpEstimator::seeded(42);
        let b = GdpEstimator::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.estimate(100, &priced(2.0)), b.estimate(100, &priced(2.0)));
        }
    }
}
