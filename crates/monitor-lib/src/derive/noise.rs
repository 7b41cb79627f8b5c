//! Injectable randomness for display jitter
//!
//! Several derived fields (OEE trend arrow, equipment health offsets,
//! generated maintenance alerts) carry a random component for display
//! variety. Derivation functions draw it from a [`NoiseSource`] so tests can
//! pin every value.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// A source of uniform draws in `[0, 1)`
pub trait NoiseSource: Send {
    fn unit(&mut self) -> f64;

    /// Uniform draw in `[low, high)`
    fn range(&mut self, low: f64, high: f64) -> f64 {
        low + self.unit() * (high - low)
    }

    /// Uniform index into a collection of `len` items
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.unit() * len as f64) as usize).min(len - 1)
    }
}

/// Thread-local RNG, used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadNoise;

impl NoiseSource for ThreadNoise {
    fn unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic RNG for reproducible runs
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Always returns the same draw
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(f64);

impl FixedNoise {
    pub fn new(value: f64) -> Self {
        Self(clamp_unit(value))
    }
}

impl NoiseSource for FixedNoise {
    fn unit(&mut self) -> f64 {
        self.0
    }
}

/// Cycles through a fixed list of draws
#[derive(Debug, Clone)]
pub struct SequenceNoise {
    values: Vec<f64>,
    position: usize,
}

impl SequenceNoise {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().map(clamp_unit).collect();
        Self {
            values: if values.is_empty() { vec![0.0] } else { values },
            position: 0,
        }
    }
}

impl NoiseSource for SequenceNoise {
    fn unit(&mut self) -> f64 {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

/// Build the process-wide noise source: seeded when a seed is configured
pub fn from_seed(seed: Option<u64>) -> Box<dyn NoiseSource> {
    match seed {
        Some(seed) => Box::new(SeededNoise::new(seed)),
        None => Box::new(ThreadNoise),
    }
}

/// A noise source shared between views
#[derive(Clone)]
pub struct SharedNoise {
    inner: Arc<Mutex<Box<dyn NoiseSource>>>,
}

impl SharedNoise {
    pub fn new(source: Box<dyn NoiseSource>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        Self::new(from_seed(seed))
    }

    /// Run `f` with exclusive access to the source
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn NoiseSource) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(guard.as_mut())
    }
}

impl std::fmt::Debug for SharedNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedNoise").finish_non_exhaustive()
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0 - f64::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_noise_in_unit_interval() {
        let mut noise = ThreadNoise;
        for _ in 0..1000 {
            let v = noise.unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let mut a = SeededNoise::new(42);
        let mut b = SeededNoise::new(42);
        for _ in 0..16 {
            assert_eq!(a.unit(), b.unit());
        }
    }

    #[test]
    fn test_fixed_noise_clamps() {
        assert!(FixedNoise::new(1.0).unit() < 1.0);
        assert_eq!(FixedNoise::new(-3.0).unit(), 0.0);
        assert_eq!(FixedNoise::new(f64::NAN).unit(), 0.0);
    }

    #[test]
    fn test_sequence_noise_cycles() {
        let mut noise = SequenceNoise::new([0.1, 0.9]);
        assert_eq!(noise.unit(), 0.1);
        assert_eq!(noise.unit(), 0.9);
        assert_eq!(noise.unit(), 0.1);
    }

    #[test]
    fn test_range_and_index() {
        let mut noise = FixedNoise::new(0.5);
        assert_eq!(noise.range(10.0, 20.0), 15.0);
        assert_eq!(noise.index(6), 3);
        assert_eq!(noise.index(0), 0);

        let mut top = FixedNoise::new(0.999_999);
        assert_eq!(top.index(4), 3);
    }

    #[test]
    fn test_shared_noise_advances_one_stream() {
        let shared = SharedNoise::new(Box::new(SequenceNoise::new([0.2, 0.4])));
        let other = shared.clone();
        assert_eq!(shared.with(|n| n.unit()), 0.2);
        assert_eq!(other.with(|n| n.unit()), 0.4);
    }
}
