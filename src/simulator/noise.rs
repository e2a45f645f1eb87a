use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Single source of randomness for the generator.
///
/// Seeded streams replay bit-for-bit; without a seed the OS provides entropy.
pub struct NoiseGenerator {
    rng: StdRng,
}

impl NoiseGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Zero-mean Gaussian draw with the given standard deviation.
    pub fn gaussian(&mut self, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        z * std_dev
    }

    pub fn apply(&mut self, value: f64, std_dev: f64) -> f64 {
        value + self.gaussian(std_dev)
    }

    /// Uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_streams_match() {
        let mut a = NoiseGenerator::new(Some(7));
        let mut b = NoiseGenerator::new(Some(7));
        for _ in 0..100 {
            assert_eq!(a.gaussian(0.5), b.gaussian(0.5));
            assert_eq!(a.uniform(), b.uniform());
        }
    }

    #[test]
    fn test_zero_std_is_exact() {
        let mut noise = NoiseGenerator::new(Some(1));
        for _ in 0..50 {
            assert_eq!(noise.apply(9.81, 0.0), 9.81);
        }
    }

    #[test]
    fn test_gaussian_statistics() {
        let mut noise = NoiseGenerator::new(Some(1234));
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| noise.gaussian(0.02)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.001, "mean={}", mean);
        assert!((var.sqrt() - 0.02).abs() < 0.001, "std={}", var.sqrt());
    }

    #[test]
    fn test_uniform_range() {
        let mut noise = NoiseGenerator::new(Some(99));
        for _ in 0..1000 {
            let u = noise.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
