//! Vose's alias method.  Building a table is O(n); drawing from it costs two uniform draws and
//! a comparison, regardless of how skewed the distribution is.
use rand::prelude::*;

use crate::error::{Result,WalkError};

/// Tolerated drift between the sum of a distribution and 1.
pub const EPSILON: f64 = 1e-6;

const NO_ALIAS: u32 = u32::MAX;

/// Turns raw weights into a probability vector.  Weights must be finite and strictly positive;
/// any rounding residual is folded into the final entry.
pub fn normalize(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(WalkError::EmptyDistribution)
    }

    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.)) {
        return Err(WalkError::InvalidWeight(format!("{} is not a finite, positive weight", w)))
    }

    let denom = weights.iter().sum::<f64>();
    if !denom.is_finite() {
        return Err(WalkError::InvalidWeight(format!("weights sum to {}", denom)))
    }

    let mut probs: Vec<f64> = weights.iter().map(|w| w / denom).collect();
    let residual = 1. - probs.iter().sum::<f64>();
    if residual.abs() > EPSILON {
        return Err(WalkError::InvalidWeight(format!("normalization drifted by {}", residual)))
    }

    let last = probs.len() - 1;
    probs[last] = (probs[last] + residual).max(0.);
    Ok(probs)
}

#[derive(Clone,Debug,PartialEq)]
pub struct AliasTable {
    prob: Vec<f64>,
    alias: Vec<u32>
}

impl AliasTable {

    /// Builds a table from a distribution that already sums to 1.
    ///
    /// Both work lists are filled in ascending index order and always popped from the end, so
    /// the same input always produces the same table.
    pub fn new(probs: &[f64]) -> Result<Self> {
        let n = probs.len();
        if n == 0 {
            return Err(WalkError::EmptyDistribution)
        }

        if let Some(p) = probs.iter().find(|p| !(p.is_finite() && **p >= 0.)) {
            return Err(WalkError::InvalidWeight(format!("{} is not a valid probability", p)))
        }

        let total = probs.iter().sum::<f64>();
        if (1. - total).abs() > EPSILON {
            return Err(WalkError::InvalidWeight(format!("probabilities sum to {}", total)))
        }

        let mut scaled: Vec<f64> = probs.iter().map(|p| p * n as f64).collect();
        let mut prob = vec![1f64; n];
        let mut alias = vec![NO_ALIAS; n];

        let (mut small, mut large): (Vec<usize>, Vec<usize>) = (0..n)
            .partition(|idx| scaled[*idx] < 1.);

        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            large.pop();

            prob[s] = scaled[s];
            alias[s] = l as u32;
            scaled[l] -= 1. - scaled[s];
            if scaled[l] < 1. {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // Whatever is left over in either list keeps its own slot: prob 1, no alias.
        Ok(AliasTable { prob, alias })
    }

    /// Normalizes raw weights and builds the table from them.
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        AliasTable::new(&normalize(weights)?)
    }

    pub fn len(&self) -> usize {
        self.prob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Probability of keeping column `idx` rather than jumping to its alias
    pub fn prob(&self, idx: usize) -> f64 {
        self.prob[idx]
    }

    pub fn alias(&self, idx: usize) -> Option<usize> {
        match self.alias[idx] {
            NO_ALIAS => None,
            a => Some(a as usize)
        }
    }

    /// Draws an index in [0, len).
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let n = self.prob.len();
        let idx = ((rng.gen::<f64>() * n as f64) as usize).min(n - 1);
        if rng.gen::<f64>() < self.prob[idx] {
            idx
        } else {
            self.alias(idx).unwrap_or(idx)
        }
    }

    /// Recovers the distribution encoded by the table.
    pub fn probabilities(&self) -> Vec<f64> {
        let n = self.prob.len() as f64;
        let mut p = self.prob.clone();
        for (idx, keep) in self.prob.iter().enumerate() {
            if let Some(a) = self.alias(idx) {
                p[a] += 1. - keep;
            }
        }
        p.iter_mut().for_each(|pi| *pi /= n);
        p
    }
}

#[cfg(test)]
mod alias_tests {
    use super::*;
    use rand_xorshift::XorShiftRng;

    fn assert_close(left: &[f64], right: &[f64], tol: f64) {
        assert_eq!(left.len(), right.len());
        for (l, r) in left.iter().zip(right.iter()) {
            assert!((l - r).abs() < tol, "{:?} != {:?}", left, right);
        }
    }

    #[test]
    fn test_construction() {
        let table = AliasTable::new(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(table.len(), 4);
        assert_close(&table.prob, &[0.4, 0.8, 1., 0.8], 1e-9);
        assert_eq!(table.alias(0), Some(3));
        assert_eq!(table.alias(1), Some(3));
        assert_eq!(table.alias(2), None);
        assert_eq!(table.alias(3), Some(2));
    }

    #[test]
    fn test_reproducible() {
        let probs = [0.05, 0.5, 0.05, 0.15, 0.25];
        assert_eq!(AliasTable::new(&probs).unwrap(), AliasTable::new(&probs).unwrap());
    }

    #[test]
    fn test_uniform_needs_no_aliases() {
        let table = AliasTable::new(&[0.25; 4]).unwrap();
        for idx in 0..4 {
            assert_eq!(table.prob(idx), 1.);
            assert_eq!(table.alias(idx), None);
        }
    }

    #[test]
    fn test_single_entry() {
        let table = AliasTable::new(&[1.]).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(20222022);
        for _ in 0..100 {
            assert_eq!(table.sample(&mut rng), 0);
        }
    }

    #[test]
    fn test_reconstructs_distribution() {
        let weights = [3., 1., 7., 0.5, 2., 11.];
        let probs = normalize(&weights).unwrap();
        let table = AliasTable::new(&probs).unwrap();
        assert_close(&table.probabilities(), &probs, 1e-12);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(AliasTable::new(&[]), Err(WalkError::EmptyDistribution)));
        assert!(matches!(AliasTable::new(&[0.5, 0.6]), Err(WalkError::InvalidWeight(_))));
        assert!(matches!(AliasTable::new(&[1.5, -0.5]), Err(WalkError::InvalidWeight(_))));
        assert!(matches!(AliasTable::new(&[f64::NAN, 1.]), Err(WalkError::InvalidWeight(_))));
    }

    #[test]
    fn test_normalize() {
        let probs = normalize(&[1., 1., 2.]).unwrap();
        assert_close(&probs, &[0.25, 0.25, 0.5], 1e-15);
        assert!((probs.iter().sum::<f64>() - 1.).abs() < 1e-15);

        assert!(matches!(normalize(&[]), Err(WalkError::EmptyDistribution)));
        assert!(matches!(normalize(&[1., 0.]), Err(WalkError::InvalidWeight(_))));
        assert!(matches!(normalize(&[1., -2.]), Err(WalkError::InvalidWeight(_))));
        assert!(matches!(normalize(&[1., f64::INFINITY]), Err(WalkError::InvalidWeight(_))));
    }

    #[test]
    fn test_chi_squared() {
        let probs = [0.1, 0.2, 0.3, 0.4];
        let table = AliasTable::new(&probs).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(2022341);
        let samples = 1_000_000;
        let mut counts = [0usize; 4];
        for _ in 0..samples {
            counts[table.sample(&mut rng)] += 1;
        }

        let chi2 = counts.iter().zip(probs.iter())
            .map(|(c, p)| {
                let expected = p * samples as f64;
                (*c as f64 - expected).powi(2) / expected
            })
            .sum::<f64>();

        // 3 degrees of freedom, p = 0.001
        assert!(chi2 < 16.27, "chi2 = {}, counts = {:?}", chi2, counts);
    }

}
