//! Numerical helpers shared by the scoring functions and the discretization filter.

use crate::util::{BayesNetError, Result};

use std::f64::consts::PI;

const LOGPI: f64 = 1.144_729_885_849_400_174_14;

/// Inverse of ln(2), used to move natural logarithms to base 2
const LOG2_INV: f64 = 1.442_695_040_888_963_407_36;

/// Overflow threshold of the asymptotic expansion
const MAX_LN_GAMMA: f64 = 2.556_348e305;

const A: [f64; 5] = [
    8.116_141_674_705_084_503_00E-4,
    -5.950_619_042_843_014_383_24E-4,
    7.936_503_404_577_169_439_45E-4,
    -2.777_777_777_300_996_872_05E-3,
    8.333_333_333_333_319_277_22E-2,
];

const B: [f64; 6] = [
    -1.378_251_525_691_208_591_00E3,
    -3.880_163_151_346_378_409_24E4,
    -3.316_129_927_388_711_847_44E5,
    -1.162_370_974_927_623_073_83E6,
    -1.721_737_008_208_396_621_46E6,
    -8.535_556_642_457_654_656_27E5,
];

const C: [f64; 6] = [
    -3.518_157_014_365_234_705_49E2,
    -1.706_421_066_518_811_592_23E4,
    -2.205_285_905_538_544_548_39E5,
    -1.139_334_443_679_825_072_07E6,
    -2.532_523_071_775_829_512_85E6,
    -2.018_891_414_335_327_732_31E6,
];


/// Evaluate a polynomial with the given coefficients, highest degree first.
fn polevl(x: f64, coef: &[f64]) -> f64 {
    coef.iter().skip(1).fold(coef[0], |acc, c| acc * x + c)
}

/// Evaluate a polynomial whose leading coefficient is 1 and is omitted from `coef`.
fn p1evl(x: f64, coef: &[f64]) -> f64 {
    coef.iter().skip(1).fold(x + coef[0], |acc, c| acc * x + c)
}


/// Natural logarithm of the absolute value of the gamma function.
///
/// Uses a rational approximation on `[2, 13)` (after shifting the argument into that interval),
/// the Stirling series for `x >= 13` and the reflection formula for `x < -34`.
///
/// # Errors
/// `GammaOverflow` at the poles (zero and the negative integers) and for arguments too large for
/// the result to be represented.
pub fn ln_gamma(x: f64) -> Result<f64> {
    if x.is_nan() {
        return Err(BayesNetError::GammaOverflow(x));
    }

    if x < -34.0 {
        let q = -x;
        let w = ln_gamma(q)?;
        let mut p = q.floor();
        if p == q {
            return Err(BayesNetError::GammaOverflow(x));
        }

        let mut z = q - p;
        if z > 0.5 {
            p += 1.0;
            z = p - q;
        }

        z = q * (PI * z).sin();
        if z == 0.0 {
            return Err(BayesNetError::GammaOverflow(x));
        }

        return Ok(LOGPI - z.ln() - w);
    }

    if x < 13.0 {
        let mut x = x;
        let mut z = 1.0;

        while x >= 3.0 {
            x -= 1.0;
            z *= x;
        }

        while x < 2.0 {
            if x == 0.0 {
                return Err(BayesNetError::GammaOverflow(x));
            }
            z /= x;
            x += 1.0;
        }

        let z = z.abs();
        if x == 2.0 {
            return Ok(z.ln());
        }

        let x = x - 2.0;
        let p = x * polevl(x, &B) / p1evl(x, &C);
        return Ok(z.ln() + p);
    }

    if x > MAX_LN_GAMMA {
        return Err(BayesNetError::GammaOverflow(x));
    }

    let mut q = (x - 0.5) * x.ln() - x + 0.918_938_533_204_672_741_78;
    if x > 1.0e8 {
        return Ok(q);
    }

    let p = 1.0 / (x * x);
    if x >= 1000.0 {
        q += ((7.936_507_936_507_936_507_936_5e-4 * p - 2.777_777_777_777_777_777_777_8e-3) * p
            + 0.083_333_333_333_333_333_333_3) / x;
    } else {
        q += polevl(p, &A) / x;
    }

    Ok(q)
}


/// `x * log2(x)`, with the convention `0 * log2(0) = 0`.
pub fn ln_func(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        x * x.ln() * LOG2_INV
    }
}


/// Entropy (in bits) of a single row of (weighted) counts.
pub fn entropy_for_row(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return 0.0;
    }

    let rest: f64 = counts.iter().map(|&c| ln_func(c)).sum();
    (ln_func(total) - rest) / total
}


/// Entropy (in bits) of the columns of `matrix` conditioned on its rows.
///
/// Each row is one side of a split and each column one class.
pub fn entropy_conditioned_on_rows<R: AsRef<[f64]>>(matrix: &[R]) -> f64 {
    let mut value = 0.0;
    let mut total = 0.0;

    for row in matrix {
        let row = row.as_ref();
        let sum: f64 = row.iter().sum();
        value += row.iter().map(|&c| ln_func(c)).sum::<f64>();
        value -= ln_func(sum);
        total += sum;
    }

    if total == 0.0 {
        return 0.0;
    }

    -value / total
}


#[cfg(test)]
mod tests {

    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn ln_gamma_integers() {
        // lnGamma(n) = ln((n - 1)!)
        let mut fact = 1.0f64;
        for n in 1..30 {
            if n > 1 {
                fact *= (n - 1) as f64;
            }
            let v = ln_gamma(n as f64).unwrap();
            assert!((v - fact.ln()).abs() < 1e-8, "n = {}: {} vs {}", n, v, fact.ln());
        }
    }

    #[test]
    fn ln_gamma_half() {
        // Gamma(1/2) = sqrt(pi)
        let v = ln_gamma(0.5).unwrap();
        assert!((v - 0.5 * PI.ln()).abs() < EPS);

        // Gamma(3/2) = sqrt(pi) / 2
        let v = ln_gamma(1.5).unwrap();
        assert!((v - (0.5 * PI.ln() - 2f64.ln())).abs() < EPS);
    }

    #[test]
    fn ln_gamma_large() {
        // Stirling's approximation dominates far out
        let x = 1.0e9;
        let v = ln_gamma(x).unwrap();
        let stirling = (x - 0.5) * x.ln() - x + 0.5 * (2.0 * PI).ln();
        assert!((v - stirling).abs() / stirling < 1e-12);

        // continuity across the switch at 13
        let below = ln_gamma(12.999_999).unwrap();
        let above = ln_gamma(13.0).unwrap();
        assert!((below - above).abs() < 1e-4);
    }

    #[test]
    fn ln_gamma_reflection() {
        // |Gamma(-34.5)| via the reflection formula: Gamma(x)Gamma(1-x) = pi / sin(pi x)
        let x = -34.5;
        let v = ln_gamma(x).unwrap();
        let expected = PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x).unwrap();
        assert!((v - expected).abs() < 1e-8);
    }

    #[test]
    fn ln_gamma_poles() {
        assert_eq!(ln_gamma(0.0), Err(BayesNetError::GammaOverflow(0.0)));
        assert!(ln_gamma(-1.0).is_err());
        assert!(ln_gamma(-40.0).is_err());
        assert!(ln_gamma(3.0e305).is_err());
        assert!(ln_gamma(f64::NAN).is_err());
    }

    #[test]
    fn entropies() {
        assert_eq!(0.0, entropy_for_row(&[0.0, 0.0]));
        assert_eq!(0.0, entropy_for_row(&[5.0, 0.0]));
        assert!((entropy_for_row(&[3.0, 3.0]) - 1.0).abs() < EPS);
        assert!((entropy_for_row(&[1.0, 1.0, 1.0, 1.0]) - 2.0).abs() < EPS);

        // a perfect split leaves no uncertainty
        let perfect = [[6.0, 0.0], [0.0, 3.0]];
        assert!(entropy_conditioned_on_rows(&perfect).abs() < EPS);

        // a useless split leaves all of it
        let useless = [[2.0, 2.0], [1.0, 1.0]];
        assert!((entropy_conditioned_on_rows(&useless) - 1.0).abs() < EPS);

        let empty: [[f64; 2]; 2] = [[0.0, 0.0], [0.0, 0.0]];
        assert_eq!(0.0, entropy_conditioned_on_rows(&empty));
    }
}
