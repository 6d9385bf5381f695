//! Clima Statistics Engine
//!
//! Correlation and regression statistics for paired numeric samples, such as
//! the monthly scores of two climate dimensions:
//! - Pearson r and Spearman ρ with t-test significance and a Fisher-z interval
//! - OLS regression with standard errors, intervals and the model F-test
//! - Confidence and prediction bands over an x-grid
//! - A quadratic-vs-linear curvature check
//!
//! Every computation is a pure function of its inputs. [`StatisticsEngine`]
//! is the entry point; [`batch`] runs it over every pair of a dimension set.

mod helpers;
mod validate;
mod correlation;
mod regression;
mod bands;
mod nonlinear;
mod config;
mod facade;
pub mod distributions;
pub mod batch;

pub use bands::generate_bands;
pub use config::{EngineConfig, NonlinearityPolicy, WarningPolicy};
pub use correlation::{correlate, fisher_interval, pearson_r, spearman_rho, ALPHA, CONFIDENCE_LEVEL};
pub use facade::{collect_warnings, compute_full_statistics, StatisticsEngine, Warning};
pub use nonlinear::{detect_nonlinearity, fit_quadratic, QuadraticFit};
pub use regression::{format_equation, regress};
pub use validate::{validate, SamplePair, MIN_SAMPLES};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn paired_sample() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 3..40)
            .prop_map(|pairs| pairs.into_iter().unzip())
    }

    proptest! {
        #[test]
        fn test_pearson_symmetric((x, y) in paired_sample()) {
            prop_assume!(validate(&x, &y).is_ok());
            prop_assert!((pearson_r(&x, &y) - pearson_r(&y, &x)).abs() < 1e-12);
            prop_assert!((spearman_rho(&x, &y) - spearman_rho(&y, &x)).abs() < 1e-12);
        }

        #[test]
        fn test_self_correlation_is_one((x, _y) in paired_sample()) {
            prop_assume!(validate(&x, &x).is_ok());
            let stats = correlate(&SamplePair::new(&x, &x).unwrap());
            prop_assert!((stats.pearson_r - 1.0).abs() < 1e-9);
        }

        #[test]
        fn test_record_invariants((x, y) in paired_sample()) {
            prop_assume!(validate(&x, &y).is_ok());
            let stats = compute_full_statistics(&x, &y).unwrap();
            let c = &stats.correlation;
            let r = &stats.regression;

            prop_assert!((-1.0..=1.0).contains(&c.pearson_r));
            prop_assert!((-1.0..=1.0).contains(&c.spearman_rho));
            prop_assert!((0.0..=1.0).contains(&c.p_value));
            prop_assert!(c.confidence_interval.contains(c.pearson_r));
            prop_assert!((r.r_squared - c.pearson_r * c.pearson_r).abs() < 1e-9);
            prop_assert!(r.adjusted_r_squared <= r.r_squared);
            prop_assert!(stats.validate().is_ok());
        }

        #[test]
        fn test_prediction_band_contains_confidence_band((x, y) in paired_sample(), grid in 1usize..50) {
            prop_assume!(validate(&x, &y).is_ok());
            let regression = regress(&SamplePair::new(&x, &y).unwrap());
            let band = generate_bands(&x, &regression, grid);
            prop_assert_eq!(band.len(), grid);
            for p in &band {
                prop_assert!(p.upper_pi - p.lower_pi >= p.upper_ci - p.lower_ci);
            }
            prop_assert!(band.windows(2).all(|w| w[0].x <= w[1].x));
        }

        #[test]
        fn test_idempotent((x, y) in paired_sample()) {
            prop_assume!(validate(&x, &y).is_ok());
            prop_assert_eq!(compute_full_statistics(&x, &y), compute_full_statistics(&x, &y));
        }
    }
}
