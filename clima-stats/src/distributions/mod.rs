//! Distribution utilities: Student's t, F, standard normal
//!
//! Every component that needs a critical value or a p-value goes through
//! these functions so that correlation, regression and bands agree.

mod special;
pub mod t;
pub mod f;
pub mod normal;

pub use special::{gamma_ln, regularized_incomplete_beta};
pub use t::{t_cdf, t_pdf, t_quantile, t_two_tailed_p};
pub use f::{f_cdf, f_upper_tail};
pub use normal::{normal_quantile, Z_95};

/// Two-sided 95% critical value of Student's t with `df` degrees of freedom
pub fn t_critical_95(df: f64) -> f64 {
    t_quantile(0.975, df)
}
