//! # Phoenix Stats
//!
//! Statistical validation of evolution runs. Everything here is a pure
//! function of an append-only `&[EvolutionStatistics]` history.
//!
//! ## Tests
//!
//! | Analysis    | Needs | Method                                                |
//! |-------------|-------|-------------------------------------------------------|
//! | trend       | 2     | OLS of average fitness on generation, Student t       |
//! | improvement | 2     | Welch t-test, first vs last generation samples        |
//! | performance | 2     | max p, max effect of the two above                    |
//! | convergence | 5     | fitness variance and diversity slopes both falling    |
//! | diversity   | 3     | OLS of diversity on generation                        |
//!
//! Short histories produce an `insufficient_data` result instead of an
//! error. Degenerate tests report p = 1 and set `low_confidence`.

pub mod analysis;
pub mod descriptive;
pub mod effect;
pub mod power;
pub mod regression;
pub mod report;
pub mod validator;

pub use analysis::{StatisticalAnalysis, INSUFFICIENT_DATA};
pub use descriptive::{confidence_interval, Summary};
pub use effect::{cohens_d, effect_sizes, EffectMagnitude, EffectSizes};
pub use power::{power_analysis, PowerAnalysis};
pub use regression::{linear_regression, LinearFit};
pub use report::{AssessmentStatus, OverallAssessment, StatisticalReport};
pub use validator::StatisticalValidator;
