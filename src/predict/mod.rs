//! Prediction and explanation
//!
//! Run the loaded forest on feature vectors and explain single predictions.

pub mod explain;
pub mod inference;

pub use explain::{Explainer, Explanation, Explanations, StatisticalFallback, TreeAttribution};
pub use inference::{decide, Predictor};
