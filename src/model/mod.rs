//! Pre-trained classifier
//!
//! - forest: tree ensemble evaluation and decision-path attribution
//! - bundle: the on-disk artifact (model, predictor order, label, encoding)

pub mod bundle;
pub mod forest;

pub use bundle::ModelBundle;
pub use forest::{Node, RandomForest, Tree};
