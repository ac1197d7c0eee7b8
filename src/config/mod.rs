pub mod scoring;

pub use scoring::{
    MetricWeights, ProfileKind, ScoringConfig, ScoringProfile, DEFAULT_SCORING_CONFIG_PATH,
    ENV_SCORING_CONFIG_PATH,
};
