use serde::Deserialize;
use sqlx::FromRow;

pub use academix_models::onboarding::{
    OnboardingFacts, OnboardingStatus, OnboardingStep, StepStatus, evaluate,
};

#[derive(Debug, Deserialize, FromRow)]
pub(crate) struct FactsRow {
    #[sqlx(flatten)]
    pub facts: OnboardingFacts,
    pub onboarded: bool,
}
