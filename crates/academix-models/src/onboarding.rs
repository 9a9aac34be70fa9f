//! Onboarding wizard progress.
//!
//! An academy walks through five steps before it may take bookings. Each step
//! is a set of boolean requirements computed from [`OnboardingFacts`], a
//! single row of counts read from the database.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    AcademyDetails,
    Locations,
    Coaches,
    Programs,
    Policy,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 5] = [
        OnboardingStep::AcademyDetails,
        OnboardingStep::Locations,
        OnboardingStep::Coaches,
        OnboardingStep::Programs,
        OnboardingStep::Policy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::AcademyDetails => "academy_details",
            OnboardingStep::Locations => "locations",
            OnboardingStep::Coaches => "coaches",
            OnboardingStep::Programs => "programs",
            OnboardingStep::Policy => "policy",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OnboardingFacts {
    pub has_name: bool,
    pub has_description: bool,
    pub has_logo: bool,
    pub sports_count: i64,
    pub locations_count: i64,
    pub locations_with_sports: i64,
    pub coaches_count: i64,
    pub coaches_with_sports: i64,
    pub programs_count: i64,
    pub packages_count: i64,
    pub schedules_count: i64,
    pub entry_fees: f64,
    pub has_policy: bool,
}

impl OnboardingFacts {
    /// `(requirement, satisfied)` pairs for one step.
    fn requirements(&self, step: OnboardingStep) -> Vec<(&'static str, bool)> {
        match step {
            OnboardingStep::AcademyDetails => vec![
                ("name", self.has_name),
                ("description", self.has_description),
                ("logo", self.has_logo),
                ("sports", self.sports_count > 0),
            ],
            OnboardingStep::Locations => vec![
                ("location", self.locations_count > 0),
                ("location_sports", self.locations_with_sports > 0),
            ],
            OnboardingStep::Coaches => vec![
                ("coach", self.coaches_count > 0),
                ("coach_sports", self.coaches_with_sports > 0),
            ],
            OnboardingStep::Programs => vec![
                ("program", self.programs_count > 0),
                ("package", self.packages_count > 0),
                ("schedule", self.schedules_count > 0),
            ],
            // Free academies (entry fees of zero) pass once a policy is written.
            OnboardingStep::Policy => vec![
                ("entry_fees", self.entry_fees > 0.0 || self.has_policy),
                ("policy", self.has_policy),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StepStatus {
    pub step: OnboardingStep,
    pub completed: bool,
    /// Requirements still unmet
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OnboardingStatus {
    pub steps: Vec<StepStatus>,
    /// First incomplete step, `None` once every step is done
    pub current_step: Option<OnboardingStep>,
    pub completed: bool,
    pub onboarded: bool,
    /// Completed steps out of five, as a percentage
    pub progress: u8,
}

pub fn evaluate(facts: &OnboardingFacts, onboarded: bool) -> OnboardingStatus {
    let steps: Vec<StepStatus> = OnboardingStep::ALL
        .into_iter()
        .map(|step| {
            let missing: Vec<String> = facts
                .requirements(step)
                .into_iter()
                .filter(|(_, met)| !met)
                .map(|(name, _)| name.to_string())
                .collect();
            StepStatus {
                step,
                completed: missing.is_empty(),
                missing,
            }
        })
        .collect();

    let done = steps.iter().filter(|s| s.completed).count();
    let current_step = steps.iter().find(|s| !s.completed).map(|s| s.step);

    OnboardingStatus {
        completed: current_step.is_none(),
        current_step,
        onboarded,
        progress: (done * 100 / steps.len()) as u8,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_facts() -> OnboardingFacts {
        OnboardingFacts {
            has_name: true,
            has_description: true,
            has_logo: true,
            sports_count: 2,
            locations_count: 1,
            locations_with_sports: 1,
            coaches_count: 3,
            coaches_with_sports: 2,
            programs_count: 1,
            packages_count: 2,
            schedules_count: 4,
            entry_fees: 150.0,
            has_policy: true,
        }
    }

    #[test]
    fn test_empty_academy_starts_at_details() {
        let status = evaluate(&OnboardingFacts::default(), false);
        assert!(!status.completed);
        assert_eq!(status.current_step, Some(OnboardingStep::AcademyDetails));
        assert_eq!(status.progress, 0);
        assert_eq!(
            status.steps[0].missing,
            vec!["name", "description", "logo", "sports"]
        );
    }

    #[test]
    fn test_complete_academy() {
        let status = evaluate(&complete_facts(), true);
        assert!(status.completed);
        assert!(status.onboarded);
        assert_eq!(status.current_step, None);
        assert_eq!(status.progress, 100);
        assert!(status.steps.iter().all(|s| s.missing.is_empty()));
    }

    #[test]
    fn test_current_step_is_first_incomplete() {
        let facts = OnboardingFacts {
            coaches_with_sports: 0,
            schedules_count: 0,
            ..complete_facts()
        };
        let status = evaluate(&facts, false);
        assert_eq!(status.current_step, Some(OnboardingStep::Coaches));
        assert_eq!(status.steps[2].missing, vec!["coach_sports"]);
        assert_eq!(status.steps[3].missing, vec!["schedule"]);
        assert_eq!(status.progress, 60);
    }

    #[test]
    fn test_location_without_sports_is_incomplete() {
        let facts = OnboardingFacts {
            locations_with_sports: 0,
            ..complete_facts()
        };
        let status = evaluate(&facts, false);
        assert_eq!(status.current_step, Some(OnboardingStep::Locations));
    }

    #[test]
    fn test_free_academy_passes_policy_step_with_policy() {
        let facts = OnboardingFacts {
            entry_fees: 0.0,
            ..complete_facts()
        };
        assert!(evaluate(&facts, false).completed);

        let facts = OnboardingFacts {
            entry_fees: 0.0,
            has_policy: false,
            ..complete_facts()
        };
        let status = evaluate(&facts, false);
        assert_eq!(status.steps[4].missing, vec!["entry_fees", "policy"]);
    }

    #[test]
    fn test_step_serializes_snake_case() {
        let json = serde_json::to_string(&OnboardingStep::AcademyDetails).unwrap();
        assert_eq!(json, r#""academy_details""#);
        assert_eq!(OnboardingStep::Programs.as_str(), "programs");
    }
}
