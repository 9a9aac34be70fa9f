use academix_models::{AthleteType, Gender};
use chrono::NaiveDate;

pub struct AthleteSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub athlete_type: AthleteType,
}

pub struct CoachSeed {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
}

#[derive(Clone, Copy, Debug)]
pub struct AcademySeedConfig {
    pub athletes: usize,
    pub coaches: usize,
}

impl Default for AcademySeedConfig {
    fn default() -> Self {
        Self {
            athletes: 50,
            coaches: 5,
        }
    }
}
