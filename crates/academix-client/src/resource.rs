//! Academy resources the client can list and edit.
//!
//! Each resource knows how to build a local placeholder from its create body
//! and how to apply an update body locally, which is what lets
//! [`OptimisticStore`](crate::OptimisticStore) show a change before the
//! server has confirmed it.

use std::fmt::Display;

use academix_models::athletes::{Athlete, AthleteWithBookings, CreateAthleteDto, UpdateAthleteDto};
use academix_models::coaches::{Coach, CoachDetail, CreateCoachDto, UpdateCoachDto};
use academix_models::locations::{CreateLocationDto, Location, LocationDetail, UpdateLocationDto};
use academix_models::programs::{
    CreateProgramDto, Program, ProgramDetail, ProgramSummary, UpdateProgramDto,
};
use academix_models::promo_codes::{
    CreatePromoCodeDto, PromoCode, PromoCodeWithUsage, UpdatePromoCodeDto, normalize_code,
};
use academix_models::{
    AcademicId, AthleteId, AthleteType, CoachId, LocationId, ProgramId, PromoCodeId,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub trait Resource {
    /// Path segment under `/api`.
    const PATH: &'static str;

    type Id: Copy + PartialEq + Display + Send + Sync;
    /// Row shape returned by the list endpoint.
    type Entity: DeserializeOwned + Clone + Send + Sync;
    /// Row shape returned by create and update.
    type Saved: DeserializeOwned + Send;
    type Create: Serialize + Sync;
    type Update: Serialize + Sync;

    fn id(entity: &Self::Entity) -> Self::Id;

    fn placeholder(input: &Self::Create) -> Self::Entity;

    fn apply(entity: &mut Self::Entity, changes: &Self::Update);

    /// Converts a server response into a list row. `previous` is the row the
    /// update started from, `None` for creates.
    fn from_saved(saved: Self::Saved, previous: Option<&Self::Entity>) -> Self::Entity;
}

/// The tenant is unknown locally; the server fills it in.
fn pending_academic() -> AcademicId {
    AcademicId::from(Uuid::nil())
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

fn set_some<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *target = value.clone();
    }
}

pub struct Athletes;

impl Resource for Athletes {
    const PATH: &'static str = "athletes";
    type Id = AthleteId;
    type Entity = AthleteWithBookings;
    type Saved = AthleteWithBookings;
    type Create = CreateAthleteDto;
    type Update = UpdateAthleteDto;

    fn id(entity: &Self::Entity) -> AthleteId {
        entity.athlete.id
    }

    fn placeholder(input: &CreateAthleteDto) -> AthleteWithBookings {
        let now = Utc::now();
        AthleteWithBookings {
            athlete: Athlete {
                id: AthleteId::new(),
                academic_id: pending_academic(),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                email: input.email.clone(),
                phone: input.phone.clone(),
                gender: input.gender,
                date_of_birth: input.date_of_birth,
                athlete_type: input.athlete_type.unwrap_or(AthleteType::Primary),
                created_at: now,
                updated_at: now,
            },
            bookings_count: 0,
        }
    }

    fn apply(entity: &mut AthleteWithBookings, changes: &UpdateAthleteDto) {
        let athlete = &mut entity.athlete;
        set(&mut athlete.first_name, &changes.first_name);
        set(&mut athlete.last_name, &changes.last_name);
        set_some(&mut athlete.email, &changes.email);
        set_some(&mut athlete.phone, &changes.phone);
        set_some(&mut athlete.gender, &changes.gender);
        set_some(&mut athlete.date_of_birth, &changes.date_of_birth);
        set(&mut athlete.athlete_type, &changes.athlete_type);
        athlete.updated_at = Utc::now();
    }

    fn from_saved(saved: AthleteWithBookings, _: Option<&AthleteWithBookings>) -> AthleteWithBookings {
        saved
    }
}

pub struct Coaches;

impl Resource for Coaches {
    const PATH: &'static str = "coaches";
    type Id = CoachId;
    type Entity = CoachDetail;
    type Saved = CoachDetail;
    type Create = CreateCoachDto;
    type Update = UpdateCoachDto;

    fn id(entity: &CoachDetail) -> CoachId {
        entity.coach.id
    }

    fn placeholder(input: &CreateCoachDto) -> CoachDetail {
        let now = Utc::now();
        CoachDetail {
            coach: Coach {
                id: CoachId::new(),
                academic_id: pending_academic(),
                name: input.name.clone(),
                title: input.title.clone(),
                bio: input.bio.clone(),
                gender: input.gender,
                date_of_birth: input.date_of_birth,
                image: input.image.clone(),
                created_at: now,
                updated_at: now,
            },
            sport_ids: input.sport_ids.clone(),
        }
    }

    fn apply(entity: &mut CoachDetail, changes: &UpdateCoachDto) {
        let coach = &mut entity.coach;
        set(&mut coach.name, &changes.name);
        set_some(&mut coach.title, &changes.title);
        set_some(&mut coach.bio, &changes.bio);
        set_some(&mut coach.gender, &changes.gender);
        set_some(&mut coach.date_of_birth, &changes.date_of_birth);
        set_some(&mut coach.image, &changes.image);
        coach.updated_at = Utc::now();
        set(&mut entity.sport_ids, &changes.sport_ids);
    }

    fn from_saved(saved: CoachDetail, _: Option<&CoachDetail>) -> CoachDetail {
        saved
    }
}

pub struct Locations;

impl Resource for Locations {
    const PATH: &'static str = "locations";
    type Id = LocationId;
    type Entity = LocationDetail;
    type Saved = LocationDetail;
    type Create = CreateLocationDto;
    type Update = UpdateLocationDto;

    fn id(entity: &LocationDetail) -> LocationId {
        entity.location.id
    }

    fn placeholder(input: &CreateLocationDto) -> LocationDetail {
        let now = Utc::now();
        LocationDetail {
            location: Location {
                id: LocationId::new(),
                academic_id: pending_academic(),
                name: input.name.clone(),
                name_in_google_map: input.name_in_google_map.clone(),
                url: input.url.clone(),
                city_id: input.city_id,
                is_default: input.is_default,
                created_at: now,
                updated_at: now,
            },
            city_name: None,
            sport_ids: input.sport_ids.clone(),
            amenity_ids: input.amenity_ids.clone(),
        }
    }

    fn apply(entity: &mut LocationDetail, changes: &UpdateLocationDto) {
        let location = &mut entity.location;
        set(&mut location.name, &changes.name);
        set_some(&mut location.name_in_google_map, &changes.name_in_google_map);
        set_some(&mut location.url, &changes.url);
        if changes.city_id.is_some() && changes.city_id != location.city_id {
            location.city_id = changes.city_id;
            entity.city_name = None;
        }
        // Clearing the default only happens by promoting another location.
        if changes.is_default == Some(true) {
            location.is_default = true;
        }
        location.updated_at = Utc::now();
        set(&mut entity.sport_ids, &changes.sport_ids);
        set(&mut entity.amenity_ids, &changes.amenity_ids);
    }

    fn from_saved(saved: LocationDetail, _: Option<&LocationDetail>) -> LocationDetail {
        saved
    }
}

pub struct Programs;

impl Resource for Programs {
    const PATH: &'static str = "programs";
    type Id = ProgramId;
    type Entity = ProgramSummary;
    type Saved = ProgramDetail;
    type Create = CreateProgramDto;
    type Update = UpdateProgramDto;

    fn id(entity: &ProgramSummary) -> ProgramId {
        entity.program.id
    }

    /// Location and sport names stay empty until the next list.
    fn placeholder(input: &CreateProgramDto) -> ProgramSummary {
        let now = Utc::now();
        ProgramSummary {
            program: Program {
                id: ProgramId::new(),
                academic_id: pending_academic(),
                location_id: input.location_id,
                sport_id: input.sport_id,
                name: input.name.clone(),
                description: input.description.clone(),
                program_type: input.program_type,
                gender: input.gender,
                start_date_of_birth: input.start_date_of_birth,
                end_date_of_birth: input.end_date_of_birth,
                number_of_seats: input.number_of_seats.unwrap_or(0),
                created_at: now,
                updated_at: now,
            },
            location_name: String::new(),
            sport_name: String::new(),
            coach_ids: input.coach_ids.clone(),
            packages_count: 0,
        }
    }

    fn apply(entity: &mut ProgramSummary, changes: &UpdateProgramDto) {
        let program = &mut entity.program;
        let current_location = program.location_id;
        if let Some(location_id) = changes.location_id.filter(|id| *id != current_location) {
            program.location_id = location_id;
            entity.location_name.clear();
        }
        let current_sport = program.sport_id;
        if let Some(sport_id) = changes.sport_id.filter(|id| *id != current_sport) {
            program.sport_id = sport_id;
            entity.sport_name.clear();
        }
        set(&mut program.name, &changes.name);
        set_some(&mut program.description, &changes.description);
        set(&mut program.program_type, &changes.program_type);
        set_some(&mut program.gender, &changes.gender);
        set_some(&mut program.start_date_of_birth, &changes.start_date_of_birth);
        set_some(&mut program.end_date_of_birth, &changes.end_date_of_birth);
        set(&mut program.number_of_seats, &changes.number_of_seats);
        program.updated_at = Utc::now();
        set(&mut entity.coach_ids, &changes.coach_ids);
    }

    /// Names carry over from `previous` while the location and sport are
    /// unchanged.
    fn from_saved(saved: ProgramDetail, previous: Option<&ProgramSummary>) -> ProgramSummary {
        let (location_name, sport_name) = match previous {
            Some(prev) => (
                if prev.program.location_id == saved.program.location_id {
                    prev.location_name.clone()
                } else {
                    String::new()
                },
                if prev.program.sport_id == saved.program.sport_id {
                    prev.sport_name.clone()
                } else {
                    String::new()
                },
            ),
            None => (String::new(), String::new()),
        };

        ProgramSummary {
            packages_count: saved.packages.len() as i64,
            program: saved.program,
            location_name,
            sport_name,
            coach_ids: saved.coach_ids,
        }
    }
}

pub struct PromoCodes;

impl Resource for PromoCodes {
    const PATH: &'static str = "promo-codes";
    type Id = PromoCodeId;
    type Entity = PromoCodeWithUsage;
    type Saved = PromoCodeWithUsage;
    type Create = CreatePromoCodeDto;
    type Update = UpdatePromoCodeDto;

    fn id(entity: &PromoCodeWithUsage) -> PromoCodeId {
        entity.promo_code.id
    }

    fn placeholder(input: &CreatePromoCodeDto) -> PromoCodeWithUsage {
        let now = Utc::now();
        PromoCodeWithUsage {
            promo_code: PromoCode {
                id: PromoCodeId::new(),
                academic_id: pending_academic(),
                code: normalize_code(&input.code),
                discount_type: input.discount_type,
                discount_value: input.discount_value,
                start_date: input.start_date,
                end_date: input.end_date,
                created_at: now,
                updated_at: now,
            },
            times_used: 0,
        }
    }

    fn apply(entity: &mut PromoCodeWithUsage, changes: &UpdatePromoCodeDto) {
        let promo = &mut entity.promo_code;
        if let Some(code) = &changes.code {
            promo.code = normalize_code(code);
        }
        set(&mut promo.discount_type, &changes.discount_type);
        set(&mut promo.discount_value, &changes.discount_value);
        set(&mut promo.start_date, &changes.start_date);
        set(&mut promo.end_date, &changes.end_date);
        promo.updated_at = Utc::now();
    }

    fn from_saved(saved: PromoCodeWithUsage, _: Option<&PromoCodeWithUsage>) -> PromoCodeWithUsage {
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academix_models::{DiscountType, ProgramType, SportId};
    use chrono::Duration;

    fn program_input() -> CreateProgramDto {
        CreateProgramDto {
            location_id: LocationId::new(),
            sport_id: SportId::new(),
            name: "U12 Football".to_string(),
            description: None,
            program_type: ProgramType::Team,
            gender: None,
            start_date_of_birth: None,
            end_date_of_birth: None,
            number_of_seats: Some(20),
            coach_ids: vec![],
        }
    }

    #[test]
    fn test_athlete_update_keeps_unsent_fields() {
        let mut athlete = Athletes::placeholder(&CreateAthleteDto {
            first_name: "Sara".to_string(),
            last_name: "Ali".to_string(),
            email: Some("sara@example.com".to_string()),
            phone: None,
            gender: None,
            date_of_birth: None,
            athlete_type: None,
        });
        Athletes::apply(
            &mut athlete,
            &UpdateAthleteDto {
                last_name: Some("Hassan".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(athlete.athlete.first_name, "Sara");
        assert_eq!(athlete.athlete.last_name, "Hassan");
        assert_eq!(athlete.athlete.email.as_deref(), Some("sara@example.com"));
        assert_eq!(athlete.athlete.athlete_type, AthleteType::Primary);
    }

    #[test]
    fn test_program_location_change_clears_name() {
        let mut program = Programs::placeholder(&program_input());
        program.location_name = "North Field".to_string();
        program.sport_name = "Football".to_string();

        Programs::apply(
            &mut program,
            &UpdateProgramDto {
                location_id: Some(LocationId::new()),
                ..Default::default()
            },
        );
        assert!(program.location_name.is_empty());
        assert_eq!(program.sport_name, "Football");
        assert_eq!(program.program.number_of_seats, 20);
    }

    #[test]
    fn test_program_saved_keeps_names_when_unchanged() {
        let mut previous = Programs::placeholder(&program_input());
        previous.location_name = "North Field".to_string();
        previous.sport_name = "Football".to_string();

        let detail = ProgramDetail {
            program: previous.program.clone(),
            coach_ids: vec![CoachId::new()],
            packages: vec![],
        };
        let row = Programs::from_saved(detail, Some(&previous));
        assert_eq!(row.location_name, "North Field");
        assert_eq!(row.coach_ids.len(), 1);
        assert_eq!(row.packages_count, 0);
    }

    #[test]
    fn test_promo_placeholder_normalizes_code() {
        let now = Utc::now();
        let promo = PromoCodes::placeholder(&CreatePromoCodeDto {
            code: " summer25 ".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 25.0,
            start_date: now,
            end_date: now + Duration::days(30),
        });
        assert_eq!(promo.promo_code.code, "SUMMER25");
        assert_eq!(promo.times_used, 0);
    }

    #[test]
    fn test_location_default_cannot_be_cleared_locally() {
        let mut location = Locations::placeholder(&CreateLocationDto {
            name: "Main".to_string(),
            name_in_google_map: None,
            url: None,
            city_id: None,
            is_default: true,
            sport_ids: vec![],
            amenity_ids: vec![],
        });
        Locations::apply(
            &mut location,
            &UpdateLocationDto {
                is_default: Some(false),
                ..Default::default()
            },
        );
        assert!(location.location.is_default);
    }
}
