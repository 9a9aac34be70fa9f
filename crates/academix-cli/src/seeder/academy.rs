//! Fake athletes and coaches for one academy.

use std::time::Instant;

use academix_models::{AcademicId, AthleteType, CoachId, Gender, SportId};
use chrono::{Duration, NaiveDate, Utc};
use fake::Fake;
use fake::faker::job::en::Title;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::CellNumber;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::BATCH_SIZE;
use super::models::{AcademySeedConfig, AthleteSeed, CoachSeed};
use crate::CliResult;

fn gender_for(index: usize) -> Gender {
    if index % 2 == 0 { Gender::Male } else { Gender::Female }
}

fn birth_date(today: NaiveDate, min_years: i64, max_years: i64) -> NaiveDate {
    let days: i64 = (min_years * 365..max_years * 365).fake();
    today - Duration::days(days)
}

/// Every fifth athlete is registered as a fellow of another.
pub fn generate_athletes(academic_id: AcademicId, count: usize, today: NaiveDate) -> Vec<AthleteSeed> {
    let tag = academic_id.to_string();
    let tag = &tag[..8];

    (0..count)
        .into_par_iter()
        .map(|index| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+{}{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                tag,
                index
            );

            AthleteSeed {
                first_name,
                last_name,
                email,
                phone: CellNumber().fake(),
                gender: gender_for(index),
                date_of_birth: birth_date(today, 5, 18),
                athlete_type: if index % 5 == 4 {
                    AthleteType::Fellow
                } else {
                    AthleteType::Primary
                },
            }
        })
        .collect()
}

pub fn generate_coaches(count: usize, today: NaiveDate) -> Vec<CoachSeed> {
    (0..count)
        .into_par_iter()
        .map(|index| CoachSeed {
            name: Name().fake(),
            title: Title().fake(),
            bio: Sentence(6..14).fake(),
            gender: gender_for(index),
            date_of_birth: birth_date(today, 22, 55),
        })
        .collect()
}

async fn insert_athletes(
    tx: &mut Transaction<'_, Postgres>,
    academic_id: AcademicId,
    athletes: &[AthleteSeed],
) -> CliResult<u64> {
    let mut inserted = 0;
    for chunk in athletes.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO athletes \
             (academic_id, first_name, last_name, email, phone, gender, date_of_birth, athlete_type) ",
        );
        query.push_values(chunk, |mut row, athlete| {
            row.push_bind(academic_id)
                .push_bind(athlete.first_name.clone())
                .push_bind(athlete.last_name.clone())
                .push_bind(athlete.email.clone())
                .push_bind(athlete.phone.clone())
                .push_bind(athlete.gender)
                .push_bind(athlete.date_of_birth)
                .push_bind(athlete.athlete_type);
        });
        inserted += query.build().execute(&mut **tx).await?.rows_affected();
    }
    Ok(inserted)
}

async fn insert_coaches(
    tx: &mut Transaction<'_, Postgres>,
    academic_id: AcademicId,
    coaches: &[CoachSeed],
) -> CliResult<Vec<CoachId>> {
    let mut ids = Vec::with_capacity(coaches.len());
    for chunk in coaches.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO coaches (academic_id, name, title, bio, gender, date_of_birth) ",
        );
        query.push_values(chunk, |mut row, coach| {
            row.push_bind(academic_id)
                .push_bind(coach.name.clone())
                .push_bind(coach.title.clone())
                .push_bind(coach.bio.clone())
                .push_bind(coach.gender)
                .push_bind(coach.date_of_birth);
        });
        query.push(" RETURNING id");
        let chunk_ids: Vec<CoachId> = query.build_query_scalar().fetch_all(&mut **tx).await?;
        ids.extend(chunk_ids);
    }
    Ok(ids)
}

/// Coaches get the academy's sports round-robin, one each.
async fn link_coach_sports(
    tx: &mut Transaction<'_, Postgres>,
    coaches: &[CoachId],
    sports: &[SportId],
) -> CliResult<()> {
    if coaches.is_empty() || sports.is_empty() {
        return Ok(());
    }
    let mut query = QueryBuilder::<Postgres>::new("INSERT INTO coach_sports (coach_id, sport_id) ");
    query.push_values(coaches.iter().enumerate(), |mut row, (index, coach)| {
        row.push_bind(*coach).push_bind(sports[index % sports.len()]);
    });
    query.build().execute(&mut **tx).await?;
    Ok(())
}

pub async fn seed_academy(
    db: &PgPool,
    academic_id: AcademicId,
    config: AcademySeedConfig,
) -> CliResult<()> {
    let start = Instant::now();

    let name: Option<String> = sqlx::query_scalar("SELECT name FROM academics WHERE id = $1")
        .bind(academic_id)
        .fetch_optional(db)
        .await?;
    let Some(name) = name else {
        return Err(format!("Academic {} not found", academic_id).into());
    };
    println!(
        "🏟️  Seeding {} athletes and {} coaches for {}...",
        config.athletes, config.coaches, name
    );

    let today = Utc::now().date_naive();
    let athletes = generate_athletes(academic_id, config.athletes, today);
    let coaches = generate_coaches(config.coaches, today);
    println!("   ✓ Generated data in {:?}", start.elapsed());

    let sports: Vec<SportId> =
        sqlx::query_scalar("SELECT sport_id FROM academic_sports WHERE academic_id = $1")
            .bind(academic_id)
            .fetch_all(db)
            .await?;

    let mut tx = db.begin().await?;
    let athlete_count = insert_athletes(&mut tx, academic_id, &athletes).await?;
    let coach_ids = insert_coaches(&mut tx, academic_id, &coaches).await?;
    link_coach_sports(&mut tx, &coach_ids, &sports).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} athletes and {} coaches in {:?}",
        athlete_count,
        coach_ids.len(),
        start.elapsed()
    );
    Ok(())
}

/// Deletes an academy's athletes and coaches. Their bookings and program
/// assignments cascade.
pub async fn clear_academy(db: &PgPool, academic_id: AcademicId) -> CliResult<(u64, u64)> {
    let mut tx = db.begin().await?;
    let athletes = sqlx::query("DELETE FROM athletes WHERE academic_id = $1")
        .bind(academic_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let coaches = sqlx::query("DELETE FROM coaches WHERE academic_id = $1")
        .bind(academic_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;
    Ok((athletes, coaches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_athlete_emails_are_unique() {
        let athletes = generate_athletes(AcademicId::new(), 200, today());
        assert_eq!(athletes.len(), 200);
        let emails: HashSet<_> = athletes.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails.len(), 200);
    }

    #[test]
    fn test_athletes_are_school_age() {
        for athlete in generate_athletes(AcademicId::new(), 50, today()) {
            let age_days = (today() - athlete.date_of_birth).num_days();
            assert!((5 * 365..18 * 365).contains(&age_days));
        }
    }

    #[test]
    fn test_fellow_share() {
        let athletes = generate_athletes(AcademicId::new(), 10, today());
        let fellows = athletes
            .iter()
            .filter(|a| a.athlete_type == AthleteType::Fellow)
            .count();
        assert_eq!(fellows, 2);
    }

    #[test]
    fn test_generate_coaches() {
        let coaches = generate_coaches(4, today());
        assert_eq!(coaches.len(), 4);
        assert!(coaches.iter().all(|c| !c.name.is_empty()));
        assert_eq!(coaches[1].gender, Gender::Female);
    }
}
