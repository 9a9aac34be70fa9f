//! Countries, cities, sports and amenities.

use std::time::Instant;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::CliResult;

pub const SPORTS: &[&str] = &[
    "Football",
    "Basketball",
    "Swimming",
    "Tennis",
    "Padel",
    "Volleyball",
    "Gymnastics",
    "Karate",
    "Taekwondo",
    "Athletics",
];

pub const AMENITIES: &[&str] = &[
    "Parking",
    "Changing rooms",
    "Showers",
    "Lockers",
    "Cafeteria",
    "First aid",
    "Floodlights",
    "Wi-Fi",
];

pub const COUNTRIES: &[(&str, &[&str])] = &[
    ("Saudi Arabia", &["Riyadh", "Jeddah", "Dammam", "Khobar", "Mecca", "Medina"]),
    ("United Arab Emirates", &["Dubai", "Abu Dhabi", "Sharjah"]),
    ("Egypt", &["Cairo", "Alexandria", "Giza"]),
    ("Kuwait", &["Kuwait City"]),
    ("Bahrain", &["Manama"]),
];

/// Inserts names into a single-column reference table, skipping existing rows.
async fn insert_names(db: &PgPool, table: &str, names: &[&str]) -> CliResult<u64> {
    let mut query = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (name) ", table));
    query.push_values(names, |mut row, name| {
        row.push_bind(*name);
    });
    query.push(" ON CONFLICT (name) DO NOTHING");
    Ok(query.build().execute(db).await?.rows_affected())
}

pub async fn seed_reference(db: &PgPool) -> CliResult<()> {
    let start = Instant::now();
    println!("🌍 Seeding reference data...");

    let sports = insert_names(db, "sports", SPORTS).await?;
    let amenities = insert_names(db, "amenities", AMENITIES).await?;
    let countries: Vec<&str> = COUNTRIES.iter().map(|(name, _)| *name).collect();
    let inserted_countries = insert_names(db, "countries", &countries).await?;

    let mut cities = 0;
    for (country, names) in COUNTRIES {
        let country_id: Uuid = sqlx::query_scalar("SELECT id FROM countries WHERE name = $1")
            .bind(country)
            .fetch_one(db)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("INSERT INTO cities (name, country_id) ");
        query.push_values(names.iter(), |mut row, name| {
            row.push_bind(*name).push_bind(country_id);
        });
        query.push(" ON CONFLICT (name, country_id) DO NOTHING");
        cities += query.build().execute(db).await?.rows_affected();
    }

    println!(
        "   ✓ {} sports, {} amenities, {} countries, {} cities in {:?}",
        sports,
        amenities,
        inserted_countries,
        cities,
        start.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_names_are_unique() {
        for list in [SPORTS, AMENITIES] {
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len());
        }
        let countries: HashSet<_> = COUNTRIES.iter().map(|(name, _)| name).collect();
        assert_eq!(countries.len(), COUNTRIES.len());
    }

    #[test]
    fn test_every_country_has_cities() {
        assert!(COUNTRIES.iter().all(|(_, cities)| !cities.is_empty()));
    }
}
