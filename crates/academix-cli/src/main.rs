use academix_cli::admin::create_system_admin;
use academix_cli::seeder::{self, AcademySeedConfig};
use academix_db::MIGRATOR;
use academix_models::AcademicId;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

#[derive(Parser)]
#[command(name = "academix-cli")]
#[command(about = "Academix CLI - administrative tools for Academix", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a system administrator account
    CreateAdmin {
        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Insert countries, cities, sports and amenities
    SeedReference,
    /// Add fake athletes and coaches to an academy
    SeedAcademy {
        /// Academy to seed
        #[arg(short = 'a', long)]
        academic_id: AcademicId,

        /// Number of athletes
        #[arg(long, default_value = "50")]
        athletes: usize,

        /// Number of coaches
        #[arg(long, default_value = "5")]
        coaches: usize,
    },
    /// Delete every athlete and coach of an academy
    ClearAcademy {
        #[arg(short = 'a', long)]
        academic_id: AcademicId,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let pool = match connect().await {
        Ok(pool) => pool,
        Err(e) => fail("Error connecting to database", e),
    };

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::Migrate => match MIGRATOR.run(&pool).await {
            Ok(()) => println!("✅ Migrations applied"),
            Err(e) => fail("Error running migrations", e),
        },
        Commands::SeedReference => {
            if let Err(e) = seeder::seed_reference(&pool).await {
                fail("Error seeding reference data", e);
            }
        }
        Commands::SeedAcademy {
            academic_id,
            athletes,
            coaches,
        } => {
            let config = AcademySeedConfig { athletes, coaches };
            if let Err(e) = seeder::seed_academy(&pool, academic_id, config).await {
                fail("Error seeding academy", e);
            }
        }
        Commands::ClearAcademy { academic_id, yes } => {
            handle_clear_academy(&pool, academic_id, yes).await
        }
    }
}

async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    Ok(pool)
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, error);
    std::process::exit(1);
}

fn prompt(label: &str, value: Option<String>) -> String {
    match value {
        Some(value) => value,
        None => Input::new()
            .with_prompt(label)
            .interact_text()
            .unwrap_or_else(|e| fail("Failed to read input", e)),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let name = prompt("Name", name);
    let email = prompt("Email address", email);
    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail("Failed to read password", e))
    });

    match create_system_admin(pool, &name, &email, &password).await {
        Ok(id) => {
            println!("\n✅ System admin created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", email.trim().to_lowercase());
        }
        Err(e) => fail("Error creating system admin", e),
    }
}

async fn handle_clear_academy(pool: &PgPool, academic_id: AcademicId, yes: bool) {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all athletes and coaches of {}?",
                academic_id
            ))
            .default(false)
            .interact()
            .unwrap_or_else(|e| fail("Failed to read confirmation", e));
        if !confirmed {
            println!("Aborted");
            return;
        }
    }

    match seeder::clear_academy(pool, academic_id).await {
        Ok((athletes, coaches)) => {
            println!("✅ Deleted {} athletes and {} coaches", athletes, coaches)
        }
        Err(e) => fail("Error clearing academy", e),
    }
}
