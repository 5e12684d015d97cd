use clap::{Parser, Subcommand};

use clerkly_lib::clerk::{run_clerk, ClerkOptions};
use clerkly_lib::config::AppConfig;
use clerkly_lib::local_store::LocalStore;
use clerkly_lib::location::{default_location, known_countries, lookup_location};
use clerkly_lib::models::{CaseCategory, Difficulty};
use clerkly_lib::session::ClerkingContext;

#[derive(Parser)]
#[command(name = "clerkly")]
#[command(version, about = "Clinical clerking simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve,
    /// Clerk a generated patient in the terminal
    Clerk {
        /// Department (Obstetrics, Pediatrics, Gynecology)
        #[arg(long)]
        department: String,
        /// basic, intermediate or advanced (random if omitted)
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// acute, chronic, emergency or outpatient (random if omitted)
        #[arg(long)]
        category: Option<CaseCategory>,
        /// Country used to localize the case; remembered for later sessions
        #[arg(long)]
        country: Option<String>,
    },
    /// List countries with a medical profile
    Locations,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    clerkly_lib::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = AppConfig::from_env()?;
            clerkly_lib::serve(config).await?;
        }
        Commands::Clerk {
            department,
            difficulty,
            category,
            country,
        } => {
            let config = AppConfig::from_env()?;
            let engine = clerkly_lib::build_engine(&config)?;
            let mut ctx = ClerkingContext::load(LocalStore::open_default()?);
            if let Some(country) = country {
                ctx.set_location(lookup_location(&country))?;
            }

            let options = ClerkOptions {
                department,
                difficulty,
                category,
            };
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            if run_clerk(&mut ctx, &engine, options, stdin, &mut stdout)
                .await?
                .is_none()
            {
                println!("Session ended without a diagnosis.");
            }
        }
        Commands::Locations => {
            let profiles = known_countries()
                .map(lookup_location)
                .chain(std::iter::once(default_location()));
            for info in profiles {
                println!(
                    "{:<16} {:<16} {:<14} {}",
                    info.country, info.region, info.economic_level, info.available_resources
                );
            }
        }
    }

    Ok(())
}
