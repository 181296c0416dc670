mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use agenda_adapters::persistence::SqliteDb;
use agenda_app::AppointmentService;
use agenda_core::time::format_local;
use agenda_ports::inbound::AppointmentBook;

use config::Config;

struct Args {
    validate: bool,
    help: bool,
}

fn parse_args() -> Args {
    let mut result = Args {
        validate: false,
        help: false,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--validate" => result.validate = true,
            "--help" | "-h" => result.help = true,
            _ => {}
        }
    }
    result
}

fn print_help() {
    println!("agenda - appointment book sign-in check\n");
    println!("USAGE:");
    println!("    agenda [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --validate   Validate configuration and exit");
    println!("    --help, -h   Show this help message\n");
    println!("ENVIRONMENT:");
    println!("    AGENDA_DATABASE_URL, AGENDA_USER_TZ, AGENDA_BUSINESS_TZ,");
    println!("    AGENDA_BUSINESS_OPEN, AGENDA_BUSINESS_CLOSE,");
    println!("    AGENDA_MIN_DURATION_MINUTES, AGENDA_LOOKAHEAD_MINUTES");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    if args.help {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!(
        user_zone = %config.user_zone,
        business_zone = %config.business_zone,
        "configuration loaded"
    );

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }
    if args.validate {
        info!("configuration is valid");
        return Ok(());
    }

    let db = SqliteDb::new(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    let book = AppointmentService::new(db.clone(), db, config.validator()?, config.finder()?);

    let now = Utc::now();
    let zone = config.user_zone;

    match book.upcoming(now, zone).await.context("upcoming appointment lookup")? {
        Some(hit) => {
            let id = hit
                .appointment
                .id()
                .map(|id| id.to_string())
                .unwrap_or_default();
            info!(
                appointment_id = %id,
                starts = %format_local(hit.appointment.start(), zone),
                "appointment starting within {} minutes",
                config.lookahead_minutes
            );
        }
        None => info!("no upcoming appointments"),
    }

    let tomorrow = book
        .tomorrow_count(now, zone)
        .await
        .context("counting tomorrow's appointments")?;
    info!(count = tomorrow, "appointments tomorrow");

    Ok(())
}
