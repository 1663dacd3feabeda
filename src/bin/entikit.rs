//! entikit CLI - set up an entity database, import spreadsheets and check
//! credentials against it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use entikit::auth::{NewRole, NewUser, Role, User, ADMIN_ROLE};
use entikit::config::ToolkitConfig;
use entikit::db::{Database, PooledConnection};
use entikit::importer::{read_sheet, AdminBoundaryImporter, OrganizationImporter};

#[derive(Parser)]
#[command(name = "entikit")]
#[command(version, about = "Entity models, validation and import tooling", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and optionally an administrator account
    Init {
        /// Username of the administrator to create
        #[arg(long, requires = "admin_password")]
        admin_username: Option<String>,

        /// Password of the administrator to create
        #[arg(long)]
        admin_password: Option<String>,
    },

    /// Import countries and states from a workbook
    ImportBoundaries {
        /// Path to the .xlsx workbook
        file: PathBuf,

        /// Sheet to read (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// Import organizations from a workbook
    ImportOrganizations {
        /// Path to the .xlsx workbook
        file: PathBuf,

        /// Sheet to read (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// Check a login and password
    Authenticate {
        login: String,
        password: String,
    },
}

fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config).and_then(|config| match cli.command {
        Commands::Init {
            admin_username,
            admin_password,
        } => init(&config, admin_username, admin_password),
        Commands::ImportBoundaries { file, sheet } => import_boundaries(&config, file, sheet),
        Commands::ImportOrganizations { file, sheet } => import_organizations(&config, file, sheet),
        Commands::Authenticate { login, password } => authenticate(&config, &login, &password),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ToolkitConfig, String> {
    match path {
        Some(path) => ToolkitConfig::load_from_file(path),
        None => Ok(ToolkitConfig::from_env()),
    }
}

/// Open the configured database and bring its schema up to date.
fn connect(config: &ToolkitConfig) -> Result<PooledConnection, String> {
    let db = Database::new_with_config(&config.database.url, config.database.pool.clone())
        .map_err(|e| e.to_string())?;
    let applied = db.run_migrations().map_err(|e| e.to_string())?;
    if applied > 0 {
        tracing::info!("Applied {} migration(s) to {}", applied, config.database.url);
    }
    db.get_connection().map_err(|e| e.to_string())
}

fn init(
    config: &ToolkitConfig,
    username: Option<String>,
    password: Option<String>,
) -> Result<(), String> {
    let mut conn = connect(config)?;
    println!("Database ready: {}", config.database.url);

    let (Some(username), Some(password)) = (username, password) else {
        return Ok(());
    };
    if User::find_by_username(&mut conn, &username)
        .map_err(|e| e.to_string())?
        .is_some()
    {
        return Err(format!("User '{}' already exists", username));
    }

    let existing = Role::find_by_name(&mut conn, ADMIN_ROLE).map_err(|e| e.to_string())?;
    let role = match existing {
        Some(role) => role,
        None => NewRole::new(ADMIN_ROLE).insert(&mut conn).map_err(|e| e.to_string())?,
    };
    let user = NewUser::new(username)
        .active()
        .with_password(&password)
        .map_err(|e| e.to_string())?
        .insert(&mut conn)
        .map_err(|e| e.to_string())?;
    user.add_role(&mut conn, &role).map_err(|e| e.to_string())?;

    println!("Created administrator {}", user);
    Ok(())
}

fn report_errors(errors: &[String]) {
    for error in errors {
        eprintln!("  ! {}", error);
    }
}

fn import_boundaries(
    config: &ToolkitConfig,
    file: PathBuf,
    sheet: Option<String>,
) -> Result<(), String> {
    let range = read_sheet(&file, sheet.as_deref()).map_err(|e| e.to_string())?;
    let mut conn = connect(config)?;

    let mut importer = AdminBoundaryImporter::new();
    let summary = importer
        .import_sheet(&mut conn, &range)
        .map_err(|e| e.to_string())?;
    report_errors(&importer.errors);
    println!(
        "Imported {} country(ies), {} state(s); skipped {} row(s)",
        summary.countries, summary.states, summary.skipped
    );
    Ok(())
}

fn import_organizations(
    config: &ToolkitConfig,
    file: PathBuf,
    sheet: Option<String>,
) -> Result<(), String> {
    let range = read_sheet(&file, sheet.as_deref()).map_err(|e| e.to_string())?;
    let mut conn = connect(config)?;

    let mut importer = OrganizationImporter::new(config.action_context());
    let summary = importer
        .import_sheet(&mut conn, &range)
        .map_err(|e| e.to_string())?;
    report_errors(&importer.errors);
    println!(
        "Imported {} organization(s) with {} contact(s); {} row(s) failed",
        summary.created, summary.contacts, summary.failed
    );
    Ok(())
}

fn authenticate(config: &ToolkitConfig, login: &str, password: &str) -> Result<(), String> {
    let mut conn = connect(config)?;
    let user = config
        .authenticator()
        .authenticate(&mut conn, login, password)
        .map_err(|e| e.to_string())?;

    match user {
        Some(user) => {
            println!("Authenticated {} ({})", user, user.uuid);
            Ok(())
        }
        None => Err("Invalid login or password".to_string()),
    }
}
