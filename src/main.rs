use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use selfly::{
    AppState, Config,
    login::{Enrollment, SignupRequest, hash_password, register_user},
    public_upload, router, startup_checks,
    store::{RecordStore, TomlRecordStore},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Manage users
    #[command(subcommand)]
    User(UserCommands),
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// List all users
    List {
        /// Path to the record store (defaults to [storage] database)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Add a new user
    Add {
        username: String,
        password: String,
        /// Directory holding the user's photos
        #[arg(long, default_value = "")]
        photo_dir: String,
        /// Directory holding the user's videos
        #[arg(long, default_value = "")]
        video_dir: String,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Remove a user
    Remove {
        username: String,
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Set a user's password
    Passwd {
        username: String,
        password: String,
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Grant or revoke administrator rights
    Admin {
        username: String,
        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

impl UserCommands {
    fn database(&self) -> Option<&PathBuf> {
        match self {
            UserCommands::List { database }
            | UserCommands::Add { database, .. }
            | UserCommands::Remove { database, .. }
            | UserCommands::Passwd { database, .. }
            | UserCommands::Admin { database, .. } => database.as_ref(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config)?;

    match cli.command {
        Some(Commands::User(user_cmd)) => handle_user_command(&config, user_cmd).await,
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(config, port, host, quit_after).await,
        None => run_server(config, None, None, None).await,
    }
}

fn load_config(config_path: &std::path::Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        let config = toml_edit::de::from_str::<Config>(&config_content)?;
        info!("Configuration loaded from: {:?}", config_path);
        Ok(config)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

async fn handle_user_command(
    config: &Config,
    cmd: UserCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = cmd
        .database()
        .cloned()
        .unwrap_or_else(|| config.storage.database.clone());
    let store = TomlRecordStore::open(db_path.clone()).await?;

    match cmd {
        UserCommands::List { .. } => {
            let users = store.list_users().await?;
            if users.is_empty() {
                println!("No users in {}", db_path.display());
            } else {
                println!("Users in {}:", db_path.display());
                for user in users {
                    println!(
                        "  [{}] {}{}  photos={}  videos={}",
                        user.id,
                        user.username,
                        if user.is_admin { " (admin)" } else { "" },
                        display_dir(user.photo_dir.as_deref()),
                        display_dir(user.video_dir.as_deref()),
                    );
                }
            }
        }
        UserCommands::Add {
            username,
            password,
            photo_dir,
            video_dir,
            admin,
            ..
        } => {
            let request = SignupRequest {
                username,
                password,
                photo_dir,
                video_dir,
            };
            match register_user(&store, request, Enrollment::Standard { is_admin: admin }).await {
                Ok(user) => println!("Added user '{}' with id {}", user.username, user.id),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        UserCommands::Remove { username, .. } => {
            let user = require_user(&store, &username).await?;
            store.delete_user(user.id).await?;
            println!("Removed user '{}'", user.username);
        }
        UserCommands::Passwd {
            username, password, ..
        } => {
            if password.is_empty() {
                eprintln!("Error: password must not be empty");
                std::process::exit(1);
            }
            let user = require_user(&store, &username).await?;
            store
                .update_password(user.id, hash_password(&password)?)
                .await?;
            println!("Updated password for user '{}'", user.username);
        }
        UserCommands::Admin {
            username, revoke, ..
        } => {
            let user = require_user(&store, &username).await?;
            store.update_admin_flag(user.id, !revoke).await?;
            println!(
                "{} administrator rights for '{}'",
                if revoke { "Revoked" } else { "Granted" },
                user.username
            );
        }
    }

    Ok(())
}

async fn require_user(
    store: &TomlRecordStore,
    username: &str,
) -> Result<selfly::store::User, Box<dyn std::error::Error>> {
    match store.get_user_by_name(username.trim()).await? {
        Some(user) => Ok(user),
        None => {
            eprintln!("Error: User '{}' not found", username.trim());
            std::process::exit(1);
        }
    }
}

fn display_dir(dir: Option<&std::path::Path>) -> String {
    dir.map(|d| d.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}

async fn run_server(
    config: Config,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);
    info!("Record store: {:?}", config.storage.database);

    // Perform startup checks
    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => report_startup_errors(&errors)?,
    }

    let store = Arc::new(TomlRecordStore::open(config.storage.database.clone()).await?);
    if let Err(errors) = startup_checks::check_user_records(store.as_ref()).await {
        report_startup_errors(&errors)?;
    }

    let reload_interval = config.storage.reload_interval_seconds;
    if reload_interval > 0 {
        info!("Watching record store for outside edits every {}s", reload_interval);
        TomlRecordStore::start_background_reload(store.clone(), reload_interval);
    }

    let public_host = public_upload::create_host(&config.public_upload)?;
    info!("Public uploads go to {}", public_host.name());

    let app = router(AppState::new(config, store, public_host));

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Set up graceful shutdown
    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

fn report_startup_errors(
    errors: &[startup_checks::StartupCheckError],
) -> Result<(), Box<dyn std::error::Error>> {
    for error in errors {
        tracing::error!("Startup check failed: {}", error);
    }

    if errors.iter().any(|e| e.is_critical()) {
        tracing::error!("Critical startup check failed, exiting");
        return Err("Critical startup check failed".into());
    }

    tracing::warn!("Non-critical startup checks failed, continuing");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
