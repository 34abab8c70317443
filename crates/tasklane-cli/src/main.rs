use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use tasklane_config::{DatabaseConfig, ServerConfig};
use tasklane_core::hash_password_with_cost;
use tasklane_db::{SqlitePool, SqliteStore, StoreError, UserSaver, init_db_pool, run_migrations};
use tasklane_models::RegisterRequest;
use tracing_subscriber::EnvFilter;
use validator::Validate;

#[derive(Parser)]
#[command(name = "tasklane-cli")]
#[command(about = "Tasklane CLI - Administrative tools for Tasklane", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a user account
    CreateUser {
        /// Unique login
        #[arg(short = 'l', long)]
        login: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::CreateUser {
            login,
            name,
            password,
        } => handle_create_user(pool, login, name, password).await,
    }
}

async fn handle_migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    run_migrations(pool)
        .await
        .context("Failed to run migrations")?;
    println!("\n✅ Migrations applied");
    Ok(())
}

async fn handle_create_user(
    pool: SqlitePool,
    login: Option<String>,
    name: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let login = match login {
        Some(login) => login,
        None => Input::new().with_prompt("Login").interact_text()?,
    };

    let name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Name").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let request = RegisterRequest {
        login,
        password,
        name,
    };
    request.validate()?;

    let cost = ServerConfig::from_env()?.bcrypt_cost;
    let password = request.password.clone();
    let hash = tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
        .await
        .context("Password hashing task failed")??;

    let store = SqliteStore::new(pool);
    match store
        .save_user(&request.login, hash.as_bytes(), &request.name)
        .await
    {
        Ok(user_id) => {
            println!("\n✅ User created successfully!");
            println!("   Id: {}", user_id.get());
            println!("   Login: {}", request.login);
            println!("   Name: {}", request.name);
            Ok(())
        }
        Err(StoreError::UserExists) => {
            anyhow::bail!("a user with login '{}' already exists", request.login)
        }
        Err(e) => Err(e).context("Failed to create user"),
    }
}
