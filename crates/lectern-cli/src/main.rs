use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use lectern_core::hash_password;
use lectern_db::{NewUser, PgPool, PgRefreshTokenStore, PgUserDirectory};
use lectern_models::{FamilyId, OrganizationId, Role, UserId};
use lectern_session::{RefreshTokenStore, TokenSweeper};

#[derive(Parser)]
#[command(name = "lectern-cli")]
#[command(about = "Lectern CLI - administrative tools for the session service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account
    CreateUser {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// One of system_admin, admin, teacher, student, parent
        #[arg(short = 'r', long, default_value = "system_admin")]
        role: Role,

        /// Organization the user belongs to (omit for system admins)
        #[arg(short = 'o', long)]
        organization: Option<OrganizationId>,

        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Revoke a user's refresh tokens, on one device or everywhere
    RevokeSessions {
        #[arg(short = 'u', long)]
        user: UserId,

        /// Only revoke this login family
        #[arg(short = 'f', long)]
        family: Option<FamilyId>,
    },
    /// Delete refresh tokens that are both revoked and expired
    SweepTokens,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    lectern_observability::init_basic_console_logging();

    let cli = Cli::parse();

    let result = match connect().await {
        Ok(pool) => run(&pool, cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")
}

async fn run(pool: &PgPool, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::CreateUser {
            email,
            role,
            organization,
            first_name,
            last_name,
            password,
        } => {
            handle_create_user(
                pool,
                role,
                organization,
                Prompted {
                    email,
                    first_name,
                    last_name,
                    password,
                },
            )
            .await
        }
        Commands::RevokeSessions { user, family } => handle_revoke_sessions(pool, user, family).await,
        Commands::SweepTokens => handle_sweep_tokens(pool).await,
    }
}

/// Fields that are prompted for when not given on the command line.
struct Prompted {
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    password: Option<String>,
}

fn prompt_text(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Input::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

async fn handle_create_user(
    pool: &PgPool,
    role: Role,
    organization_id: Option<OrganizationId>,
    fields: Prompted,
) -> anyhow::Result<()> {
    if role != Role::SystemAdmin && organization_id.is_none() {
        anyhow::bail!("--organization is required for role {role}");
    }

    let first_name = prompt_text(fields.first_name, "First name")?;
    let last_name = prompt_text(fields.last_name, "Last name")?;
    let email = prompt_text(fields.email, "Email address")?;
    let password = match fields.password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    let password_hash = hash_password(&password)?;

    let created = PgUserDirectory::new(pool.clone())
        .create_user(&NewUser {
            first_name: first_name.clone(),
            last_name: last_name.clone(),
            email: email.clone(),
            password_hash,
            role,
            organization_id,
        })
        .await?
        .context("User with this email already exists")?;

    println!("\nUser created successfully");
    println!("   ID: {}", created.id);
    println!("   Email: {}", email);
    println!("   Name: {} {}", first_name, last_name);
    println!("   Role: {}", role);

    Ok(())
}

async fn handle_revoke_sessions(
    pool: &PgPool,
    user: UserId,
    family: Option<FamilyId>,
) -> anyhow::Result<()> {
    let store = PgRefreshTokenStore::new(pool.clone());
    let now = Utc::now();

    let revoked = match family {
        Some(family) => store.revoke_all_by_family(user, family, now).await?,
        None => store.revoke_all_by_user(user, now).await?,
    };

    match family {
        Some(family) => println!("Revoked {revoked} refresh token(s) in family {family}"),
        None => println!("Revoked {revoked} refresh token(s) for user {user}"),
    }

    Ok(())
}

async fn handle_sweep_tokens(pool: &PgPool) -> anyhow::Result<()> {
    let sweeper = TokenSweeper::new(Arc::new(PgRefreshTokenStore::new(pool.clone())));
    let deleted = sweeper.run_once().await?;

    println!("Deleted {deleted} revoked and expired refresh token(s)");

    Ok(())
}
