//! Account administration for the plant data service.
//!
//! Uses the same configuration as the server, applies pending migrations and
//! then operates directly on the credential tables.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use migration::{Migrator, MigratorTrait};
use plantdata::{
    auth::Role, config::ConfigLoader, db, repositories::AccountRepository,
    telemetry::init_tracing,
};

#[derive(Debug, Parser)]
#[command(name = "plantdata-accounts", version, about = "Manage plant and admin logins")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a plant operator login
    AddPlant {
        plant_name: String,
        #[arg(long, env = "PLANTDATA_NEW_PASSWORD")]
        password: String,
    },
    /// Create an administrator login
    AddAdmin {
        username: String,
        #[arg(long, env = "PLANTDATA_NEW_PASSWORD")]
        password: String,
    },
    /// Replace the password of an existing login
    SetPassword {
        #[arg(value_enum)]
        role: RoleArg,
        identity: String,
        #[arg(long, env = "PLANTDATA_NEW_PASSWORD")]
        password: String,
    },
    /// List logins, optionally for one role
    List {
        #[arg(value_enum)]
        role: Option<RoleArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Plant,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Plant => Role::Plant,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    init_tracing(&config)?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    Migrator::up(&db, None)
        .await
        .context("running database migrations")?;

    let repo = AccountRepository::new(&db);

    match cli.command {
        Command::AddPlant {
            plant_name,
            password,
        } => {
            let user = repo.create_plant_user(&plant_name, &password).await?;
            println!("Created plant login '{}' (id {})", user.plant_name, user.id);
        }
        Command::AddAdmin { username, password } => {
            let user = repo.create_admin_user(&username, &password).await?;
            println!("Created admin login '{}' (id {})", user.username, user.id);
        }
        Command::SetPassword {
            role,
            identity,
            password,
        } => {
            let role = Role::from(role);
            if !repo.set_password(role, &identity, &password).await? {
                bail!("no {} login named '{}'", role, identity);
            }
            println!("Password updated for {} login '{}'", role, identity);
        }
        Command::List { role } => {
            let roles = match role {
                Some(role) => vec![Role::from(role)],
                None => vec![Role::Admin, Role::Plant],
            };
            for role in roles {
                let identities = repo.list(role).await?;
                println!("{} logins ({}):", role, identities.len());
                for identity in identities {
                    println!("  {}", identity);
                }
            }
        }
    }

    Ok(())
}
