use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "wastewise_cli", version, about = "WasteWise operator tools")]
pub struct Cli {
    /// Log debug detail. `WASTEWISE_LOG` overrides this.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CLI version.
    Version,

    /// Create the administrator account if it does not exist yet.
    CreateAdmin(CreateAdminArgs),

    /// Remove revocation entries whose tokens have expired anyway.
    PurgeRevocations(DatabaseArgs),
}

#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
}

#[derive(Args, Debug)]
pub struct CreateAdminArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Admin login email.
    #[arg(long, env = "ADMIN_EMAIL")]
    pub email: String,

    /// Admin password. Prefer the environment variable over the flag.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Display name.
    #[arg(long, env = "ADMIN_USERNAME", default_value = "Admin")]
    pub username: String,
}
