use anyhow::Context;
use clap::Args;

use crate::auth::password::hash_password;
use crate::auth::Role;
use crate::config::AppConfig;
use crate::database::models::user::RegisterRequest;
use crate::database::models::User;
use crate::database::{manager, PgUserStore, UserStore};

/// Admins cannot self-register over HTTP; this is the only way to mint one.
#[derive(Args, Debug)]
pub struct CreateAdminArgs {
    #[arg(long, help = "Login email for the new admin")]
    pub email: String,

    #[arg(long, help = "Display name")]
    pub name: String,

    #[arg(long, help = "Password (8 to 128 characters)")]
    pub password: String,
}

pub async fn handle(args: CreateAdminArgs) -> anyhow::Result<()> {
    let RegisterRequest { name, email, password } = RegisterRequest {
        name: args.name,
        email: args.email,
        password: args.password,
    }
    .validate()?;

    let config = AppConfig::from_env()?;
    let url = config.database_url()?;
    let pool = manager::connect(url, &config.database)
        .await
        .with_context(|| format!("failed to connect to {}", manager::redact_url(url)))?;
    manager::migrate(&pool).await.context("failed to apply schema")?;

    let password_hash = hash_password(&password)?;
    let store = PgUserStore::new(pool.clone());
    let user = store
        .insert(User::create(name, email, password_hash, Role::Admin))
        .await?;
    pool.close().await;

    tracing::info!(user_id = %user.id, "Admin account created");
    println!("Created admin {} ({})", user.email, user.id);
    Ok(())
}
