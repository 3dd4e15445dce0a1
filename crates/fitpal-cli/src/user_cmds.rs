//! Handlers for `fitpal user` and `fitpal account` subcommands.

use anyhow::Result;
use sqlx::PgPool;

use fitpal_core::account::{link_google_account, reconcile_external_link, unlink_google_account};
use fitpal_db::queries::users;

use crate::config::FitpalConfig;
use crate::resolve::resolve_user;
use crate::{AccountCommands, UserCommands};

pub async fn run_user_command(command: UserCommands, pool: &PgPool, config: &FitpalConfig) -> Result<()> {
    match command {
        UserCommands::Create { username, email } => {
            let user = users::insert_user(pool, &username, &email).await?;
            println!("User created.");
            println!("  ID:       {}", user.id);
            println!("  Username: {}", user.username);
            println!("  Email:    {}", user.email);
        }
        UserCommands::Show { target } => {
            let user = resolve_user(pool, target.as_deref().or(config.user.as_deref())).await?;
            println!("  ID:       {}", user.id);
            println!("  Username: {}", user.username);
            println!("  Email:    {}", user.email);
            println!("  Created:  {}", user.created_at.format("%Y-%m-%d %H:%M"));
        }
        UserCommands::Delete { target } => {
            let user = resolve_user(pool, Some(&target)).await?;
            users::delete_user(pool, user.id).await?;
            println!("User {} deleted.", user.username);
        }
    }
    Ok(())
}

pub async fn run_account_command(command: AccountCommands, pool: &PgPool, config: &FitpalConfig) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;
    match command {
        AccountCommands::Link {
            access_token,
            refresh_token,
        } => {
            link_google_account(pool, user.id, &access_token, refresh_token.as_deref()).await?;
            println!("Google account linked for {}.", user.username);
        }
        AccountCommands::Unlink => {
            if unlink_google_account(pool, user.id).await? {
                println!("Google account unlinked for {}.", user.username);
            } else {
                println!("{} had no linked Google account.", user.username);
            }
        }
        AccountCommands::Reconcile => {
            let connected = reconcile_external_link(pool, user.id).await?;
            println!("connected_to_google_account = {connected}");
        }
    }
    Ok(())
}
