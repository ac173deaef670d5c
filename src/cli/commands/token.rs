use anyhow::{bail, Context};

use crate::auth::{generate_jwt, Claims};
use crate::cli::connect_postgres;
use crate::config::AppConfig;
use crate::database::models::User;
use crate::database::schema::{from_document, parse_id, Collection};
use crate::database::Store;

/// Print a bearer token for an existing user
pub async fn handle(user: &str, config: &AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    let id = parse_id(user)?;

    // Tokens are only useful against a persistent store
    let store = connect_postgres(config).await?;
    let Some(doc) = store.get(Collection::User, id).await? else {
        bail!("No user with id {}", id);
    };
    let user: User = from_document(doc).context("stored user is malformed")?;

    let claims = Claims::new(user.id, user.role, config.security.jwt_expiry_hours);
    let token = generate_jwt(&claims, config.jwt_secret())?;
    println!("{}", token);
    Ok(())
}
