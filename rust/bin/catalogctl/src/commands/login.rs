//! Login / logout / identity commands.

use std::path::Path;

use anyhow::Result;
use catalog_admin::model::{ALGORITHMS_PAGE, HOME_PAGE, PRODUCTS_PAGE};
use catalog_admin::service::auth;
use catalog_admin::CatalogApi;
use catalog_client::Session;
use catalog_core::CatalogSettings;

use super::Connection;
use crate::config::ClientConfig;

/// Log in to the current context's server and store the token.
pub async fn login(
    email: &str,
    password: &str,
    settings: CatalogSettings,
    client_config_path: &Path,
) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let conn = Connection::open(&config, settings)?;

    let session = Session::new();
    let user = auth::login(conn.api.as_ref(), &session, email, password).await?;
    let token = session
        .bearer()
        .ok_or_else(|| anyhow::anyhow!("Server returned an empty token"))?;

    let ctx = config
        .get_mut(&conn.context)
        .ok_or_else(|| anyhow::anyhow!("Context disappeared"))?;
    ctx.token = token;
    config.save(client_config_path)?;

    println!("Logged in as {} <{}>.", user.name, user.email);
    println!("Token saved to context \"{}\".", conn.context);
    Ok(())
}

/// Clear the token from the current context.
pub fn logout(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let name = config.require_current()?.name.clone();

    let ctx = config
        .get_mut(&name)
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;
    let session = Session::with_token(std::mem::take(&mut ctx.token));
    if !auth::logout(&session) {
        println!("Not logged in to context \"{}\".", name);
        return Ok(());
    }

    config.save(client_config_path)?;
    println!("Logged out from context \"{}\".", name);
    Ok(())
}

/// Drop the current context's token without printing anything.
pub fn forget_token(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let name = config.current_context.clone();
    if let Some(ctx) = config.get_mut(&name) {
        if !ctx.token.is_empty() {
            ctx.token.clear();
            config.save(client_config_path)?;
        }
    }
    Ok(())
}

/// Show the identity behind the stored token and the pages it may view.
pub async fn whoami(conn: &Connection, output_json: bool) -> Result<()> {
    if !conn.session.is_active() {
        anyhow::bail!("Not logged in. Run `catalogctl login`.");
    }
    let user = conn
        .api
        .me(&conn.session)
        .await
        .map_err(|e| e.into_load_error())?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!("{} <{}> (id {})", user.name, user.email, user.id);
    let roles: Vec<String> = user
        .roles
        .iter()
        .map(|r| format!("{} ({})", r.name, r.id))
        .collect();
    println!("Roles: {}", roles.join(", "));
    for page in [HOME_PAGE, PRODUCTS_PAGE, ALGORITHMS_PAGE] {
        let mark = if user.can_view(page) { "yes" } else { "no" };
        println!("  {:14} {}", page, mark);
    }
    Ok(())
}

/// Report the current context and whether its token is still accepted.
pub async fn status(conn: &Connection) -> Result<()> {
    println!("Context: {}", conn.context);
    println!("Server:  {}", conn.api.base_url());
    if !conn.session.is_active() {
        println!("Auth:    not logged in");
        return Ok(());
    }
    match conn.api.me(&conn.session).await {
        Ok(user) => println!("Auth:    logged in as {}", user.email),
        Err(e) if e.is_unauthorized() => println!("Auth:    token rejected"),
        Err(e) => println!("Auth:    unreachable ({})", e),
    }
    Ok(())
}
