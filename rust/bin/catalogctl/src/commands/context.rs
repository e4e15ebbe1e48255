//! Context management commands.
//!
//! A context pairs a catalog server with the token issued by it.

use std::path::Path;

use anyhow::Result;
use catalog_core::normalize_base_url;

use crate::config::{ClientConfig, Context};

/// Normalize `server` and require an http(s) URL with a host.
fn validate_server(server: &str) -> Result<String> {
    let url = normalize_base_url(server);
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| anyhow::anyhow!("Server must start with http:// or https://, got \"{}\".", server))?;
    if host.is_empty() || host.starts_with('/') {
        anyhow::bail!("Server URL \"{}\" has no host.", server);
    }
    Ok(url)
}

fn auth_label(ctx: &Context) -> &'static str {
    if ctx.token.is_empty() {
        "not logged in"
    } else {
        "logged in"
    }
}

fn not_found(name: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Context \"{}\" not found. Run `catalogctl context list` to see available contexts.",
        name
    )
}

/// Register a context; the first one becomes current.
pub fn create(name: &str, server: &str, client_config_path: &Path) -> Result<()> {
    let server = validate_server(server)?;
    let mut config = ClientConfig::load(client_config_path)?;
    if config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!("Context \"{}\" already exists. Use `catalogctl context set`.", name);
    }

    config.upsert_context(Context {
        name: name.to_string(),
        server,
        token: String::new(),
    });
    let became_current = config.current_context.is_empty();
    if became_current {
        config.current_context = name.to_string();
    }
    config.save(client_config_path)?;

    if became_current {
        println!("Context \"{}\" created and set as current.", name);
    } else {
        println!("Context \"{}\" created.", name);
    }
    Ok(())
}

pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: catalogctl context create <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:14}", "", "NAME", "SERVER", "AUTH");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context { "*" } else { " " };
        println!("{:2} {:20} {:40} {:14}", marker, ctx.name, ctx.server, auth_label(ctx));
    }
    Ok(())
}

/// Make `name` the current context and show where it points.
pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let ctx = config
        .contexts
        .iter()
        .find(|c| c.name == name)
        .cloned()
        .ok_or_else(|| not_found(name))?;

    config.current_context = ctx.name.clone();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\" ({}, {}).", name, ctx.server, auth_label(&ctx));
    if ctx.token.is_empty() {
        println!("Run `catalogctl login` to authenticate.");
    }
    Ok(())
}

/// Point a context at another server. The stored token was issued by the
/// old server and is dropped.
pub fn set(name: &str, server: Option<&str>, client_config_path: &Path) -> Result<()> {
    let server = server.map(validate_server).transpose()?;
    let mut config = ClientConfig::load(client_config_path)?;
    let ctx = config.get_mut(name).ok_or_else(|| not_found(name))?;

    let Some(server) = server.filter(|s| *s != ctx.server) else {
        println!("Context \"{}\" unchanged.", name);
        return Ok(());
    };
    let had_token = !ctx.token.is_empty();
    ctx.server = server.clone();
    ctx.token.clear();
    config.save(client_config_path)?;

    println!("Context \"{}\" now points to {}.", name, server);
    if had_token {
        println!("Its token was cleared; run `catalogctl login` again.");
    }
    Ok(())
}

pub fn delete(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let was_current = config.current_context == name;
    if !config.remove_context(name) {
        return Err(not_found(name));
    }
    config.save(client_config_path)?;

    println!("Context \"{}\" deleted.", name);
    if was_current {
        println!("No current context; pick one with `catalogctl use context <name>`.");
    }
    Ok(())
}
