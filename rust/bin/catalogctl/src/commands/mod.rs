pub mod breadcrumbs;
pub mod context;
pub mod login;
pub mod products;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use catalog_admin::{HttpCatalog, Notice, NoticeLevel};
use catalog_client::{RestClient, Session};
use catalog_core::{normalize_base_url, CatalogError, CatalogSettings, Redirect, Surface};
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::{ClientConfig, Context};

/// Everything a server-facing command needs.
pub struct Connection {
    pub context: String,
    pub api: Arc<HttpCatalog>,
    pub session: Arc<Session>,
    pub settings: CatalogSettings,
}

impl Connection {
    pub fn open(config: &ClientConfig, settings: CatalogSettings) -> Result<Self> {
        let ctx = config.require_current()?;
        let rest = RestClient::with_timeout(server_url(ctx)?, settings.request_timeout())?;
        Ok(Self {
            context: ctx.name.clone(),
            api: Arc::new(HttpCatalog::new(rest)),
            session: Arc::new(Session::with_token(ctx.token.clone())),
            settings,
        })
    }
}

/// Server URL of `ctx`, or a hint on how to set one.
pub fn server_url(ctx: &Context) -> Result<String> {
    if ctx.server.trim().is_empty() {
        anyhow::bail!(
            "No server URL set for context \"{}\". Run `catalogctl context set {} --server <url>`.",
            ctx.name,
            ctx.name
        );
    }
    Ok(normalize_base_url(&ctx.server))
}

/// Print queued mutation notices to stderr.
pub fn drain_notices(rx: &mut mpsc::UnboundedReceiver<Notice>) {
    while let Ok(notice) = rx.try_recv() {
        match notice.level {
            NoticeLevel::Success => eprintln!("{}", notice.message),
            NoticeLevel::Failure => eprintln!("error: {}", notice.message),
        }
    }
}

/// Turn a catalog failure into a user-facing message. An expired session
/// also drops the stored token.
pub fn explain(err: anyhow::Error, config_path: &Path) -> anyhow::Error {
    let Some(catalog) = err.downcast_ref::<CatalogError>() else {
        return err;
    };
    match catalog.surface() {
        Surface::Redirect(Redirect::Login) => {
            if let Err(e) = login::forget_token(config_path) {
                warn!("failed to clear stored token: {}", e);
            }
            anyhow::anyhow!("{}: session expired, run `catalogctl login`", catalog)
        }
        Surface::Redirect(Redirect::Forbidden) => {
            anyhow::anyhow!("{}: access denied ({})", catalog, Redirect::Forbidden.path())
        }
        _ => anyhow::anyhow!("{} [{}]", catalog, catalog.error_code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_url_required() {
        let ctx = Context {
            name: "local".to_string(),
            server: " http://localhost:3001/ ".to_string(),
            token: String::new(),
        };
        assert_eq!(server_url(&ctx).unwrap(), "http://localhost:3001");

        let empty = Context {
            server: String::new(),
            ..ctx
        };
        assert!(server_url(&empty).is_err());
    }

    #[test]
    fn test_explain_forgets_expired_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = ClientConfig::default();
        config.upsert_context(Context {
            name: "a".to_string(),
            server: "http://localhost:3001".to_string(),
            token: "stale".to_string(),
        });
        config.current_context = "a".to_string();
        config.save(&path).unwrap();

        let err = explain(CatalogError::AuthExpired("HTTP 401".into()).into(), &path);
        assert!(err.to_string().contains("catalogctl login"));
        let back = ClientConfig::load(&path).unwrap();
        assert!(back.current().unwrap().token.is_empty());
    }

    #[test]
    fn test_explain_adds_error_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = explain(
            CatalogError::Request("timeout".into()).into(),
            &dir.path().join("config.toml"),
        );
        assert_eq!(err.to_string(), "timeout [REQUEST_FAILED]");

        let other = explain(anyhow::anyhow!("plain"), &dir.path().join("config.toml"));
        assert_eq!(other.to_string(), "plain");
    }
}
