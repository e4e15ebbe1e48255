//! `catalogctl breadcrumbs`: print one random category chain.

use anyhow::Result;
use catalog_admin::service::breadcrumb;
use catalog_core::CatalogError;

use super::Connection;

pub async fn show(conn: &Connection) -> Result<()> {
    let mut rng = rand::thread_rng();
    match breadcrumb::fetch_chain(conn.api.as_ref(), &conn.session, &mut rng).await {
        Ok(chain) => println!("{}", chain),
        Err(CatalogError::EmptyResult(message)) => println!("{}", message),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
