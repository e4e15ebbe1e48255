//! Product listing and CRUD commands, driven through the list controller.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use catalog_admin::model::{ImageUpload, ProductDraft, ProductPatch};
use catalog_admin::{LoadOutcome, Notice, ProductListController, ProductListState};
use catalog_core::PageWindow;
use tokio::sync::mpsc;

use super::{drain_notices, Connection};

fn controller(conn: &Connection) -> (Arc<ProductListController>, mpsc::UnboundedReceiver<Notice>) {
    ProductListController::new(
        conn.api.clone(),
        Arc::clone(&conn.session),
        conn.settings.clone(),
    )
}

/// Load `page` of the listing, filtered by `search` when given.
async fn open_page(ctl: &ProductListController, page: u32, search: Option<String>) -> Result<()> {
    let searched = match search {
        Some(term) => ctl.submit_search(term).await?,
        None => LoadOutcome::Unchanged,
    };
    if page > 1 {
        ctl.set_page(page).await?;
    } else if searched == LoadOutcome::Unchanged {
        ctl.refresh().await?;
    }
    Ok(())
}

pub async fn list(conn: &Connection, page: u32, search: Option<String>, output_json: bool) -> Result<()> {
    let (ctl, _notices) = controller(conn);
    open_page(&ctl, page, search).await?;
    let state = ctl.snapshot();

    if output_json {
        let body = serde_json::json!({
            "page": state.current_page,
            "itemsPerPage": state.items_per_page,
            "totalItems": state.total_items,
            "totalExact": state.total_exact,
            "products": state.products,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print_table(&state);
    Ok(())
}

fn print_table(state: &ProductListState) {
    if state.products.is_empty() {
        println!("No products found.");
        return;
    }

    println!("{:6} {:32} {:>6} {:>10} {:20}", "ID", "NAME", "QTY", "PRICE", "MANUFACTURER");
    for p in &state.products {
        println!(
            "{:6} {:32} {:>6} {:>10} {:20}",
            p.id,
            p.name,
            p.quantity,
            p.price.to_string(),
            state.manufacturer_name(p.manufacturer_id)
        );
    }

    let pagination = state.pagination();
    let approx = if state.total_exact { "" } else { "at least " };
    println!();
    println!(
        "Page {} of {} ({}{} items)",
        state.current_page,
        pagination.last_page(),
        approx,
        state.total_items
    );
    println!(
        "{}",
        render_pager(&state.page_window(), state.current_page, pagination.total_pages())
    );
}

/// One-line pager, e.g. `‹ 1 … 4 5 [6] 7 8 … 12 ›`.
fn render_pager(window: &PageWindow, current: u32, total_pages: u32) -> String {
    let mut parts = Vec::new();
    if window.has_prev {
        parts.push("‹".to_string());
    }
    if window.first_shortcut {
        parts.push("1".to_string());
    }
    if window.leading_ellipsis {
        parts.push("…".to_string());
    }
    for &page in &window.pages {
        if page == current {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if window.trailing_ellipsis {
        parts.push("…".to_string());
    }
    if window.last_shortcut {
        parts.push(total_pages.to_string());
    }
    if window.has_next {
        parts.push("›".to_string());
    }
    parts.join(" ")
}

pub async fn get(conn: &Connection, id: u64, output_json: bool) -> Result<()> {
    let (ctl, _notices) = controller(conn);
    ctl.refresh().await?;
    let product = ctl.product(id).await?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&product)?);
        return Ok(());
    }

    let state = ctl.snapshot();
    println!("ID:           {}", product.id);
    println!("Name:         {}", product.name);
    println!("Quantity:     {}", product.quantity);
    println!("Price:        {}", product.price);
    println!("Manufacturer: {}", state.manufacturer_name(product.manufacturer_id));
    if !product.photo_url.is_empty() {
        println!("Photo:        {}", product.photo_url);
    }
    Ok(())
}

pub async fn create(conn: &Connection, draft: ProductDraft, page: u32) -> Result<()> {
    let (ctl, mut notices) = controller(conn);
    open_page(&ctl, page, None).await?;

    let result = ctl.create_product(draft).await;
    drain_notices(&mut notices);
    let outcome = result?;

    println!("Created product {}.", outcome.product.id);
    if let Some(page) = outcome.navigated_to {
        println!("It is listed on page {}.", page);
    }
    Ok(())
}

/// Field overrides for `product update`; unset fields keep their value.
#[derive(Debug, Default)]
pub struct UpdateArgs {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<String>,
    pub manufacturer: Option<u64>,
    pub image: Option<String>,
}

pub async fn update(conn: &Connection, id: u64, args: UpdateArgs) -> Result<()> {
    let (ctl, mut notices) = controller(conn);
    ctl.refresh().await?;
    let current = ctl.product(id).await?;

    let mut patch = ProductPatch::from_product(&current);
    if let Some(name) = args.name {
        patch.name = name;
    }
    if let Some(quantity) = args.quantity {
        patch.quantity = quantity;
    }
    if let Some(price) = args.price {
        patch.price = price;
    }
    if let Some(manufacturer) = args.manufacturer {
        patch.manufacturer_id = manufacturer;
    }
    let image = args.image.as_deref().map(read_image).transpose()?;

    let result = ctl.update_product(id, patch, image).await;
    drain_notices(&mut notices);
    let product = result?;
    println!("Updated product {}: {} ({}).", product.id, product.name, product.price);
    Ok(())
}

fn read_image(path: &str) -> Result<ImageUpload> {
    let path = Path::new(path);
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("Not a file: {}", path.display()))?;
    Ok(ImageUpload {
        content_type: content_type_for(&file_name).to_string(),
        file_name,
        bytes,
    })
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Delete from `page`; when that empties the page, follow the redirect.
pub async fn delete(conn: &Connection, id: u64, page: u32) -> Result<()> {
    let (ctl, mut notices) = controller(conn);
    open_page(&ctl, page, None).await?;

    let result = ctl.delete_product(id).await;
    drain_notices(&mut notices);
    let redirect = result?;

    if redirect.should_redirect {
        println!(
            "Page {} is now empty; showing page {}.",
            ctl.snapshot().current_page,
            redirect.new_page
        );
        ctl.set_page(redirect.new_page).await?;
        print_table(&ctl.snapshot());
    }
    Ok(())
}
