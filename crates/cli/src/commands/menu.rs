//! Menu and product commands.

use std::path::PathBuf;

use tracing::info;

use pitii_client::Access;
use pitii_client::views::ProductManagementView;
use pitii_core::ProductId;

use super::{CommandError, Context, read_image};

/// Print the menu.
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let view = ProductManagementView::new(ctx.products(), Access::Visitor);
    view.refresh().await?;

    let menu = view.menu().await;
    if menu.is_empty() {
        info!("The menu is empty");
        return Ok(());
    }

    info!("Menu ({} items):", menu.len());
    for product in &menu {
        info!(
            "  #{:<4} {:<30} R${}  {}",
            product.id,
            product.name,
            product.price,
            product.image_url.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Add a product.
pub async fn add(
    ctx: &Context,
    name: String,
    price: String,
    image: Option<PathBuf>,
) -> Result<(), CommandError> {
    let image = image.as_deref().map(read_image).transpose()?;
    let mut view = ProductManagementView::new(ctx.products(), ctx.staff_access().await?);

    let form = view.form_mut();
    form.name = name;
    form.price = price;
    form.image = image;

    let created = view.submit().await?;
    info!("Added #{} {} (R${})", created.id, created.name, created.price);
    Ok(())
}

/// Edit a product, keeping any field that was not given.
pub async fn edit(
    ctx: &Context,
    id: ProductId,
    name: Option<String>,
    price: Option<String>,
    image: Option<PathBuf>,
) -> Result<(), CommandError> {
    let image = image.as_deref().map(read_image).transpose()?;
    let mut view = ProductManagementView::new(ctx.products(), ctx.staff_access().await?);
    view.refresh().await?;

    let product = view
        .menu()
        .await
        .into_iter()
        .find(|p| p.id == id)
        .ok_or(CommandError::UnknownProduct(id))?;
    view.begin_edit(&product)?;

    let form = view.form_mut();
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(price) = price {
        form.price = price;
    }
    form.image = image;

    let updated = view.submit().await?;
    info!("Updated #{} {} (R${})", updated.id, updated.name, updated.price);
    Ok(())
}

/// Delete a product.
pub async fn delete(ctx: &Context, id: ProductId) -> Result<(), CommandError> {
    let view = ProductManagementView::new(ctx.products(), ctx.staff_access().await?);
    view.delete(id).await?;
    info!("Deleted product #{id}");
    Ok(())
}
