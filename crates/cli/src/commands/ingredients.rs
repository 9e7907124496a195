//! Ingredient commands.

use tracing::{info, warn};

use pitii_client::Access;
use pitii_client::views::ProductManagementView;
use pitii_core::{IngredientId, Product, ProductId};

use super::{CommandError, Context};

/// Load the menu and find product `id`.
async fn select(
    ctx: &Context,
    access: Access,
    id: ProductId,
) -> Result<(ProductManagementView, Product), CommandError> {
    let view = ProductManagementView::new(ctx.products(), access);
    view.refresh().await?;
    let product = view
        .menu()
        .await
        .into_iter()
        .find(|p| p.id == id)
        .ok_or(CommandError::UnknownProduct(id))?;
    Ok((view, product))
}

/// Open the panel for a write. A failed listing is not fatal: the panel is
/// open either way and the write targets the product, not the list.
async fn open_for_edit(
    ctx: &Context,
    id: ProductId,
) -> Result<ProductManagementView, CommandError> {
    let (mut view, product) = select(ctx, ctx.staff_access().await?, id).await?;
    if let Err(e) = view.open_ingredients(product).await {
        warn!(error = %e, product = %id, "Could not load current ingredients, continuing");
    }
    Ok(view)
}

/// Print a product's ingredients.
pub async fn list(ctx: &Context, product: ProductId) -> Result<(), CommandError> {
    let (mut view, subject) = select(ctx, Access::Visitor, product).await?;
    view.open_ingredients(subject).await?;
    let panel = view.panel();

    if let Some(subject) = panel.subject() {
        info!("Ingredients of {}:", subject.name);
    }
    if panel.ingredients().is_empty() {
        info!("  (none)");
    }
    for ingredient in panel.ingredients() {
        info!("  #{:<4} {}", ingredient.id, ingredient.name);
    }
    Ok(())
}

/// Add an ingredient to a product.
pub async fn add(ctx: &Context, product: ProductId, name: String) -> Result<(), CommandError> {
    let mut view = open_for_edit(ctx, product).await?;
    view.set_ingredient_draft(name);
    let created = view.add_ingredient().await?;
    info!("Added ingredient #{} {}", created.id, created.name);
    Ok(())
}

/// Remove an ingredient from a product.
pub async fn remove(
    ctx: &Context,
    product: ProductId,
    ingredient: IngredientId,
) -> Result<(), CommandError> {
    let mut view = open_for_edit(ctx, product).await?;
    view.remove_ingredient(ingredient).await?;
    info!("Removed ingredient #{ingredient}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pitii_integration_tests::{Endpoint, MockBackend};

    use super::*;

    #[tokio::test]
    async fn test_add_proceeds_when_listing_fails() {
        let mock = MockBackend::start().await;
        let burger = mock.seed_product("Burger", "10", None);
        mock.fail(Endpoint::ListIngredients, 500, "boom");
        let ctx = Context::new(mock.config()).unwrap();

        add(&ctx, burger.id, "Cheddar".to_owned()).await.unwrap();

        let stored = mock.ingredients(burger.id);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Cheddar");
    }

    #[tokio::test]
    async fn test_remove_proceeds_when_listing_fails() {
        let mock = MockBackend::start().await;
        let burger = mock.seed_product("Burger", "10", None);
        let bun = mock.seed_ingredient(burger.id, "Bun");
        mock.fail(Endpoint::ListIngredients, 500, "boom");
        let ctx = Context::new(mock.config()).unwrap();

        remove(&ctx, burger.id, bun.id).await.unwrap();

        assert!(mock.ingredients(burger.id).is_empty());
    }

    #[tokio::test]
    async fn test_list_fails_when_listing_fails() {
        let mock = MockBackend::start().await;
        let burger = mock.seed_product("Burger", "10", None);
        mock.fail(Endpoint::ListIngredients, 500, "boom");
        let ctx = Context::new(mock.config()).unwrap();

        assert!(list(&ctx, burger.id).await.is_err());
    }
}
