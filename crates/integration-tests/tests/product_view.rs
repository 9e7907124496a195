//! Product management view: form, access and the ingredient panel.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pitii_client::views::{IngredientPanel, ProductManagementView};
use pitii_client::{Access, ApiError, AppError, ProductStore};
use pitii_core::{ImageUpload, IngredientId};
use pitii_integration_tests::{CDN_BASE, Endpoint, MockBackend, capture_logs};

async fn staff_view(mock: &MockBackend) -> (ProductStore, ProductManagementView) {
    let store = ProductStore::new(mock.client());
    let view = ProductManagementView::new(&store, mock.staff().await);
    view.refresh().await.expect("refresh failed");
    (store, view)
}

fn png(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

// ============================================================================
// Access Tests
// ============================================================================

#[tokio::test]
async fn test_visitor_sees_menu_but_cannot_write() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);

    let store = ProductStore::new(mock.client());
    let mut view = ProductManagementView::new(&store, Access::Visitor);
    view.refresh().await.expect("refresh failed");

    assert!(!view.can_manage());
    assert_eq!(view.menu().await, vec![burger.clone()]);

    assert!(matches!(view.begin_edit(&burger), Err(AppError::Unauthorized(_))));

    view.form_mut().name = "Soda".to_owned();
    view.form_mut().price = "3".to_owned();
    assert!(matches!(view.submit().await, Err(AppError::Unauthorized(_))));
    // Rejected before the form is consumed.
    assert_eq!(view.form().name, "Soda");

    assert!(matches!(
        view.delete(burger.id).await,
        Err(AppError::Unauthorized(_))
    ));

    // Nothing but the menu fetch reached the backend.
    let writes: Vec<_> = mock
        .requests()
        .into_iter()
        .filter(|r| r.method != "GET")
        .collect();
    assert!(writes.is_empty());
}

#[tokio::test]
async fn test_staff_requests_carry_bearer_token() {
    let mock = MockBackend::start().await;
    mock.enforce_auth(true);
    let (_store, mut view) = staff_view(&mock).await;

    view.form_mut().name = "Soda".to_owned();
    view.form_mut().price = "3".to_owned();
    view.submit().await.expect("submit failed");

    let creates = mock.requests_to("POST", "/api/products");
    assert_eq!(creates.len(), 1);
    assert!(creates[0].bearer.is_some());
}

#[tokio::test]
async fn test_expired_session_acts_as_visitor() {
    let mock = MockBackend::start().await;
    mock.set_session_ttl(chrono::Duration::seconds(-1));
    let access = mock.staff().await;

    let (logs, _guard) = capture_logs();
    let store = ProductStore::new(mock.client());
    let mut view = ProductManagementView::new(&store, access);

    assert!(!view.can_manage());
    assert!(!view.can_manage());
    view.form_mut().name = "Soda".to_owned();
    view.form_mut().price = "3".to_owned();
    assert!(matches!(view.submit().await, Err(AppError::Unauthorized(_))));
    assert!(matches!(
        view.delete(pitii_core::ProductId::new(1)).await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(mock.requests_to("POST", "/api/products").is_empty());

    // Reported once when the view is built, not on every check.
    assert_eq!(logs.count("staff session expired"), 1);
}

// ============================================================================
// Form Tests
// ============================================================================

#[tokio::test]
async fn test_create_uploads_image_and_clears_form() {
    let mock = MockBackend::start().await;
    let (store, mut view) = staff_view(&mock).await;

    let form = view.form_mut();
    form.name = "Burger".to_owned();
    form.price = "12,50".to_owned();
    form.image = Some(png("burger.png"));

    let created = view.submit().await.expect("submit failed");

    assert!(view.form().is_clear());
    assert_eq!(store.snapshot().await, vec![created.clone()]);
    assert_eq!(
        created.image_url.as_deref(),
        Some(format!("{CDN_BASE}/burger.png").as_str())
    );

    let forms = mock.product_forms();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].fields["name"], "Burger");
    assert_eq!(forms[0].fields["price"], "12.50");
    assert!(!forms[0].fields.contains_key("imageUrl"));
    let image = forms[0].image.as_ref().unwrap();
    assert_eq!(image.file_name.as_deref(), Some("burger.png"));
    assert_eq!(image.content_type.as_deref(), Some("image/png"));
    assert_eq!(image.len, 4);
}

#[tokio::test]
async fn test_edit_without_new_image_forwards_stored_url() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", Some("https://cdn/burger.png"));
    let (store, mut view) = staff_view(&mock).await;

    view.begin_edit(&burger).unwrap();
    assert!(view.form().is_editing());
    assert_eq!(view.form().name, "Burger");
    assert_eq!(view.form().price, "10");

    view.form_mut().name = "Burger Deluxe".to_owned();
    let updated = view.submit().await.expect("submit failed");

    assert!(view.form().is_clear());
    assert_eq!(updated.id, burger.id);
    assert_eq!(updated.image_url.as_deref(), Some("https://cdn/burger.png"));
    assert_eq!(store.get(burger.id).await, Some(updated));

    let forms = mock.product_forms();
    assert_eq!(forms[0].fields["imageUrl"], "https://cdn/burger.png");
    assert!(forms[0].image.is_none());
}

#[tokio::test]
async fn test_edit_with_new_image_uploads_it() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", Some("https://cdn/burger.png"));
    let (_store, mut view) = staff_view(&mock).await;

    view.begin_edit(&burger).unwrap();
    view.form_mut().image = Some(png("burger-v2.png"));
    let updated = view.submit().await.expect("submit failed");

    assert_eq!(
        updated.image_url.as_deref(),
        Some(format!("{CDN_BASE}/burger-v2.png").as_str())
    );
    let forms = mock.product_forms();
    assert!(forms[0].image.is_some());
    assert!(!forms[0].fields.contains_key("imageUrl"));
}

#[tokio::test]
async fn test_invalid_price_clears_form_without_request() {
    let mock = MockBackend::start().await;
    let (store, mut view) = staff_view(&mock).await;

    view.form_mut().name = "Soda".to_owned();
    view.form_mut().price = "three".to_owned();

    let err = view.submit().await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(view.form().is_clear());
    assert!(mock.product_forms().is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_failed_submit_clears_form_and_keeps_menu() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let (store, mut view) = staff_view(&mock).await;
    mock.fail(Endpoint::UpdateProduct, 500, "boom");

    view.begin_edit(&burger).unwrap();
    view.form_mut().name = "Burger Deluxe".to_owned();
    let err = view.submit().await.unwrap_err();

    assert!(err.is_remote());
    assert!(view.form().is_clear());
    assert_eq!(store.snapshot().await, vec![burger]);
}

#[tokio::test]
async fn test_cancel_edit_resets_form() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let (_store, mut view) = staff_view(&mock).await;

    view.begin_edit(&burger).unwrap();
    view.cancel_edit();

    assert!(view.form().is_clear());
    assert!(mock.product_forms().is_empty());
}

#[tokio::test]
async fn test_staff_delete_removes_from_menu() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let soda = mock.seed_product("Soda", "3", None);
    let (store, view) = staff_view(&mock).await;

    view.delete(burger.id).await.expect("delete failed");

    assert_eq!(store.snapshot().await, vec![soda]);
}

// ============================================================================
// Ingredient Panel Tests
// ============================================================================

#[tokio::test]
async fn test_switching_products_shows_only_the_new_subject() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let fries = mock.seed_product("Fries", "6", None);
    mock.seed_ingredient(burger.id, "Bun");
    mock.seed_ingredient(burger.id, "Patty");
    let salt = mock.seed_ingredient(fries.id, "Salt");

    let store = ProductStore::new(mock.client());
    let mut view = ProductManagementView::new(&store, Access::Visitor);
    assert!(!view.panel().is_open());

    view.open_ingredients(burger.clone()).await.unwrap();
    assert_eq!(view.panel().ingredients().len(), 2);

    view.open_ingredients(fries.clone()).await.unwrap();
    assert_eq!(view.panel().subject(), Some(&fries));
    assert_eq!(view.panel().ingredients(), [salt]);

    view.close_ingredients();
    assert_eq!(*view.panel(), IngredientPanel::Closed);
}

#[tokio::test]
async fn test_fetch_failure_opens_empty_panel() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    mock.seed_ingredient(burger.id, "Bun");
    mock.fail(Endpoint::ListIngredients, 500, "boom");

    let store = ProductStore::new(mock.client());
    let mut view = ProductManagementView::new(&store, Access::Visitor);

    let err = view.open_ingredients(burger.clone()).await.unwrap_err();

    assert!(err.is_remote());
    assert!(view.panel().is_open());
    assert_eq!(view.panel().subject(), Some(&burger));
    assert!(view.panel().ingredients().is_empty());
}

#[tokio::test]
async fn test_add_ingredient_appends_echo_and_clears_draft() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let (_store, mut view) = staff_view(&mock).await;

    view.open_ingredients(burger.clone()).await.unwrap();
    view.set_ingredient_draft("  Cheddar ");
    let created = view.add_ingredient().await.expect("add failed");

    // The backend trims; the panel shows what it stored.
    assert_eq!(created.name, "Cheddar");
    assert_eq!(view.panel().ingredients(), [created]);
    let IngredientPanel::Open { draft, .. } = view.panel() else {
        panic!("panel should stay open");
    };
    assert!(draft.is_empty());
    assert_eq!(mock.ingredients(burger.id).len(), 1);
}

#[tokio::test]
async fn test_add_ingredient_failure_surfaces_server_body() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let (_store, mut view) = staff_view(&mock).await;
    mock.fail(
        Endpoint::CreateIngredient,
        422,
        r#"{"error":"Ingredient already exists"}"#,
    );

    view.open_ingredients(burger).await.unwrap();
    view.set_ingredient_draft("Bun");
    let err = view.add_ingredient().await.unwrap_err();

    let AppError::Api(ApiError::Api { status, message }) = &err else {
        panic!("expected a backend error, got {err:?}");
    };
    assert_eq!(*status, 422);
    assert!(message.contains("Ingredient already exists"));
    assert!(view.panel().ingredients().is_empty());
    let IngredientPanel::Open { draft, .. } = view.panel() else {
        panic!("panel should stay open");
    };
    assert_eq!(draft, "Bun");
}

#[tokio::test]
async fn test_add_ingredient_not_found_keeps_server_body() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let (_store, mut view) = staff_view(&mock).await;
    mock.fail(
        Endpoint::CreateIngredient,
        404,
        r#"{"error":"Product was archived"}"#,
    );

    view.open_ingredients(burger).await.unwrap();
    view.set_ingredient_draft("Bun");
    let (logs, _guard) = capture_logs();
    let err = view.add_ingredient().await.unwrap_err();

    let AppError::Api(ApiError::NotFound { message, .. }) = &err else {
        panic!("expected not found, got {err:?}");
    };
    assert!(message.contains("Product was archived"));
    assert!(err.to_string().contains("Product was archived"));
    assert_eq!(logs.count("Product was archived"), 1);
}

#[tokio::test]
async fn test_ingredient_writes_need_an_open_panel() {
    let mock = MockBackend::start().await;
    let (_store, mut view) = staff_view(&mock).await;

    assert!(matches!(
        view.add_ingredient().await,
        Err(AppError::NoSubject)
    ));
    assert!(matches!(
        view.remove_ingredient(IngredientId::new(1)).await,
        Err(AppError::NoSubject)
    ));
}

#[tokio::test]
async fn test_visitor_cannot_edit_ingredients() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let bun = mock.seed_ingredient(burger.id, "Bun");

    let store = ProductStore::new(mock.client());
    let mut view = ProductManagementView::new(&store, Access::Visitor);
    view.open_ingredients(burger.clone()).await.unwrap();

    view.set_ingredient_draft("Cheddar");
    assert!(matches!(
        view.add_ingredient().await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        view.remove_ingredient(bun.id).await,
        Err(AppError::Unauthorized(_))
    ));
    assert_eq!(view.panel().ingredients(), [bun]);
}

#[tokio::test]
async fn test_remove_ingredient_success() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let bun = mock.seed_ingredient(burger.id, "Bun");
    let patty = mock.seed_ingredient(burger.id, "Patty");
    let (_store, mut view) = staff_view(&mock).await;

    view.open_ingredients(burger.clone()).await.unwrap();
    view.remove_ingredient(bun.id).await.expect("remove failed");

    assert_eq!(view.panel().ingredients(), [patty.clone()]);
    assert_eq!(mock.ingredients(burger.id), vec![patty]);
}

#[tokio::test]
async fn test_remove_ingredient_drops_entry_even_when_backend_fails() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let bun = mock.seed_ingredient(burger.id, "Bun");
    let patty = mock.seed_ingredient(burger.id, "Patty");
    let (_store, mut view) = staff_view(&mock).await;
    mock.fail(Endpoint::DeleteIngredient, 500, "boom");

    view.open_ingredients(burger.clone()).await.unwrap();
    let err = view.remove_ingredient(bun.id).await.unwrap_err();

    assert!(err.is_remote());
    assert_eq!(view.panel().ingredients(), [patty]);
    // The backend still has it.
    assert_eq!(mock.ingredients(burger.id).len(), 2);
}

#[tokio::test]
async fn test_remove_ingredient_keeps_entry_without_response() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let bun = mock.seed_ingredient(burger.id, "Bun");

    let store = ProductStore::new(mock.client_with_timeout(Duration::from_millis(200)));
    let mut view = ProductManagementView::new(&store, mock.staff().await);
    view.open_ingredients(burger.clone()).await.unwrap();
    mock.delay(Endpoint::DeleteIngredient, Duration::from_secs(2));

    let err = view.remove_ingredient(bun.id).await.unwrap_err();

    let AppError::Api(api) = &err else {
        panic!("expected a transport error, got {err:?}");
    };
    assert!(matches!(api, ApiError::Http(_)));
    assert_eq!(api.status(), None);
    assert_eq!(view.panel().ingredients(), [bun]);
}

#[tokio::test]
async fn test_ingredient_edits_do_not_touch_menu() {
    let mock = MockBackend::start().await;
    let burger = mock.seed_product("Burger", "10", None);
    let (store, mut view) = staff_view(&mock).await;

    view.open_ingredients(burger.clone()).await.unwrap();
    view.set_ingredient_draft("Bun");
    view.add_ingredient().await.unwrap();

    assert_eq!(store.snapshot().await, vec![burger]);
}
