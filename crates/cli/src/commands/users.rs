//! Registration and user commands.

use secrecy::SecretString;
use tracing::info;

use pitii_client::views::{RegistrationForm, RegistrationView};

use super::{CommandError, Context};

/// Register a new user.
pub async fn register(
    ctx: &Context,
    name: String,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    let form = RegistrationForm::new(name, email, SecretString::from(password));
    let mut view = RegistrationView::new(ctx.users(), form);

    let registered = view.submit().await?;
    info!("{}", registered.acknowledgement);
    info!(
        "  #{} {} <{}>",
        registered.user.id, registered.user.name, registered.user.email
    );
    Ok(())
}

/// List registered users.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let access = ctx.staff_access().await?;
    let users = ctx.users().with_client(access.client_for(ctx.users().client()));
    users.load().await?;

    let all = users.snapshot().await;
    info!("{} users:", all.len());
    for user in &all {
        info!("  #{:<4} {:<24} {}", user.id, user.name, user.email);
    }
    Ok(())
}
