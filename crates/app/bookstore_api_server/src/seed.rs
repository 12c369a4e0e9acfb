//! Optional startup accounts.
//!
//! Registration never grants roles, so the first administrator has to come
//! from somewhere. Each pair of `SEED_*` variables creates one account (if it
//! does not exist yet) and grants it a role.

use bookstore_core::auth::service::AuthService;
use bookstore_core::auth::store::CredentialStore;
use bookstore_core::auth::{ADMINISTRATOR, AuthError, CUSTOMER};
use tracing::{info, warn};

/// One account to provision at startup.
#[derive(Clone)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
    pub role: &'static str,
}

/// Reads `SEED_ADMIN_USERNAME`/`SEED_ADMIN_PASSWORD` and
/// `SEED_CUSTOMER_USERNAME`/`SEED_CUSTOMER_PASSWORD`.
pub fn accounts_from_env() -> Vec<SeedAccount> {
    [
        ("SEED_ADMIN", ADMINISTRATOR),
        ("SEED_CUSTOMER", CUSTOMER),
    ]
    .into_iter()
    .filter_map(|(prefix, role)| {
        let username = std::env::var(format!("{prefix}_USERNAME")).ok()?;
        let password = std::env::var(format!("{prefix}_PASSWORD")).ok()?;
        Some(SeedAccount {
            username,
            password,
            role,
        })
    })
    .collect()
}

/// Create each account if missing and grant its role.
pub async fn seed_accounts(
    auth: &AuthService,
    store: &dyn CredentialStore,
    accounts: &[SeedAccount],
) -> Result<(), AuthError> {
    for account in accounts {
        let existing = store.find_by_username(&account.username).await?;
        let user = match existing {
            Some(user) => user,
            None => {
                auth.register(&account.username, &account.password).await?;
                store
                    .find_by_username(&account.username)
                    .await?
                    .ok_or(AuthError::MissingUser)?
            }
        };
        store.grant_role(&user.id, account.role).await?;
        info!(username = %user.username, role = account.role, "seeded account");
    }
    if accounts.is_empty() {
        warn!("no seed accounts configured; administrators must be granted out of band");
    }
    Ok(())
}
