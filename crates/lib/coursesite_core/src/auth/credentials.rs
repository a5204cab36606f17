//! Email + password validation.

use sqlx::SqlitePool;

use super::AuthError;
use super::accounts::find_by_email;
use super::password::verify_password;
use crate::models::account::Account;

/// Check an email/password pair, returning the account on success.
///
/// Unknown email, an account that has not finished setup, and a wrong
/// password all fail with the same [`AuthError::CredentialError`].
pub async fn validate_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<Account, AuthError> {
    let account = find_by_email(pool, email)
        .await?
        .ok_or(AuthError::CredentialError)?;

    if !account.is_setup {
        return Err(AuthError::CredentialError);
    }

    let Some(hash) = account.password_hash.as_deref() else {
        return Err(AuthError::CredentialError);
    };

    if !verify_password(password, hash)? {
        return Err(AuthError::CredentialError);
    }

    Ok(account)
}
