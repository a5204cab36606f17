//! Account store queries.
//!
//! Every mutation refreshes `updated_at`. Expiry comparisons bind the current
//! time from Rust so stored and compared timestamps share sqlx's encoding.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::AuthError;
use super::password::hash_password;
use super::setup_token::{generate_setup_token, setup_token_expiry};
use crate::models::account::Account;

/// Email of the account created on first run.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@coursesite.local";

/// Well-known first-run password of the default admin. Change it after the
/// first login via `/change-password`.
pub const DEFAULT_ADMIN_PASSWORD: &str = "coursesite-admin";

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, is_admin, setup_token, \
     setup_token_expiry, is_setup, created_at, updated_at";

/// Create an invited account with a fresh setup token.
///
/// Fails with [`AuthError::Conflict`] when the email is already registered.
pub async fn create_account(
    pool: &SqlitePool,
    email: &str,
    is_admin: bool,
) -> Result<Account, AuthError> {
    let now = Utc::now();
    let token = generate_setup_token();
    let expiry = setup_token_expiry(now);

    let result = sqlx::query_as::<_, Account>(&format!(
        "INSERT INTO accounts \
         (email, is_admin, setup_token, setup_token_expiry, is_setup, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, FALSE, ?5, ?5) RETURNING {ACCOUNT_COLUMNS}"
    ))
    .bind(email)
    .bind(is_admin)
    .bind(&token)
    .bind(expiry)
    .bind(now)
    .fetch_one(pool)
    .await;

    match result {
        Ok(account) => Ok(account),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AuthError::Conflict(email.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Fetch an account by email (exact, case-sensitive match).
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Account>, AuthError> {
    let row = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch an account by ID.
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Account>, AuthError> {
    let row = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the account holding a non-expired setup token.
///
/// An expired token is indistinguishable from an unknown one.
pub async fn find_by_setup_token(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<Account>, AuthError> {
    let row = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts \
         WHERE setup_token = ?1 AND setup_token_expiry > ?2"
    ))
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// All accounts, newest first.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Account>, AuthError> {
    let rows = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replace an account's password hash.
pub async fn set_password(
    pool: &SqlitePool,
    account_id: i64,
    password_hash: &str,
) -> Result<(), AuthError> {
    let result =
        sqlx::query("UPDATE accounts SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(account_id)
            .execute(pool)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AuthError::NotFound(format!("account {account_id}")));
    }
    Ok(())
}

/// Consume a setup token: store the hash, mark the account set up and clear
/// the token, all in one conditional update.
///
/// Of several concurrent completions of the same token at most one succeeds;
/// the rest see [`AuthError::InvalidOrExpiredToken`].
pub async fn complete_setup(
    pool: &SqlitePool,
    token: &str,
    password_hash: &str,
) -> Result<(), AuthError> {
    let now = Utc::now();
    let result = sqlx::query(
        "UPDATE accounts \
         SET password_hash = ?1, is_setup = TRUE, setup_token = NULL, setup_token_expiry = NULL, \
             updated_at = ?2 \
         WHERE setup_token = ?3 AND setup_token_expiry > ?2",
    )
    .bind(password_hash)
    .bind(now)
    .bind(token)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::InvalidOrExpiredToken);
    }
    Ok(())
}

/// Issue a new setup token for a pending account, replacing any previous one
/// and restarting the 7-day window.
///
/// Accounts that completed setup are left untouched and yield
/// [`AuthError::AlreadySetUp`].
pub async fn regenerate_setup_token(
    pool: &SqlitePool,
    account_id: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let token = generate_setup_token();
    let result = sqlx::query(
        "UPDATE accounts SET setup_token = ?1, setup_token_expiry = ?2, updated_at = ?3 \
         WHERE id = ?4 AND is_setup = FALSE",
    )
    .bind(&token)
    .bind(setup_token_expiry(now))
    .bind(now)
    .bind(account_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return match find_by_id(pool, account_id).await? {
            Some(_) => Err(AuthError::AlreadySetUp(account_id)),
            None => Err(AuthError::NotFound(format!("account {account_id}"))),
        };
    }
    Ok(token)
}

/// Count all accounts.
pub async fn account_count(pool: &SqlitePool) -> Result<i64, AuthError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// First-run bootstrap: when the store is empty, create one admin account
/// that is already set up with [`DEFAULT_ADMIN_PASSWORD`].
///
/// Returns whether an account was created. Never fires once any account exists.
pub async fn bootstrap_default_admin(pool: &SqlitePool) -> Result<bool, AuthError> {
    if account_count(pool).await? > 0 {
        return Ok(false);
    }

    let now = Utc::now();
    let hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
    let result = sqlx::query(
        "INSERT INTO accounts (email, password_hash, is_admin, is_setup, created_at, updated_at) \
         SELECT ?1, ?2, TRUE, TRUE, ?3, ?3 WHERE NOT EXISTS (SELECT 1 FROM accounts)",
    )
    .bind(DEFAULT_ADMIN_EMAIL)
    .bind(&hash)
    .bind(now)
    .execute(pool)
    .await?;

    let created = result.rows_affected() == 1;
    if created {
        warn!(
            email = DEFAULT_ADMIN_EMAIL,
            "created default admin account with the documented first-run password; change it now"
        );
    } else {
        info!("account store populated concurrently; skipping default admin");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn created_account_awaits_setup() {
        let pool = connect_in_memory().await.unwrap();
        let account = create_account(&pool, "a@x.com", false).await.unwrap();

        assert!(account.id > 0);
        assert!(!account.is_setup);
        assert!(!account.is_admin);
        assert!(account.password_hash.is_none());
        assert_eq!(64, account.setup_token.as_deref().unwrap().len());
        assert!(account.setup_token_expiry.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let pool = connect_in_memory().await.unwrap();
        create_account(&pool, "a@x.com", false).await.unwrap();
        let err = create_account(&pool, "a@x.com", true).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(email) if email == "a@x.com"));
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let pool = connect_in_memory().await.unwrap();
        create_account(&pool, "a@x.com", false).await.unwrap();
        assert!(find_by_email(&pool, "a@x.com").await.unwrap().is_some());
        assert!(find_by_email(&pool, "A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_lookups_return_none() {
        let pool = connect_in_memory().await.unwrap();
        assert!(find_by_id(&pool, 42).await.unwrap().is_none());
        assert!(find_by_setup_token(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn complete_setup_clears_token_and_sets_hash() {
        let pool = connect_in_memory().await.unwrap();
        let account = create_account(&pool, "a@x.com", false).await.unwrap();
        let token = account.setup_token.clone().unwrap();

        let found = find_by_setup_token(&pool, &token).await.unwrap().unwrap();
        assert_eq!(account.id, found.id);

        let hash = hash_password("longpassword1").unwrap();
        complete_setup(&pool, &token, &hash).await.unwrap();

        let after = find_by_id(&pool, account.id).await.unwrap().unwrap();
        assert!(after.is_setup);
        assert!(after.setup_token.is_none());
        assert!(after.setup_token_expiry.is_none());
        assert!(verify_password("longpassword1", after.password_hash.as_deref().unwrap()).unwrap());
        assert!(after.updated_at >= account.updated_at);
    }

    #[tokio::test]
    async fn setup_token_works_only_once() {
        let pool = connect_in_memory().await.unwrap();
        let account = create_account(&pool, "a@x.com", false).await.unwrap();
        let token = account.setup_token.unwrap();
        let hash = hash_password("longpassword1").unwrap();

        complete_setup(&pool, &token, &hash).await.unwrap();
        let second = complete_setup(&pool, &token, &hash).await;
        assert!(matches!(second, Err(AuthError::InvalidOrExpiredToken)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_completions_succeed_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.db");
        let pool = crate::db::connect(path.to_str().unwrap(), 8).await.unwrap();
        crate::migrate::migrate(&pool).await.unwrap();
        let hash = hash_password("longpassword1").unwrap();

        for n in 0..4 {
            let email = format!("racer{n}@x.com");
            let account = create_account(&pool, &email, false).await.unwrap();
            let token = account.setup_token.unwrap();

            let racers: Vec<_> = (0..6)
                .map(|_| {
                    let pool = pool.clone();
                    let token = token.clone();
                    let hash = hash.clone();
                    tokio::spawn(async move { complete_setup(&pool, &token, &hash).await })
                })
                .collect();

            let mut wins = 0;
            for racer in racers {
                match racer.await.unwrap() {
                    Ok(()) => wins += 1,
                    Err(AuthError::InvalidOrExpiredToken) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
            assert_eq!(1, wins, "{email}");
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn expired_token_is_treated_as_unknown() {
        let pool = connect_in_memory().await.unwrap();
        let account = create_account(&pool, "a@x.com", false).await.unwrap();
        let token = account.setup_token.unwrap();

        sqlx::query("UPDATE accounts SET setup_token_expiry = ?1 WHERE id = ?2")
            .bind(Utc::now() - chrono::Duration::seconds(1))
            .bind(account.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(find_by_setup_token(&pool, &token).await.unwrap().is_none());
        let hash = hash_password("longpassword1").unwrap();
        assert!(matches!(
            complete_setup(&pool, &token, &hash).await,
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }

    #[tokio::test]
    async fn regenerate_replaces_previous_token() {
        let pool = connect_in_memory().await.unwrap();
        let account = create_account(&pool, "a@x.com", false).await.unwrap();
        let old = account.setup_token.unwrap();

        let new = regenerate_setup_token(&pool, account.id).await.unwrap();
        assert_ne!(old, new);
        assert!(find_by_setup_token(&pool, &old).await.unwrap().is_none());
        assert_eq!(
            account.id,
            find_by_setup_token(&pool, &new).await.unwrap().unwrap().id
        );
    }

    #[tokio::test]
    async fn regenerate_refuses_accounts_that_completed_setup() {
        let pool = connect_in_memory().await.unwrap();
        assert!(bootstrap_default_admin(&pool).await.unwrap());
        let admin = find_by_email(&pool, DEFAULT_ADMIN_EMAIL)
            .await
            .unwrap()
            .unwrap();

        let result = regenerate_setup_token(&pool, admin.id).await;
        assert!(matches!(result, Err(AuthError::AlreadySetUp(id)) if id == admin.id));

        let after = find_by_id(&pool, admin.id).await.unwrap().unwrap();
        assert!(after.is_setup);
        assert!(after.setup_token.is_none());
        assert!(after.setup_token_expiry.is_none());
        assert!(!(after.is_setup && after.setup_token.is_some()));
        assert_eq!(admin.password_hash, after.password_hash);
    }

    #[tokio::test]
    async fn regenerate_for_unknown_account_is_not_found() {
        let pool = connect_in_memory().await.unwrap();
        assert!(matches!(
            regenerate_setup_token(&pool, 99).await,
            Err(AuthError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn set_password_replaces_hash() {
        let pool = connect_in_memory().await.unwrap();
        bootstrap_default_admin(&pool).await.unwrap();
        let admin = find_by_email(&pool, DEFAULT_ADMIN_EMAIL).await.unwrap().unwrap();

        let hash = hash_password("brand-new-password").unwrap();
        set_password(&pool, admin.id, &hash).await.unwrap();

        let after = find_by_id(&pool, admin.id).await.unwrap().unwrap();
        assert_eq!(Some(hash), after.password_hash);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let pool = connect_in_memory().await.unwrap();
        create_account(&pool, "first@x.com", false).await.unwrap();
        create_account(&pool, "second@x.com", false).await.unwrap();
        create_account(&pool, "third@x.com", true).await.unwrap();

        let emails: Vec<String> = list_all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.email)
            .collect();
        assert_eq!(vec!["third@x.com", "second@x.com", "first@x.com"], emails);
    }

    #[tokio::test]
    async fn bootstrap_creates_exactly_one_admin_on_empty_store() {
        let pool = connect_in_memory().await.unwrap();
        assert!(bootstrap_default_admin(&pool).await.unwrap());
        assert!(!bootstrap_default_admin(&pool).await.unwrap());
        assert_eq!(1, account_count(&pool).await.unwrap());

        let admin = find_by_email(&pool, DEFAULT_ADMIN_EMAIL).await.unwrap().unwrap();
        assert!(admin.is_admin);
        assert!(admin.is_setup);
        assert!(admin.setup_token.is_none());
        assert!(
            verify_password(DEFAULT_ADMIN_PASSWORD, admin.password_hash.as_deref().unwrap())
                .unwrap()
        );
    }

    #[tokio::test]
    async fn bootstrap_skips_populated_store() {
        let pool = connect_in_memory().await.unwrap();
        create_account(&pool, "a@x.com", false).await.unwrap();
        assert!(!bootstrap_default_admin(&pool).await.unwrap());
        assert!(find_by_email(&pool, DEFAULT_ADMIN_EMAIL).await.unwrap().is_none());
    }
}
