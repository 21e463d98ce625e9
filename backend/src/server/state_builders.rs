//! Builders for the HTTP state: Diesel-backed when a pool is configured,
//! in-memory otherwise.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use backend::config::SuperuserSettings;
use backend::domain::ports::{
    CredentialHasher, ImageStore, RecipeRepository, TaxonomyRepository, TokenRepository,
    UserRepository,
};
use backend::domain::{
    AccountServiceImpl, Error, Registration, RecipeServiceImpl, TaxonomyServiceImpl,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::InMemoryStore;
use backend::outbound::persistence::{
    DieselRecipeRepository, DieselTaxonomyRepository, DieselTokenRepository,
    DieselUserRepository,
};
use backend::outbound::security::Argon2CredentialHasher;
use backend::outbound::storage::FilesystemImageStore;

use super::ServerConfig;

/// Adapters behind the three driving ports.
struct Adapters<U, T, X, R, H, S> {
    users: Arc<U>,
    tokens: Arc<T>,
    taxonomy: Arc<X>,
    recipes: Arc<R>,
    hasher: Arc<H>,
    images: Arc<S>,
}

impl<U, T, X, R, H, S> Adapters<U, T, X, R, H, S>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
    X: TaxonomyRepository + 'static,
    R: RecipeRepository + 'static,
    H: CredentialHasher + 'static,
    S: ImageStore + 'static,
{
    fn into_state(self) -> HttpState {
        let Self {
            users,
            tokens,
            taxonomy,
            recipes,
            hasher,
            images,
        } = self;
        HttpState::new(
            Arc::new(AccountServiceImpl::new(users, tokens, hasher)),
            Arc::new(TaxonomyServiceImpl::new(taxonomy.clone())),
            Arc::new(RecipeServiceImpl::new(recipes, taxonomy, images)),
        )
    }
}

/// Build the shared HTTP state from the configured adapters.
///
/// # Errors
/// Returns [`std::io::Error`] when the media directory cannot be opened.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let images = FilesystemImageStore::open(&config.media_root, config.media_url.clone())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let images = Arc::new(images);
    let hasher = Arc::new(Argon2CredentialHasher::new());

    let state = match &config.db_pool {
        Some(pool) => Adapters {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            tokens: Arc::new(DieselTokenRepository::new(pool.clone())),
            taxonomy: Arc::new(DieselTaxonomyRepository::new(pool.clone())),
            recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
            hasher,
            images,
        }
        .into_state(),
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            let store = Arc::new(InMemoryStore::new());
            Adapters {
                users: store.clone(),
                tokens: store.clone(),
                taxonomy: store.clone(),
                recipes: store,
                hasher,
                images,
            }
            .into_state()
        }
    };
    Ok(web::Data::new(state))
}

fn is_duplicate_email(err: &Error) -> bool {
    err.details()
        .and_then(|details| details.get("code"))
        .and_then(|code| code.as_str())
        == Some("duplicate_email")
}

/// Create the configured superuser unless the account already exists.
///
/// # Errors
/// Returns the domain error when the credentials are invalid or the
/// account store fails.
pub(crate) async fn ensure_superuser(
    state: &HttpState,
    superuser: SuperuserSettings<'_>,
) -> Result<(), Error> {
    let registration = Registration::try_from_parts(superuser.email, superuser.password, None)
        .map_err(|err| Error::invalid_request(format!("invalid superuser settings: {err}")))?;
    match state.accounts.create_superuser(registration).await {
        Ok(user) => {
            info!(user_id = %user.id(), "superuser created");
            Ok(())
        }
        Err(err) if is_duplicate_email(&err) => {
            info!("superuser already exists");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::domain::LoginCredentials;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const EMAIL: &str = "admin@example.com";
    const PASSWORD: &str = "admin-pass";

    #[fixture]
    fn media_dir() -> TempDir {
        tempfile::tempdir().expect("temp media dir")
    }

    fn in_memory_state(media_dir: &TempDir) -> web::Data<HttpState> {
        let config = ServerConfig::new("127.0.0.1:0", media_dir.path(), "/media/");
        build_http_state(&config).expect("state builds")
    }

    #[rstest]
    #[tokio::test]
    async fn missing_pool_selects_the_in_memory_store(media_dir: TempDir) {
        let state = in_memory_state(&media_dir);
        let registration =
            Registration::try_from_parts("cook@example.com", "secret", None).expect("valid");

        state
            .accounts
            .create_user(registration)
            .await
            .expect("in-memory accounts accept registrations");
    }

    #[rstest]
    #[tokio::test]
    async fn superuser_bootstrap_is_idempotent(media_dir: TempDir) {
        let state = in_memory_state(&media_dir);
        let settings = SuperuserSettings {
            email: EMAIL,
            password: PASSWORD,
        };

        ensure_superuser(&state, settings).await.expect("first run");
        ensure_superuser(&state, settings).await.expect("second run");

        let credentials = LoginCredentials::try_from_parts(EMAIL, PASSWORD).expect("shape");
        let user = state
            .accounts
            .authenticate(&credentials)
            .await
            .expect("authentication runs")
            .expect("superuser can log in");
        assert!(user.flags().is_superuser);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_superuser_email_is_reported(media_dir: TempDir) {
        let state = in_memory_state(&media_dir);
        let settings = SuperuserSettings {
            email: "not-an-email",
            password: PASSWORD,
        };

        let err = ensure_superuser(&state, settings)
            .await
            .expect_err("invalid email");
        assert!(err.message().contains("superuser"));
    }
}
