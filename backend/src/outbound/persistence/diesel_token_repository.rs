//! PostgreSQL-backed `TokenRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TokenRepository, TokenRepositoryError};
use crate::domain::{TokenDigest, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewAuthTokenRow;
use super::pool::DbPool;
use super::schema::auth_tokens;

/// Diesel-backed token digest store.
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_token_error(error: &diesel::result::Error) -> TokenRepositoryError {
    map_diesel_error(
        error,
        TokenRepositoryError::query,
        TokenRepositoryError::connection,
    )
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn store(
        &self,
        digest: &TokenDigest,
        user_id: &UserId,
    ) -> Result<(), TokenRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TokenRepositoryError::connection))?;

        let row = NewAuthTokenRow {
            digest: digest.as_ref(),
            user_id: *user_id.as_uuid(),
        };

        // Digests of fresh random tokens do not collide; a repeat is idempotent.
        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .on_conflict(auth_tokens::digest)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_token_error(&err))
    }

    async fn find_user_id(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, TokenRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TokenRepositoryError::connection))?;

        auth_tokens::table
            .filter(auth_tokens::digest.eq(digest.as_ref()))
            .select(auth_tokens::user_id)
            .first::<uuid::Uuid>(&mut conn)
            .await
            .optional()
            .map(|found| found.map(UserId::from_uuid))
            .map_err(|err| map_token_error(&err))
    }
}
