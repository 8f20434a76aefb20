//! Profiles Repository

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Error, FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::profiles::models::{Profile, RestaurantUuid, Role, UserUuid};

const GET_PROFILE_SQL: &str = include_str!("sql/get_profile.sql");

#[derive(Debug, Clone)]
pub struct PgProfilesRepository {
    pool: PgPool,
}

impl PgProfilesRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for Profile {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        let role = role.parse::<Role>().map_err(|e| Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            role,
            restaurant: row
                .try_get::<Option<Uuid>, _>("restaurant_uuid")?
                .map(RestaurantUuid::from_uuid),
        })
    }
}

#[async_trait]
impl ProfilesRepository for PgProfilesRepository {
    async fn get_profile(&self, user: UserUuid) -> Result<Option<Profile>, Error> {
        query_as::<Postgres, Profile>(GET_PROFILE_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }
}

#[automock]
#[async_trait]
pub trait ProfilesRepository: Send + Sync {
    /// Resolve the profile (and therefore the role) of a user.
    async fn get_profile(&self, user: UserUuid) -> Result<Option<Profile>, Error>;
}
