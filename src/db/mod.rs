use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Client, ClientPatch, NewClient, NewProspect, Prospect, ProspectPatch};

mod memory;

pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for prospects. `get`, `update` and `delete` report a missing
/// record as `None` / `false` rather than as an error.
#[async_trait]
pub trait ProspectStore: Send + Sync {
    async fn create_prospect(&self, input: &NewProspect) -> StoreResult<Prospect>;
    async fn list_prospects(&self) -> StoreResult<Vec<Prospect>>;
    async fn get_prospect(&self, id: Uuid) -> StoreResult<Option<Prospect>>;
    async fn update_prospect(
        &self,
        id: Uuid,
        patch: &ProspectPatch,
    ) -> StoreResult<Option<Prospect>>;
    async fn delete_prospect(&self, id: Uuid) -> StoreResult<bool>;
}

/// Storage for clients, same contract as [`ProspectStore`].
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create_client(&self, input: &NewClient) -> StoreResult<Client>;
    async fn list_clients(&self) -> StoreResult<Vec<Client>>;
    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>>;
    async fn update_client(&self, id: Uuid, patch: &ClientPatch) -> StoreResult<Option<Client>>;
    async fn delete_client(&self, id: Uuid) -> StoreResult<bool>;
}

const PROSPECT_COLUMNS: &str = "id, name, place, location, created_at, updated_at";

const CLIENT_COLUMNS: &str = "id, name, first_visit, next_visit, amount, phone, location, \
                              status, created_at, updated_at";

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(config.database_url()?)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!().run(self.get_pool()).await?;
        Ok(())
    }

    /// Wait for checked-out connections to return, then close the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ProspectStore for Database {
    async fn create_prospect(&self, input: &NewProspect) -> StoreResult<Prospect> {
        let prospect = sqlx::query_as::<_, Prospect>(&format!(
            "INSERT INTO prospects (name, place, location) VALUES ($1, $2, $3) \
             RETURNING {PROSPECT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.place)
        .bind(&input.location)
        .fetch_one(self.get_pool())
        .await?;

        Ok(prospect)
    }

    async fn list_prospects(&self) -> StoreResult<Vec<Prospect>> {
        let prospects = sqlx::query_as::<_, Prospect>(&format!(
            "SELECT {PROSPECT_COLUMNS} FROM prospects ORDER BY created_at ASC"
        ))
        .fetch_all(self.get_pool())
        .await?;

        Ok(prospects)
    }

    async fn get_prospect(&self, id: Uuid) -> StoreResult<Option<Prospect>> {
        let prospect = sqlx::query_as::<_, Prospect>(&format!(
            "SELECT {PROSPECT_COLUMNS} FROM prospects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(prospect)
    }

    async fn update_prospect(
        &self,
        id: Uuid,
        patch: &ProspectPatch,
    ) -> StoreResult<Option<Prospect>> {
        let prospect = sqlx::query_as::<_, Prospect>(&format!(
            r#"
            UPDATE prospects
            SET name = COALESCE($2, name),
                place = COALESCE($3, place),
                location = CASE WHEN $4 THEN $5 ELSE location END,
                updated_at = now()
            WHERE id = $1
            RETURNING {PROSPECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.place)
        .bind(patch.location.is_some())
        .bind(patch.location.clone().flatten())
        .fetch_optional(self.get_pool())
        .await?;

        Ok(prospect)
    }

    async fn delete_prospect(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM prospects WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ClientStore for Database {
    async fn create_client(&self, input: &NewClient) -> StoreResult<Client> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (name, first_visit, next_visit, amount, phone, location, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.first_visit)
        .bind(input.next_visit)
        .bind(input.amount)
        .bind(&input.phone)
        .bind(&input.location)
        .bind(input.status.as_str())
        .fetch_one(self.get_pool())
        .await?;

        Ok(client)
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at ASC"
        ))
        .fetch_all(self.get_pool())
        .await?;

        Ok(clients)
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(client)
    }

    async fn update_client(&self, id: Uuid, patch: &ClientPatch) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET name = COALESCE($2, name),
                first_visit = CASE WHEN $3 THEN $4 ELSE first_visit END,
                next_visit = CASE WHEN $5 THEN $6 ELSE next_visit END,
                amount = CASE WHEN $7 THEN $8 ELSE amount END,
                phone = CASE WHEN $9 THEN $10 ELSE phone END,
                location = CASE WHEN $11 THEN $12 ELSE location END,
                status = COALESCE($13, status),
                updated_at = now()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(patch.first_visit.is_some())
        .bind(patch.first_visit.flatten())
        .bind(patch.next_visit.is_some())
        .bind(patch.next_visit.flatten())
        .bind(patch.amount.is_some())
        .bind(patch.amount.flatten())
        .bind(patch.phone.is_some())
        .bind(patch.phone.clone().flatten())
        .bind(patch.location.is_some())
        .bind(patch.location.clone().flatten())
        .bind(patch.status.map(|status| status.as_str()))
        .fetch_optional(self.get_pool())
        .await?;

        Ok(client)
    }

    async fn delete_client(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Connect to the database and bring the schema up to date
pub async fn init(config: &Config) -> anyhow::Result<Database> {
    let db = Database::new(config).await?;

    db.migrate().await?;

    Ok(db)
}
