use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::errors::WorkerError;
use crate::models::config_model::{ConfigRecord, ConfigType, CreateConfigRequest};

/// Filas que se crean si no existen: (tipo, data, enabled)
const DEFAULT_CONFIGS: &[(ConfigType, &str, bool)] = &[
    (ConfigType::TelegramBot, "", true),
    (ConfigType::TradingViewScreenshot, "1D", true),
    (ConfigType::TradingViewCredentials, "", false),
];

#[derive(Clone, Debug)]
pub struct ConfigService {
    db_pool: Pool<Sqlite>,
}

impl ConfigService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ConfigService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Fallo en migraciones")?;
        Ok(())
    }

    /// Inserta las configs por defecto que falten. No toca las existentes.
    pub async fn seed_defaults(&self) -> Result<()> {
        for (config_type, data, enabled) in DEFAULT_CONFIGS {
            if self.get(*config_type).await?.is_none() {
                log::info!("(seed_defaults) Creando config por defecto '{}'", config_type);
                self.insert(config_type.as_str(), data, *enabled).await?;
            }
        }
        Ok(())
    }

    /// Primera fila con ese tipo, si existe
    pub async fn get(&self, config_type: ConfigType) -> Result<Option<ConfigRecord>> {
        self.fetch_first(config_type)
            .await
            .with_context(|| format!("Error leyendo config '{}'", config_type))
    }

    /// Como `get`, pero la ausencia es `ConfigurationMissing`
    pub async fn require(&self, config_type: ConfigType) -> Result<ConfigRecord, WorkerError> {
        self.fetch_first(config_type)
            .await?
            .ok_or(WorkerError::ConfigurationMissing(config_type))
    }

    /// Devuelve la fila existente o la crea con `data` y enabled=true
    pub async fn find_or_create(
        &self,
        config_type: ConfigType,
        data: &str,
    ) -> Result<ConfigRecord> {
        if let Some(existing) = self.get(config_type).await? {
            return Ok(existing);
        }
        self.insert(config_type.as_str(), data, true).await
    }

    /// Sobrescribe `data` de todas las filas de ese tipo. Devuelve filas afectadas.
    pub async fn update_data(&self, config_type: ConfigType, data: &str) -> Result<u64> {
        let now = Utc::now().to_rfc3339();
        let res = sqlx::query(
            r#"
            UPDATE configs
            SET data = ?1,
                updated_at = ?2
            WHERE type = ?3
            "#,
        )
        .bind(data)
        .bind(now)
        .bind(config_type.as_str())
        .execute(&self.db_pool)
        .await
        .with_context(|| format!("Error actualizando config '{}'", config_type))?;

        Ok(res.rows_affected())
    }

    pub async fn set_enabled(&self, config_type: ConfigType, enabled: bool) -> Result<u64> {
        let now = Utc::now().to_rfc3339();
        let res = sqlx::query(r#"UPDATE configs SET enabled = ?1, updated_at = ?2 WHERE type = ?3"#)
            .bind(enabled)
            .bind(now)
            .bind(config_type.as_str())
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("Error cambiando enabled de '{}'", config_type))?;

        Ok(res.rows_affected())
    }

    pub async fn list(&self) -> Result<Vec<ConfigRecord>> {
        let rows = sqlx::query_as::<_, ConfigRecord>(
            r#"
            SELECT id, type, data, enabled, created_at, updated_at
            FROM configs
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Error listando configs")?;

        Ok(rows)
    }

    /// Crea la fila tal cual llega del endpoint admin (sin validar `type`)
    pub async fn create(&self, req: CreateConfigRequest) -> Result<ConfigRecord> {
        self.insert(&req.config_type, &req.data, req.enabled.unwrap_or(true))
            .await
    }

    async fn fetch_first(&self, config_type: ConfigType) -> sqlx::Result<Option<ConfigRecord>> {
        sqlx::query_as::<_, ConfigRecord>(
            r#"
            SELECT id, type, data, enabled, created_at, updated_at
            FROM configs
            WHERE type = ?1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(config_type.as_str())
        .fetch_optional(&self.db_pool)
        .await
    }

    async fn insert(&self, config_type: &str, data: &str, enabled: bool) -> Result<ConfigRecord> {
        let now = Utc::now().to_rfc3339();
        let id = sqlx::query(
            r#"
            INSERT INTO configs (type, data, enabled, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(config_type)
        .bind(data)
        .bind(enabled)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar config")?
        .last_insert_rowid();

        Ok(ConfigRecord {
            id,
            config_type: config_type.to_string(),
            data: data.to_string(),
            enabled,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}
