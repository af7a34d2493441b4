use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::message_model::{EnqueueMessageRequest, MessageStatus, QueueMessage};

#[derive(Clone, Debug)]
pub struct MessageService {
    db_pool: Pool<Sqlite>,
}

impl MessageService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        MessageService { db_pool }
    }

    /// Mensajes con ese status, en orden de inserción
    pub async fn find_by_status(&self, status: MessageStatus) -> Result<Vec<QueueMessage>> {
        let rows = sqlx::query_as::<_, QueueMessage>(
            r#"
            SELECT id, data, timeframe, channels, status, log, created_at, updated_at
            FROM messages
            WHERE status = ?1
            ORDER BY id
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.db_pool)
        .await
        .context("Error leyendo mensajes por status")?;

        Ok(rows)
    }

    pub async fn list(&self, status: Option<MessageStatus>) -> Result<Vec<QueueMessage>> {
        match status {
            Some(s) => self.find_by_status(s).await,
            None => sqlx::query_as::<_, QueueMessage>(
                r#"
                SELECT id, data, timeframe, channels, status, log, created_at, updated_at
                FROM messages
                ORDER BY id
                "#,
            )
            .fetch_all(&self.db_pool)
            .await
            .context("Error listando mensajes"),
        }
    }

    pub async fn get(&self, id: i64) -> Result<QueueMessage> {
        sqlx::query_as::<_, QueueMessage>(
            r#"
            SELECT id, data, timeframe, channels, status, log, created_at, updated_at
            FROM messages
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await
        .context("No se encontró mensaje con ese id")
    }

    /// Crea un mensaje en estado "pending"
    pub async fn enqueue(&self, req: EnqueueMessageRequest) -> Result<QueueMessage> {
        let now = Utc::now().to_rfc3339();
        let id = sqlx::query(
            r#"
            INSERT INTO messages (data, timeframe, channels, status, log, created_at, updated_at)
            VALUES (?1, ?2, ?3, 'pending', NULL, ?4, ?4)
            "#,
        )
        .bind(&req.data)
        .bind(&req.timeframe)
        .bind(&req.channels)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar mensaje")?
        .last_insert_rowid();

        self.get(id).await
    }

    /// Escribe status + log
    pub async fn update_status(&self, id: i64, status: MessageStatus, log: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE messages
            SET status = ?1,
                log = ?2,
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(status.as_str())
        .bind(log)
        .bind(now)
        .bind(id)
        .execute(&self.db_pool)
        .await
        .context("Error actualizando status del mensaje")?;

        Ok(())
    }

    /// Escribe solo el log, el status queda como está
    pub async fn update_log(&self, id: i64, log: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(r#"UPDATE messages SET log = ?1, updated_at = ?2 WHERE id = ?3"#)
            .bind(log)
            .bind(now)
            .bind(id)
            .execute(&self.db_pool)
            .await
            .context("Error actualizando log del mensaje")?;

        Ok(())
    }
}
