use std::future::Future;

use crate::entities::{ChatMessage, ChatRole, SqliteStore, format_ts, parse_ts};

pub trait ChatStore: Send + Sync + 'static {
    /// Persist one chat turn: the user message immediately followed by the
    /// assistant reply, atomically.
    fn append_turn(
        &self,
        user: ChatMessage,
        assistant: ChatMessage,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// History in creation order. Empty when the itinerary is missing or not
    /// owned by `user_id`.
    fn list_messages(
        &self,
        itinerary_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;
}

impl ChatStore for SqliteStore {
    async fn append_turn(&self, user: ChatMessage, assistant: ChatMessage) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for msg in [&user, &assistant] {
            sqlx::query(
                "INSERT INTO chat_messages (id, itinerary_id, role, content, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&msg.id)
            .bind(&msg.itinerary_id)
            .bind(msg.role.to_string())
            .bind(&msg.content)
            .bind(format_ts(&msg.created_at))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_messages(
        &self,
        itinerary_id: &str,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT m.id, m.itinerary_id, m.role, m.content, m.created_at \
             FROM chat_messages m \
             JOIN itineraries i ON i.id = m.itinerary_id \
             WHERE m.itinerary_id = ?1 AND i.user_id = ?2 \
             ORDER BY m.created_at ASC, m.rowid ASC",
        )
        .bind(itinerary_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, itinerary_id, role, content, created_at)| {
                let role = role
                    .parse::<ChatRole>()
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                Ok(ChatMessage {
                    id,
                    itinerary_id,
                    role,
                    content,
                    created_at: parse_ts(&created_at, "created_at"),
                })
            })
            .collect()
    }
}
