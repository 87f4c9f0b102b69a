use std::future::Future;

use chrono::Utc;

use crate::entities::{Itinerary, SqliteStore, format_ts, parse_ts};

pub trait ItineraryStore: Send + Sync + 'static {
    fn insert_itinerary(
        &self,
        itinerary: Itinerary,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// `None` when the row is missing or owned by someone else.
    fn get_itinerary(
        &self,
        id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Itinerary>, sqlx::Error>> + Send;

    /// Most recently updated first.
    fn list_itineraries(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Itinerary>, sqlx::Error>> + Send;

    /// Replace `itinerary_text` and refresh `updated_at`. Returns `false`
    /// when no owned row matched.
    fn update_itinerary_text(
        &self,
        id: &str,
        user_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn rename_itinerary(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Remove the chat history, then the itinerary row, in one transaction.
    fn delete_itinerary(
        &self,
        id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

type ItineraryRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, destination, start_date, end_date, \
     preferences, itinerary_text, created_at, updated_at FROM itineraries";

fn from_row(row: ItineraryRow) -> Itinerary {
    let (
        id,
        user_id,
        title,
        destination,
        start_date,
        end_date,
        preferences,
        itinerary_text,
        created_at,
        updated_at,
    ) = row;
    Itinerary {
        id,
        user_id,
        title,
        destination,
        start_date,
        end_date,
        preferences,
        itinerary_text,
        created_at: parse_ts(&created_at, "created_at"),
        updated_at: parse_ts(&updated_at, "updated_at"),
    }
}

impl ItineraryStore for SqliteStore {
    async fn insert_itinerary(&self, itinerary: Itinerary) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO itineraries (id, user_id, title, destination, start_date, end_date, \
             preferences, itinerary_text, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&itinerary.id)
        .bind(&itinerary.user_id)
        .bind(&itinerary.title)
        .bind(&itinerary.destination)
        .bind(&itinerary.start_date)
        .bind(&itinerary.end_date)
        .bind(&itinerary.preferences)
        .bind(&itinerary.itinerary_text)
        .bind(format_ts(&itinerary.created_at))
        .bind(format_ts(&itinerary.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_itinerary(&self, id: &str, user_id: &str) -> Result<Option<Itinerary>, sqlx::Error> {
        let row: Option<ItineraryRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1 AND user_id = ?2"))
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(from_row))
    }

    async fn list_itineraries(&self, user_id: &str) -> Result<Vec<Itinerary>, sqlx::Error> {
        let rows: Vec<ItineraryRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY updated_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn update_itinerary_text(
        &self,
        id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE itineraries SET itinerary_text = ?1, updated_at = ?2 \
             WHERE id = ?3 AND user_id = ?4",
        )
        .bind(text)
        .bind(format_ts(&Utc::now()))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn rename_itinerary(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE itineraries SET title = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
        )
        .bind(title)
        .bind(format_ts(&Utc::now()))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_itinerary(&self, id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(String,)> =
            sqlx::query_as("SELECT id FROM itineraries WHERE id = ?1 AND user_id = ?2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        let chats = sqlx::query("DELETE FROM chat_messages WHERE itinerary_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM itineraries WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(
            itinerary_id = %id,
            chat_rows = chats.rows_affected(),
            "itinerary deleted"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::{ChatMessage, ChatRole, ChatStore};

    fn sample(id: &str, user_id: &str) -> Itinerary {
        let now = Utc::now();
        Itinerary {
            id: id.into(),
            user_id: user_id.into(),
            title: "Trip to Paris".into(),
            destination: "Paris".into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-01-03".into(),
            preferences: "museums".into(),
            itinerary_text: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn get_is_scoped_to_owner() {
        let store = store().await;
        store.insert_itinerary(sample("it-1", "alice")).await.unwrap();

        let found = store.get_itinerary("it-1", "alice").await.unwrap();
        assert_eq!(found.map(|i| i.destination), Some("Paris".to_string()));
        assert!(store.get_itinerary("it-1", "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_by_most_recent_update() {
        let store = store().await;
        store.insert_itinerary(sample("older", "alice")).await.unwrap();
        store.insert_itinerary(sample("newer", "alice")).await.unwrap();
        store.insert_itinerary(sample("other", "bob")).await.unwrap();

        store
            .update_itinerary_text("older", "alice", "- Day 1: Louvre")
            .await
            .unwrap();

        let ids: Vec<String> = store
            .list_itineraries("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["older", "newer"]);
    }

    #[tokio::test]
    async fn updates_ignore_foreign_rows() {
        let store = store().await;
        store.insert_itinerary(sample("it-1", "alice")).await.unwrap();

        assert!(!store.update_itinerary_text("it-1", "bob", "hijack").await.unwrap());
        assert!(!store.rename_itinerary("it-1", "bob", "Mine now").await.unwrap());

        let row = store.get_itinerary("it-1", "alice").await.unwrap().unwrap();
        assert_eq!(row.itinerary_text, "");
        assert_eq!(row.title, "Trip to Paris");
    }

    #[tokio::test]
    async fn delete_removes_chats_then_row() {
        let store = store().await;
        store.insert_itinerary(sample("it-1", "alice")).await.unwrap();
        store
            .append_turn(
                ChatMessage::new("it-1", ChatRole::User, "hi"),
                ChatMessage::new("it-1", ChatRole::Assistant, "hello"),
            )
            .await
            .unwrap();

        assert!(!store.delete_itinerary("it-1", "bob").await.unwrap());
        assert_eq!(store.list_messages("it-1", "alice").await.unwrap().len(), 2);

        assert!(store.delete_itinerary("it-1", "alice").await.unwrap());
        assert!(store.get_itinerary("it-1", "alice").await.unwrap().is_none());
        let (left,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE itinerary_id = 'it-1'")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn parent_row_cannot_be_removed_before_children() {
        let store = store().await;
        store.insert_itinerary(sample("it-1", "alice")).await.unwrap();
        store
            .append_turn(
                ChatMessage::new("it-1", ChatRole::User, "hi"),
                ChatMessage::new("it-1", ChatRole::Assistant, "hello"),
            )
            .await
            .unwrap();

        let result = sqlx::query("DELETE FROM itineraries WHERE id = 'it-1'")
            .execute(&store.pool)
            .await;
        assert!(result.is_err(), "foreign key should block orphaning chat rows");
    }
}
