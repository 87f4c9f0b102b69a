//! Itinerary orchestration.
//!
//! Every operation is a straight line of awaits: load, prompt, call the
//! model, split, persist. Nothing is rolled back; an itinerary inserted
//! before a failed model call keeps an empty text until a later chat turn
//! fills it. Concurrent chat turns on one itinerary are last-write-wins.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::entities::{ChatMessage, ChatRole, ChatStore, Itinerary, ItineraryStore, SqliteStore};
use crate::error::ServerError;
use crate::llm::ModelGateway;
use crate::planner::days::split_into_days;
use crate::planner::prompt::{TripMeta, build_chat_prompt, build_initial_prompt};
use crate::planner::reply::{combine, split_reply};
use crate::schemas::itinerary::CreateItineraryRequest;

/// Assistant message stored when the first reply has no chat part.
pub const DEFAULT_CREATE_REPLY: &str =
    "Your itinerary is ready! Ask me if you want any changes.";
/// Assistant message stored when a chat-turn reply has no chat part.
pub const DEFAULT_CHAT_REPLY: &str = "Done.";

#[derive(Debug, Clone)]
pub struct CreatedItinerary {
    pub itinerary: Itinerary,
    pub combined_message: String,
}

#[derive(Debug)]
pub struct ItineraryService<S = SqliteStore> {
    store: Arc<S>,
    model: Arc<dyn ModelGateway>,
}

impl<S> Clone for ItineraryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            model: Arc::clone(&self.model),
        }
    }
}

impl<S> ItineraryService<S>
where
    S: ItineraryStore + ChatStore,
{
    pub fn new(store: Arc<S>, model: Arc<dyn ModelGateway>) -> Self {
        Self { store, model }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        req: CreateItineraryRequest,
    ) -> Result<CreatedItinerary, ServerError> {
        req.validate()?;
        let destination = req.destination.trim();
        let start_date = req.start_date.trim();
        let end_date = req.end_date.trim();
        let preferences = req.preferences.trim();
        check_date_order(start_date, end_date)?;

        let now = Utc::now();
        let itinerary = Itinerary {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            title: format!("Trip to {destination}"),
            destination: destination.to_owned(),
            start_date: start_date.to_owned(),
            end_date: end_date.to_owned(),
            preferences: preferences.to_owned(),
            itinerary_text: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_itinerary(itinerary.clone()).await?;
        info!(itinerary_id = %itinerary.id, user_id = %user.id, %destination, "itinerary created");

        let prompt = build_initial_prompt(destination, start_date, end_date, preferences);
        let reply = self.model.generate(&prompt).await?;
        let split = split_reply(&reply);
        if !split.has_itinerary() {
            warn!(itinerary_id = %itinerary.id, "initial reply carried no itinerary part");
        }

        let chat_reply = non_empty_or(&split.chat_reply, DEFAULT_CREATE_REPLY);
        let summary = request_summary(destination, start_date, end_date, preferences);
        self.store
            .append_turn(
                ChatMessage::new(&itinerary.id, ChatRole::User, summary),
                ChatMessage::new(&itinerary.id, ChatRole::Assistant, chat_reply),
            )
            .await?;
        self.store
            .update_itinerary_text(&itinerary.id, &user.id, &split.itinerary_text)
            .await?;

        let stored = self
            .store
            .get_itinerary(&itinerary.id, &user.id)
            .await?
            .ok_or_else(|| {
                ServerError::Internal(format!("itinerary {} vanished after insert", itinerary.id))
            })?;
        debug!(itinerary_id = %stored.id, text_len = stored.itinerary_text.len(), "initial itinerary stored");
        Ok(CreatedItinerary {
            combined_message: combine(chat_reply, &stored.itinerary_text),
            itinerary: stored,
        })
    }

    /// Run one chat turn and return the combined message. When the reply
    /// has no itinerary part the stored text is kept and echoed back.
    pub async fn chat(
        &self,
        user: &AuthUser,
        id: &str,
        message: &str,
    ) -> Result<String, ServerError> {
        if message.trim().is_empty() {
            return Err(ServerError::Validation("message is required".into()));
        }
        let itinerary = self.owned(user, id).await?;
        let history = self.store.list_messages(id, &user.id).await?;

        let meta = TripMeta {
            title: &itinerary.title,
            destination: &itinerary.destination,
            start_date: &itinerary.start_date,
            end_date: &itinerary.end_date,
            preferences: &itinerary.preferences,
        };
        let prompt = build_chat_prompt(&itinerary.itinerary_text, &history, message, &meta);
        debug!(itinerary_id = %id, history_len = history.len(), prompt_len = prompt.len(), "chat turn prompt built");

        let reply = self.model.generate(&prompt).await?;
        let split = split_reply(&reply);
        let chat_reply = non_empty_or(&split.chat_reply, DEFAULT_CHAT_REPLY);

        self.store
            .append_turn(
                ChatMessage::new(id, ChatRole::User, message),
                ChatMessage::new(id, ChatRole::Assistant, chat_reply),
            )
            .await?;

        let revised = split.has_itinerary();
        let effective = if revised {
            split.itinerary_text.as_str()
        } else {
            warn!(itinerary_id = %id, "reply carried no itinerary part; keeping stored text");
            itinerary.itinerary_text.as_str()
        };
        if !self.store.update_itinerary_text(id, &user.id, effective).await? {
            return Err(not_found(id));
        }

        info!(itinerary_id = %id, revised, "chat turn done");
        Ok(combine(chat_reply, effective))
    }

    pub async fn rename(&self, user: &AuthUser, id: &str, new_title: &str) -> Result<(), ServerError> {
        let title = new_title.trim();
        if title.is_empty() {
            return Err(ServerError::Validation("newTitle is required".into()));
        }
        if !self.store.rename_itinerary(id, &user.id, title).await? {
            return Err(not_found(id));
        }
        info!(itinerary_id = %id, %title, "itinerary renamed");
        Ok(())
    }

    pub async fn delete(&self, user: &AuthUser, id: &str) -> Result<(), ServerError> {
        if !self.store.delete_itinerary(id, &user.id).await? {
            return Err(not_found(id));
        }
        info!(itinerary_id = %id, user_id = %user.id, "itinerary deleted");
        Ok(())
    }

    pub async fn list(&self, user: &AuthUser) -> Result<Vec<Itinerary>, ServerError> {
        Ok(self.store.list_itineraries(&user.id).await?)
    }

    pub async fn state(&self, user: &AuthUser, id: &str) -> Result<Itinerary, ServerError> {
        self.owned(user, id).await
    }

    pub async fn history(&self, user: &AuthUser, id: &str) -> Result<Vec<ChatMessage>, ServerError> {
        Ok(self.store.list_messages(id, &user.id).await?)
    }

    pub async fn days(&self, user: &AuthUser, id: &str) -> Result<Vec<String>, ServerError> {
        let itinerary = self.owned(user, id).await?;
        Ok(split_into_days(&itinerary.itinerary_text)
            .map(str::to_owned)
            .collect())
    }

    async fn owned(&self, user: &AuthUser, id: &str) -> Result<Itinerary, ServerError> {
        self.store
            .get_itinerary(id, &user.id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &str) -> ServerError {
    ServerError::NotFound(format!("itinerary {id} not found"))
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// The user message recorded for the initial request.
fn request_summary(destination: &str, start_date: &str, end_date: &str, preferences: &str) -> String {
    let mut summary = format!("Plan a trip to {destination} from {start_date} to {end_date}.");
    if !preferences.is_empty() {
        summary.push_str(&format!(" Preferences: {preferences}"));
    }
    summary
}

/// Dates are free text; only reject a range when both ends are ISO dates.
fn check_date_order(start_date: &str, end_date: &str) -> Result<(), ServerError> {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    if let (Some(start), Some(end)) = (parse(start_date), parse(end_date)) {
        if end < start {
            return Err(ServerError::Validation(format!(
                "endDate {end_date} is before startDate {start_date}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::LlmError;

    /// Replays canned replies in order and records every prompt it sees.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn push_error(&self, err: LlmError) {
            self.replies.lock().unwrap().push_back(Err(err));
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::InvalidResponse("script exhausted".into())))
        }
    }

    pub(crate) fn user(id: &str) -> AuthUser {
        AuthUser {
            id: id.into(),
            email: None,
        }
    }

    pub(crate) fn paris() -> CreateItineraryRequest {
        CreateItineraryRequest {
            destination: "Paris".into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-01-03".into(),
            preferences: "museums".into(),
        }
    }

    async fn service(model: Arc<ScriptedModel>) -> (ItineraryService, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::connect("sqlite::memory:").await.unwrap());
        (ItineraryService::new(Arc::clone(&store), model), store)
    }

    #[tokio::test]
    async fn create_stores_itinerary_and_first_turn() {
        let model = Arc::new(ScriptedModel::new(&[
            "Sounds great!||||- Day 1 (2025-01-01): Arrive\n- Day 2: Explore",
        ]));
        let (svc, store) = service(model.clone()).await;

        let created = svc.create(&user("alice"), paris()).await.unwrap();
        assert_eq!(
            created.itinerary.itinerary_text,
            "- Day 1 (2025-01-01): Arrive\n- Day 2: Explore"
        );
        assert_eq!(created.itinerary.title, "Trip to Paris");
        assert_eq!(
            created.combined_message,
            "Sounds great!||||- Day 1 (2025-01-01): Arrive\n- Day 2: Explore"
        );

        let history = store.list_messages(&created.itinerary.id, "alice").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert!(history[0].content.contains("Paris"));
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[1].content, "Sounds great!");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("2025-01-01") && prompts[0].contains("2025-01-03"));
    }

    #[tokio::test]
    async fn create_without_delimiter_leaves_text_empty() {
        let model = Arc::new(ScriptedModel::new(&["I need more details first."]));
        let (svc, _) = service(model).await;

        let created = svc.create(&user("alice"), paris()).await.unwrap();
        assert_eq!(created.itinerary.itinerary_text, "");
        assert_eq!(created.combined_message, "I need more details first.||||");
    }

    #[tokio::test]
    async fn create_falls_back_to_default_confirmation() {
        let model = Arc::new(ScriptedModel::new(&["  ||||- Day 1: Arrive"]));
        let (svc, store) = service(model).await;

        let created = svc.create(&user("alice"), paris()).await.unwrap();
        let history = store.list_messages(&created.itinerary.id, "alice").await.unwrap();
        assert_eq!(history[1].content, DEFAULT_CREATE_REPLY);
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_before_any_write() {
        let model = Arc::new(ScriptedModel::new(&[]));
        let (svc, store) = service(model.clone()).await;

        let req = CreateItineraryRequest {
            end_date: String::new(),
            ..paris()
        };
        let err = svc.create(&user("alice"), req).await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
        assert!(store.list_itineraries("alice").await.unwrap().is_empty());
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_reversed_dates() {
        let (svc, _) = service(Arc::new(ScriptedModel::new(&[]))).await;
        let req = CreateItineraryRequest {
            start_date: "2025-01-05".into(),
            ..paris()
        };
        let err = svc.create(&user("alice"), req).await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
    }

    #[tokio::test]
    async fn create_keeps_row_when_model_fails() {
        let model = Arc::new(ScriptedModel::new(&[]));
        model.push_error(LlmError::Api {
            status: 500,
            message: "down".into(),
        });
        let (svc, store) = service(model).await;

        let err = svc.create(&user("alice"), paris()).await.unwrap_err();
        assert!(matches!(err, ServerError::Upstream(_)));

        let rows = store.list_itineraries("alice").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].itinerary_text, "");
    }

    #[tokio::test]
    async fn chat_turn_replaces_text_and_replays_history() {
        let model = Arc::new(ScriptedModel::new(&[
            "Here you go||||- Day 1: Louvre",
            "Swapped it||||- Day 1: Orsay",
        ]));
        let (svc, store) = service(model.clone()).await;
        let alice = user("alice");
        let id = svc.create(&alice, paris()).await.unwrap().itinerary.id;

        let combined = svc.chat(&alice, &id, "Swap the Louvre for Orsay").await.unwrap();
        assert_eq!(combined, "Swapped it||||- Day 1: Orsay");
        assert_eq!(svc.state(&alice, &id).await.unwrap().itinerary_text, "- Day 1: Orsay");

        let history = store.list_messages(&id, "alice").await.unwrap();
        let roles: Vec<ChatRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
        assert_eq!(history[2].content, "Swap the Louvre for Orsay");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[1].contains("- Day 1: Louvre"));
        assert!(prompts[1].contains("Assistant: Here you go"));
        assert!(prompts[1].contains("User: Swap the Louvre for Orsay"));
    }

    #[tokio::test]
    async fn chat_turn_without_itinerary_keeps_previous_text() {
        let model = Arc::new(ScriptedModel::new(&[
            "Here you go||||- Day 1: Louvre",
            "Ciao||||- Day 1: Colosseum",
            "Sorry, I did not understand.",
        ]));
        let (svc, store) = service(model).await;
        let alice = user("alice");
        let created = svc.create(&alice, paris()).await.unwrap();
        let id = created.itinerary.id;
        let rome = CreateItineraryRequest {
            destination: "Rome".into(),
            ..paris()
        };
        let rome_id = svc.create(&alice, rome).await.unwrap().itinerary.id;
        assert_eq!(svc.list(&alice).await.unwrap()[0].id, rome_id);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let combined = svc.chat(&alice, &id, "???").await.unwrap();
        assert_eq!(combined, "Sorry, I did not understand.||||- Day 1: Louvre");

        let state = svc.state(&alice, &id).await.unwrap();
        assert_eq!(state.itinerary_text, "- Day 1: Louvre");
        assert!(state.updated_at > created.itinerary.updated_at);
        assert_eq!(svc.list(&alice).await.unwrap()[0].id, id);
        assert_eq!(store.list_messages(&id, "alice").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn chat_turn_defaults_empty_reply_to_done() {
        let model = Arc::new(ScriptedModel::new(&["Hi||||- Day 1: A", "||||- Day 1: B"]));
        let (svc, store) = service(model).await;
        let alice = user("alice");
        let id = svc.create(&alice, paris()).await.unwrap().itinerary.id;

        let combined = svc.chat(&alice, &id, "change it").await.unwrap();
        assert_eq!(combined, "Done.||||- Day 1: B");
        let history = store.list_messages(&id, "alice").await.unwrap();
        assert_eq!(history[3].content, DEFAULT_CHAT_REPLY);
    }

    #[tokio::test]
    async fn chat_turn_on_foreign_itinerary_is_not_found() {
        let model = Arc::new(ScriptedModel::new(&["Hi||||- Day 1: A"]));
        let (svc, store) = service(model.clone()).await;
        let id = svc.create(&user("alice"), paris()).await.unwrap().itinerary.id;

        let err = svc.chat(&user("mallory"), &id, "delete day 1").await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        assert_eq!(model.prompts.lock().unwrap().len(), 1);
        assert_eq!(store.list_messages(&id, "alice").await.unwrap().len(), 2);
        assert_eq!(
            svc.state(&user("alice"), &id).await.unwrap().itinerary_text,
            "- Day 1: A"
        );
    }

    #[tokio::test]
    async fn chat_turn_requires_a_message() {
        let (svc, _) = service(Arc::new(ScriptedModel::new(&[]))).await;
        let err = svc.chat(&user("alice"), "any", "   ").await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
    }

    #[tokio::test]
    async fn rename_with_blank_title_keeps_title() {
        let model = Arc::new(ScriptedModel::new(&["Hi||||- Day 1: A"]));
        let (svc, _) = service(model).await;
        let alice = user("alice");
        let id = svc.create(&alice, paris()).await.unwrap().itinerary.id;

        let err = svc.rename(&alice, &id, "  ").await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
        assert_eq!(svc.state(&alice, &id).await.unwrap().title, "Trip to Paris");

        svc.rename(&alice, &id, " Winter in Paris ").await.unwrap();
        assert_eq!(svc.state(&alice, &id).await.unwrap().title, "Winter in Paris");

        let err = svc.rename(&user("bob"), &id, "Mine").await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_history_and_row() {
        let model = Arc::new(ScriptedModel::new(&["Hi||||- Day 1: A"]));
        let (svc, _) = service(model).await;
        let alice = user("alice");
        let id = svc.create(&alice, paris()).await.unwrap().itinerary.id;

        let err = svc.delete(&user("bob"), &id).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        svc.delete(&alice, &id).await.unwrap();
        assert!(svc.history(&alice, &id).await.unwrap().is_empty());
        assert!(matches!(
            svc.state(&alice, &id).await.unwrap_err(),
            ServerError::NotFound(_)
        ));
        assert!(matches!(
            svc.delete(&alice, &id).await.unwrap_err(),
            ServerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn days_segments_stored_text() {
        let model = Arc::new(ScriptedModel::new(&["Hi||||- Day 1: A\n- Day 2: B"]));
        let (svc, _) = service(model).await;
        let alice = user("alice");
        let id = svc.create(&alice, paris()).await.unwrap().itinerary.id;

        assert_eq!(svc.days(&alice, &id).await.unwrap(), vec!["- Day 1: A", "- Day 2: B"]);
    }

    #[test]
    fn date_order_only_checked_for_iso_dates() {
        assert!(check_date_order("2025-01-01", "2025-01-01").is_ok());
        assert!(check_date_order("next friday", "2025-01-01").is_ok());
        assert!(check_date_order("2025-02-01", "2025-01-01").is_err());
    }
}
