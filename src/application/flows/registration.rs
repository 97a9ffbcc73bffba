//! Registration wizard flow.
//!
//! Walks a learner through the eight-step profile wizard. Each answer is
//! persisted as a single field update before the cursor advances, so a
//! crash mid-wizard loses at most the prompt, never collected data. The
//! `edit_only` variant re-enters the wizard at one field and finalizes
//! immediately after it.

use std::sync::Arc;

use chrono::Utc;

use crate::application::templates;
use crate::domain::foundation::{DomainError, LineUserId};
use crate::domain::registration::{coerce_answer, step_index, ProfileField, REGISTRATION_STEPS};
use crate::domain::session::{Flow, Session};
use crate::ports::{OutboundMessage, SessionStore, UserRepository};

/// Handler for the registration wizard.
pub struct RegistrationFlow {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl RegistrationFlow {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }

    /// Starts the wizard from the top.
    ///
    /// An already-registered user gets an informational reply and no state
    /// change.
    pub async fn start(&self, user_id: &LineUserId) -> Result<Vec<OutboundMessage>, DomainError> {
        let user = self.users.get_or_create(user_id).await?;
        if user.is_registered {
            return Ok(vec![templates::already_registered(user.display_name())]);
        }

        self.sessions
            .put(
                user_id,
                Session::with_flow(Flow::Registering { step: 0, edit_only: false }, Utc::now()),
            )
            .await;

        Ok(vec![templates::registration_started(
            REGISTRATION_STEPS[0].prompt,
        )])
    }

    /// Re-enters the wizard at a single field for a registered user.
    pub async fn start_edit(
        &self,
        user_id: &LineUserId,
        field: ProfileField,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let registered = self
            .users
            .find(user_id)
            .await?
            .map(|user| user.is_registered)
            .unwrap_or(false);
        if !registered {
            return Ok(vec![templates::please_register()]);
        }

        let step = step_index(field);
        self.sessions
            .put(
                user_id,
                Session::with_flow(Flow::Registering { step, edit_only: true }, Utc::now()),
            )
            .await;

        Ok(vec![templates::registration_prompt(&REGISTRATION_STEPS[step])])
    }

    /// Consumes one answer and advances, finalizes, or completes an edit.
    pub async fn advance(
        &self,
        user_id: &LineUserId,
        answer: &str,
        step: usize,
        edit_only: bool,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let Some(current) = REGISTRATION_STEPS.get(step) else {
            // A session cursor outside the table means the record is stale
            // or corrupt; reset rather than guess.
            self.sessions.clear(user_id).await;
            return Ok(vec![templates::generic_error()]);
        };

        let value = coerce_answer(current.field, answer);
        self.users
            .set_profile_field(user_id, current.field, &value)
            .await?;

        if edit_only {
            self.sessions.clear(user_id).await;
            return Ok(vec![templates::profile_updated()]);
        }

        if step + 1 >= REGISTRATION_STEPS.len() {
            self.users.mark_registered(user_id).await?;
            let user = self.users.find(user_id).await?;
            self.sessions.clear(user_id).await;

            let name = user
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "ผู้เรียน".to_string());
            return Ok(vec![templates::registration_completed(&name)]);
        }

        self.sessions
            .put(
                user_id,
                Session::with_flow(
                    Flow::Registering { step: step + 1, edit_only: false },
                    Utc::now(),
                ),
            )
            .await;

        Ok(vec![templates::registration_prompt(
            &REGISTRATION_STEPS[step + 1],
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::flows::test_support::{MemorySessions, MemoryUsers};
    use crate::domain::user::ThaiLevel;

    fn flow(users: Arc<MemoryUsers>, sessions: Arc<MemorySessions>) -> RegistrationFlow {
        RegistrationFlow::new(users, sessions)
    }

    fn user_id() -> LineUserId {
        LineUserId::new("U-reg").unwrap()
    }

    #[tokio::test]
    async fn start_enters_step_zero() {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let flow = flow(users.clone(), sessions.clone());

        let messages = flow.start(&user_id()).await.unwrap();
        assert_eq!(messages.len(), 1);

        let session = sessions.current(&user_id()).await;
        assert_eq!(session.flow, Flow::Registering { step: 0, edit_only: false });
    }

    #[tokio::test]
    async fn registered_user_short_circuits() {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        users.seed_registered(&user_id()).await;
        let flow = flow(users.clone(), sessions.clone());

        flow.start(&user_id()).await.unwrap();

        // No state change: the session stays idle.
        assert!(sessions.current(&user_id()).await.is_idle());
    }

    #[tokio::test]
    async fn full_wizard_stores_answers_verbatim_and_normalizes_enums() {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let flow = flow(users.clone(), sessions.clone());
        let id = user_id();

        flow.start(&id).await.unwrap();

        let answers = [
            "王小明",
            "มะลิ",
            "6401234",
            "Mahidol University",
            "wang@example.com",
            "Chinese",
            "BEGINNER",
            "YES",
        ];
        for (step, answer) in answers.iter().enumerate() {
            flow.advance(&id, answer, step, false).await.unwrap();
        }

        let user = users.get(&id).await.unwrap();
        assert!(user.is_registered);
        assert_eq!(user.chinese_name.as_deref(), Some("王小明"));
        assert_eq!(user.thai_name.as_deref(), Some("มะลิ"));
        assert_eq!(user.student_id.as_deref(), Some("6401234"));
        assert_eq!(user.university.as_deref(), Some("Mahidol University"));
        assert_eq!(user.email.as_deref(), Some("wang@example.com"));
        assert_eq!(user.nationality.as_deref(), Some("Chinese"));
        assert_eq!(user.thai_level, ThaiLevel::Beginner);
        assert!(user.consent);

        // Flow completed: session cleared.
        assert!(sessions.current(&id).await.is_idle());
    }

    #[tokio::test]
    async fn out_of_set_level_substitutes_default_and_advances() {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let flow = flow(users.clone(), sessions.clone());
        let id = user_id();

        flow.start(&id).await.unwrap();
        let level_step = step_index(ProfileField::ThaiLevel);
        flow.advance(&id, "native speaker", level_step, false)
            .await
            .unwrap();

        let user = users.get(&id).await.unwrap();
        assert_eq!(user.thai_level, ThaiLevel::Intermediate);
        assert_eq!(
            sessions.current(&id).await.flow,
            Flow::Registering { step: level_step + 1, edit_only: false }
        );
    }

    #[tokio::test]
    async fn edit_mode_updates_one_field_and_finalizes() {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        users.seed_registered(&user_id()).await;
        let flow = flow(users.clone(), sessions.clone());
        let id = user_id();

        flow.start_edit(&id, ProfileField::Email).await.unwrap();
        let step = step_index(ProfileField::Email);
        assert_eq!(
            sessions.current(&id).await.flow,
            Flow::Registering { step, edit_only: true }
        );

        let messages = flow.advance(&id, "new@example.com", step, true).await.unwrap();
        assert_eq!(messages, vec![templates::profile_updated()]);

        let user = users.get(&id).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("new@example.com"));
        assert!(sessions.current(&id).await.is_idle());
    }

    #[tokio::test]
    async fn edit_requires_registration() {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let flow = flow(users.clone(), sessions.clone());

        let messages = flow
            .start_edit(&user_id(), ProfileField::Email)
            .await
            .unwrap();
        assert_eq!(messages, vec![templates::please_register()]);
        assert!(sessions.current(&user_id()).await.is_idle());
    }

    #[tokio::test]
    async fn stale_cursor_resets_the_session() {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let flow = flow(users.clone(), sessions.clone());
        let id = user_id();

        let messages = flow.advance(&id, "answer", 99, false).await.unwrap();
        assert_eq!(messages, vec![templates::generic_error()]);
    }
}
