//! The conversation controller.
//!
//! One inbound webhook event in, one dispatch decision out: read the
//! user's session, route to the flow that owns the current state (or
//! classify an intent from idle), and deliver whatever the flow replied.
//!
//! # Error policy
//!
//! Nothing here is fatal to the process. Flow errors are logged and
//! answered with a generic apology; delivery failures are logged and
//! dropped. One event's failure never affects its siblings in the batch.
//!
//! # Known limitation
//!
//! The grade -> persist -> award points -> clear session sequence inside
//! the feedback and submission flows is not transactional. A crash
//! mid-sequence can award points without a recorded submission, or record
//! one without its points. Accepted for this domain; see DESIGN.md.

use std::sync::Arc;

use crate::application::badges::BadgeAwarder;
use crate::application::flows::{
    ChatFlow, FeedbackFlow, GameFlow, PracticeFlow, ProfileFlow, RegistrationFlow, SubmissionFlow,
};
use crate::application::templates;
use crate::domain::foundation::{DomainError, LineUserId};
use crate::domain::games::GameKind;
use crate::domain::intent::{classify, MenuIntent};
use crate::domain::session::Flow;
use crate::domain::webhook::{
    parse_postback, EventSource, MessageContent, PostbackAction, WebhookEvent,
};
use crate::ports::{
    BadgeRepository, FeedbackRepository, MessagingGateway, OutboundMessage, QuestionBank,
    SessionStore, SubmissionRepository, TaskRepository, UserRepository, WritingEvaluator,
};

/// Drives the per-user conversation state machine.
pub struct ConversationController {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn MessagingGateway>,
    registration: RegistrationFlow,
    feedback: FeedbackFlow,
    submission: SubmissionFlow,
    game: GameFlow,
    practice: PracticeFlow,
    profile: ProfileFlow,
    chat: ChatFlow,
}

impl ConversationController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        feedback: Arc<dyn FeedbackRepository>,
        questions: Arc<dyn QuestionBank>,
        badges: Arc<dyn BadgeRepository>,
        evaluator: Arc<dyn WritingEvaluator>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        let awarder = Arc::new(BadgeAwarder::new(
            users.clone(),
            badges,
            gateway.clone(),
        ));

        Self {
            registration: RegistrationFlow::new(users.clone(), sessions.clone()),
            feedback: FeedbackFlow::new(
                users.clone(),
                tasks.clone(),
                feedback,
                evaluator.clone(),
                sessions.clone(),
                awarder.clone(),
            ),
            submission: SubmissionFlow::new(
                users.clone(),
                tasks.clone(),
                submissions.clone(),
                evaluator.clone(),
                sessions.clone(),
                awarder,
            ),
            game: GameFlow::new(users.clone(), questions.clone(), sessions.clone()),
            practice: PracticeFlow::new(users.clone(), questions),
            profile: ProfileFlow::new(users.clone(), tasks, submissions),
            chat: ChatFlow::new(users.clone(), evaluator),
            sessions,
            users,
            gateway,
        }
    }

    /// Handles one webhook event end to end.
    ///
    /// Every outcome terminates in a reply or a logged no-op; this method
    /// never returns an error to the transport layer.
    pub async fn dispatch(&self, event: WebhookEvent) {
        match event {
            WebhookEvent::Message {
                reply_token,
                source,
                message: MessageContent::Text { text },
            } => {
                let Some(user_id) = Self::user_of(&source) else {
                    return;
                };
                let result = self.handle_text(&user_id, &text).await;
                self.deliver(&reply_token, &user_id, result).await;
            }
            WebhookEvent::Message { source, .. } => {
                tracing::debug!(user = ?source.user_id, "ignoring non-text message");
            }
            WebhookEvent::Postback {
                reply_token,
                source,
                postback,
            } => {
                let Some(user_id) = Self::user_of(&source) else {
                    return;
                };
                match parse_postback(&postback.data) {
                    Some(action) => {
                        let result = self.handle_postback(&user_id, action).await;
                        self.deliver(&reply_token, &user_id, result).await;
                    }
                    None => {
                        tracing::warn!(user = %user_id, data = %postback.data, "unrecognized postback");
                    }
                }
            }
            WebhookEvent::Follow { reply_token, source } => {
                let Some(user_id) = Self::user_of(&source) else {
                    return;
                };
                let result = self.handle_follow(&user_id).await;
                self.deliver(&reply_token, &user_id, result).await;
            }
            WebhookEvent::Unfollow { source } => {
                tracing::info!(user = ?source.user_id, "user unfollowed");
            }
            WebhookEvent::Unknown => {
                tracing::debug!("skipping unknown event type");
            }
        }
    }

    fn user_of(source: &EventSource) -> Option<LineUserId> {
        let raw = source.user_id.as_deref()?;
        LineUserId::new(raw).ok()
    }

    /// Sends the flow's reply, downgrading flow errors to a generic
    /// apology so the learner always hears back.
    async fn deliver(
        &self,
        reply_token: &str,
        user_id: &LineUserId,
        result: Result<Vec<OutboundMessage>, DomainError>,
    ) {
        let messages = match result {
            Ok(messages) if messages.is_empty() => return,
            Ok(messages) => messages,
            Err(err) => {
                tracing::error!(user = %user_id, error = %err, "flow handler failed");
                vec![templates::generic_error()]
            }
        };

        if let Err(err) = self.gateway.reply(reply_token, messages).await {
            tracing::error!(user = %user_id, error = %err, "failed to deliver reply");
        }
    }

    /// The text transition table: an active flow consumes the message
    /// first; otherwise the intent classifier routes it.
    async fn handle_text(
        &self,
        user_id: &LineUserId,
        text: &str,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let session = self.sessions.get(user_id).await;

        match session.flow {
            Flow::Registering { step, edit_only } => {
                self.registration.advance(user_id, text, step, edit_only).await
            }
            Flow::AwaitingFeedbackDraft => self.feedback.submit_draft(user_id, text).await,
            Flow::AwaitingSubmission { task_id } => {
                self.submission.submit(user_id, text, task_id).await
            }
            Flow::PlayingGame(play) => self.game.answer(user_id, text, play).await,
            Flow::Idle => self.handle_idle_text(user_id, text).await,
        }
    }

    async fn handle_idle_text(
        &self,
        user_id: &LineUserId,
        text: &str,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        match classify(text) {
            Some(MenuIntent::Register) => self.registration.start(user_id).await,
            Some(MenuIntent::Feedback) => self.feedback.start(user_id).await,
            Some(MenuIntent::Submit) => self.submission.start(user_id).await,
            Some(MenuIntent::Practice) => self.practice.start(user_id).await,
            Some(MenuIntent::Dashboard) => self.profile.show_dashboard(user_id).await,
            Some(MenuIntent::Profile) => self.profile.show_profile(user_id).await,
            Some(MenuIntent::GameMenu) => Ok(vec![templates::game_menu()]),
            Some(MenuIntent::VocabGame) => self.game.start(user_id, GameKind::Vocabulary).await,
            Some(MenuIntent::FillBlankGame) => self.game.start(user_id, GameKind::FillBlank).await,
            Some(MenuIntent::WordOrderGame) => self.game.start(user_id, GameKind::WordOrder).await,
            Some(MenuIntent::SentenceGame) => {
                self.game.start(user_id, GameKind::SentenceConstruction).await
            }
            None => self.chat.respond(user_id, text).await,
        }
    }

    /// Postback actions from the rich menu and flex buttons.
    async fn handle_postback(
        &self,
        user_id: &LineUserId,
        action: PostbackAction,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        match action {
            PostbackAction::Register => self.registration.start(user_id).await,
            PostbackAction::FeedbackMode => self.feedback.start(user_id).await,
            PostbackAction::SubmitMode => self.submission.start(user_id).await,
            PostbackAction::Practice => self.practice.start(user_id).await,
            PostbackAction::MyProfile => self.profile.show_profile(user_id).await,
            PostbackAction::EditProfile { field } => {
                self.registration.start_edit(user_id, field).await
            }
        }
    }

    /// First contact: make sure the user record exists and greet.
    async fn handle_follow(
        &self,
        user_id: &LineUserId,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        self.users.get_or_create(user_id).await?;
        Ok(vec![templates::welcome_flex()])
    }
}
