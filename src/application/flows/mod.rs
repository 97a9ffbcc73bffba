//! Flow handlers - one finite state machine per bounded interaction.
//!
//! Each handler owns the ports it needs and returns the outbound messages
//! for the triggering event; the controller delivers them and owns the
//! top-level dispatch.

pub mod chat;
pub mod feedback;
pub mod game;
pub mod practice;
pub mod profile;
pub mod registration;
pub mod submission;

pub use chat::ChatFlow;
pub use feedback::FeedbackFlow;
pub use game::GameFlow;
pub use practice::PracticeFlow;
pub use profile::ProfileFlow;
pub use registration::RegistrationFlow;
pub use submission::SubmissionFlow;
