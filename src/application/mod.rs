//! Application layer - the conversation controller and its flow handlers.

pub mod badges;
pub mod controller;
pub mod flows;
pub mod templates;

pub use badges::BadgeAwarder;
pub use controller::ConversationController;
