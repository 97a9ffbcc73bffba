//! LINE Messaging API adapters.

mod client;

pub use client::LineMessagingClient;
