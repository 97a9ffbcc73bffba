//! ProficienThAI - Conversational Thai Writing Coach
//!
//! This crate implements a LINE-webhook chatbot that guides non-native
//! learners (mainly Chinese students) through registration, weekly writing
//! submissions, draft feedback, and vocabulary/grammar mini-games, with
//! LLM-backed rubric grading and a points/level/badge progression system.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
