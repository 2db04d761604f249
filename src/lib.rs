//! # Chat Gateway
//!
//! A minimal HTTP gateway between chat channels (web, Telegram, other bots)
//! and Yandex GPT.
//!
//! This library provides:
//! - An HTTP API that accepts a conversation and returns one generated reply
//! - An agent that performs a single upstream completion per request
//! - A tool registry for future function-calling support
//!
//! ## Flow
//!
//! 1. Validate the inbound `POST /api/chat` body
//! 2. Merge request overrides with the configured defaults
//! 3. Call the upstream completion endpoint once
//! 4. Map the completion (or the failure) onto the HTTP response
//!
//! ## Example
//!
//! ```rust,ignore
//! use chat_gateway::{agent::{Agent, ReplyOptions}, config::Config, llm::ChatMessage};
//! use std::sync::Arc;
//!
//! let config = Arc::new(Config::from_env()?);
//! let agent = Agent::new(config)?;
//! let reply = agent
//!     .generate_reply(&[ChatMessage::user("Привет!")], &ReplyOptions::default())
//!     .await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
