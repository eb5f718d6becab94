//! # Reseller storefront bot
//! This crate hosts the chat side of the storefront. It is responsible for:
//! Receiving Telegram updates on a webhook.
//! Turning commands and button presses into calls on the reseller engine.
//! Replying in the chat the command came from, and escalating recharge requests to reviewers.
//!
//! ## Configuration
//! The bot is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/telegram/webhook`: The webhook route for receiving updates from Telegram.
pub mod bot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod expiry_worker;
pub mod helpers;
pub mod integrations;
pub mod replies;
pub mod routes;
pub mod server;
pub mod telegram;
pub mod transport;

#[cfg(test)]
mod endpoint_tests;
