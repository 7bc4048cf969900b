//! Homework Status Bot Library
//!
//! A Telegram bot that watches Yandex Practicum homework reviews.
//!
//! This crate provides the core functionality for:
//! - Checking that the required tokens are configured
//! - Fetching homework statuses from the Practicum API
//! - Validating the response and turning it into a status message
//! - Sending status changes to a Telegram chat on a fixed interval

pub mod config;
pub mod homework;
pub mod practicum;
pub mod scheduler;
pub mod telegram;

#[cfg(test)]
mod test_support;
