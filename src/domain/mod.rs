//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click accounting event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves the short code and responds
//! 2. The cache click counter is incremented synchronously
//! 3. A [`click_event::ClickEvent`] is sent to a bounded channel
//! 4. [`click_worker::run_click_worker`] adds it to the stored counter with retries

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
