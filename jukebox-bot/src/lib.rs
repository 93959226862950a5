//! # Jukebox Bot
//!
//! Chat-driven music playback: users in a shared channel queue, skip, undo
//! and inspect a playlist that one audio backend plays in order.
//!
//! - [`playback`]: collection queue and the Stopped/Playing/Paused engine
//! - [`coordinator`]: backend events, polling and the startup comment check
//! - [`commands`]: chat command parsing and execution
//! - [`bot`]: wires everything together for one session

pub mod backend;
pub mod bot;
pub mod chat;
pub mod commands;
pub mod coordinator;
pub mod error;
pub mod playback;
pub mod render;
pub mod resolver;

pub use error::{Error, Result};
