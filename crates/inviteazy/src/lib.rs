//! Inviteazy server: event invitations over interchangeable storage backends.
//!
//! The backend is chosen once at startup from `DB_TYPE` (see
//! [`storage::Storage`]). Read-heavy GET routes sit behind a response cache
//! (see [`cache::ResponseCache`]).

pub mod app;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod services;
pub mod state;
pub mod storage;
