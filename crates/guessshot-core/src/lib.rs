//! Core types, traits, and engines for the GuessShot quiz service.
//!
//! Nothing here touches HTTP or a database. Storage, question files and the
//! chat transport sit behind [`store::QuizStore`],
//! [`catalog::QuestionCatalog`] and [`transport::ChatTransport`].

// Trait futures declare `Send` explicitly; impls use plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod answer;
pub mod badge;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod profile;
pub mod question;
pub mod ranking;
pub mod store;
pub mod transport;

pub use error::{Error, Result};
