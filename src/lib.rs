//! pillseek
//!
//! Client-side orchestration for a pill identification backend. Two flows
//! form the core: submitting an image as an asynchronous analysis job
//! (upload, bounded polling, grouped result retrieval) and running a
//! filter search page by page into one growing result list. Presentation
//! concerns stay outside; this crate hands over ready-to-render result
//! collections, empty states and displayable errors.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
