//! Streamcast is the session engine of a live-video-streaming platform: it
//! tracks the correspondence between a stream record (owned by a user,
//! identified by a stream key) and a live ingest session (identified by a
//! broadcast id minted by the media server), and reconciles persisted state
//! against ground truth on the media server when end-of-broadcast
//! notifications go missing.

pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod models;
pub mod services;
pub mod views;
pub mod web;
