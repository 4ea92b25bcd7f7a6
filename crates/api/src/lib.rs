//! HTTP API: operational surface for the AI request queue.

pub mod app;
