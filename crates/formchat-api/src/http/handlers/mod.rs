//! HTTP request handlers for the REST API and the frame shell.

pub mod chatbot;
pub mod embed;
pub mod stats;
pub mod widget;
