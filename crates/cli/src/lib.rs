//! Terminal front-end for the assistant: rendering and the chat session loop.
pub mod chat;
pub mod render;
