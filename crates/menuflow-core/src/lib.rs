//! Conversation flow engine for Menuflow.
//!
//! Owns the validated flow definition, the per-user session store, and the
//! transition algorithm that answers "given this user's position and this
//! inbound message, what happens next." All I/O (flow files, persistence,
//! delivery) lives behind trait seams implemented in `menuflow-infra`.

pub mod engine;
pub mod event;
pub mod flow;
pub mod outbound;
pub mod repository;
pub mod session;
