//! Outbound delivery trait definition.
//!
//! The engine computes response descriptors and nothing else; translating a
//! descriptor into a channel's wire format and delivering it is the outbound
//! adapter's job. The application layer calls the adapter after the engine
//! commits -- a delivery failure never rolls back the session.
//!
//! Uses native async fn in traits (Rust 2024 edition, no async_trait macro).

use menuflow_types::error::DeliveryError;
use menuflow_types::response::ResponseDescriptor;

/// Delivers a response descriptor to a user over some channel.
pub trait OutboundAdapter: Send + Sync {
    /// Deliver `response` to `user_id`. Best-effort: the caller logs
    /// failures, it does not retry on the engine's behalf.
    fn deliver(
        &self,
        user_id: &str,
        response: &ResponseDescriptor,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;
}
