//! Default outbound delivery adapter.
//!
//! `TracingOutbound` "delivers" responses by emitting structured log events.
//! It stands in for a real channel adapter (which would translate the
//! descriptor into a provider's wire format); the engine and API layer are
//! wired against the `OutboundAdapter` trait and never know the difference.

use menuflow_core::outbound::OutboundAdapter;
use menuflow_types::error::DeliveryError;
use menuflow_types::response::ResponseDescriptor;

/// Log-only outbound adapter, the default wiring.
#[derive(Debug, Default, Clone)]
pub struct TracingOutbound;

impl TracingOutbound {
    pub fn new() -> Self {
        Self
    }
}

impl OutboundAdapter for TracingOutbound {
    async fn deliver(
        &self,
        user_id: &str,
        response: &ResponseDescriptor,
    ) -> Result<(), DeliveryError> {
        tracing::info!(
            user_id,
            kind = ?response.kind,
            options = response.options.len(),
            text = %response.text,
            "outbound response"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deliver_always_succeeds() {
        let outbound = TracingOutbound::new();
        let resp = ResponseDescriptor::text("hello");
        assert!(outbound.deliver("u1", &resp).await.is_ok());
    }
}
