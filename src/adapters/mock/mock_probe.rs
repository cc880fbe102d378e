//! Probe stand-in that never touches the network.

use crate::ports::{ConnectivityProbe, ProbeReport};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// Probe stand-in. Reachable by default; `unresolvable` simulates a DNS failure.
#[derive(Debug, Default)]
pub struct MockProbe {
    calls: AtomicUsize,
    unresolvable: bool,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unresolvable() -> Self {
        Self {
            unresolvable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ConnectivityProbe for MockProbe {
    async fn probe(&self, server: &str, port: u16) -> ProbeReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unresolvable {
            warn!(server, port, "[MOCK] SMTP probe: DNS resolution failed");
            return ProbeReport {
                resolved: Err(format!("failed to lookup address for {}", server)),
                tcp: None,
            };
        }
        info!(server, port, "[MOCK] SMTP probe");
        ProbeReport {
            resolved: Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]),
            tcp: Some(Ok(())),
        }
    }
}
