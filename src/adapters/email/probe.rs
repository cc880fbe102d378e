//! DNS + TCP reachability probe for the SMTP server. Diagnostic only.

use crate::ports::{ConnectivityProbe, ProbeReport};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::{TcpStream, lookup_host};
use tracing::{info, warn};

/// Resolves the server and tries a raw TCP connect with a short timeout.
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn probe(&self, server: &str, port: u16) -> ProbeReport {
        let resolved = match lookup_host((server, port)).await {
            Ok(addrs) => {
                let mut ips: Vec<IpAddr> = addrs.map(|a| a.ip()).collect();
                ips.sort();
                ips.dedup();
                info!(server, port, addresses = ?ips, "SMTP probe: DNS resolved");
                ips
            }
            Err(e) => {
                warn!(server, port, error = %e, "SMTP probe: DNS resolve failed");
                return ProbeReport {
                    resolved: Err(e.to_string()),
                    tcp: None,
                };
            }
        };

        let tcp = match tokio::time::timeout(self.timeout, TcpStream::connect((server, port))).await
        {
            Ok(Ok(_stream)) => {
                info!(server, port, "SMTP probe: TCP connect success");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(server, port, error = %e, "SMTP probe: TCP connect failed");
                Err(e.to_string())
            }
            Err(_) => {
                warn!(
                    server,
                    port,
                    timeout_secs = self.timeout.as_secs(),
                    "SMTP probe: TCP connect timed out"
                );
                Err(format!("timed out after {:?}", self.timeout))
            }
        };

        ProbeReport {
            resolved: Ok(resolved),
            tcp: Some(tcp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reports_reachable_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let report = TcpProbe::new(Duration::from_secs(2))
            .probe("127.0.0.1", port)
            .await;
        assert_eq!(report.resolved, Ok(vec!["127.0.0.1".parse().unwrap()]));
        assert!(report.is_reachable());
    }

    #[tokio::test]
    async fn dns_failure_skips_tcp() {
        let report = TcpProbe::new(Duration::from_secs(2))
            .probe("does-not-exist.invalid", 25)
            .await;
        assert!(report.resolved.is_err());
        assert_eq!(report.tcp, None);
    }
}
