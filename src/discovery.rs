//! # Host Address Discovery
//!
//! Best-effort lookups of the addresses this host is reachable on. Purely
//! informational: the listeners log the local address at startup and ignore
//! failures; nothing in the transport depends on either lookup succeeding.

use std::net::IpAddr;

use tokio::net::UdpSocket;

use crate::error::{Result, TransportError};

/// Address of the interface that routes toward the public internet.
///
/// Uses a connected UDP socket to let the OS pick the outbound interface;
/// no packets are sent.
pub async fn local_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect("8.8.8.8:80").await?;
    Ok(socket.local_addr()?.ip())
}

/// Public address of this host as seen from the internet.
///
/// Queries an external service (api.ipify.org), so the answer depends on
/// that service being reachable; treat failures as expected.
pub async fn public_ip() -> Result<IpAddr> {
    let body = reqwest::get("https://api.ipify.org")
        .await
        .map_err(|e| TransportError::Discovery(e.to_string()))?
        .text()
        .await
        .map_err(|e| TransportError::Discovery(e.to_string()))?;

    body.trim()
        .parse()
        .map_err(|_| TransportError::Discovery(format!("not an IP address: {body:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_ip_resolves_to_a_non_loopback_address() {
        // Hosts without a default route are a legitimate environment; only
        // assert on the shape of a successful answer.
        if let Ok(ip) = local_ip().await {
            assert!(!ip.is_loopback());
        }
    }
}
