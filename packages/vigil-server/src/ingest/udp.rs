use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{debug, info, warn};
use vigil_core::decode::{decode_csi, decode_monitor, decode_rss};
use vigil_core::{
    CsiAdapter, EngineError, MonitorAdapter, RssiAdapter, SourceAdapter,
};

use crate::state::ServerState;

/// Bind and spawn one listener task per enabled WiFi transport. A bind
/// failure disables that source for the process lifetime; the rest keep
/// running.
pub async fn spawn_udp_sources(state: &Arc<ServerState>) {
    if state.config.rssi.enabled {
        let adapter = RssiAdapter::new(state.config.rssi_config());
        spawn_listener(
            "coarse-signal",
            state.config.rssi.udp_port,
            adapter,
            decode_rss,
            state.clone(),
        )
        .await;
    }

    if state.config.csi.enabled {
        let adapter = CsiAdapter::new(state.config.csi_config());
        spawn_listener(
            "fine-signal",
            state.config.csi.udp_port,
            adapter,
            decode_csi,
            state.clone(),
        )
        .await;
    }

    if state.config.monitor.enabled {
        let adapter = MonitorAdapter::new(state.config.monitor_config());
        spawn_listener(
            "raw-packet",
            state.config.monitor.udp_port,
            adapter,
            decode_monitor,
            state.clone(),
        )
        .await;
    }
}

async fn spawn_listener<A>(
    label: &'static str,
    port: u16,
    adapter: A,
    decode: fn(&str) -> Result<A::Input, EngineError>,
    state: Arc<ServerState>,
) where
    A: SourceAdapter + Send + 'static,
{
    match UdpSocket::bind(("0.0.0.0", port)).await {
        Ok(socket) => {
            info!("✓ {} UDP listener on port {}", label, port);
            tokio::spawn(run_listener(label, socket, adapter, decode, state));
        }
        Err(e) => {
            warn!("{} listener disabled: failed to bind port {}: {}", label, port, e);
        }
    }
}

/// Per-transport receive loop: decode each datagram with the
/// transport's decode function, feed the adapter, publish the event.
/// Malformed datagrams are dropped without touching adapter state.
async fn run_listener<A>(
    label: &'static str,
    socket: UdpSocket,
    mut adapter: A,
    decode: fn(&str) -> Result<A::Input, EngineError>,
    state: Arc<ServerState>,
) where
    A: SourceAdapter + Send,
{
    let mut buf = [0u8; 4096];
    loop {
        let len = match socket.recv_from(&mut buf).await {
            Ok((len, _addr)) => len,
            Err(e) => {
                warn!("{} socket receive error: {}", label, e);
                continue;
            }
        };

        let text = match std::str::from_utf8(&buf[..len]) {
            Ok(text) => text,
            Err(_) => {
                debug!("{}: dropping non-UTF-8 datagram", label);
                continue;
            }
        };

        match decode(text) {
            Ok(sample) => {
                let event = adapter.process(sample);
                state.store_wifi_event(event.clone());
                state.hub.publish(&event);
            }
            Err(e) => {
                debug!("{}: dropping malformed datagram: {}", label, e);
            }
        }
    }
}
