//! Wire-format decoders for the UDP transports.
//!
//! Each transport is a stateless decode function; the ingestion
//! listeners pair one of these with the matching adapter. Decode errors
//! mean the datagram is dropped, never that ingestion stops.

use crate::error::{EngineError, Result};
use crate::types::CSI_SUBCARRIERS;

/// Coarse-signal format: `RSS:<integer>`.
pub fn decode_rss(msg: &str) -> Result<f64> {
    let rest = msg
        .trim()
        .strip_prefix("RSS:")
        .ok_or_else(|| EngineError::MalformedSample(msg.trim().to_string()))?;
    rest.trim()
        .parse::<i64>()
        .map(|v| v as f64)
        .map_err(|_| EngineError::NonNumeric(rest.trim().to_string()))
}

/// Fine-signal format: `<timestamp>,<v0>,...,<v63>` — at least 65
/// comma-separated fields. The timestamp field is ignored.
pub fn decode_csi(msg: &str) -> Result<Vec<f64>> {
    let parts: Vec<&str> = msg.trim().split(',').collect();
    if parts.len() < CSI_SUBCARRIERS + 1 {
        return Err(EngineError::FieldCount {
            expected: CSI_SUBCARRIERS + 1,
            actual: parts.len(),
        });
    }
    parts[1..=CSI_SUBCARRIERS]
        .iter()
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| EngineError::NonNumeric(p.trim().to_string()))
        })
        .collect()
}

/// Raw-packet format: `WIFI:<rssi>,<type>,<subtype>`. Only the signal
/// level is used downstream; the two frame-type codes are validated and
/// discarded.
pub fn decode_monitor(msg: &str) -> Result<f64> {
    let rest = msg
        .trim()
        .strip_prefix("WIFI:")
        .ok_or_else(|| EngineError::MalformedSample(msg.trim().to_string()))?;
    let fields: Vec<&str> = rest.split(',').collect();
    if fields.len() != 3 {
        return Err(EngineError::FieldCount {
            expected: 3,
            actual: fields.len(),
        });
    }
    let rssi = fields[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| EngineError::NonNumeric(fields[0].trim().to_string()))?;
    for code in &fields[1..] {
        code.trim()
            .parse::<i64>()
            .map_err(|_| EngineError::NonNumeric(code.trim().to_string()))?;
    }
    Ok(rssi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rss_accepts_negative_integers() {
        assert_eq!(decode_rss("RSS:-50").unwrap(), -50.0);
        assert_eq!(decode_rss("  RSS:0 \n").unwrap(), 0.0);
    }

    #[test]
    fn rss_rejects_garbage() {
        assert!(decode_rss("RSSI:-50").is_err());
        assert!(decode_rss("RSS:abc").is_err());
        assert!(decode_rss("RSS:").is_err());
        assert!(decode_rss("").is_err());
    }

    #[test]
    fn csi_takes_64_amplitudes_after_timestamp() {
        let mut fields = vec!["1700000000.5".to_string()];
        fields.extend((0..64).map(|i| format!("{}.5", i)));
        let msg = fields.join(",");
        let amps = decode_csi(&msg).unwrap();
        assert_eq!(amps.len(), 64);
        assert_eq!(amps[0], 0.5);
        assert_eq!(amps[63], 63.5);
    }

    #[test]
    fn csi_rejects_short_and_non_numeric_rows() {
        // 64 fields total is one short: timestamp + only 63 amplitudes.
        let short = (0..64).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        assert!(decode_csi(&short).is_err());

        let mut fields = vec!["ts".to_string()];
        fields.extend((0..64).map(|i| i.to_string()));
        fields[10] = "x".to_string();
        assert!(decode_csi(&fields.join(",")).is_err());
    }

    #[test]
    fn monitor_extracts_rssi_and_validates_codes() {
        assert_eq!(decode_monitor("WIFI:-80,0,8").unwrap(), -80.0);
        assert!(decode_monitor("WIFI:-80,0").is_err());
        assert!(decode_monitor("WIFI:-80,zero,8").is_err());
        assert!(decode_monitor("RSS:-80").is_err());
    }
}
