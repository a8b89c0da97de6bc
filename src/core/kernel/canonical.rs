//! Canonical signing strings.
//!
//! Every function here is pure: the same parameters, timestamp and window
//! always produce the same bytes. The `signature` key is never part of a
//! canonical string.
//!
//! HMAC forms are signed exactly as transmitted, so their values are
//! percent-encoded. ED25519 forms sign the decoded values.

use crate::core::kernel::params::Params;

pub const TIMESTAMP_KEY: &str = "timestamp";
pub const SIGNATURE_KEY: &str = "signature";
pub const RECV_WINDOW_KEY: &str = "recvWindow";

/// Key priority used by Aster futures signing
pub const FUTURES_PRIORITY: &[&str] = &[
    "symbol",
    "side",
    "type",
    "quantity",
    "price",
    "timeInForce",
    "positionSide",
    "reduceOnly",
    "newClientOrderId",
    "stopPrice",
    "closePosition",
    "activationPrice",
    "callbackRate",
    "workingType",
    "priceProtect",
    "newOrderRespType",
    "orderId",
    "origClientOrderId",
    "recvWindow",
];

/// Join pairs as `k1=v1&k2=v2` with every value percent-encoded
pub fn encode_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .filter(|(k, _)| *k != SIGNATURE_KEY)
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Join pairs as `k1=v1&k2=v2` without encoding
pub fn join_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .filter(|(k, _)| *k != SIGNATURE_KEY)
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Insertion-order HMAC form.
///
/// Caller order is kept; `timestamp` and `recvWindow` are appended only when
/// the caller did not supply them.
pub fn hmac_insertion_order(params: &Params, timestamp: i64, recv_window: Option<u64>) -> String {
    let mut sequence = params.clone();
    if !sequence.contains(TIMESTAMP_KEY) {
        sequence.insert(TIMESTAMP_KEY, timestamp);
    }
    if let Some(window) = recv_window {
        if !sequence.contains(RECV_WINDOW_KEY) {
            sequence.insert(RECV_WINDOW_KEY, window);
        }
    }
    encode_pairs(sequence.iter())
}

/// Fixed-order HMAC form.
///
/// Keys in `priority` come first in list order, remaining keys alphabetically,
/// and a fresh `timestamp` always closes the string. A caller-supplied
/// timestamp is ignored.
pub fn hmac_fixed_order(
    params: &Params,
    priority: &[String],
    timestamp: i64,
    recv_window: Option<u64>,
) -> String {
    let mut working = params.clone();
    if let Some(window) = recv_window {
        if !working.contains(RECV_WINDOW_KEY) {
            working.insert(RECV_WINDOW_KEY, window);
        }
    }

    let mut ordered: Vec<(&str, &str)> = Vec::with_capacity(working.len() + 1);
    for key in priority {
        if let Some(value) = working.get(key) {
            ordered.push((key.as_str(), value));
        }
    }

    let mut remaining: Vec<(&str, &str)> = working
        .iter()
        .filter(|(k, _)| *k != TIMESTAMP_KEY && !priority.iter().any(|p| p == k))
        .collect();
    remaining.sort_by(|a, b| a.0.cmp(b.0));
    ordered.extend(remaining);

    let timestamp = timestamp.to_string();
    ordered.retain(|(k, _)| *k != TIMESTAMP_KEY);
    ordered.push((TIMESTAMP_KEY, timestamp.as_str()));

    encode_pairs(ordered)
}

fn instruction_segment(instruction: &str, params: &Params) -> String {
    let pairs = join_pairs(params.sorted());
    if pairs.is_empty() {
        format!("instruction={}", instruction)
    } else {
        format!("instruction={}&{}", instruction, pairs)
    }
}

/// ED25519 instruction form:
/// `instruction=<tag>[&<sorted pairs>]&timestamp=<t>&window=<w>`
pub fn ed25519_instruction(instruction: &str, params: &Params, timestamp: i64, window: u64) -> String {
    format!(
        "{}&timestamp={}&window={}",
        instruction_segment(instruction, params),
        timestamp,
        window
    )
}

/// ED25519 batch form: one instruction segment per sub-request, then a single
/// shared `&timestamp=<t>&window=<w>`.
pub fn ed25519_batch(instruction: &str, items: &[Params], timestamp: i64, window: u64) -> String {
    let segments = items
        .iter()
        .map(|item| instruction_segment(instruction, item))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}&timestamp={}&window={}", segments, timestamp, window)
}
