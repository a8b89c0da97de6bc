use crate::core::errors::ExchangeError;
use crate::core::kernel::canonical::{self, RECV_WINDOW_KEY, SIGNATURE_KEY, TIMESTAMP_KEY};
use crate::core::kernel::params::Params;
use crate::core::kernel::request::{
    ParamPlacement, PreparedRequest, RequestBody, RequestDescriptor, WireBody, WireRequest,
};
use crate::core::kernel::signer::{SignatureResult, Signer, SignerKind};
use serde_json::{Map, Value};

pub const ED25519_KEY_HEADER: &str = "X-API-Key";
pub const ED25519_SIGNATURE_HEADER: &str = "X-Signature";
pub const ED25519_TIMESTAMP_HEADER: &str = "X-Timestamp";
pub const ED25519_WINDOW_HEADER: &str = "X-Window";

/// Closed set of signing schemes, chosen per exchange at construction time.
///
/// Each variant pairs a canonical form with the wire placement that must carry
/// exactly the same parameter sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Caller order, `timestamp`/`recvWindow` appended, hex HMAC as `signature`
    HmacOrdered,
    /// Priority keys, then alphabetical, then `timestamp`; hex HMAC as `signature`
    HmacFixedOrder { priority: Vec<String> },
    /// `instruction=` prefixed, alphabetical, base64 ED25519 in headers
    Ed25519,
    /// One instruction segment per sub-request, shared timestamp and window
    Ed25519Batch,
}

/// Per-attempt signing inputs supplied by the orchestrator
#[derive(Clone, Copy)]
pub struct SigningContext<'a> {
    pub signer: &'a dyn Signer,
    pub api_key_header: &'a str,
    pub placement: ParamPlacement,
    pub timestamp: i64,
    pub window: Option<u64>,
}

impl SignatureScheme {
    /// Fixed-order HMAC with the Aster futures priority list
    pub fn futures_fixed_order() -> Self {
        Self::HmacFixedOrder {
            priority: canonical::FUTURES_PRIORITY
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }

    pub fn signer_kind(&self) -> SignerKind {
        match self {
            Self::HmacOrdered | Self::HmacFixedOrder { .. } => SignerKind::Hmac,
            Self::Ed25519 | Self::Ed25519Batch => SignerKind::Ed25519,
        }
    }

    /// Name of the window parameter for this scheme
    pub fn window_key(&self) -> &'static str {
        match self {
            Self::HmacOrdered | Self::HmacFixedOrder { .. } => RECV_WINDOW_KEY,
            Self::Ed25519 | Self::Ed25519Batch => "window",
        }
    }

    /// The variant that signs `body`: a batch body under ED25519 uses the batch form
    pub fn for_body(&self, body: &RequestBody) -> Self {
        match (self, body) {
            (Self::Ed25519, RequestBody::Batch(_)) => Self::Ed25519Batch,
            (scheme, _) => scheme.clone(),
        }
    }

    /// Build the signed wire form of `descriptor` for one attempt.
    ///
    /// `params` replaces the descriptor's own parameters so the orchestrator can
    /// refresh caller-supplied values between attempts.
    pub fn prepare_signed(
        &self,
        descriptor: &RequestDescriptor,
        params: &Params,
        ctx: &SigningContext<'_>,
    ) -> Result<PreparedRequest, ExchangeError> {
        if ctx.signer.kind() != self.signer_kind() {
            return Err(ExchangeError::AuthError(format!(
                "{:?} signer cannot produce {:?} signatures",
                ctx.signer.kind(),
                self
            )));
        }

        match self.for_body(descriptor.body()) {
            scheme @ (Self::HmacOrdered | Self::HmacFixedOrder { .. }) => {
                scheme.prepare_hmac(descriptor, params, ctx)
            }
            Self::Ed25519 => Self::prepare_ed25519(descriptor, params, ctx),
            Self::Ed25519Batch => Self::prepare_ed25519_batch(descriptor, ctx),
        }
    }

    fn prepare_hmac(
        &self,
        descriptor: &RequestDescriptor,
        params: &Params,
        ctx: &SigningContext<'_>,
    ) -> Result<PreparedRequest, ExchangeError> {
        if *descriptor.body() != RequestBody::Empty {
            return Err(ExchangeError::InvalidParameters(
                "HMAC signing covers parameters only; pass the payload as Params".to_string(),
            ));
        }

        let canonical = match self {
            Self::HmacFixedOrder { priority } => {
                canonical::hmac_fixed_order(params, priority, ctx.timestamp, ctx.window)
            }
            _ => canonical::hmac_insertion_order(params, ctx.timestamp, ctx.window),
        };
        let signature = ctx.signer.sign(&canonical)?;
        let encoded = format!("{}&{}={}", canonical, SIGNATURE_KEY, signature.token);

        let (query, body) = match ctx.placement {
            ParamPlacement::Query => (Some(encoded), None),
            ParamPlacement::FormBody => (None, Some(WireBody::Form(encoded))),
            ParamPlacement::JsonBody => {
                return Err(ExchangeError::InvalidParameters(
                    "HMAC schemes cannot place parameters in a JSON body".to_string(),
                ))
            }
        };

        let signed = Params::parse_encoded(&canonical);
        let timestamp = signed
            .get(TIMESTAMP_KEY)
            .and_then(|t| t.parse::<i64>().ok())
            .unwrap_or(ctx.timestamp);
        let window = signed
            .get(RECV_WINDOW_KEY)
            .and_then(|w| w.parse::<u64>().ok());

        Ok(PreparedRequest {
            wire: WireRequest {
                method: descriptor.method().clone(),
                path: descriptor.path().to_string(),
                query,
                headers: vec![(
                    ctx.api_key_header.to_string(),
                    ctx.signer.key_id().to_string(),
                )],
                body,
            },
            timestamp: Some(timestamp),
            window,
            signature: Some(signature),
        })
    }

    fn prepare_ed25519(
        descriptor: &RequestDescriptor,
        params: &Params,
        ctx: &SigningContext<'_>,
    ) -> Result<PreparedRequest, ExchangeError> {
        let instruction = require_instruction(descriptor)?;
        let window = require_window(ctx)?;

        let (signing_params, query, body) = match ctx.placement {
            ParamPlacement::Query => {
                if *descriptor.body() != RequestBody::Empty {
                    return Err(ExchangeError::InvalidParameters(
                        "query-signed requests cannot carry a body".to_string(),
                    ));
                }
                let query = sorted_query(params);
                (params.clone(), query, None)
            }
            ParamPlacement::JsonBody => {
                let object = json_object_body(descriptor, params)?;
                let signing_params = Params::from_json_object(&object);
                let body = if object.is_empty() {
                    None
                } else {
                    Some(WireBody::Json(serde_json::to_string(&object)?))
                };
                (signing_params, None, body)
            }
            ParamPlacement::FormBody => {
                return Err(ExchangeError::InvalidParameters(
                    "ED25519 schemes cannot place parameters in a form body".to_string(),
                ))
            }
        };

        let canonical =
            canonical::ed25519_instruction(instruction, &signing_params, ctx.timestamp, window);
        let signature = ctx.signer.sign(&canonical)?;

        Ok(PreparedRequest {
            wire: WireRequest {
                method: descriptor.method().clone(),
                path: descriptor.path().to_string(),
                query,
                headers: ed25519_headers(ctx, &signature, window),
                body,
            },
            timestamp: Some(ctx.timestamp),
            window: Some(window),
            signature: Some(signature),
        })
    }

    fn prepare_ed25519_batch(
        descriptor: &RequestDescriptor,
        ctx: &SigningContext<'_>,
    ) -> Result<PreparedRequest, ExchangeError> {
        let instruction = require_instruction(descriptor)?;
        let window = require_window(ctx)?;

        let RequestBody::Batch(items) = descriptor.body() else {
            return Err(ExchangeError::InvalidParameters(
                "batch signing requires a batch body".to_string(),
            ));
        };
        if ctx.placement != ParamPlacement::JsonBody {
            return Err(ExchangeError::InvalidParameters(
                "batch requests must be sent as a JSON body".to_string(),
            ));
        }

        let items: Vec<Map<String, Value>> = items.iter().map(without_nulls).collect();
        let signing_items: Vec<Params> = items.iter().map(Params::from_json_object).collect();

        let canonical =
            canonical::ed25519_batch(instruction, &signing_items, ctx.timestamp, window);
        let signature = ctx.signer.sign(&canonical)?;

        Ok(PreparedRequest {
            wire: WireRequest {
                method: descriptor.method().clone(),
                path: descriptor.path().to_string(),
                query: None,
                headers: ed25519_headers(ctx, &signature, window),
                body: Some(WireBody::Json(serde_json::to_string(&items)?)),
            },
            timestamp: Some(ctx.timestamp),
            window: Some(window),
            signature: Some(signature),
        })
    }
}

/// Wire form of an unsigned call. Parameters keep caller order.
pub fn prepare_unsigned(
    descriptor: &RequestDescriptor,
    placement: ParamPlacement,
) -> Result<PreparedRequest, ExchangeError> {
    let params = descriptor.parameters();
    let encoded = canonical::encode_pairs(params.iter());

    let (query, body) = match (placement, descriptor.body()) {
        (_, RequestBody::Batch(items)) => {
            let items: Vec<Map<String, Value>> = items.iter().map(without_nulls).collect();
            (
                non_empty(encoded),
                Some(WireBody::Json(serde_json::to_string(&items)?)),
            )
        }
        (ParamPlacement::Query, RequestBody::Json(value)) => (
            non_empty(encoded),
            Some(WireBody::Json(serde_json::to_string(value)?)),
        ),
        (ParamPlacement::Query, RequestBody::Empty) => (non_empty(encoded), None),
        (ParamPlacement::FormBody, RequestBody::Empty) => {
            (None, non_empty(encoded).map(WireBody::Form))
        }
        (ParamPlacement::FormBody, RequestBody::Json(_)) => {
            return Err(ExchangeError::InvalidParameters(
                "form-placed requests cannot carry a JSON body".to_string(),
            ))
        }
        (ParamPlacement::JsonBody, _) => {
            let object = json_object_body(descriptor, params)?;
            let body = if object.is_empty() {
                None
            } else {
                Some(WireBody::Json(serde_json::to_string(&object)?))
            };
            (None, body)
        }
    };

    Ok(PreparedRequest {
        wire: WireRequest {
            method: descriptor.method().clone(),
            path: descriptor.path().to_string(),
            query,
            headers: Vec::new(),
            body,
        },
        timestamp: None,
        window: None,
        signature: None,
    })
}

fn require_instruction(descriptor: &RequestDescriptor) -> Result<&str, ExchangeError> {
    descriptor.instruction_tag().ok_or_else(|| {
        ExchangeError::InvalidParameters(format!(
            "signed request to {} requires an instruction tag",
            descriptor.path()
        ))
    })
}

fn require_window(ctx: &SigningContext<'_>) -> Result<u64, ExchangeError> {
    ctx.window.ok_or_else(|| {
        ExchangeError::InvalidParameters("ED25519 signing requires a window".to_string())
    })
}

fn ed25519_headers(
    ctx: &SigningContext<'_>,
    signature: &SignatureResult,
    window: u64,
) -> Vec<(String, String)> {
    vec![
        (ED25519_KEY_HEADER.to_string(), ctx.signer.key_id().to_string()),
        (ED25519_SIGNATURE_HEADER.to_string(), signature.token.clone()),
        (ED25519_TIMESTAMP_HEADER.to_string(), ctx.timestamp.to_string()),
        (ED25519_WINDOW_HEADER.to_string(), window.to_string()),
    ]
}

fn sorted_query(params: &Params) -> Option<String> {
    non_empty(canonical::encode_pairs(params.sorted()))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// The JSON object a body-placed request sends: the descriptor's object body,
/// or its parameters rendered as strings. Null fields are dropped so the
/// transmitted object equals the signed one.
fn json_object_body(
    descriptor: &RequestDescriptor,
    params: &Params,
) -> Result<Map<String, Value>, ExchangeError> {
    match descriptor.body() {
        RequestBody::Json(Value::Object(object)) => {
            if !params.is_empty() {
                return Err(ExchangeError::InvalidParameters(
                    "pass either Params or a JSON object body, not both".to_string(),
                ));
            }
            Ok(without_nulls(object))
        }
        RequestBody::Json(_) => Err(ExchangeError::InvalidParameters(
            "JSON body must be an object; use a batch body for lists".to_string(),
        )),
        RequestBody::Empty => Ok(params.to_json_object()),
        RequestBody::Batch(_) => Err(ExchangeError::InvalidParameters(
            "batch body cannot be flattened into one object".to_string(),
        )),
    }
}

fn without_nulls(object: &Map<String, Value>) -> Map<String, Value> {
    object
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::signer::{Ed25519Signer, HmacSigner};
    use serde_json::json;

    const SEED_B64: &str = "AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA=";

    fn hmac_ctx(signer: &HmacSigner, placement: ParamPlacement) -> SigningContext<'_> {
        SigningContext {
            signer,
            api_key_header: "X-MBX-APIKEY",
            placement,
            timestamp: 1_700_000_000_000,
            window: Some(5000),
        }
    }

    #[test]
    fn test_hmac_form_body_carries_signed_string() {
        let signer = HmacSigner::new("key".to_string(), "secret".to_string()).unwrap();
        let descriptor = RequestDescriptor::post("/fapi/v1/order")
            .params(Params::new().with("symbol", "BTCUSDT").with("side", "BUY"))
            .signed();
        let prepared = SignatureScheme::futures_fixed_order()
            .prepare_signed(
                &descriptor,
                descriptor.parameters(),
                &hmac_ctx(&signer, ParamPlacement::FormBody),
            )
            .unwrap();

        let signature = prepared.signature.clone().unwrap();
        let body = prepared.wire.body.clone().unwrap();
        assert_eq!(body.content_type(), "application/x-www-form-urlencoded");
        assert_eq!(
            body.as_str(),
            format!("{}&signature={}", signature.canonical, signature.token)
        );
        assert!(prepared.wire.query.is_none());
        assert_eq!(prepared.wire.header("X-MBX-APIKEY"), Some("key"));
    }

    #[test]
    fn test_hmac_rejects_json_body() {
        let signer = HmacSigner::new("key".to_string(), "secret".to_string()).unwrap();
        let descriptor = RequestDescriptor::post("/api/v1/order")
            .json_body(json!({"symbol": "BTCUSDT"}))
            .signed();
        let err = SignatureScheme::HmacOrdered
            .prepare_signed(
                &descriptor,
                descriptor.parameters(),
                &hmac_ctx(&signer, ParamPlacement::Query),
            )
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidParameters(_)));
    }

    #[test]
    fn test_signer_kind_mismatch() {
        let signer = HmacSigner::new("key".to_string(), "secret".to_string()).unwrap();
        let descriptor = RequestDescriptor::get("/api/v1/order")
            .instruction("orderQuery")
            .signed();
        let err = SignatureScheme::Ed25519
            .prepare_signed(
                &descriptor,
                descriptor.parameters(),
                &hmac_ctx(&signer, ParamPlacement::Query),
            )
            .unwrap_err();
        assert!(matches!(err, ExchangeError::AuthError(_)));
    }

    #[test]
    fn test_ed25519_json_body_signed_from_body_fields() {
        let signer = Ed25519Signer::new(SEED_B64, None).unwrap();
        let descriptor = RequestDescriptor::delete("/api/v1/order")
            .json_body(json!({"symbol": "SOL_USDC", "orderId": "42", "clientId": null}))
            .instruction("orderCancel")
            .signed();
        let ctx = SigningContext {
            signer: &signer,
            api_key_header: ED25519_KEY_HEADER,
            placement: ParamPlacement::JsonBody,
            timestamp: 77,
            window: Some(5000),
        };
        let prepared = SignatureScheme::Ed25519
            .prepare_signed(&descriptor, descriptor.parameters(), &ctx)
            .unwrap();

        assert_eq!(
            prepared.signature.as_ref().unwrap().canonical,
            "instruction=orderCancel&orderId=42&symbol=SOL_USDC&timestamp=77&window=5000"
        );
        let sent: Value =
            serde_json::from_str(prepared.wire.body.as_ref().unwrap().as_str()).unwrap();
        assert_eq!(sent, json!({"symbol": "SOL_USDC", "orderId": "42"}));
        assert_eq!(prepared.wire.header(ED25519_TIMESTAMP_HEADER), Some("77"));
    }

    #[test]
    fn test_ed25519_requires_instruction() {
        let signer = Ed25519Signer::new(SEED_B64, None).unwrap();
        let descriptor = RequestDescriptor::get("/api/v1/capital").signed();
        let ctx = SigningContext {
            signer: &signer,
            api_key_header: ED25519_KEY_HEADER,
            placement: ParamPlacement::Query,
            timestamp: 1,
            window: Some(5000),
        };
        assert!(SignatureScheme::Ed25519
            .prepare_signed(&descriptor, descriptor.parameters(), &ctx)
            .is_err());
    }

    #[test]
    fn test_batch_body_selects_batch_variant() {
        let batch = RequestBody::Batch(vec![Map::new()]);
        assert_eq!(
            SignatureScheme::Ed25519.for_body(&batch),
            SignatureScheme::Ed25519Batch
        );
        assert_eq!(
            SignatureScheme::HmacOrdered.for_body(&batch),
            SignatureScheme::HmacOrdered
        );
    }

    #[test]
    fn test_unsigned_query_keeps_caller_order() {
        let descriptor = RequestDescriptor::get("/api/v1/depth")
            .params(Params::new().with("symbol", "BTCUSDT").with("limit", 5));
        let prepared = prepare_unsigned(&descriptor, ParamPlacement::Query).unwrap();
        assert_eq!(prepared.wire.query.as_deref(), Some("symbol=BTCUSDT&limit=5"));
        assert!(prepared.wire.headers.is_empty());
        assert!(prepared.signature.is_none());
    }
}
