use serde_json::Value;

use sbt_mint_core::{PortError, ProviderError};

pub(crate) fn build_client(timeout_ms: u64) -> reqwest::Client {
    let builder = reqwest::Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(std::time::Duration::from_millis(timeout_ms));
    #[cfg(target_arch = "wasm32")]
    let _ = timeout_ms;
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "http client builder failed, using defaults");
        reqwest::Client::new()
    })
}

pub(crate) async fn call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<Value, PortError> {
    let payload = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });
    let response = client
        .post(url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| PortError::Transport(format!("{method} request failed: {e}")))?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| PortError::Transport(format!("{method} json decode failed: {e}")))?;
    if let Some(err) = body.get("error") {
        return Err(PortError::Provider(provider_error_from_json(err)));
    }
    if !status.is_success() {
        return Err(PortError::Transport(format!("{method} status {status}: {body}")));
    }
    body.get("result")
        .cloned()
        .ok_or_else(|| PortError::Validation(format!("{method} response missing result")))
}

/// Normalize a JSON-RPC error object. Revert reasons may sit at the top
/// level or under `data`.
pub fn provider_error_from_json(err: &Value) -> ProviderError {
    let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_owned);
    ProviderError {
        code: err.get("code").and_then(Value::as_i64),
        reason: text(err.get("reason"))
            .or_else(|| text(err.get("data").and_then(|d| d.get("reason")))),
        message: text(err.get("message")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_object_fields_are_normalized() {
        let err = provider_error_from_json(&serde_json::json!({
            "code": 4902,
            "message": "Unrecognized chain ID \"0x2105\"."
        }));
        assert_eq!(err.code, Some(4902));
        assert_eq!(err.reason, None);
        assert!(err.message.as_deref().unwrap_or_default().contains("Unrecognized"));

        let err = provider_error_from_json(&serde_json::json!({
            "code": 3,
            "message": "execution reverted",
            "data": { "reason": "Already minted" }
        }));
        assert_eq!(err.reason.as_deref(), Some("Already minted"));
    }
}
