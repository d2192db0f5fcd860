#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::{Address, U256};
use serde_json::Value;
use tiny_http::{Header, Response, Server};

use sbt_mint_adapters::{Eip1193Adapter, MintAdapterConfig, PublicRpcAdapter, SharedView};
use sbt_mint_core::WalletSessionController;

pub type AdapterController = WalletSessionController<Eip1193Adapter, PublicRpcAdapter, SharedView>;

/// Every JSON-RPC method the mock node has seen, in arrival order.
pub type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

pub fn fast_config() -> MintAdapterConfig {
    MintAdapterConfig {
        rpc_timeout_ms: 5_000,
        receipt_poll_interval_ms: 10,
        receipt_max_polls: Some(20),
        ..MintAdapterConfig::default()
    }
}

pub fn default_account() -> Address {
    Address::with_last_byte(1)
}

pub fn uint_word(value: u64) -> String {
    format!("0x{:064x}", U256::from(value))
}

/// Answers each JSON-RPC request with `{"jsonrpc","id"}` plus whatever the
/// handler returns (`result` or `error`).
pub fn spawn_rpc_server<F>(handler: F) -> (String, CallLog)
where
    F: Fn(&str, &Value) -> Value + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&calls);

    thread::spawn(move || loop {
        let mut req = match server.recv() {
            Ok(r) => r,
            Err(_) => break,
        };
        let mut body = String::new();
        if req.as_reader().read_to_string(&mut body).is_err() {
            continue;
        }
        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let method = payload["method"].as_str().unwrap_or_default().to_owned();
        let params = payload["params"].clone();
        log.lock()
            .expect("call log")
            .push((method.clone(), params.clone()));

        let mut reply = handler(&method, &params);
        reply["jsonrpc"] = Value::from("2.0");
        reply["id"] = payload["id"].clone();
        let response = Response::from_string(reply.to_string()).with_header(
            Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("content type header"),
        );
        let _ = req.respond(response);
    });

    (addr, calls)
}

pub fn methods(calls: &CallLog) -> Vec<String> {
    calls
        .lock()
        .expect("call log")
        .iter()
        .map(|(m, _)| m.clone())
        .collect()
}

/// Public node serving `totalSupply` from a counter that each mint bumps.
pub fn spawn_supply_node(supply: Arc<Mutex<u64>>) -> (String, CallLog) {
    spawn_rpc_server(move |method, params| match method {
        "eth_call" => {
            let data = params[0]["data"].as_str().unwrap_or_default();
            if data.starts_with("0x18160ddd") {
                let current = *supply.lock().expect("supply");
                serde_json::json!({ "result": uint_word(current) })
            } else if data.starts_with("0x70a08231") {
                serde_json::json!({ "result": uint_word(1) })
            } else {
                serde_json::json!({ "error": { "code": 3, "message": "execution reverted" } })
            }
        }
        _ => serde_json::json!({
            "error": { "code": -32601, "message": format!("method {method} not found") }
        }),
    })
}

pub fn deterministic_controller(node_url: &str) -> AdapterController {
    WalletSessionController::new(
        Eip1193Adapter::deterministic(fast_config()),
        PublicRpcAdapter::with_url(node_url),
        SharedView::new(),
    )
}
