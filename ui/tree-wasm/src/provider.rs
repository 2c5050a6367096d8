//! Injected wallet provider (`window.celo` / `window.ethereum`) as a JSON-RPC transport.
//!
//! EIP-1193 `request` is preferred. Older injected wallets only offer the
//! callback-style `sendAsync(payload, cb)` / `send(payload, cb)` pair, plus
//! `enable()` for authorization; those are used when `request` is absent.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use std::cell::Cell;
use std::time::Duration;
use tn_chain_client::{ChainError, Result, RpcTransport};
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Globals checked for a provider, in order.
const PROVIDER_GLOBALS: [&str; 2] = ["celo", "ethereum"];

/// Callback-style methods tried when `request` is missing, in order.
const LEGACY_SENDERS: [&str; 2] = ["sendAsync", "send"];

/// EIP-1193 "user rejected the request".
const USER_REJECTED: i64 = 4001;

pub struct InjectedProvider {
    inner: Object,
    next_id: Cell<u64>,
}

impl InjectedProvider {
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        PROVIDER_GLOBALS.iter().find_map(|global| {
            let value = Reflect::get(&window, &JsValue::from_str(global)).ok()?;
            let inner = value.dyn_into::<Object>().ok()?;
            info!(global, "wallet provider detected");
            Some(Self {
                inner,
                next_id: Cell::new(1),
            })
        })
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.inner, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    async fn invoke(&self, function: &Function, args: &Array) -> Result<JsValue> {
        let returned = function.apply(&self.inner, args).map_err(js_error)?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(js_error)
    }

    /// Send one JSON-RPC envelope through a `(payload, callback)` method.
    async fn send_legacy(&self, send: &Function, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.replace(self.next_id.get() + 1);
        let payload = to_js(&rpc_payload(id, method, params))?;

        let promise = Promise::new(&mut |resolve: Function, reject: Function| {
            let on_call_error = reject.clone();
            let callback = Closure::once_into_js(move |err: JsValue, response: JsValue| {
                let _ = if err.is_null() || err.is_undefined() {
                    resolve.call1(&JsValue::UNDEFINED, &response)
                } else {
                    reject.call1(&JsValue::UNDEFINED, &err)
                };
            });
            if let Err(err) = send.call2(&self.inner, &payload, &callback) {
                let _ = on_call_error.call1(&JsValue::UNDEFINED, &err);
            }
        });

        let response = JsFuture::from(promise).await.map_err(js_error)?;
        unwrap_rpc_response(from_js(response)?)
    }
}

#[async_trait(?Send)]
impl RpcTransport for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        debug!(method, "wallet request");

        if let Some(request) = self.method("request") {
            let payload = to_js(&json!({ "method": method, "params": params }))?;
            let result = self.invoke(&request, &Array::of1(&payload)).await?;
            return from_js(result);
        }

        if method == "eth_requestAccounts" {
            if let Some(enable) = self.method("enable") {
                let result = self.invoke(&enable, &Array::new()).await?;
                return from_js(result);
            }
        }

        let Some(send) = LEGACY_SENDERS.iter().find_map(|name| self.method(name)) else {
            return Err(ChainError::ProviderUnavailable(format!(
                "request, sendAsync or send ({method})"
            )));
        };
        self.send_legacy(&send, method, params).await
    }

    async fn pause(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

fn to_js(value: &Value) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| ChainError::Transport(err.to_string()))
}

fn from_js(value: JsValue) -> Result<Value> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| ChainError::InvalidResponse(err.to_string()))
}

fn rpc_payload(id: u64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

/// Split a JSON-RPC response envelope into its result or error.
fn unwrap_rpc_response(response: Value) -> Result<Value> {
    if let Some(error) = response.get("error").filter(|error| !error.is_null()) {
        let code = error.get("code").and_then(Value::as_i64);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());
        return Err(classify(code, message));
    }
    Ok(response.get("result").cloned().unwrap_or(Value::Null))
}

fn classify(code: Option<i64>, message: String) -> ChainError {
    match code {
        Some(USER_REJECTED) => ChainError::Rejected(message),
        Some(code) => ChainError::Rpc { code, message },
        None => ChainError::Transport(message),
    }
}

fn js_error(err: JsValue) -> ChainError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).ok();

    let code = field("code").and_then(|code| code.as_f64()).map(|code| code as i64);
    let message = field("message")
        .and_then(|message| message.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));

    classify(code, message)
}
