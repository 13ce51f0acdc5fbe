#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use parcelbot::TrackerError;
use parcelbot::core::delivery::MessageChannel;
use parcelbot::core::models::CarrierHint;
use parcelbot::tracking::{QueryResponse, TrackingProvider};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Register(Option<CarrierHint>),
    Query(Option<CarrierHint>),
}

type Responder = Box<dyn Fn(Option<CarrierHint>, usize) -> Result<QueryResponse, TrackerError> + Send + Sync>;

/// In-memory provider that records every call and answers queries through a
/// closure receiving the attempt's carrier and the zero-based query index.
pub struct ScriptedProvider {
    calls: Mutex<Vec<Call>>,
    responder: Responder,
    fail_register: bool,
}

impl ScriptedProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(Option<CarrierHint>, usize) -> Result<QueryResponse, TrackerError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            fail_register: false,
        }
    }

    /// A provider that never has an accepted record.
    pub fn always_empty() -> Self {
        Self::new(|_, _| Ok(empty_response()))
    }

    pub fn failing_register(mut self) -> Self {
        self.fail_register = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn query_carriers(&self) -> Vec<Option<CarrierHint>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query(carrier) => Some(carrier),
                Call::Register(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl TrackingProvider for ScriptedProvider {
    async fn register(
        &self,
        _number: &str,
        carrier: Option<CarrierHint>,
    ) -> Result<(), TrackerError> {
        self.calls.lock().unwrap().push(Call::Register(carrier));
        if self.fail_register {
            return Err(TrackerError::ProviderError("register returned code -1".to_string()));
        }
        Ok(())
    }

    async fn query(
        &self,
        _number: &str,
        carrier: Option<CarrierHint>,
    ) -> Result<QueryResponse, TrackerError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.iter().filter(|c| matches!(c, Call::Query(_))).count();
            calls.push(Call::Query(carrier));
            index
        };
        (self.responder)(carrier, index)
    }
}

/// Channel that keeps every sent message; can be told to fail sends.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<(i64, String)>>,
    fail_sends: bool,
}

impl RecordingChannel {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: true,
        }
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TrackerError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail_sends {
            return Err(TrackerError::DeliveryError("sendMessage HTTP 400".to_string()));
        }
        Ok(())
    }
}

pub fn empty_response() -> QueryResponse {
    serde_json::from_value(json!({
        "code": 0,
        "data": { "accepted": [], "rejected": [{ "number": "5532417763", "error": { "code": -18019909 } }] }
    }))
    .unwrap()
}

pub fn accepted_response(record: Value) -> QueryResponse {
    serde_json::from_value(json!({
        "code": 0,
        "data": { "accepted": [record], "rejected": [] }
    }))
    .unwrap()
}

/// Legacy-layout record with one `In Transit` scan in Memphis.
pub fn legacy_record(number: &str) -> Value {
    json!({
        "number": number,
        "carrier": 100001,
        "track": {
            "e": 10,
            "w1": 100001,
            "z0": { "a": "2025-05-28T14:30:00Z", "c": "Memphis", "z": "Departed facility", "s": "In Transit" },
            "z1": [
                { "a": "2025-05-28T14:30:00Z", "c": "Memphis", "z": "Departed facility", "s": "In Transit" }
            ]
        }
    })
}
