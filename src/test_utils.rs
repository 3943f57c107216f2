use ethers::providers::{JsonRpcClient, ProviderError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// JSON-RPC transport that answers requests from a queue, in order,
/// regardless of method, and remembers which methods were called.
#[derive(Clone, Debug, Default)]
pub struct MockRpc {
    responses: Arc<Mutex<VecDeque<serde_json::Value>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Serialize>(&self, res: T) {
        self.responses
            .lock()
            .unwrap()
            .push_back(serde_json::to_value(res).unwrap());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JsonRpcClient for MockRpc {
    type Error = ProviderError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        println!("Request: {} {:?}", method, params);
        self.calls.lock().unwrap().push(method.to_string());
        let res = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::CustomError(format!("No responses for {}", method)))?;
        serde_json::from_value(res).map_err(ProviderError::SerdeJson)
    }
}
