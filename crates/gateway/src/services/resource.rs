use core::fmt::Display;
use core::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::GatewayClient;
use crate::error::ApiError;

/// Query-string parameters for list and report calls.
///
/// `skip`/`limit` map onto the backend's paging parameters; anything else is passed
/// through verbatim in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    filters: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(self.filters.len() + 2);
        if let Some(skip) = self.skip {
            query.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query.extend(self.filters.iter().cloned());
        query
    }
}

/// CRUD wrapper for one REST collection.
///
/// `T` is the decoded record type; `serde_json::Value` keeps the body untyped.
pub struct Resource<T = Value> {
    gateway: GatewayClient,
    path: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            path: self.path,
            _record: PhantomData,
        }
    }
}

impl<T> core::fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resource").field("path", &self.path).finish()
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(gateway: GatewayClient, path: &'static str) -> Self {
        Self {
            gateway,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub(crate) fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    /// Path of one record. The id is percent-encoded as a single segment.
    pub(crate) fn item_path(&self, id: impl Display) -> String {
        format!("{}/{}", self.path, urlencoding::encode(&id.to_string()))
    }

    pub async fn list(&self, params: &QueryParams) -> Result<Vec<T>, ApiError> {
        self.gateway
            .get(self.path)
            .query(&params.to_query())
            .send_json()
            .await
    }

    pub async fn get(&self, id: impl Display) -> Result<T, ApiError> {
        self.gateway.get(&self.item_path(id)).send_json().await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T, ApiError> {
        self.gateway.post(self.path).json(body).send_json().await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: impl Display,
        body: &B,
    ) -> Result<T, ApiError> {
        self.gateway
            .put(&self.item_path(id))
            .json(body)
            .send_json()
            .await
    }

    /// Delete a record. The backend answers with a confirmation message, returned as-is.
    pub async fn delete(&self, id: impl Display) -> Result<Value, ApiError> {
        self.gateway.delete(&self.item_path(id)).send_json().await
    }
}
