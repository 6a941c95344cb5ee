//! Document Store Adapter.
//!
//! Wraps the Redis/RedisJSON primitives the rest of the crate relies on:
//!
//! - document creation with a server-assigned creation timestamp,
//! - atomic compound writes against one document (all ops commit or none),
//! - a lexicographic range scan over profile display names,
//! - collection subscriptions that deliver full ordered snapshots on every
//!   change notification.
//!
//! Compound writes run as a single Lua script invocation, which is what
//! gives them single-document atomicity; nothing here spans documents in
//! one transaction, so cross-document flows (the follow dual-write) are
//! built from two independent calls by the caller.

pub mod commands;
pub mod scripts;

use std::sync::Arc;

use futures_util::StreamExt;
use log::{debug, warn};
use redis::aio::ConnectionManager;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    config::Config,
    errors::SocialError,
    id::generate_document_id,
    keys::{KeyContext, split_lex_member},
};
use commands::{CreateEnvelope, ProfileSaveEnvelope, UpdateEnvelope, UpdatePlan};

/// Field every document stamps with its server-side creation time.
const CREATED_AT_FIELD: &str = "created_at";

/// Snapshot ordering over the collection's recency index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Handle to the store. Cheap to clone; all methods take `&self`.
#[derive(Clone)]
pub struct DocumentStore {
    conn: ConnectionManager,
    client: redis::Client,
    keys: KeyContext,
}

impl DocumentStore {
    pub async fn connect(config: &Config) -> Result<Self, SocialError> {
        let client = config.client()?;
        let conn = config.connection_manager().await?;
        Ok(Self {
            conn,
            client,
            keys: config.keys(),
        })
    }

    pub fn keys(&self) -> &KeyContext {
        &self.keys
    }

    /// Creates a document with a store-generated id, stamping `created_at`
    /// from the server clock and registering it in the recency index.
    pub async fn create_document(
        &self,
        collection: &'static str,
        id_field: &str,
        mut payload: Value,
    ) -> Result<String, SocialError> {
        let id = generate_document_id();
        payload[id_field] = Value::String(id.clone());

        let envelope = CreateEnvelope {
            id: &id,
            payload_json: payload.to_string(),
            created_at_field: CREATED_AT_FIELD,
        };
        let reply = self
            .invoke(
                &scripts::DOCUMENT_CREATE_SCRIPT,
                &[self.keys.document(collection, &id), self.keys.recency_index(collection)],
                &serialize_envelope(&envelope)?,
                &self.keys.channel(collection),
            )
            .await?;
        if let Some(err) = reply_error(&reply, collection, &id) {
            return Err(err);
        }

        debug!("created {collection} document {id}");
        Ok(id)
    }

    pub async fn read_document<T>(&self, collection: &'static str, id: &str) -> Result<Option<T>, SocialError>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.conn.clone();
        let key = self.keys.document(collection, id);
        let raw: Option<String> = redis::cmd("JSON.GET").arg(&key).query_async(&mut conn).await?;
        match raw {
            Some(json) => {
                let value = serde_json::from_str::<T>(&json).map_err(|err| {
                    SocialError::other(format!("failed to deserialize {collection} document {id}: {err}"))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Applies a compound write to one document; every op in the plan
    /// commits together or not at all. Returns the membership results of any
    /// `toggle_member` ops, in op order.
    ///
    /// A missing document fails with [`SocialError::NotFound`] unless the
    /// plan carries an `ensure` seed, which is written (and stamped) first.
    pub async fn atomic_update(
        &self,
        collection: &'static str,
        id: &str,
        plan: UpdatePlan,
    ) -> Result<Vec<bool>, SocialError> {
        let envelope = UpdateEnvelope { id, plan: &plan };
        let reply = self
            .invoke(
                &scripts::DOCUMENT_UPDATE_SCRIPT,
                &[self.keys.document(collection, id)],
                &serialize_envelope(&envelope)?,
                &self.keys.channel(collection),
            )
            .await?;
        if let Some(err) = reply_error(&reply, collection, id) {
            return Err(err);
        }

        debug!("applied {} op(s) to {collection} document {id}", plan.ops.len());
        let toggles = reply
            .get("results")
            .and_then(Value::as_array)
            .map(|results| results.iter().filter_map(Value::as_bool).collect())
            .unwrap_or_default();
        Ok(toggles)
    }

    /// Merges display name and bio into a profile document (creating it when
    /// absent) and keeps the display-name lex index in step, atomically.
    pub async fn save_profile(
        &self,
        user_id: &str,
        display_name: &str,
        bio: &str,
        seed: &Value,
    ) -> Result<(), SocialError> {
        let envelope = ProfileSaveEnvelope {
            user_id,
            display_name,
            bio,
            seed_json: seed.to_string(),
        };
        let reply = self
            .invoke(
                &scripts::PROFILE_SAVE_SCRIPT,
                &[
                    self.keys.document(crate::keys::collections::PROFILES, user_id),
                    self.keys.display_index(),
                ],
                &serialize_envelope(&envelope)?,
                &self.keys.channel(crate::keys::collections::PROFILES),
            )
            .await?;
        if let Some(err) = reply_error(&reply, crate::keys::collections::PROFILES, user_id) {
            return Err(err);
        }
        Ok(())
    }

    /// Lexicographic range scan over the display-name index. Returns
    /// `(display_name, user_id)` pairs ordered by display name, at most
    /// `limit` of them. Bounds are `[lower, upper_exclusive)`.
    pub async fn query_display_range(
        &self,
        lower: &str,
        upper_exclusive: &str,
        limit: usize,
    ) -> Result<Vec<(String, String)>, SocialError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = redis::cmd("ZRANGEBYLEX")
            .arg(self.keys.display_index())
            .arg(format!("[{lower}"))
            .arg(format!("({upper_exclusive}"))
            .arg("LIMIT")
            .arg(0)
            .arg(limit as i64)
            .query_async(&mut conn)
            .await?;

        Ok(members
            .iter()
            .filter_map(|member| split_lex_member(member))
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect())
    }

    /// Reads the full collection in recency order.
    pub async fn load_collection<T>(&self, collection: &'static str, order: SortOrder) -> Result<Vec<T>, SocialError>
    where
        T: DeserializeOwned,
    {
        load_documents(self.conn.clone(), self.keys.clone(), collection, order).await
    }

    /// Subscribes to a collection's change notifications. The listener task
    /// re-reads the full ordered result set on every notification (and once
    /// immediately) and publishes it as a replacement snapshot; dropping the
    /// returned handle tears the subscription down.
    pub async fn subscribe<T>(&self, collection: &'static str, order: SortOrder) -> Result<Subscription<T>, SocialError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let channel = self.keys.channel(collection);
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&channel).await?;

        let (sender, receiver) = watch::channel(Arc::new(Vec::new()));
        let conn = self.conn.clone();
        let keys = self.keys.clone();
        let task = tokio::spawn(async move {
            run_listener(pubsub, conn, keys, collection, order, sender).await;
        });

        Ok(Subscription { receiver, task })
    }

    async fn invoke(
        &self,
        script: &redis::Script,
        keys: &[String],
        envelope: &str,
        channel: &str,
    ) -> Result<Value, SocialError> {
        let mut conn = self.conn.clone();
        let mut invocation = script.prepare_invoke();
        for key in keys {
            invocation.key(key.as_str());
        }
        invocation.arg(envelope);
        invocation.arg(channel);
        let raw: String = invocation.invoke_async(&mut conn).await?;
        serde_json::from_str(&raw).map_err(|err| SocialError::other(format!("unreadable script reply: {err}")))
    }
}

/// Live handle to one collection subscription.
pub struct Subscription<T> {
    receiver: watch::Receiver<Arc<Vec<T>>>,
    task: JoinHandle<()>,
}

impl<T> Subscription<T> {
    /// Latest snapshot; empty until the first one has been delivered.
    pub fn latest(&self) -> Arc<Vec<T>> {
        self.receiver.borrow().clone()
    }

    /// A receiver observing every subsequent snapshot replacement.
    pub fn watch(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.receiver.clone()
    }

    /// Stops the listener; no snapshot is delivered after this returns.
    /// Dropping the subscription has the same effect.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_listener<T>(
    mut pubsub: redis::aio::PubSub,
    conn: ConnectionManager,
    keys: KeyContext,
    collection: &'static str,
    order: SortOrder,
    sender: watch::Sender<Arc<Vec<T>>>,
) where
    T: DeserializeOwned + Send + Sync + 'static,
{
    // First snapshot goes out without waiting for a write, so subscribers
    // start from the current state rather than an empty view.
    if !refresh(&conn, &keys, collection, order, &sender).await {
        return;
    }

    let mut messages = pubsub.on_message();
    while let Some(message) = messages.next().await {
        debug!("{collection} change notification: {:?}", message.get_payload::<String>().ok());
        if !refresh(&conn, &keys, collection, order, &sender).await {
            break;
        }
    }
}

/// Loads and publishes one snapshot. Returns `false` once every receiver is
/// gone and the listener should stop. A failed load is logged and skipped;
/// the next notification retries.
async fn refresh<T>(
    conn: &ConnectionManager,
    keys: &KeyContext,
    collection: &'static str,
    order: SortOrder,
    sender: &watch::Sender<Arc<Vec<T>>>,
) -> bool
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    match load_documents::<T>(conn.clone(), keys.clone(), collection, order).await {
        Ok(snapshot) => sender.send(Arc::new(snapshot)).is_ok(),
        Err(err) => {
            warn!("snapshot refresh for {collection} failed: {err}");
            !sender.is_closed()
        }
    }
}

async fn load_documents<T>(
    mut conn: ConnectionManager,
    keys: KeyContext,
    collection: &'static str,
    order: SortOrder,
) -> Result<Vec<T>, SocialError>
where
    T: DeserializeOwned,
{
    let mut range = redis::cmd("ZRANGE");
    range.arg(keys.recency_index(collection)).arg(0).arg(-1);
    if order == SortOrder::Desc {
        range.arg("REV");
    }
    let ids: Vec<String> = range.query_async(&mut conn).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut mget = redis::cmd("JSON.MGET");
    for id in &ids {
        mget.arg(keys.document(collection, id));
    }
    mget.arg("$");
    let payloads: Vec<Option<String>> = mget.query_async(&mut conn).await?;

    let mut documents = Vec::with_capacity(ids.len());
    for (id, payload) in ids.iter().zip(payloads) {
        let Some(payload) = payload else {
            warn!("document {id} is in the {collection} index but missing from the store");
            continue;
        };
        documents.push(parse_document(collection, &payload)?);
    }
    Ok(documents)
}

/// `JSON.MGET` with the `$` path wraps every document in a one-element array.
fn parse_document<T>(collection: &str, payload: &str) -> Result<T, SocialError>
where
    T: DeserializeOwned,
{
    let value: Value = serde_json::from_str(payload)
        .map_err(|err| SocialError::other(format!("unreadable {collection} document: {err}")))?;
    let document = match value {
        Value::Array(mut items) if !items.is_empty() => items.remove(0),
        other => other,
    };
    serde_json::from_value(document)
        .map_err(|err| SocialError::other(format!("failed to deserialize {collection} document: {err}")))
}

fn serialize_envelope<E: serde::Serialize>(envelope: &E) -> Result<String, SocialError> {
    serde_json::to_string(envelope).map_err(|err| SocialError::other(format!("failed to serialize command: {err}")))
}

fn reply_error(reply: &Value, collection: &'static str, id: &str) -> Option<SocialError> {
    let code = reply.get("err")?.as_str()?;
    Some(match code {
        "document_not_found" => SocialError::NotFound {
            collection,
            id: id.to_string(),
        },
        "document_exists" => SocialError::other(format!("document already exists in '{collection}': {id}")),
        other => SocialError::other(format!("store script rejected the write: {other}")),
    })
}
