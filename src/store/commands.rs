use serde::Serialize;
use serde_json::Value;

/// One field mutation inside an atomic compound write.
///
/// Array fields mutated through `SetAdd`/`SetRemove`/`ToggleMember` carry
/// set semantics: applying the same operation twice leaves the same state,
/// which is what makes client-driven retries safe.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldOp {
    /// Add `value` to an array field unless it is already a member.
    SetAdd { field: String, value: Value },
    /// Remove every occurrence of `value` from an array field.
    SetRemove { field: String, value: Value },
    /// Add `delta` to a numeric field.
    Increment { field: String, delta: i64 },
    /// Append `value` to an array field. When `stamp` is set, the server
    /// write time (epoch millis) is written into that key of the value
    /// before appending.
    Append {
        field: String,
        value: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        stamp: Option<String>,
    },
    /// Flip membership of `value` in `set_field` and move `count_field` in
    /// step, deciding from the live document state. The script pushes the
    /// resulting membership (`true` = now a member) into the reply.
    ToggleMember {
        set_field: String,
        count_field: String,
        value: Value,
    },
}

/// Compound write against a single document, applied all-or-nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePlan {
    pub ops: Vec<FieldOp>,
    /// Seed document written first when the target does not exist yet.
    /// Shipped pre-serialized so the script never re-encodes it (cjson
    /// cannot tell an empty array from an empty object).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensure_json: Option<String>,
}

impl UpdatePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_add(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.ops.push(FieldOp::SetAdd {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn set_remove(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.ops.push(FieldOp::SetRemove {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn increment(mut self, field: &str, delta: i64) -> Self {
        self.ops.push(FieldOp::Increment {
            field: field.to_string(),
            delta,
        });
        self
    }

    pub fn append_stamped(mut self, field: &str, value: Value, stamp: &str) -> Self {
        self.ops.push(FieldOp::Append {
            field: field.to_string(),
            value,
            stamp: Some(stamp.to_string()),
        });
        self
    }

    pub fn toggle_member(mut self, set_field: &str, count_field: &str, value: impl Into<Value>) -> Self {
        self.ops.push(FieldOp::ToggleMember {
            set_field: set_field.to_string(),
            count_field: count_field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn ensure(mut self, seed: &Value) -> Self {
        self.ensure_json = Some(seed.to_string());
        self
    }
}

/// Envelope decoded by `document_update.lua`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateEnvelope<'a> {
    /// Document id, echoed as the notification payload.
    pub id: &'a str,
    #[serde(flatten)]
    pub plan: &'a UpdatePlan,
}

/// Envelope decoded by `document_create.lua`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateEnvelope<'a> {
    pub id: &'a str,
    /// Full document, pre-serialized (see `UpdatePlan::ensure_json`).
    pub payload_json: String,
    /// Field stamped with the server write time (epoch millis).
    pub created_at_field: &'a str,
}

/// Envelope decoded by `profile_save.lua`.
#[derive(Debug, Serialize)]
pub(crate) struct ProfileSaveEnvelope<'a> {
    pub user_id: &'a str,
    pub display_name: &'a str,
    pub bio: &'a str,
    /// Seed document for the create branch, pre-serialized.
    pub seed_json: String,
}
