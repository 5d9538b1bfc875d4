//! The generic MemberPress event
//!
//! One type serves every event kind. The kind supplies the declared name,
//! type and schema; the event owns the raw payload, validates it once at
//! construction and builds entity wrappers on demand.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::kind::EventKind;
use crate::entities::{json_type_name, Entity, Member, Membership, Subscription, Transaction};
use crate::schema::{EntityKind, Schema};

/// Top-level keys every delivery must carry
pub const ENVELOPE_KEYS: [&str; 3] = ["event", "type", "data"];

static NULL: Value = Value::Null;

/// Why a delivery failed structural validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `payload.event` differs from the kind's wire name
    #[error("event name mismatch: expected {expected}, received {received:?}")]
    EventMismatch {
        /// Declared wire name
        expected: &'static str,
        /// Value found in the payload, if it was a string
        received: Option<String>,
    },

    /// `payload.type` differs from the kind's event type
    #[error("event type mismatch: expected {expected:?}, received {received:?}")]
    TypeMismatch {
        /// Declared event type
        expected: &'static str,
        /// Value found in the payload, if it was a string
        received: Option<String>,
    },

    /// One of `event`, `type` or `data` is absent
    #[error("payload is missing top-level keys: {0:?}")]
    MissingEnvelopeKeys(Vec<String>),

    /// `data` is present but not an object
    #[error("payload data is a {received}, not an object")]
    DataNotObject {
        /// JSON type actually received
        received: &'static str,
    },

    /// `data` lacks keys of the declared schema
    #[error("payload data is missing required keys: {0:?}")]
    MissingDataKeys(Vec<String>),

    /// The event name is absent or not part of the taxonomy
    #[error("unidentified event: {received:?}")]
    UnidentifiedEvent {
        /// Value found in `payload.event`, if it was a string
        received: Option<String>,
    },
}

/// Audit record of one delivery, handed to the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// Unique entry id
    pub id: Uuid,
    /// When the entry was created
    pub received_at: DateTime<Utc>,
    /// Site that sent the delivery, when known
    pub sender: Option<String>,
    /// Classified event name
    pub event: String,
    /// Whether the delivery passed validation
    pub is_valid: bool,
    /// Raw payload as received
    pub payload: Value,
}

/// One classified webhook delivery
#[derive(Debug)]
pub struct MemberpressEvent {
    kind: EventKind,
    payload: Value,
    schema: Schema,
    validation_error: Option<ValidationError>,
    member: OnceLock<Member>,
    membership: OnceLock<Membership>,
    subscription: OnceLock<Subscription>,
    transaction: OnceLock<Transaction>,
}

impl MemberpressEvent {
    /// Wrap `payload` as an event of `kind` and validate it
    ///
    /// Validation runs exactly once, here. A failure is logged at warn level
    /// and recorded; it never panics or returns an error.
    pub fn new(kind: EventKind, payload: Value) -> Self {
        let schema = kind.schema();
        let validation_error = validate(kind, &schema, &payload).err();

        match &validation_error {
            Some(err) => warn!(event = %kind, error = %err, "Invalid MemberPress webhook payload"),
            None => debug!(event = %kind, keys = schema.len(), "Validated MemberPress webhook payload"),
        }

        Self {
            kind,
            payload,
            schema,
            validation_error,
            member: OnceLock::new(),
            membership: OnceLock::new(),
            subscription: OnceLock::new(),
            transaction: OnceLock::new(),
        }
    }

    /// Classified kind
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Declared event name
    pub fn event(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Declared event type: "member", "subscription", "transaction", or
    /// empty for unidentified events
    pub fn event_type(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Event name as it appeared in the payload
    pub fn received_event_name(&self) -> Option<&str> {
        self.payload.get("event").and_then(Value::as_str)
    }

    /// The `data` object, `None` when absent or not an object
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.payload.get("data").and_then(Value::as_object)
    }

    /// The raw payload
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Required keys of `data`
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// True when the payload matched its kind's envelope and schema
    pub fn is_valid(&self) -> bool {
        self.validation_error.is_none()
    }

    /// First validation failure, `None` for valid events
    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    /// True when this event carries `entity`: either it is the event's own
    /// type or the schema names it
    pub fn has_entity(&self, entity: EntityKind) -> bool {
        self.kind.event_type() == Some(entity) || self.schema.contains(entity.as_str())
    }

    /// Whether the event carries a member
    pub fn has_member(&self) -> bool {
        self.has_entity(EntityKind::Member)
    }

    /// Whether the event carries a membership
    pub fn has_membership(&self) -> bool {
        self.has_entity(EntityKind::Membership)
    }

    /// Whether the event carries a subscription
    pub fn has_subscription(&self) -> bool {
        self.has_entity(EntityKind::Subscription)
    }

    /// Whether the event carries a transaction
    pub fn has_transaction(&self) -> bool {
        self.has_entity(EntityKind::Transaction)
    }

    /// The member, read from `data` for member events and from
    /// `data["member"]` otherwise
    pub fn member(&self) -> Option<&Member> {
        self.entity(&self.member)
    }

    /// The membership, read from `data["membership"]`
    pub fn membership(&self) -> Option<&Membership> {
        self.entity(&self.membership)
    }

    /// The subscription, read from `data` for subscription events and from
    /// `data["subscription"]` otherwise
    pub fn subscription(&self) -> Option<&Subscription> {
        self.entity(&self.subscription)
    }

    /// The transaction, read from `data` for transaction events and from
    /// `data["transaction"]` otherwise
    pub fn transaction(&self) -> Option<&Transaction> {
        self.entity(&self.transaction)
    }

    /// Audit record for this delivery
    pub fn log_entry(&self, sender: Option<String>) -> EventLogEntry {
        EventLogEntry {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            sender,
            event: self.event().to_string(),
            is_valid: self.is_valid(),
            payload: self.payload.clone(),
        }
    }

    fn entity<'a, T: Entity>(&'a self, cell: &'a OnceLock<T>) -> Option<&'a T> {
        if !self.has_entity(T::KIND) {
            return None;
        }
        Some(cell.get_or_init(|| T::from_value(self.entity_source(T::KIND))))
    }

    fn entity_source(&self, entity: EntityKind) -> &Value {
        let data = self.payload.get("data").unwrap_or(&NULL);
        if self.kind.event_type() == Some(entity) {
            data
        } else {
            data.get(entity.as_str()).unwrap_or(&NULL)
        }
    }
}

fn validate(kind: EventKind, schema: &Schema, payload: &Value) -> Result<(), ValidationError> {
    let received = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);

    if !kind.is_known() {
        return Err(ValidationError::UnidentifiedEvent {
            received: received("event"),
        });
    }

    if received("event").as_deref() != Some(kind.as_str()) {
        return Err(ValidationError::EventMismatch {
            expected: kind.as_str(),
            received: received("event"),
        });
    }

    if received("type").as_deref() != Some(kind.type_name()) {
        return Err(ValidationError::TypeMismatch {
            expected: kind.type_name(),
            received: received("type"),
        });
    }

    let missing: Vec<String> = ENVELOPE_KEYS
        .iter()
        .filter(|key| payload.get(**key).is_none())
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingEnvelopeKeys(missing));
    }

    let data = match payload.get("data") {
        Some(Value::Object(data)) => data,
        Some(other) => {
            return Err(ValidationError::DataNotObject {
                received: json_type_name(other),
            })
        }
        None => return Err(ValidationError::MissingEnvelopeKeys(vec!["data".to_string()])),
    };

    let missing = schema.missing_from(data);
    if !missing.is_empty() {
        return Err(ValidationError::MissingDataKeys(
            missing.into_iter().map(str::to_string).collect(),
        ));
    }

    Ok(())
}
