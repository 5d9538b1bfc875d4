//! Schema registry
//!
//! Field lists for the four MemberPress entity kinds. COMPLETE lists every
//! field the MemberPress REST API documents for the entity; MINIMUM lists the
//! fields needed to identify the entity and evaluate subscription status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The four MemberPress entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// WordPress user
    Member,
    /// Purchasable product
    Membership,
    /// Recurring billing agreement
    Subscription,
    /// Single payment
    Transaction,
}

impl EntityKind {
    /// Every entity kind
    pub const ALL: [EntityKind; 4] = [
        Self::Member,
        Self::Membership,
        Self::Subscription,
        Self::Transaction,
    ];

    /// Wire name, also the key under which the entity nests inside `data`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Membership => "membership",
            Self::Subscription => "subscription",
            Self::Transaction => "transaction",
        }
    }

    /// Every documented field of this entity
    pub fn complete_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Member => COMPLETE_MEMBER,
            Self::Membership => COMPLETE_MEMBERSHIP,
            Self::Subscription => COMPLETE_SUBSCRIPTION,
            Self::Transaction => COMPLETE_TRANSACTION,
        }
    }

    /// Fields required for business-rule evaluation
    pub fn minimum_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Member => MINIMUM_MEMBER,
            Self::Membership => MINIMUM_MEMBERSHIP,
            Self::Subscription => MINIMUM_SUBSCRIPTION,
            Self::Transaction => MINIMUM_TRANSACTION,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "membership" => Ok(Self::Membership),
            "subscription" => Ok(Self::Subscription),
            "transaction" => Ok(Self::Transaction),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

/// Ordered set of required field names
///
/// Insertion order is kept and duplicates are dropped, so composing a base
/// entity schema with auxiliary entity names yields a stable key list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    keys: Vec<&'static str>,
}

impl Schema {
    /// An empty schema, which every object satisfies
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a schema from a key list, dropping duplicates
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        let mut schema = Self::empty();
        schema.extend(keys);
        schema
    }

    /// Base schema of an entity kind followed by auxiliary entity names
    pub fn compose(base: Option<EntityKind>, related: &[EntityKind]) -> Self {
        let mut schema = Self::empty();
        if let Some(kind) = base {
            schema.extend(kind.complete_keys().iter().copied());
        }
        schema.extend(related.iter().map(EntityKind::as_str));
        schema
    }

    fn extend<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'static str>,
    {
        for key in keys {
            if !self.keys.contains(&key) {
                self.keys.push(key);
            }
        }
    }

    /// Field names in declaration order
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// Number of required keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when nothing is required
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether `key` is required
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| *k == key)
    }

    /// Keys of this schema absent from `object`
    pub fn missing_from(&self, object: &Map<String, Value>) -> Vec<&'static str> {
        self.keys
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect()
    }

    /// True when `object` carries every key of this schema
    pub fn is_satisfied_by(&self, object: &Map<String, Value>) -> bool {
        self.keys.iter().all(|key| object.contains_key(*key))
    }
}

const COMPLETE_MEMBER: &[&str] = &[
    "id",
    "email",
    "username",
    "nicename",
    "url",
    "message",
    "registered_at",
    "first_name",
    "last_name",
    "display_name",
    "active_memberships",
    "active_txn_count",
    "expired_txn_count",
    "trial_txn_count",
    "sub_count",
    "login_count",
    "first_txn",
    "latest_txn",
    "address",
    "profile",
    "recent_transactions",
    "recent_subscriptions",
];

const MINIMUM_MEMBER: &[&str] = &[
    "username",
    "recent_transactions",
    "recent_subscriptions",
    "active_memberships",
];

const COMPLETE_SUBSCRIPTION: &[&str] = &[
    "coupon",
    "membership",
    "member",
    "id",
    "subscr_id",
    "gateway",
    "price",
    "period",
    "period_type",
    "limit_cycles",
    "limit_cycles_num",
    "limit_cycles_action",
    "limit_cycles_expires_after",
    "limit_cycles_expires_type",
    "prorated_trial",
    "trial",
    "trial_days",
    "trial_amount",
    "trial_tax_amount",
    "trial_total",
    "status",
    "created_at",
    "total",
    "tax_rate",
    "tax_amount",
    "tax_desc",
    "tax_class",
    "cc_last4",
    "cc_exp_month",
    "cc_exp_year",
    "token",
    "tax_compound",
    "tax_shipping",
    "response",
];

const MINIMUM_SUBSCRIPTION: &[&str] = &["id", "status", "membership", "member"];

const COMPLETE_TRANSACTION: &[&str] = &[
    "membership",
    "member",
    "coupon",
    "subscription",
    "id",
    "amount",
    "total",
    "tax_amount",
    "tax_rate",
    "tax_desc",
    "tax_class",
    "trans_num",
    "status",
    "txn_type",
    "gateway",
    "prorated",
    "created_at",
    "expires_at",
    "corporate_account_id",
    "parent_transaction_id",
    "tax_compound",
    "tax_shipping",
    "response",
];

const MINIMUM_TRANSACTION: &[&str] = &["id", "status", "membership", "member", "expires_at"];

const COMPLETE_MEMBERSHIP: &[&str] = &[
    "id",
    "title",
    "content",
    "excerpt",
    "date",
    "status",
    "author",
    "date_gmt",
    "modified",
    "modified_gmt",
    "group",
    "price",
    "period",
    "period_type",
    "signup_button_text",
    "limit_cycles",
    "limit_cycles_num",
    "limit_cycles_action",
    "limit_cycles_expires_after",
    "limit_cycles_expires_type",
    "trial",
    "trial_days",
    "trial_amount",
    "trial_once",
    "group_order",
    "is_highlighted",
    "plan_code",
    "pricing_title",
    "pricing_show_price",
    "pricing_display",
    "custom_price",
    "pricing_heading_txt",
    "pricing_footer_txt",
    "pricing_button_txt",
    "pricing_button_position",
    "pricing_benefits",
    "register_price_action",
    "register_price",
    "thank_you_page_enabled",
    "thank_you_page_type",
    "thank_you_message",
    "thank_you_page_id",
    "custom_login_urls_enabled",
    "custom_login_urls_default",
    "custom_login_urls",
    "expire_type",
    "expire_after",
    "expire_unit",
    "expire_fixed",
    "tax_exempt",
    "tax_class",
    "allow_renewal",
    "access_url",
    "disable_address_fields",
    "simultaneous_subscriptions",
    "use_custom_template",
    "custom_template",
    "customize_payment_methods",
    "custom_payment_methods",
    "customize_profile_fields",
    "custom_profile_fields",
    "cannot_purchase_message",
];

const MINIMUM_MEMBERSHIP: &[&str] = &["id", "title", "status"];
