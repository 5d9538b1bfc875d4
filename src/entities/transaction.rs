use chrono::NaiveDateTime;

use super::fields;
use super::{Member, Membership, Subscription};
use crate::schema::EntityKind;

/// Transaction status of a settled payment
pub const STATUS_COMPLETE: &str = "complete";

entity_wrapper!(
    /// A MemberPress payment transaction.
    Transaction,
    EntityKind::Transaction
);

impl Transaction {
    field_accessors!(ids: id, corporate_account_id, parent_transaction_id);
    field_accessors!(strings: tax_desc, tax_class, trans_num, status, txn_type, gateway);
    field_accessors!(amounts: amount, total, tax_amount, tax_rate);
    field_accessors!(flags: prorated, tax_compound, tax_shipping);
    field_accessors!(datetimes: created_at, expires_at);
    field_accessors!(raw: coupon, response);

    /// Nested membership object, when sent expanded
    pub fn membership(&self) -> Option<Membership> {
        fields::object(&self.fields, "membership").map(|m| Membership::new(m.clone()))
    }

    /// Nested member object, when sent expanded
    pub fn member(&self) -> Option<Member> {
        fields::object(&self.fields, "member").map(|m| Member::new(m.clone()))
    }

    /// Nested subscription object, when sent expanded
    pub fn subscription(&self) -> Option<Subscription> {
        fields::object(&self.fields, "subscription").map(|s| Subscription::new(s.clone()))
    }

    /// Membership id, scalar or nested
    pub fn membership_id(&self) -> Option<i64> {
        fields::reference_id(&self.fields, "membership")
    }

    /// Member id, scalar or nested
    pub fn member_id(&self) -> Option<i64> {
        fields::reference_id(&self.fields, "member")
    }

    /// Subscription id; `0` from MemberPress means a one-time payment
    pub fn subscription_id(&self) -> Option<i64> {
        fields::reference_id(&self.fields, "subscription")
    }

    /// Coupon id, scalar or nested
    pub fn coupon_id(&self) -> Option<i64> {
        fields::reference_id(&self.fields, "coupon")
    }

    /// True when the payment has settled
    pub fn is_complete_status(&self) -> bool {
        self.status() == Some(STATUS_COMPLETE)
    }

    /// True when the transaction carries an expiry and it lies before `now`
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.expires_at().is_some_and(|expires| expires < now)
    }
}
