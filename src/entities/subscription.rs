use super::fields;
use super::{Member, Membership};
use crate::schema::EntityKind;

/// Subscription status meaning the member currently has access
pub const STATUS_ACTIVE: &str = "active";

entity_wrapper!(
    /// A recurring MemberPress subscription.
    Subscription,
    EntityKind::Subscription
);

impl Subscription {
    field_accessors!(ids: id);
    field_accessors!(
        strings: subscr_id,
        gateway,
        period_type,
        limit_cycles_action,
        limit_cycles_expires_type,
        status,
        tax_desc,
        tax_class,
        cc_last4,
        cc_exp_month,
        cc_exp_year,
        token
    );
    field_accessors!(
        counts: period,
        limit_cycles_num,
        limit_cycles_expires_after,
        trial_days
    );
    field_accessors!(
        amounts: price,
        trial_amount,
        trial_tax_amount,
        trial_total,
        total,
        tax_rate,
        tax_amount
    );
    field_accessors!(flags: limit_cycles, prorated_trial, trial, tax_compound, tax_shipping);
    field_accessors!(datetimes: created_at);
    field_accessors!(raw: coupon, response);

    /// Nested membership, when sent as an object
    pub fn membership(&self) -> Option<Membership> {
        fields::object(&self.fields, "membership").map(|m| Membership::new(m.clone()))
    }

    /// Nested member, when sent as an object
    /// Nested member object, when sent expanded
    pub fn member(&self) -> Option<Member> {
        fields::object(&self.fields, "member").map(|m| Member::new(m.clone()))
    }

    /// Membership id, whether sent as a scalar or a nested object
    pub fn membership_id(&self) -> Option<i64> {
        fields::reference_id(&self.fields, "membership")
    }

    /// Member id, scalar or nested
    pub fn member_id(&self) -> Option<i64> {
        fields::reference_id(&self.fields, "member")
    }

    /// Coupon id, scalar or nested
    pub fn coupon_id(&self) -> Option<i64> {
        fields::reference_id(&self.fields, "coupon")
    }

    /// True when the status is `active`
    pub fn is_active(&self) -> bool {
        self.status() == Some(STATUS_ACTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;
    use serde_json::json;

    #[test]
    fn test_subscription_accessors() {
        let sub = Subscription::from_value(&json!({
            "id": "12",
            "subscr_id": "sub_1LwZ",
            "gateway": "stripe",
            "price": "19.95",
            "period": 1,
            "period_type": "months",
            "status": "active",
            "created_at": "2022-10-07 22:21:58",
            "trial": "true",
            "trial_days": "7",
            "total": 19.95,
            "membership": {"id": 245, "title": "Monthly"},
            "member": 10,
            "coupon": 0,
            "cc_last4": "4242"
        }));

        assert_eq!(sub.id(), Some(12));
        assert_eq!(sub.subscr_id(), Some("sub_1LwZ"));
        assert_eq!(sub.price(), Some(19.95));
        assert_eq!(sub.total(), Some(19.95));
        assert_eq!(sub.period(), 1);
        assert!(sub.trial());
        assert_eq!(sub.trial_days(), 7);
        assert!(sub.created_at().is_some());
        assert!(sub.is_active());
        assert_eq!(sub.membership_id(), Some(245));
        assert_eq!(sub.membership().and_then(|m| m.id()), Some(245));
        assert_eq!(sub.member_id(), Some(10));
        assert!(sub.member().is_none());
        assert_eq!(sub.coupon_id(), Some(0));
        assert_eq!(sub.cc_last4(), Some("4242"));
        assert!(sub.is_minimum());
    }

    #[test]
    fn test_inactive_and_empty() {
        let sub = Subscription::from_value(&json!({"status": "suspended"}));
        assert!(!sub.is_active());

        let sub = Subscription::default();
        assert!(!sub.is_active());
        assert_eq!(sub.id(), None);
        assert_eq!(sub.trial_days(), 0);
        assert!(sub.created_at().is_none());
        assert!(!sub.is_minimum());
    }
}
