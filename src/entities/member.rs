use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use url::Url;

use super::fields;
use super::{Entity, Membership, Subscription, Transaction};
use crate::schema::EntityKind;

entity_wrapper!(
    /// A MemberPress member (WordPress user) as sent by the REST API and by
    /// member-family webhooks.
    Member,
    EntityKind::Member
);

impl Member {
    field_accessors!(strings: username, nicename, message, first_name, last_name, display_name);
    field_accessors!(ids: id);
    field_accessors!(
        counts: active_txn_count,
        expired_txn_count,
        trial_txn_count,
        sub_count,
        login_count
    );

    /// Email address, `None` unless syntactically valid
    pub fn email(&self) -> Option<&str> {
        fields::email(&self.fields, "email")
    }

    /// Profile URL, `None` unless an absolute http(s) URL
    pub fn url(&self) -> Option<Url> {
        fields::url(&self.fields, "url")
    }

    /// Registration timestamp
    pub fn registered_at(&self) -> Option<NaiveDateTime> {
        fields::member_datetime(&self.fields, "registered_at")
    }

    /// Memberships the member currently has access to
    pub fn active_memberships(&self) -> Vec<Membership> {
        fields::objects(&self.fields, "active_memberships")
            .into_iter()
            .map(|m| Membership::new(m.clone()))
            .collect()
    }

    /// Most recent subscriptions, newest first as sent
    pub fn recent_subscriptions(&self) -> Vec<Subscription> {
        fields::objects(&self.fields, "recent_subscriptions")
            .into_iter()
            .map(|s| Subscription::new(s.clone()))
            .collect()
    }

    /// Most recent transactions
    pub fn recent_transactions(&self) -> Vec<Transaction> {
        fields::objects(&self.fields, "recent_transactions")
            .into_iter()
            .map(|t| Transaction::new(t.clone()))
            .collect()
    }

    /// The member's first transaction (`first_txn`)
    pub fn first_transaction(&self) -> Option<Transaction> {
        fields::object(&self.fields, "first_txn").map(|t| Transaction::new(t.clone()))
    }

    /// The member's latest transaction (`latest_txn`)
    pub fn latest_transaction(&self) -> Option<Transaction> {
        fields::object(&self.fields, "latest_txn").map(|t| Transaction::new(t.clone()))
    }

    /// Billing address, empty when absent
    pub fn address(&self) -> Map<String, Value> {
        fields::object(&self.fields, "address").cloned().unwrap_or_default()
    }

    /// Custom profile fields, empty when absent
    pub fn profile(&self) -> Map<String, Value> {
        fields::object(&self.fields, "profile").cloned().unwrap_or_default()
    }

    /// True when any recent subscription is in the "active" state
    pub fn is_active_subscription(&self) -> bool {
        self.recent_subscriptions().iter().any(Subscription::is_active)
    }

    /// Business-rule fields absent from the object
    pub fn missing_minimum_keys(&self) -> Vec<&'static str> {
        Self::KIND
            .minimum_keys()
            .iter()
            .copied()
            .filter(|key| !self.fields.contains_key(*key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn valid_member() -> Member {
        Member::from_value(&json!({
            "id": "10",
            "email": "jon.spurling@crstrategypartners.com",
            "username": "JonSpurling81",
            "nicename": "jonspurling81",
            "url": "",
            "message": "",
            "registered_at": "2022-10-07 22:21:58",
            "first_name": "Jon",
            "last_name": "Spurling",
            "display_name": "Jon Spurling",
            "active_memberships": [{"id": 7, "title": "Monthly", "status": "publish"}],
            "active_txn_count": "1",
            "expired_txn_count": "0",
            "trial_txn_count": "1",
            "sub_count": null,
            "login_count": "1",
            "first_txn": {"id": "31", "status": "complete", "expires_at": "2022-11-07 22:21:58"},
            "latest_txn": {"id": "31", "status": "complete", "expires_at": "2022-11-07 22:21:58"},
            "address": {"mepr-address-city": "Austin"},
            "profile": {},
            "recent_transactions": [{"id": "31", "status": "complete"}],
            "recent_subscriptions": [{"id": "12", "status": "active"}]
        }))
    }

    #[test]
    fn test_valid_member_accessors() {
        let member = valid_member();
        let registered = NaiveDate::from_ymd_opt(2022, 10, 7)
            .unwrap()
            .and_hms_opt(22, 21, 58)
            .unwrap();

        assert_eq!(member.id(), Some(10));
        assert_eq!(member.email(), Some("jon.spurling@crstrategypartners.com"));
        assert_eq!(member.username(), Some("JonSpurling81"));
        assert_eq!(member.nicename(), Some("jonspurling81"));
        assert_eq!(member.url(), None);
        assert_eq!(member.message(), Some(""));
        assert_eq!(member.registered_at(), Some(registered));
        assert_eq!(member.display_name(), Some("Jon Spurling"));
        assert_eq!(member.active_txn_count(), 1);
        assert_eq!(member.expired_txn_count(), 0);
        assert_eq!(member.trial_txn_count(), 1);
        assert_eq!(member.sub_count(), 0);
        assert_eq!(member.login_count(), 1);

        assert!(member.is_complete());
        assert!(member.is_minimum());
        assert!(member.missing_minimum_keys().is_empty());

        assert_eq!(member.active_memberships().len(), 1);
        assert_eq!(member.recent_subscriptions().len(), 1);
        assert_eq!(member.recent_transactions().len(), 1);
        assert_eq!(member.first_transaction().and_then(|t| t.id()), Some(31));
        assert!(member.latest_transaction().is_some());
        assert_eq!(
            member.address().get("mepr-address-city"),
            Some(&json!("Austin"))
        );
        assert!(member.profile().is_empty());
        assert!(member.is_active_subscription());
    }

    #[test]
    fn test_empty_member() {
        let member = Member::default();

        assert_eq!(member.id(), None);
        assert_eq!(member.email(), None);
        assert_eq!(member.username(), None);
        assert_eq!(member.url(), None);
        assert_eq!(member.registered_at(), None);
        assert_eq!(member.active_txn_count(), 0);
        assert_eq!(member.expired_txn_count(), 0);
        assert_eq!(member.trial_txn_count(), 0);
        assert_eq!(member.login_count(), 0);

        assert!(!member.is_complete());
        assert!(!member.is_minimum());
        assert_eq!(member.missing_minimum_keys().len(), 4);
        assert!(member.active_memberships().is_empty());
        assert!(member.recent_subscriptions().is_empty());
        assert!(member.first_transaction().is_none());
        assert!(member.address().is_empty());
        assert!(!member.is_active_subscription());
    }

    #[test]
    fn test_two_digit_year_registration() {
        let member = Member::from_value(&json!({"registered_at": "10/04/22 00:46:37"}));
        let expected = NaiveDate::from_ymd_opt(2022, 10, 4)
            .unwrap()
            .and_hms_opt(0, 46, 37)
            .unwrap();
        assert_eq!(member.registered_at(), Some(expected));
    }

    #[test]
    fn test_bad_fields_degrade() {
        let member = Member::from_value(&json!({
            "id": "abc",
            "email": "mcdaniel-at-example",
            "url": "not a url",
            "registered_at": "sometime in october",
            "login_count": "many",
            "recent_subscriptions": "none"
        }));

        assert_eq!(member.id(), None);
        assert_eq!(member.email(), None);
        assert_eq!(member.url(), None);
        assert_eq!(member.registered_at(), None);
        assert_eq!(member.login_count(), 0);
        assert!(member.recent_subscriptions().is_empty());
    }

    #[test]
    fn test_inactive_subscriptions() {
        let member = Member::from_value(&json!({
            "recent_subscriptions": [{"status": "cancelled"}, {"status": "pending"}]
        }));
        assert!(!member.is_active_subscription());
    }

    #[test]
    fn test_profile_url() {
        let member = Member::from_value(&json!({"url": "https://lawrencemcdaniel.com"}));
        assert_eq!(
            member.url().map(|u| u.host_str().map(str::to_string)),
            Some(Some("lawrencemcdaniel.com".to_string()))
        );
    }
}
