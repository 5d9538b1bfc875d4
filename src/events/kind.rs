//! MemberPress event kinds
//!
//! Every kind is fully described by three static facts: its wire name, the
//! entity it is primarily about, and the other entities its `data` nests.
//! The table below is the only place those facts live.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, Schema};

const NO_RELATED: &[EntityKind] = &[];

const MEMBERSHIP_MEMBER: &[EntityKind] = &[EntityKind::Membership, EntityKind::Member];

const MEMBERSHIP_MEMBER_SUBSCRIPTION: &[EntityKind] = &[
    EntityKind::Membership,
    EntityKind::Member,
    EntityKind::Subscription,
];

macro_rules! event_kinds {
    ($($variant:ident => $name:literal, $event_type:ident, $related:ident;)+) => {
        /// MemberPress webhook event types
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum EventKind {
            $(
                #[doc = concat!("`", $name, "`")]
                #[serde(rename = $name)]
                $variant,
            )+

            /// Catch-all for absent or unrecognized event names
            #[serde(rename = "unidentified-event", other)]
            Unidentified,
        }

        impl EventKind {
            /// Every identified kind, in wire-name order
            pub const ALL: &'static [EventKind] = &[$(Self::$variant),+];

            /// Wire name as sent in `payload.event`
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                    Self::Unidentified => UNIDENTIFIED_EVENT,
                }
            }

            /// Entity the event is primarily about; `None` when unidentified
            pub fn event_type(&self) -> Option<EntityKind> {
                match self {
                    $(Self::$variant => Some(EntityKind::$event_type),)+
                    Self::Unidentified => None,
                }
            }

            /// Other entities nested inside `data`
            pub fn related(&self) -> &'static [EntityKind] {
                match self {
                    $(Self::$variant => $related,)+
                    Self::Unidentified => &[],
                }
            }
        }

        impl FromStr for EventKind {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $($name => Self::$variant,)+
                    _ => Self::Unidentified,
                })
            }
        }
    };
}

/// Wire name of the fallback kind
pub const UNIDENTIFIED_EVENT: &str = "unidentified-event";

event_kinds! {
    AfterCcExpiresReminder => "after-cc-expires-reminder", Subscription, MEMBERSHIP_MEMBER;
    AfterMemberSignupReminder => "after-member-signup-reminder", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    AfterSignupAbandonedReminder => "after-signup-abandoned-reminder", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    AfterSubExpiresReminder => "after-sub-expires-reminder", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    BeforeCcExpiresReminder => "before-cc-expires-reminder", Subscription, MEMBERSHIP_MEMBER;
    BeforeSubExpiresReminder => "before-sub-expires-reminder", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    BeforeSubRenewsReminder => "before-sub-renews-reminder", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    BeforeSubTrialEnds => "before-sub-trial-ends", Subscription, MEMBERSHIP_MEMBER;
    Login => "login", Member, NO_RELATED;
    MemberAccountUpdated => "member-account-updated", Member, NO_RELATED;
    MemberAdded => "member-added", Member, NO_RELATED;
    MemberDeleted => "member-deleted", Member, NO_RELATED;
    MemberSignupCompleted => "member-signup-completed", Member, NO_RELATED;
    MpcaCourseCompleted => "mpca-course-completed", Member, NO_RELATED;
    MpcaCourseStarted => "mpca-course-started", Member, NO_RELATED;
    MpcaLessonCompleted => "mpca-lesson-completed", Member, NO_RELATED;
    MpcaLessonStarted => "mpca-lesson-started", Member, NO_RELATED;
    MpcaQuizAttemptCompleted => "mpca-quiz-attempt-completed", Member, NO_RELATED;
    NonRecurringTransactionCompleted => "non-recurring-transaction-completed", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    NonRecurringTransactionExpired => "non-recurring-transaction-expired", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    OfflinePaymentComplete => "offline-payment-complete", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    OfflinePaymentPending => "offline-payment-pending", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    OfflinePaymentRefunded => "offline-payment-refunded", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    RecurringTransactionCompleted => "recurring-transaction-completed", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    RecurringTransactionExpired => "recurring-transaction-expired", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    RecurringTransactionFailed => "recurring-transaction-failed", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    RenewalTransactionCompleted => "renewal-transaction-completed", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    SubAccountAdded => "sub-account-added", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    SubAccountRemoved => "sub-account-removed", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    SubscriptionCreated => "subscription-created", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionDowngradedToOneTime => "subscription-downgraded-to-one-time", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    SubscriptionDowngradedToRecurring => "subscription-downgraded-to-recurring", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionDowngraded => "subscription-downgraded", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionExpired => "subscription-expired", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionPaused => "subscription-paused", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionResumed => "subscription-resumed", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionStopped => "subscription-stopped", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionUpgradedToOneTime => "subscription-upgraded-to-one-time", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    SubscriptionUpgradedToRecurring => "subscription-upgraded-to-recurring", Subscription, MEMBERSHIP_MEMBER;
    SubscriptionUpgraded => "subscription-upgraded", Subscription, MEMBERSHIP_MEMBER;
    TransactionCompleted => "transaction-completed", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    TransactionExpired => "transaction-expired", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    TransactionFailed => "transaction-failed", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
    TransactionRefunded => "transaction-refunded", Transaction, MEMBERSHIP_MEMBER_SUBSCRIPTION;
}

impl EventKind {
    /// Look up a wire name; unknown names map to [`EventKind::Unidentified`]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Unidentified)
    }

    /// Check if this is a known event kind
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unidentified)
    }

    /// Value expected in `payload.type`; empty when unidentified
    pub fn type_name(&self) -> &'static str {
        self.event_type().map(|kind| kind.as_str()).unwrap_or("")
    }

    /// Required keys of `data`: the base entity's fields followed by the
    /// names of the related entities
    pub fn schema(&self) -> Schema {
        Schema::compose(self.event_type(), self.related())
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
