//! Domain entities, ports, and services.
//!
//! Purpose: define the strongly typed core of poke.community — automations,
//! votes, subscriptions, profiles — together with the hexagonal ports the
//! adapters plug into and the services that implement the driving ports.
//! Types are immutable where practical and document their invariants in
//! each type's Rustdoc.

pub mod accounts_service;
pub mod automation;
pub mod automations_service;
pub mod error;
pub mod notifications;
pub mod ports;
pub mod profile;
pub mod slug;
pub mod subscription;
pub mod subscriptions_service;
pub mod unsubscribe_token;
pub mod vote;

pub use self::accounts_service::AccountsService;
pub use self::automation::{Automation, AutomationForm, AutomationId};
pub use self::automations_service::AutomationsService;
pub use self::error::{DomainResult, Error, ErrorCode, TRACE_ID_HEADER};
pub use self::notifications::{EmailNotifier, SiteUrl};
pub use self::profile::{DisplayName, EmailAddress, Profile, SessionIdentity, UserId};
pub use self::subscription::{
    Subscription, SubscriptionCategory, SubscriptionId, SubscriptionPreferences,
};
pub use self::subscriptions_service::SubscriptionsService;
pub use self::unsubscribe_token::{SigningSecret, UnsubscribeTokenService};
pub use self::vote::{Vote, VoteStatistics, VoteTransition, VoteValue};
