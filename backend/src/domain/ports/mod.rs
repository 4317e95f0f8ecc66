//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`AutomationsQuery`, `SubscriptionsCommand`, ...) are the
//! use-case traits inbound adapters depend on; driven ports
//! (`AutomationRepository`, `Mailer`, ...) are the contracts outbound
//! adapters implement.

mod accounts;
mod automation_repository;
mod automations;
mod mailer;
mod notifier;
mod profile_repository;
mod subscription_repository;
mod subscriptions;
mod vote_repository;

#[cfg(test)]
pub use accounts::{MockAccountsCommand, MockAccountsQuery};
pub use accounts::{AccountsCommand, AccountsQuery};
#[cfg(test)]
pub use automation_repository::MockAutomationRepository;
pub use automation_repository::{
    AuthorSummary, AutomationChanges, AutomationFilter, AutomationRepository,
    AutomationRepositoryError, AutomationWithAuthor, NewAutomationRecord,
};
#[cfg(test)]
pub use automations::{MockAutomationsCommand, MockAutomationsQuery, MockVotesCommand};
pub use automations::{
    AutomationListing, AutomationsCommand, AutomationsQuery, CreatedAutomation,
    ListAutomationsRequest, ListingOrder, VoteReceipt, VotesCommand,
};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{DisabledMailer, Mailer, MailerError, OutboundEmail};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{
    AutomationAnnouncement, Notifier, SilentNotifier, TrendingDigestEntry,
};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{
    InMemorySubscriptionRepository, SubscriberContact, SubscriptionRepository,
    SubscriptionRepositoryError,
};
#[cfg(test)]
pub use subscriptions::{MockSubscriptionsCommand, MockSubscriptionsQuery};
pub use subscriptions::{SubscriptionsCommand, SubscriptionsQuery, UnsubscribeOutcome};
#[cfg(test)]
pub use vote_repository::MockVoteRepository;
pub use vote_repository::{InMemoryVoteRepository, VoteRepository, VoteRepositoryError};
