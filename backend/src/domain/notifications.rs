//! Best-effort notification fan-out over email.
//!
//! `EmailNotifier` implements the [`Notifier`] port: it loads the active
//! subscribers of a category, mints one unsubscribe link per recipient,
//! and sends one message per recipient so every mail carries its own
//! `List-Unsubscribe` target. Every failure path logs and swallows; the
//! mutation that triggered the fan-out must never fail on its account.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::domain::ports::{
    AutomationAnnouncement, Mailer, Notifier, OutboundEmail, SubscriberContact,
    SubscriptionRepository, TrendingDigestEntry,
};
use crate::domain::subscription::{SubscriptionCategory, SubscriptionId};
use crate::domain::unsubscribe_token::UnsubscribeTokenService;

/// Sender shown on announcement and digest mail.
const MAIL_FROM: &str = "poke.community <updates@emails.poke.community>";

/// Footer reminding recipients the site is an independent project.
const MAIL_FOOTER: &str =
    "poke.community is an independent community project and not affiliated with Poke.";

/// Public base URL of the site, normalised without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl(String);

impl SiteUrl {
    /// Wrap a configured base URL, trimming any trailing slash.
    pub fn new(base: impl AsRef<str>) -> Self {
        Self(base.as_ref().trim_end_matches('/').to_owned())
    }

    /// Join an absolute path onto the base URL.
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.0)
    }

    /// URL of one automation's detail page.
    pub fn automation_url(&self, slug: &str) -> String {
        self.join(&format!("/automations/{slug}"))
    }

    /// One-click unsubscribe URL for a subscription link.
    pub fn unsubscribe_url(
        &self,
        subscription_id: &SubscriptionId,
        category: SubscriptionCategory,
        token: &str,
    ) -> String {
        self.join(&format!(
            "/unsubscribe/{subscription_id}?type={}&token={token}",
            category.as_str()
        ))
    }
}

/// Email-backed notification dispatcher.
///
/// The mailer parameter may be a trait object so startup wiring can swap
/// in [`crate::domain::ports::DisabledMailer`] when no provider key is
/// configured.
pub struct EmailNotifier<S, M: ?Sized> {
    subscriptions: Arc<S>,
    mailer: Arc<M>,
    tokens: Arc<UnsubscribeTokenService>,
    site: SiteUrl,
}

impl<S, M: ?Sized> EmailNotifier<S, M> {
    /// Create a dispatcher over the given adapters.
    pub fn new(
        subscriptions: Arc<S>,
        mailer: Arc<M>,
        tokens: Arc<UnsubscribeTokenService>,
        site: SiteUrl,
    ) -> Self {
        Self {
            subscriptions,
            mailer,
            tokens,
            site,
        }
    }
}

impl<S, M> EmailNotifier<S, M>
where
    S: SubscriptionRepository,
    M: Mailer + ?Sized,
{
    fn unsubscribe_link(
        &self,
        contact: &SubscriberContact,
        category: SubscriptionCategory,
    ) -> Option<String> {
        match self.tokens.create_token(&contact.subscription_id, category) {
            Ok(token) => Some(self.site.unsubscribe_url(
                &contact.subscription_id,
                category,
                &token,
            )),
            Err(err) => {
                warn!(error = %err, "skipping recipient without unsubscribe token");
                None
            }
        }
    }

    async fn send_each(
        &self,
        category: SubscriptionCategory,
        contacts: Vec<SubscriberContact>,
        render: impl Fn(&str) -> (String, String, String),
    ) {
        for contact in contacts {
            let Some(unsubscribe_url) = self.unsubscribe_link(&contact, category) else {
                continue;
            };
            let (subject, html, text) = render(&unsubscribe_url);
            let email = OutboundEmail {
                from: MAIL_FROM.to_owned(),
                to: contact.email.as_ref().to_owned(),
                subject,
                html,
                text,
                headers: unsubscribe_headers(&unsubscribe_url),
            };
            if let Err(err) = self.mailer.send(&email).await {
                error!(error = %err, to = %contact.email, "notification send failed");
            }
        }
    }
}

#[async_trait]
impl<S, M> Notifier for EmailNotifier<S, M>
where
    S: SubscriptionRepository,
    M: Mailer + ?Sized,
{
    async fn automation_published(&self, announcement: &AutomationAnnouncement) {
        let contacts = match self
            .subscriptions
            .active_recipients(SubscriptionCategory::New, Some(announcement.author.clone()))
            .await
        {
            Ok(contacts) => contacts,
            Err(err) => {
                error!(error = %err, "unable to load announcement subscribers");
                return;
            }
        };
        if contacts.is_empty() {
            return;
        }

        let automation_url = self.site.automation_url(&announcement.slug);
        let title = announcement.title.clone();
        self.send_each(SubscriptionCategory::New, contacts, move |unsubscribe_url| {
            (
                format!("New automation on poke.community: {title}"),
                announcement_html(&title, &automation_url, unsubscribe_url),
                announcement_text(&title, &automation_url, unsubscribe_url),
            )
        })
        .await;
    }

    async fn trending_digest(&self, entries: &[TrendingDigestEntry]) {
        if entries.is_empty() {
            return;
        }
        let contacts = match self
            .subscriptions
            .active_recipients(SubscriptionCategory::Trending, None)
            .await
        {
            Ok(contacts) => contacts,
            Err(err) => {
                error!(error = %err, "unable to load digest subscribers");
                return;
            }
        };
        if contacts.is_empty() {
            return;
        }

        let html_items: String = entries
            .iter()
            .map(|entry| {
                format!(
                    "<li><a href=\"{}\">{}</a> - {} votes</li>",
                    self.site.automation_url(&entry.slug),
                    entry.title,
                    entry.vote_total
                )
            })
            .collect();
        let text_items: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                format!("{}. {} ({} votes)", index + 1, entry.title, entry.vote_total)
            })
            .collect();

        self.send_each(
            SubscriptionCategory::Trending,
            contacts,
            move |unsubscribe_url| {
                (
                    "Trending automations on poke.community".to_owned(),
                    trending_html(&html_items, unsubscribe_url),
                    trending_text(&text_items, unsubscribe_url),
                )
            },
        )
        .await;
    }
}

fn unsubscribe_headers(unsubscribe_url: &str) -> Vec<(String, String)> {
    vec![
        ("List-Unsubscribe".to_owned(), format!("<{unsubscribe_url}>")),
        (
            "List-Unsubscribe-Post".to_owned(),
            "List-Unsubscribe=One-Click".to_owned(),
        ),
    ]
}

fn announcement_html(title: &str, automation_url: &str, unsubscribe_url: &str) -> String {
    [
        "<p>Hey community,</p>".to_owned(),
        "<p>A new automation just dropped on <strong>poke.community</strong>:</p>".to_owned(),
        format!("<p><a href=\"{automation_url}\">{title}</a></p>"),
        "<p>Give it a look, vote, and let the creator know what you think.</p>".to_owned(),
        format!(
            "<p>If you no longer want to receive these updates you can \
             <a href=\"{unsubscribe_url}\">unsubscribe instantly</a>.</p>"
        ),
        "<hr />".to_owned(),
        format!("<small>{MAIL_FOOTER}</small>"),
    ]
    .join("")
}

fn announcement_text(title: &str, automation_url: &str, unsubscribe_url: &str) -> String {
    [
        "Hey community,".to_owned(),
        String::new(),
        "A new automation just dropped on poke.community:".to_owned(),
        title.to_owned(),
        automation_url.to_owned(),
        String::new(),
        "Vote and share your thoughts with the creator.".to_owned(),
        String::new(),
        format!("To unsubscribe instantly, visit: {unsubscribe_url}"),
        String::new(),
        MAIL_FOOTER.to_owned(),
    ]
    .join("\n")
}

fn trending_html(list_items: &str, unsubscribe_url: &str) -> String {
    [
        "<p>Here are the automations people loved this week:</p>".to_owned(),
        format!("<ul>{list_items}</ul>"),
        "<p>Vote for your favorites or submit your own automation on poke.community.</p>"
            .to_owned(),
        format!(
            "<p>If you'd rather not receive trending updates you can \
             <a href=\"{unsubscribe_url}\">unsubscribe here</a>.</p>"
        ),
        "<hr />".to_owned(),
        format!("<small>{MAIL_FOOTER}</small>"),
    ]
    .join("")
}

fn trending_text(lines: &[String], unsubscribe_url: &str) -> String {
    let mut parts = vec![
        "Here are the automations people loved this week:".to_owned(),
        String::new(),
    ];
    parts.extend(lines.iter().cloned());
    parts.extend([
        String::new(),
        "Submit your own automations or vote on others at poke.community.".to_owned(),
        String::new(),
        format!("To unsubscribe instantly, visit: {unsubscribe_url}"),
        String::new(),
        MAIL_FOOTER.to_owned(),
    ]);
    parts.join("\n")
}
