//! Weekly trending digest sender.
//!
//! Ranks automations by recent vote velocity and fans the digest out to
//! active "trending" subscribers. The binary performs one dispatch and
//! exits; scheduling (e.g. weekly cron) lives outside this repository.

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use poke_community::domain::ports::{
    AutomationsQuery, Notifier, SilentNotifier, TrendingDigestEntry,
};
use poke_community::domain::{
    AutomationsService, EmailNotifier, UnsubscribeTokenService,
};
use poke_community::outbound::email::ResendMailer;
use poke_community::outbound::persistence::{
    DbPool, DieselAutomationRepository, DieselSubscriptionRepository, DieselVoteRepository,
    PoolConfig,
};
use poke_community::server::AppConfig;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "send-trending-digest", about = "Send the weekly trending digest")]
struct Args {
    /// Number of automations to include in the digest.
    #[arg(long, default_value_t = 5)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;
    let api_key = config
        .resend_api_key
        .clone()
        .ok_or_else(|| eyre!("RESEND_API_KEY must be set to send the digest"))?;

    let pool = DbPool::new(PoolConfig::new(&config.database_url)).await?;
    let automations = Arc::new(DieselAutomationRepository::new(pool.clone()));
    let votes = Arc::new(DieselVoteRepository::new(pool.clone()));
    let subscriptions = Arc::new(DieselSubscriptionRepository::new(pool));
    let tokens = Arc::new(UnsubscribeTokenService::new(Some(
        config.unsubscribe_secret,
    )));

    // The catalogue service ranks; dispatch itself must not re-announce.
    let catalogue = AutomationsService::new(automations, votes, Arc::new(SilentNotifier));
    let ranked = catalogue.trending(None, args.limit).await?;
    let entries: Vec<TrendingDigestEntry> = ranked
        .into_iter()
        .map(|listing| TrendingDigestEntry {
            title: listing.automation.title,
            slug: listing.automation.slug,
            vote_total: listing.statistics.vote_total,
        })
        .collect();

    if entries.is_empty() {
        info!("no automations to feature; skipping digest");
        return Ok(());
    }

    let notifier = EmailNotifier::new(
        subscriptions,
        Arc::new(ResendMailer::new(api_key)?),
        tokens,
        config.site_url,
    );
    notifier.trending_digest(&entries).await;

    info!(entries = entries.len(), "trending digest dispatched");
    Ok(())
}
