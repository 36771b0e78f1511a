mod auth;
mod budget;
mod config;
mod dashboard;
mod models;
mod search;

use anyhow::Context;
use auth::{
    Credential, IdTokenProvider, IdentityProvider, IdentityStrategy, MagicLinkProvider,
    MemoryTokenStore,
};
use clap::Parser;
use config::Config;
use dashboard::{Dashboard, SearchOutcome};
use models::Country;
use search::{HostelFinder, SampleProvider, SearchProvider, SerpApiProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find hostels that fit your monthly budget")]
struct Args {
    /// Monthly income; without it the search is skipped
    #[arg(short, long)]
    income: Option<String>,

    /// Countries to search (Mexico, Colombia, Brazil, Vietnam, Thailand)
    #[arg(short, long = "country", value_delimiter = ',')]
    countries: Vec<Country>,

    /// ID token (google/oidc) or magic link URL (magic-link)
    #[arg(long, env = "HOSTEL_CREDENTIAL")]
    credential: Option<String>,

    /// Email to send a magic link to
    #[arg(long)]
    email: Option<String>,

    /// Where to write the results
    #[arg(short, long, default_value = "hostels.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = Config::from_env()?;

    info!("🛏️  HostelList");
    info!("==========================================");

    let provider: Arc<dyn SearchProvider> = match &cfg.serpapi_key {
        Some(key) => Arc::new(SerpApiProvider::with_base_url(
            key.clone(),
            cfg.serpapi_base_url.clone(),
            cfg.http_timeout,
        )?),
        None => {
            warn!("SERPAPI_KEY not set, searching sample hostels only");
            Arc::new(SampleProvider::new())
        }
    };

    let (identity, credential) = sign_in_material(&cfg, &args).await?;
    let finder = HostelFinder::new(provider);
    let finder_source = finder.source_name();
    let dashboard = Dashboard::new(finder, identity);

    let session = dashboard
        .sign_in(&credential)
        .await
        .context("Sign-in failed")?;
    info!("Welcome, {}", session.identity.name);

    dashboard.set_income(args.income.clone().unwrap_or_default()).await;
    dashboard.select_regions(args.countries.iter().copied()).await;

    if let Some(budget) = dashboard.budget().await {
        info!("Budget for 30-day stay: ${:.2}", budget.total);
    }

    info!(
        source = finder_source,
        regions = ?dashboard.regions().await,
        ready = dashboard.can_search().await,
        "Starting search"
    );

    match dashboard.search().await {
        SearchOutcome::Completed(count) => info!("\n✅ Found {} hostels\n", count),
        SearchOutcome::Skipped(reason) => {
            warn!(?reason, "Nothing to search");
            return Ok(());
        }
        SearchOutcome::Busy | SearchOutcome::Discarded => return Ok(()),
    }

    let listings = dashboard.listings().await;
    if listings.is_empty() {
        println!("No hostels found within your budget. Try increasing your monthly income or check back later.");
    }

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({}/night)", i + 1, listing.name, listing.price);
        println!("   {}, {}", listing.location, listing.country);
        println!("   ⭐ {}", listing.rating);
        println!("   30-day total: {}", listing.monthly_stay());
        println!("   Book: {}", listing.booking_url);
        println!();
    }

    let json = serde_json::to_string_pretty(&listings)?;
    tokio::fs::write(&args.output, json)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("💾 Saved {} hostels to {}", listings.len(), args.output.display());

    dashboard.sign_out().await;

    Ok(())
}

/// Build the configured identity provider and the credential to present to it
async fn sign_in_material(
    cfg: &Config,
    args: &Args,
) -> anyhow::Result<(Arc<dyn IdentityProvider>, Credential)> {
    match cfg.identity {
        IdentityStrategy::Google | IdentityStrategy::Oidc => {
            let provider = if cfg.identity == IdentityStrategy::Google {
                IdTokenProvider::google()
            } else {
                IdTokenProvider::oidc()
            };
            let token = args
                .credential
                .clone()
                .with_context(|| format!("{} sign-in needs --credential <ID token>", cfg.identity))?;
            Ok((
                Arc::new(provider) as Arc<dyn IdentityProvider>,
                Credential::IdToken(token),
            ))
        }
        IdentityStrategy::MagicLink => {
            let store = Arc::new(MemoryTokenStore::new());
            let provider = Arc::new(MagicLinkProvider::with_ttl(
                store,
                &cfg.magic_link_base_url,
                cfg.magic_link_ttl,
            )?);

            let link = match &args.credential {
                Some(url) => url.clone(),
                None => {
                    let email = args
                        .email
                        .as_deref()
                        .context("magic-link sign-in needs --email or --credential <link>")?;
                    let link = provider.issue(email).await?;
                    info!("📧 Sign-in link for {}: {}", link.email, link.url);
                    link.url
                }
            };

            Ok((
                provider as Arc<dyn IdentityProvider>,
                Credential::MagicLink(link),
            ))
        }
    }
}
