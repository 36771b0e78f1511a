use crate::auth::{AuthError, Credential, IdentityProvider, Session, SessionStore};
use crate::budget::{Budget, BudgetError, Income};
use crate::models::{Country, Listing};
use crate::search::HostelFinder;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Why a search request did nothing
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    SignedOut,
    InvalidIncome(BudgetError),
    NoRegions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Listings were replaced with this many results
    Completed(usize),
    Skipped(SkipReason),
    /// Another search is still running
    Busy,
    /// The user signed out while the search ran; results were dropped
    Discarded,
}

#[derive(Debug, Default)]
struct DashboardState {
    income: String,
    regions: BTreeSet<Country>,
    listings: Vec<Listing>,
}

/// Per-user view state: who is signed in, what they asked for, what was found
pub struct Dashboard {
    finder: HostelFinder,
    identity: Arc<dyn IdentityProvider>,
    sessions: SessionStore,
    state: RwLock<DashboardState>,
    loading: AtomicBool,
    generation: AtomicU64,
}

/// Clears the loading flag however the search ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Dashboard {
    pub fn new(finder: HostelFinder, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            finder,
            identity,
            sessions: SessionStore::new(),
            state: RwLock::new(DashboardState::default()),
            loading: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn sign_in(&self, credential: &Credential) -> Result<Session, AuthError> {
        let identity = self.identity.sign_in(credential).await?;
        Ok(self
            .sessions
            .establish(identity, self.identity.strategy())
            .await)
    }

    /// Forget the user and everything they entered
    pub async fn sign_out(&self) {
        // Bump under the state lock so a search either lands before the reset or sees the bump
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(session) = self.sessions.clear().await {
            info!(email = %session.identity.email, "Signed out");
        }
        *state = DashboardState::default();
    }

    pub async fn session(&self) -> Option<Session> {
        self.sessions.current().await
    }

    pub async fn set_income(&self, text: impl Into<String>) {
        self.state.write().await.income = text.into();
    }

    /// Budget for the current income text, if it is a usable number
    pub async fn budget(&self) -> Option<Budget> {
        let state = self.state.read().await;
        Income::parse(&state.income).ok().map(Budget::from_income)
    }

    /// Add the country if absent, remove it if present; returns whether it is now selected
    pub async fn toggle_region(&self, country: Country) -> bool {
        let mut state = self.state.write().await;
        if state.regions.remove(&country) {
            false
        } else {
            state.regions.insert(country);
            true
        }
    }

    pub async fn select_regions(&self, countries: impl IntoIterator<Item = Country>) {
        self.state.write().await.regions = countries.into_iter().collect();
    }

    pub async fn regions(&self) -> Vec<Country> {
        self.state.read().await.regions.iter().copied().collect()
    }

    pub async fn listings(&self) -> Vec<Listing> {
        self.state.read().await.listings.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn can_search(&self) -> bool {
        !self.is_loading() && self.check_ready().await.is_ok()
    }

    async fn check_ready(&self) -> Result<(Budget, Vec<Country>), SkipReason> {
        if self.sessions.current().await.is_none() {
            return Err(SkipReason::SignedOut);
        }
        let state = self.state.read().await;
        let income = Income::parse(&state.income).map_err(SkipReason::InvalidIncome)?;
        if state.regions.is_empty() {
            return Err(SkipReason::NoRegions);
        }
        Ok((
            Budget::from_income(income),
            state.regions.iter().copied().collect(),
        ))
    }

    /// Run a search for the current income and regions. Listings change only
    /// when the search completes.
    pub async fn search(&self) -> SearchOutcome {
        if self.loading.swap(true, Ordering::SeqCst) {
            debug!("Search already running");
            return SearchOutcome::Busy;
        }
        let _guard = LoadingGuard(&self.loading);

        // Taken before the session check so a sign-out anywhere after it is noticed
        let generation = self.generation.load(Ordering::SeqCst);

        let (budget, regions) = match self.check_ready().await {
            Ok(ready) => ready,
            Err(reason) => {
                debug!(?reason, "Search skipped");
                return SearchOutcome::Skipped(reason);
            }
        };

        info!(
            total = budget.total,
            daily_ceiling = budget.daily_ceiling,
            "Finding hostels"
        );

        let listings = self.finder.find(&budget, &regions).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Dropping results from before sign-out");
            return SearchOutcome::Discarded;
        }
        let count = listings.len();
        state.listings = listings;
        SearchOutcome::Completed(count)
    }
}
