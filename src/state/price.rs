// ============================================================================
// PricePoller : récupération périodique du prix courant
// ============================================================================
// Publie un PriceState via un canal watch :
// - fetch_price() : une requête, met à jour prix / erreur / chargement
// - start() : une requête immédiate puis une toutes les `poll_interval`
// - stop() : arrête le timer, les réponses encore en vol sont ignorées
//
// Chaque tick lance sa requête sans attendre la précédente. Les réponses sont
// réconciliées par RequestGate : une réponse plus ancienne que la dernière
// appliquée est ignorée, quelle que soit la latence de l'API.
//
// CONCEPT RUST : tokio::sync::watch
// - Un Sender conserve la dernière valeur, les Receivers la lisent
// - Les lecteurs (UI) sont notifiés à chaque modification
// ============================================================================

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::MarketApi;
use crate::config::Config;
use crate::error::FetchError;
use crate::models::PriceState;
use crate::state::gate::RequestGate;

/// Poller de prix pour un symbole
pub struct PricePoller {
    inner: Arc<PollerInner>,
    period: Duration,

    /// Handle du timer : Some entre start() et stop()
    timer: Option<JoinHandle<()>>,
}

/// Partie partagée avec les tâches de fetch
struct PollerInner {
    api: Arc<dyn MarketApi>,
    symbol: String,
    display_name: String,
    state: watch::Sender<PriceState>,
    gate: RequestGate,
    in_flight: AtomicUsize,
}

impl PricePoller {
    /// Crée un poller (inactif) à partir de la configuration
    pub fn new(api: Arc<dyn MarketApi>, config: &Config) -> Self {
        let (state, _) = watch::channel(PriceState::default());

        Self {
            inner: Arc::new(PollerInner {
                api,
                symbol: config.symbol.clone(),
                display_name: config.display_name.clone(),
                state,
                gate: RequestGate::new(),
                in_flight: AtomicUsize::new(0),
            }),
            period: config.poll_interval,
            timer: None,
        }
    }

    /// Copie de l'état courant
    pub fn state(&self) -> PriceState {
        self.inner.state.borrow().clone()
    }

    /// Abonnement aux changements d'état
    pub fn subscribe(&self) -> watch::Receiver<PriceState> {
        self.inner.state.subscribe()
    }

    pub fn symbol(&self) -> &str {
        &self.inner.symbol
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Lance une récupération du prix
    ///
    /// La future ne dépend pas de `self` : elle peut être spawnée et
    /// continuer après un stop() (son résultat sera alors ignoré).
    pub fn fetch_price(&self) -> impl Future<Output = ()> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        async move { inner.fetch().await }
    }

    /// Démarre le polling : une requête immédiate puis une par période
    ///
    /// Doit être appelé dans un runtime tokio. Sans effet si déjà démarré.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }

        self.inner.gate.open();
        info!(symbol = %self.inner.symbol, period = ?self.period, "Starting price polling");

        let inner = Arc::clone(&self.inner);
        let period = self.period;
        self.timer = Some(tokio::spawn(async move {
            // Le premier tick de tokio::time::interval est immédiat
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let inner = Arc::clone(&inner);
                tokio::spawn(async move { inner.fetch().await });
            }
        }));
    }

    /// Arrête le polling
    ///
    /// Les requêtes en vol ne sont pas annulées, mais leurs réponses sont ignorées.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!(symbol = %self.inner.symbol, "Stopped price polling");
        }
        self.inner.gate.close();
    }
}

impl Drop for PricePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PollerInner {
    async fn fetch(&self) {
        let ticket = self.gate.issue();

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_if_modified(|state| {
            if !self.gate.is_open() {
                return false;
            }
            state.loading = true;
            true
        });

        debug!(symbol = %self.symbol, generation = ticket.generation(), "Fetching current price");
        let result = self.api.current_price(&self.symbol).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Err(e) = &result {
            warn!(symbol = %self.symbol, error = %e, "Failed to fetch price");
        }

        let mut applied = false;
        self.state.send_if_modified(|state| {
            let loading = self.in_flight.load(Ordering::SeqCst) > 0;

            // Seule la réponse la plus récente déjà arrivée est appliquée.
            // Après stop(), seul l'indicateur de chargement est mis à jour.
            if self.gate.try_apply(ticket) {
                match result {
                    Ok(price) => state.apply_price(price),
                    Err(e) => state.apply_error(self.error_message(&e)),
                }
                applied = true;
            } else if state.loading == loading {
                return false;
            }

            state.loading = loading;
            true
        });

        if !applied {
            debug!(generation = ticket.generation(), "Discarded stale price response");
        }
    }

    /// Message affiché à l'utilisateur pour une erreur
    fn error_message(&self, err: &FetchError) -> String {
        if err.is_status() {
            format!("Failed to fetch {} price.", self.display_name)
        } else {
            err.to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
