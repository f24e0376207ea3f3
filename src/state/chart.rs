// ============================================================================
// ChartLoader : chargement des chandelles à la demande
// ============================================================================
// Expose la plage sélectionnée et le graphique chargé (série + configuration).
//
// - select(range) : met à jour la plage, récupère les chandelles, puis
//   remplace série et configuration d'un seul coup
// - En cas d'échec : le graphique précédent reste affiché, l'erreur est loguée
// - Sélections rapides : seule la dernière sélection est appliquée
// ============================================================================

use std::sync::Arc;

use chrono::FixedOffset;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::MarketApi;
use crate::config::Config;
use crate::error::FetchError;
use crate::models::{ChartData, ChartDisplayConfig, ChartSeries, RangeKey};
use crate::state::gate::RequestGate;

/// Graphique chargé : série et configuration issues de la même réponse
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedChart {
    pub range: RangeKey,
    pub series: ChartSeries,
    pub options: ChartDisplayConfig,
}

/// Ce que l'UI lit
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    /// Plage surlignée dans les onglets
    pub selected: RangeKey,

    /// None tant qu'aucun chargement n'a réussi
    pub chart: Option<LoadedChart>,
}

/// Chargeur de graphique pour un symbole
///
/// CONCEPT RUST : Clone bon marché
/// - Tout l'état est derrière un Arc, cloner ne copie qu'un pointeur
/// - Permet de spawner select() depuis la boucle d'événements
#[derive(Clone)]
pub struct ChartLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    api: Arc<dyn MarketApi>,
    symbol: String,
    dataset_label: String,
    initial_range: RangeKey,
    offset: FixedOffset,
    view: watch::Sender<ChartView>,
    gate: RequestGate,
}

impl ChartLoader {
    pub fn new(api: Arc<dyn MarketApi>, config: &Config) -> Self {
        let (view, _) = watch::channel(ChartView {
            selected: config.initial_range,
            chart: None,
        });

        Self {
            inner: Arc::new(LoaderInner {
                api,
                symbol: config.symbol.clone(),
                dataset_label: config.dataset_label(),
                initial_range: config.initial_range,
                offset: config.label_offset(),
                view,
                gate: RequestGate::new(),
            }),
        }
    }

    /// Ouvre le chargeur et charge la plage initiale
    pub async fn activate(&self) {
        self.inner.gate.open();
        info!(symbol = %self.inner.symbol, range = %self.inner.initial_range, "Activating chart loader");
        self.select(self.inner.initial_range).await;
    }

    /// Ferme le chargeur : les réponses en vol sont ignorées
    pub fn deactivate(&self) {
        self.inner.gate.close();
        info!(symbol = %self.inner.symbol, "Deactivated chart loader");
    }

    /// Sélectionne une plage et charge ses chandelles
    pub async fn select(&self, range: RangeKey) {
        let inner = &self.inner;
        if !inner.gate.is_open() {
            debug!(range = %range, "Ignoring selection on inactive chart loader");
            return;
        }

        let ticket = inner.gate.issue();
        inner.view.send_if_modified(|view| {
            let changed = view.selected != range;
            view.selected = range;
            changed
        });

        debug!(range = %range, generation = ticket.generation(), "Loading chart range");
        let loaded = match self.load(range).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(range = %range, error = %e, "Failed to load chart data");
                return;
            }
        };

        let points = loaded.series.len();
        let applied = inner.view.send_if_modified(|view| {
            if !inner.gate.is_current(ticket) {
                return false;
            }
            view.chart = Some(loaded);
            true
        });

        if applied {
            info!(range = %range, points, "Chart data loaded");
        } else {
            debug!(range = %range, generation = ticket.generation(), "Discarded stale chart response");
        }
    }

    pub async fn select_today(&self) {
        self.select(RangeKey::Today).await
    }

    pub async fn select_week(&self) {
        self.select(RangeKey::Week).await
    }

    pub async fn select_month(&self) {
        self.select(RangeKey::Month).await
    }

    pub async fn select_six_months(&self) {
        self.select(RangeKey::SixMonths).await
    }

    pub async fn select_year(&self) {
        self.select(RangeKey::Year).await
    }

    /// Copie de la vue courante
    pub fn snapshot(&self) -> ChartView {
        self.inner.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChartView> {
        self.inner.view.subscribe()
    }

    /// Payload {labels, datasets} du graphique affiché
    pub fn chart_data(&self) -> Option<ChartData> {
        self.inner
            .view
            .borrow()
            .chart
            .as_ref()
            .map(|chart| chart.series.to_chart_data(&self.inner.dataset_label))
    }

    /// Récupère et transforme les chandelles (sans toucher à l'état)
    async fn load(&self, range: RangeKey) -> Result<LoadedChart, FetchError> {
        let candles = self.inner.api.candles(&self.inner.symbol, range).await?;
        let series = ChartSeries::from_candles(&candles, &self.inner.offset)?;
        let options = ChartDisplayConfig::for_series(&series);

        Ok(LoadedChart {
            range,
            series,
            options,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{candles_closing_at, server_error, MockApi};

    fn loader(api: &Arc<MockApi>) -> ChartLoader {
        let config = Config {
            utc_labels: true,
            ..Config::default()
        };
        ChartLoader::new(api.clone(), &config)
    }

    async fn wait_for_candle_calls(api: &MockApi, count: usize) {
        while api.candle_calls().len() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_activate_loads_today() {
        let api = Arc::new(MockApi::new());
        api.push_candles(RangeKey::Today, Ok(candles_closing_at(&[100.0, 200.0])));
        let loader = loader(&api);

        loader.activate().await;

        assert_eq!(api.candle_calls(), vec![RangeKey::Today]);
        let view = loader.snapshot();
        assert_eq!(view.selected, RangeKey::Today);

        let chart = view.chart.unwrap();
        assert_eq!(chart.range, RangeKey::Today);
        assert_eq!(chart.series.values, vec![100.0, 200.0]);
        assert_eq!(chart.series.labels, vec!["Nov 14, 10 PM", "Nov 14, 11 PM"]);

        let (min, max) = chart.options.y_bounds();
        assert!((min - 99.0).abs() < 1e-9);
        assert!((max - 202.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_series_matches_candle_count() {
        let api = Arc::new(MockApi::new());
        let closes: Vec<f64> = (0..168).map(|i| 30_000.0 + i as f64 * 12.5).collect();
        api.push_candles(RangeKey::Week, Ok(candles_closing_at(&closes)));
        let loader = loader(&api);

        loader.select_week().await;

        let chart = loader.snapshot().chart.unwrap();
        assert_eq!(chart.series.labels.len(), 168);
        assert_eq!(chart.series.values.len(), 168);

        let (min, max) = chart.options.y_bounds();
        for value in &chart.series.values {
            assert!(min <= *value && *value <= max);
        }
    }

    #[tokio::test]
    async fn test_same_range_twice_is_identical() {
        let api = Arc::new(MockApi::new());
        api.push_candles(RangeKey::Month, Ok(candles_closing_at(&[1.0, 3.0, 2.0])));
        api.push_candles(RangeKey::Month, Ok(candles_closing_at(&[1.0, 3.0, 2.0])));
        let loader = loader(&api);

        loader.select_month().await;
        let first = loader.snapshot();
        loader.select_month().await;
        let second = loader.snapshot();

        assert_eq!(first, second);
        assert_eq!(api.candle_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_chart() {
        let api = Arc::new(MockApi::new());
        api.push_candles(RangeKey::Today, Ok(candles_closing_at(&[100.0, 200.0])));
        api.push_candles(RangeKey::Year, Err(server_error()));
        api.push_candles(RangeKey::SixMonths, Ok(Vec::new()));
        let loader = loader(&api);

        loader.select_today().await;
        let before = loader.snapshot().chart;

        loader.select_year().await;
        let view = loader.snapshot();
        assert_eq!(view.selected, RangeKey::Year);
        assert_eq!(view.chart, before);

        // Liste vide : traitée comme une erreur de parsing
        loader.select_six_months().await;
        assert_eq!(loader.snapshot().chart, before);
    }

    #[tokio::test]
    async fn test_last_selected_range_wins() {
        let api = Arc::new(MockApi::new());
        let week = api.defer_candles(RangeKey::Week);
        let month = api.defer_candles(RangeKey::Month);
        let loader = loader(&api);

        let week_task = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.select_week().await })
        };
        wait_for_candle_calls(&api, 1).await;

        let month_task = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.select_month().await })
        };
        wait_for_candle_calls(&api, 2).await;
        assert_eq!(api.candle_calls(), vec![RangeKey::Week, RangeKey::Month]);

        // Le mois répond en premier
        month.send(Ok(candles_closing_at(&[10.0, 20.0]))).unwrap();
        month_task.await.unwrap();

        // La semaine répond en dernier : réponse périmée
        week.send(Ok(candles_closing_at(&[1.0, 2.0, 3.0]))).unwrap();
        week_task.await.unwrap();

        let view = loader.snapshot();
        assert_eq!(view.selected, RangeKey::Month);
        let chart = view.chart.unwrap();
        assert_eq!(chart.range, RangeKey::Month);
        assert_eq!(chart.series.values, vec![10.0, 20.0]);
    }

    #[tokio::test]
    async fn test_deactivate_discards_in_flight() {
        let api = Arc::new(MockApi::new());
        let reply = api.defer_candles(RangeKey::Today);
        let loader = loader(&api);

        let task = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.activate().await })
        };
        wait_for_candle_calls(&api, 1).await;

        loader.deactivate();
        reply.send(Ok(candles_closing_at(&[5.0]))).unwrap();
        task.await.unwrap();

        assert_eq!(loader.snapshot().chart, None);

        // Chargeur inactif : aucune requête
        loader.select_week().await;
        assert_eq!(api.candle_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_chart_data_payload() {
        let api = Arc::new(MockApi::new());
        api.push_candles(RangeKey::Today, Ok(candles_closing_at(&[100.0, 200.0])));
        let loader = loader(&api);
        assert!(loader.chart_data().is_none());

        loader.activate().await;

        let data = loader.chart_data().unwrap();
        assert_eq!(data.labels.len(), 2);
        assert_eq!(data.datasets[0].label, "Bitcoin Price (USD)");
        assert_eq!(data.datasets[0].data, vec![100.0, 200.0]);
    }
}
