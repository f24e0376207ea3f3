// ============================================================================
// Structure : App
// ============================================================================
// État de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : l'UI ne lit que App
// 2. Snapshots : PriceState et ChartView sont recopiés depuis les canaux
//    watch à chaque frame, App ne partage rien avec les tâches tokio
// 3. Command pattern : les actions async sont décrites par AppCommand et
//    exécutées par la boucle principale
// ============================================================================

use crate::config::Config;
use crate::models::{PriceState, RangeKey};
use crate::state::{ChartView, LoadedChart};

/// Action async demandée par l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Charger le graphique d'une plage
    SelectRange(RangeKey),
}

/// Contenu du tooltip pour le point sous le curseur
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLine {
    pub title: String,
    pub label: String,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' -> true, deuxième -> quit
    pub confirm_quit: bool,

    pub symbol: String,
    pub display_name: String,

    /// Nom de la série ("Bitcoin Price (USD)")
    pub dataset_label: String,

    /// Dernier état du poller de prix
    pub price: PriceState,

    /// Dernier état du chargeur de graphique
    pub chart: ChartView,

    /// Index du point survolé (None : tooltip masqué)
    pub cursor: Option<usize>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            symbol: config.symbol.clone(),
            display_name: config.display_name.clone(),
            dataset_label: config.dataset_label(),
            price: PriceState::default(),
            chart: ChartView {
                selected: config.initial_range,
                chart: None,
            },
            cursor: None,
        }
    }

    // ========================================================================
    // Synchronisation avec les unités de données
    // ========================================================================

    pub fn sync_price(&mut self, price: PriceState) {
        self.price = price;
    }

    /// Remplace la vue du graphique
    ///
    /// Le curseur est ramené dans les bornes de la nouvelle série.
    pub fn sync_chart(&mut self, chart: ChartView) {
        self.chart = chart;

        let len = self.loaded_chart().map(|c| c.series.len()).unwrap_or(0);
        self.cursor = match self.cursor {
            Some(_) if len == 0 => None,
            Some(index) => Some(index.min(len - 1)),
            None => None,
        };
    }

    pub fn loaded_chart(&self) -> Option<&LoadedChart> {
        self.chart.chart.as_ref()
    }

    pub fn selected_range(&self) -> RangeKey {
        self.chart.selected
    }

    // ========================================================================
    // Plages
    // ========================================================================

    /// Demande le chargement d'une plage
    pub fn select_range(&mut self, range: RangeKey) -> AppCommand {
        self.chart.selected = range;
        AppCommand::SelectRange(range)
    }

    pub fn next_range(&mut self) -> AppCommand {
        let range = self.selected_range().next();
        self.select_range(range)
    }

    pub fn previous_range(&mut self) -> AppCommand {
        let range = self.selected_range().previous();
        self.select_range(range)
    }

    // ========================================================================
    // Curseur du tooltip
    // ========================================================================

    /// Déplace le curseur vers la gauche (apparaît sur le dernier point)
    pub fn cursor_left(&mut self) {
        let len = match self.loaded_chart() {
            Some(chart) if !chart.series.is_empty() => chart.series.len(),
            _ => return,
        };

        self.cursor = Some(match self.cursor {
            Some(index) => index.saturating_sub(1),
            None => len - 1,
        });
    }

    /// Déplace le curseur vers la droite (apparaît sur le dernier point)
    pub fn cursor_right(&mut self) {
        let len = match self.loaded_chart() {
            Some(chart) if !chart.series.is_empty() => chart.series.len(),
            _ => return,
        };

        self.cursor = Some(match self.cursor {
            Some(index) => (index + 1).min(len - 1),
            None => len - 1,
        });
    }

    pub fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    /// Tooltip du point sous le curseur
    pub fn tooltip(&self) -> Option<TooltipLine> {
        let index = self.cursor?;
        let chart = self.loaded_chart()?;

        let title = chart.options.tooltip_title(&chart.series, index)?;
        let value = chart.series.values.get(index)?;

        Some(TooltipLine {
            title: title.to_string(),
            label: chart.options.tooltip_label(*value),
        })
    }

    // ========================================================================
    // Quit
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::candles_closing_at;
    use crate::models::{ChartDisplayConfig, ChartSeries};
    use chrono::FixedOffset;

    fn loaded(range: RangeKey, closes: &[f64]) -> ChartView {
        let candles = candles_closing_at(closes);
        let utc = FixedOffset::east_opt(0).unwrap();
        let series = ChartSeries::from_candles(&candles, &utc).unwrap();
        let options = ChartDisplayConfig::for_series(&series);

        ChartView {
            selected: range,
            chart: Some(LoadedChart {
                range,
                series,
                options,
            }),
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::new(&Config::default());
        assert!(app.is_running());
        assert_eq!(app.selected_range(), RangeKey::Today);
        assert_eq!(app.price, PriceState::default());
        assert!(app.loaded_chart().is_none());
        assert!(app.tooltip().is_none());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new(&Config::default());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_range_cycle() {
        let mut app = App::new(&Config::default());

        assert_eq!(app.next_range(), AppCommand::SelectRange(RangeKey::Week));
        assert_eq!(app.selected_range(), RangeKey::Week);

        assert_eq!(app.previous_range(), AppCommand::SelectRange(RangeKey::Today));
        assert_eq!(app.previous_range(), AppCommand::SelectRange(RangeKey::Year));
    }

    #[test]
    fn test_cursor_moves_within_series() {
        let mut app = App::new(&Config::default());

        // Pas de graphique : le curseur reste masqué
        app.cursor_left();
        assert_eq!(app.cursor, None);

        app.sync_chart(loaded(RangeKey::Today, &[100.0, 200.0, 150.0]));

        app.cursor_left();
        assert_eq!(app.cursor, Some(2));
        app.cursor_left();
        app.cursor_left();
        app.cursor_left();
        assert_eq!(app.cursor, Some(0));

        app.cursor_right();
        assert_eq!(app.cursor, Some(1));

        app.hide_cursor();
        assert_eq!(app.cursor, None);
    }

    #[test]
    fn test_tooltip_line() {
        let mut app = App::new(&Config::default());
        app.sync_chart(loaded(RangeKey::Today, &[100.0, 200.0]));

        app.cursor_right();
        let tooltip = app.tooltip().unwrap();
        assert_eq!(tooltip.title, "Nov 14, 11 PM");
        assert_eq!(tooltip.label, "200 $");
    }

    #[test]
    fn test_sync_chart_clamps_cursor() {
        let mut app = App::new(&Config::default());
        app.sync_chart(loaded(RangeKey::Today, &[1.0, 2.0, 3.0, 4.0]));
        app.cursor_right();
        assert_eq!(app.cursor, Some(3));

        app.sync_chart(loaded(RangeKey::Month, &[1.0, 2.0]));
        assert_eq!(app.cursor, Some(1));
        assert_eq!(app.selected_range(), RangeKey::Month);

        app.sync_chart(ChartView {
            selected: RangeKey::Week,
            chart: None,
        });
        assert_eq!(app.cursor, None);
    }
}
