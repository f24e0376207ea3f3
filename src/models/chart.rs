// ============================================================================
// Structures : ChartSeries et ChartDisplayConfig
// ============================================================================
// Données prêtes à afficher, dérivées d'une réponse de chandelles
//
// - ChartSeries : labels (dates) et valeurs (clôtures), alignés par index
// - ChartDisplayConfig : bornes des axes, tooltip, visibilité axes/légende
//
// Les deux sont reconstruits à chaque chargement par des fonctions pures,
// jamais modifiés sur place.
// ============================================================================

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::error::FetchError;
use crate::models::Candle;

/// Format des labels : "Nov 14, 10 PM"
const LABEL_FORMAT: &str = "%b %-d, %-I %p";

/// Marge appliquée aux bornes de l'axe Y (1%)
const AXIS_PADDING: f64 = 0.01;

// ============================================================================
// ChartSeries
// ============================================================================

/// Série du graphique : un label et une valeur par chandelle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// Construit la série à partir des chandelles
    ///
    /// Échoue si la liste est vide ou si une chandelle est invalide :
    /// dans ce cas rien n'est produit (pas de série partielle).
    pub fn from_candles(candles: &[Candle], offset: &FixedOffset) -> Result<Self, FetchError> {
        if candles.is_empty() {
            return Err(FetchError::Parse("empty candle list".to_string()));
        }

        let mut labels = Vec::with_capacity(candles.len());
        let mut values = Vec::with_capacity(candles.len());

        for candle in candles {
            labels.push(format_label(candle.open_time, offset)?);
            values.push(candle.close_price()?);
        }

        Ok(Self { labels, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Payload {labels, datasets} pour un composant graphique
    pub fn to_chart_data(&self, dataset_label: &str) -> ChartData {
        ChartData {
            labels: self.labels.clone(),
            datasets: vec![ChartDataset {
                label: dataset_label.to_string(),
                fill: false,
                border_color: "white".to_string(),
                y_axis_id: "y".to_string(),
                tension: 0.4,
                data: self.values.clone(),
                point_radius: 0,
                point_hover_radius: 0,
            }],
        }
    }
}

/// Convertit une heure d'ouverture (ms) en label court
pub fn format_label(open_time_ms: i64, offset: &FixedOffset) -> Result<String, FetchError> {
    let datetime = DateTime::from_timestamp_millis(open_time_ms)
        .ok_or_else(|| FetchError::Parse(format!("invalid open time {}", open_time_ms)))?;

    Ok(datetime.with_timezone(offset).format(LABEL_FORMAT).to_string())
}

/// Bornes (min, max) de l'axe Y, chacune élargie de 1% de sa propre valeur
///
/// La marge utilise la valeur absolue : la borne basse descend toujours
/// et la borne haute monte toujours, même pour des valeurs négatives.
pub fn axis_bounds(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let (min, max) = values
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &v| (min.min(v), max.max(v)));

    Some((min - min.abs() * AXIS_PADDING, max + max.abs() * AXIS_PADDING))
}

// ============================================================================
// Payload graphique
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub fill: bool,
    pub border_color: String,
    #[serde(rename = "yAxisID")]
    pub y_axis_id: String,
    pub tension: f64,
    pub data: Vec<f64>,
    pub point_radius: u32,
    pub point_hover_radius: u32,
}

// ============================================================================
// ChartDisplayConfig
// ============================================================================

/// Configuration d'affichage, dérivée d'une série chargée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDisplayConfig {
    pub responsive: bool,
    pub interaction: Interaction,
    pub plugins: Plugins,
    pub scales: Scales,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Le tooltip suit l'index sous le curseur
    Index,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub mode: InteractionMode,
    pub intersect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: bool,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub enabled: bool,
    /// Suffixe ajouté à la valeur ("100 $")
    pub value_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub display: bool,
    pub grid: Grid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub draw_ticks: bool,
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_on_chart_area: Option<bool>,
}

impl ChartDisplayConfig {
    /// Construit la configuration pour une série
    ///
    /// Fonction pure : deux appels avec la même série donnent le même résultat.
    pub fn for_series(series: &ChartSeries) -> Self {
        let (min, max) = axis_bounds(&series.values).unwrap_or((0.0, 0.0));

        Self {
            responsive: true,
            interaction: Interaction {
                mode: InteractionMode::Index,
                intersect: false,
            },
            plugins: Plugins {
                legend: false,
                tooltip: Tooltip {
                    enabled: true,
                    value_suffix: "$".to_string(),
                },
            },
            scales: Scales {
                x: Axis {
                    display: false,
                    grid: Grid {
                        draw_ticks: false,
                        display: false,
                        draw_on_chart_area: Some(true),
                    },
                    begin_at_zero: None,
                    min: None,
                    max: None,
                },
                y: Axis {
                    display: false,
                    grid: Grid {
                        draw_ticks: false,
                        display: false,
                        draw_on_chart_area: None,
                    },
                    begin_at_zero: Some(true),
                    min: Some(min),
                    max: Some(max),
                },
            },
        }
    }

    /// Bornes de l'axe Y
    pub fn y_bounds(&self) -> (f64, f64) {
        (
            self.scales.y.min.unwrap_or(0.0),
            self.scales.y.max.unwrap_or(0.0),
        )
    }

    /// Titre du tooltip : le label du point survolé
    pub fn tooltip_title<'a>(&self, series: &'a ChartSeries, index: usize) -> Option<&'a str> {
        if !self.plugins.tooltip.enabled {
            return None;
        }
        series.labels.get(index).map(String::as_str)
    }

    /// Texte du tooltip : "{valeur} $"
    pub fn tooltip_label(&self, value: f64) -> String {
        format!("{} {}", value, self.plugins.tooltip.value_suffix)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
