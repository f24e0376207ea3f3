// ============================================================================
// Chart - Rendu du graphique des clôtures
// ============================================================================
// Affiche la série chargée sous forme de graphique ligne
//
// - Bornes de l'axe Y : celles de ChartDisplayConfig (min/max élargis de 1%)
// - Axes et légende : affichés selon les drapeaux de la configuration
// - Tooltip : point sous le curseur + ligne "{label}  {valeur} $"
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::chart::Axis as AxisOptions;
use crate::state::LoadedChart;

/// Dessine le graphique de la plage affichée
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let chart = match app.loaded_chart() {
        Some(chart) if !chart.series.is_empty() => chart,
        _ => {
            render_no_data(frame, area, "Chargement du graphique...");
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Graphique
            Constraint::Length(1), // Tooltip
        ])
        .split(area)
        .to_vec();

    render_chart_graph(frame, app, chart, chunks[0]);
    render_tooltip(frame, app, chunks[1]);
}

// ============================================================================
// Graphique principal
// ============================================================================

/// Convertit la série en points (index, clôture)
pub fn series_points(chart: &LoadedChart) -> Vec<(f64, f64)> {
    chart
        .series
        .values
        .iter()
        .enumerate()
        .map(|(i, value)| (i as f64, *value))
        .collect()
}

fn render_chart_graph(frame: &mut Frame, app: &App, chart: &LoadedChart, area: Rect) {
    let points = series_points(chart);
    let options = &chart.options;
    let (y_min, y_max) = options.y_bounds();
    let x_max = (points.len().saturating_sub(1) as f64).max(1.0);

    let mut datasets = vec![Dataset::default()
        .name(app.dataset_label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::White))
        .data(&points)];

    // Point survolé : dataset à un seul point, sans nom (hors légende)
    let cursor_point: Vec<(f64, f64)> = app
        .cursor
        .and_then(|index| points.get(index).copied())
        .into_iter()
        .collect();
    if !cursor_point.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Yellow))
                .data(&cursor_point),
        );
    }

    let first_label = chart.series.labels.first().cloned().unwrap_or_default();
    let last_label = chart.series.labels.last().cloned().unwrap_or_default();

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels(axis_labels(&options.scales.x, vec![first_label, last_label]));

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(axis_labels(
            &options.scales.y,
            vec![
                format!("{:.2}", y_min),
                format!("{:.2}", (y_min + y_max) / 2.0),
                format!("{:.2}", y_max),
            ],
        ));

    let mut widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} - {} ", app.dataset_label, chart.range.name())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    if !options.plugins.legend {
        widget = widget.legend_position(None);
    }

    frame.render_widget(widget, area);
}

/// Labels d'un axe, vides si l'axe est masqué
fn axis_labels<'a>(options: &AxisOptions, labels: Vec<String>) -> Vec<Span<'a>> {
    if !options.display {
        return Vec::new();
    }
    labels.into_iter().map(Span::raw).collect()
}

// ============================================================================
// Tooltip
// ============================================================================

fn render_tooltip(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.tooltip() {
        Some(tooltip) => Line::from(vec![
            Span::styled(tooltip.title, Style::default().fg(Color::Gray)),
            Span::raw("  "),
            Span::styled(
                tooltip.label,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from(Span::styled(
            "[← →] Tooltip",
            Style::default().fg(Color::DarkGray),
        )),
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

// ============================================================================
// Helper : Message quand pas de données
// ============================================================================

fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
