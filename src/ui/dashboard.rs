// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'écran unique de l'application :
//
// ┌ header : symbole, prix (ou erreur), indicateur de chargement ┐
// ├ onglets : 1D 1W 1M 6M 1Y                                     ┤
// ├ graphique des clôtures + tooltip                             ┤
// └ footer : raccourcis clavier                                  ┘
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Widgets : Block, Paragraph, Tabs, Chart
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::models::RangeKey;
use crate::ui::chart;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_range_tabs(frame, app, chunks[1]);
    chart::render_chart(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

/// Crée le layout principal (header, onglets, graphique, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Onglets
            Constraint::Min(0),    // Graphique
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : prix courant
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ({}) ", app.display_name, app.symbol))
        .title_alignment(Alignment::Center);

    let mut spans = vec![Span::styled(
        app.price.display(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];

    // Le dernier prix connu reste affiché à côté de l'erreur
    if let Some(error) = &app.price.error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(error.clone(), Style::default().fg(Color::Red)));
    }

    if app.price.loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("⟳", Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Onglets des plages
// ============================================================================

fn render_range_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = RangeKey::all()
        .iter()
        .enumerate()
        .map(|(i, range)| Line::from(format!("{} {}", i + 1, range.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Range "))
        .select(app.selected_range().index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        );

    frame.render_widget(tabs, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[1-5 / t w m s y]", key),
            Span::raw(" Range  "),
            Span::styled("[h l]", key),
            Span::raw(" Prev/Next  "),
            Span::styled("[← →]", key),
            Span::raw(" Tooltip  "),
            Span::styled("[Esc]", key),
            Span::raw(" Hide"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
