// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier (crossterm) et fournit des helpers pour les
// reconnaître
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : identifier la touche pressée
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::RangeKey;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Pas d'événement pendant le délai de poll : on redessine
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant au plus `tick_rate`)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on garde Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),

                // Release, resize, souris : simple redessin
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Flèche gauche : curseur du tooltip vers la gauche
pub fn is_left_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Left)
    } else {
        false
    }
}

/// Flèche droite : curseur du tooltip vers la droite
pub fn is_right_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Right)
    } else {
        false
    }
}

/// Vérifie si l'événement est 'l' (plage suivante)
pub fn is_next_range_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('l'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'h' (plage précédente)
pub fn is_previous_range_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('h'))
    } else {
        false
    }
}

/// Plage associée à une touche directe
///
/// - '1' à '5' : position dans les onglets
/// - 't' / 'w' / 'm' / 's' / 'y' : initiale de la plage
pub fn range_from_event(event: &Event) -> Option<RangeKey> {
    let Event::Key(key) = event else {
        return None;
    };

    match key.code {
        KeyCode::Char('1') | KeyCode::Char('t') => Some(RangeKey::Today),
        KeyCode::Char('2') | KeyCode::Char('w') => Some(RangeKey::Week),
        KeyCode::Char('3') | KeyCode::Char('m') => Some(RangeKey::Month),
        KeyCode::Char('4') | KeyCode::Char('s') => Some(RangeKey::SixMonths),
        KeyCode::Char('5') | KeyCode::Char('y') => Some(RangeKey::Year),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
