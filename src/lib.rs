// ============================================================================
// LazyPrice - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // API Binance
pub mod app;    // État de l'application TUI
pub mod config; // Configuration (.env / variables d'environnement)
pub mod error;  // Erreurs typées
pub mod models; // Structures de données
pub mod state;  // Poller de prix et chargeur de graphique
pub mod ui;     // Interface utilisateur
