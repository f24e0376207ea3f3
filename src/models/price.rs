// ============================================================================
// Structure : PriceState
// ============================================================================
// État publié par le poller de prix : dernier prix, dernière erreur, chargement
//
// CONCEPT RUST : Option<String>
// - None : pas encore de prix (ou pas d'erreur)
// - Some(..) : valeur disponible
// ============================================================================

use serde::{Deserialize, Serialize};

/// État courant du prix d'un symbole
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceState {
    /// Dernier prix connu, formaté avec exactement 2 décimales
    pub price: Option<String>,

    /// Message d'erreur de la dernière tentative (None si elle a réussi)
    pub error: Option<String>,

    /// Vrai tant qu'une requête est en cours
    pub loading: bool,
}

impl PriceState {
    /// Applique un prix reçu : formate et efface l'erreur
    pub fn apply_price(&mut self, value: f64) {
        self.price = Some(format_price(value));
        self.error = None;
    }

    /// Applique une erreur : le prix précédent est conservé
    pub fn apply_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Texte pour l'affichage
    pub fn display(&self) -> String {
        match (&self.price, &self.error) {
            (Some(price), _) => format!("${}", price),
            (None, Some(_)) => "N/A".to_string(),
            (None, None) => "Loading...".to_string(),
        }
    }
}

/// Formate un prix avec 2 décimales ("42000.5" -> "42000.50")
pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(42000.5), "42000.50");
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(1.005e3), "1005.00");
    }

    #[test]
    fn test_error_keeps_price() {
        let mut state = PriceState::default();
        state.apply_price(100.0);
        state.apply_error("Failed to fetch Bitcoin price.".to_string());

        assert_eq!(state.price.as_deref(), Some("100.00"));
        assert_eq!(state.error.as_deref(), Some("Failed to fetch Bitcoin price."));

        state.apply_price(101.25);
        assert_eq!(state.price.as_deref(), Some("101.25"));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_display() {
        let mut state = PriceState::default();
        assert_eq!(state.display(), "Loading...");

        state.apply_error("boom".to_string());
        assert_eq!(state.display(), "N/A");

        state.apply_price(42000.5);
        assert_eq!(state.display(), "$42000.50");
    }
}
