// ============================================================================
// RequestGate : jetons de génération pour les requêtes
// ============================================================================
// Chaque requête reçoit un ticket strictement croissant. Deux règles :
// - is_current : seul le dernier ticket émis compte (sélection utilisateur)
// - try_apply : tout ticket plus récent que le dernier appliqué passe
//   (polling, où un nouveau tick part avant la fin du précédent)
//
// - Réponses dans le désordre : l'ancienne est ignorée
// - Réponse après fermeture (teardown) : ignorée, même après réouverture
//
// CONCEPT RUST : Atomics
// - AtomicU64 / AtomicBool : partageables entre tâches sans Mutex
// ============================================================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Jeton associé à une requête
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct RequestGate {
    latest: AtomicU64,
    /// Plus grand ticket appliqué (ou barrière posée par close())
    applied: AtomicU64,
    open: AtomicBool,
}

impl RequestGate {
    /// Porte ouverte, aucun ticket émis
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            open: AtomicBool::new(true),
        }
    }

    /// Émet un nouveau ticket, qui devient le seul valide
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Vrai si la réponse portant ce ticket doit être appliquée
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.is_open() && self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Vrai si le ticket est plus récent que la dernière réponse appliquée
    ///
    /// Le ticket devient alors le dernier appliqué : un ticket plus ancien
    /// arrivant ensuite est refusé.
    pub fn try_apply(&self, ticket: Ticket) -> bool {
        self.is_open() && self.applied.fetch_max(ticket.0, Ordering::SeqCst) < ticket.0
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Ferme la porte et invalide tous les tickets en circulation
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        let fence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.applied.fetch_max(fence, Ordering::SeqCst);
    }

    /// Rouvre la porte (les anciens tickets restent invalides)
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new()
    }
}
