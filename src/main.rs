// ============================================================================
// LazyPrice : prix crypto en direct et graphique historique
// ============================================================================
// Programme TUI qui affiche le prix courant d'un symbole Binance (rafraîchi
// toutes les 3 secondes) et le graphique des clôtures pour une plage choisie
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop synchrone + runtime tokio pour les tâches async
// 3. tokio::sync::watch : l'UI lit les derniers états publiés
// 4. RAII : le poller s'arrête quand il est droppé
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazyprice::api::{BinanceClient, MarketApi};
use lazyprice::app::{App, AppCommand};
use lazyprice::config::Config;
use lazyprice::state::{ChartLoader, PricePoller};
use lazyprice::ui::{events::EventHandler, render, Event};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier, avec rotation quotidienne
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/lazyprice/logs
/// - macOS : ~/Library/Application Support/lazyprice/logs
/// - Windows : C:\Users\<user>\AppData\Local\lazyprice\logs
/// - Sinon (ou si la création échoue) : ./logs
fn log_dir() -> PathBuf {
    let fallback = PathBuf::from("./logs");

    match dirs::data_local_dir() {
        Some(dir) => {
            let dir = dir.join("lazyprice").join("logs");
            if std::fs::create_dir_all(&dir).is_ok() {
                dir
            } else {
                fallback
            }
        }
        None => fallback,
    }
}

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/lazyprice/logs/lazyprice.log.*
/// RUST_LOG=lazyprice=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyprice.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Utile pour suivre les tâches tokio
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour lazyprice, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyprice=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'installation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================
// CONCEPT RUST : Async dans sync
// - main() est synchrone (boucle TUI bloquante)
// - runtime.enter() rend tokio::spawn utilisable depuis ce thread
// - Les tâches (polling, chargements) tournent sur les workers du runtime
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyPrice starting up");

    let config = Config::from_env().context("Configuration invalide")?;
    info!(?config, "Configuration loaded");

    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let result = {
        let _guard = runtime.enter();
        run_session(&config)
    };

    // Les requêtes encore en vol ne bloquent pas la sortie
    runtime.shutdown_timeout(Duration::from_secs(1));

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Crée les unités de données, lance le TUI et nettoie à la fin
fn run_session(config: &Config) -> Result<()> {
    let client = BinanceClient::new(&config.api_base_url, config.request_timeout)
        .context("Échec de la création du client HTTP")?;
    let api: Arc<dyn MarketApi> = Arc::new(client);

    // Unités de données
    let mut poller = PricePoller::new(Arc::clone(&api), config);
    let loader = ChartLoader::new(api, config);

    poller.start();
    {
        let loader = loader.clone();
        tokio::spawn(async move { loader.activate().await });
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(config);
    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &poller, &loader);

    // Teardown : plus aucune réponse n'est appliquée
    poller.stop();
    loader.deactivate();

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    result
}

// ============================================================================
// Event loop
// ============================================================================
// Render → Input → Update, jusqu'à ce que app.running devienne false
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    poller: &PricePoller,
    loader: &ChartLoader,
) -> Result<()> {
    let mut price_rx = poller.subscribe();
    let mut chart_rx = loader.subscribe();

    app.sync_price(poller.state());
    app.sync_chart(loader.snapshot());

    while app.is_running() {
        // ========================================
        // 0. SYNC : Copie les derniers états publiés
        // ========================================
        // CONCEPT : watch::Receiver::has_changed
        // - true si une nouvelle valeur a été publiée depuis la dernière lecture
        // - borrow_and_update() marque la valeur comme vue
        if price_rx.has_changed().unwrap_or(false) {
            app.sync_price(price_rx.borrow_and_update().clone());
        }
        if chart_rx.has_changed().unwrap_or(false) {
            app.sync_chart(chart_rx.borrow_and_update().clone());
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT
        // ========================================
        match events.next() {
            Ok(event) => {
                if let Some(command) = handle_event(app, event) {
                    dispatch(command, loader);
                }
            }
            Err(e) => warn!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Exécute une commande sur le runtime tokio
///
/// CONCEPT : Fire-and-forget
/// - La tâche n'est pas attendue : la boucle continue de dessiner
/// - Les sélections rapides se chevauchent, la dernière gagne
fn dispatch(command: AppCommand, loader: &ChartLoader) {
    match command {
        AppCommand::SelectRange(range) => {
            let loader = loader.clone();
            tokio::spawn(async move { loader.select(range).await });
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et retourne l'éventuelle commande async à lancer
fn handle_event(app: &mut App, event: Event) -> Option<AppCommand> {
    use lazyprice::ui::events::{
        is_escape_event, is_left_event, is_next_range_event, is_previous_range_event,
        is_quit_event, is_right_event, range_from_event,
    };

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step quit : première pression -> confirmation, deuxième -> quit
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
            None
        }

        Event::Key(_) if is_next_range_event(&event) => {
            app.cancel_quit();
            let command = app.next_range();
            info!(range = %app.selected_range(), "User changed to next range");
            Some(command)
        }

        Event::Key(_) if is_previous_range_event(&event) => {
            app.cancel_quit();
            let command = app.previous_range();
            info!(range = %app.selected_range(), "User changed to previous range");
            Some(command)
        }

        Event::Key(_) if is_left_event(&event) => {
            app.cancel_quit();
            app.cursor_left();
            None
        }

        Event::Key(_) if is_right_event(&event) => {
            app.cancel_quit();
            app.cursor_right();
            None
        }

        Event::Key(_) if is_escape_event(&event) => {
            app.cancel_quit();
            app.hide_cursor();
            None
        }

        Event::Key(_) => {
            // Toute autre touche annule la confirmation de quit
            app.cancel_quit();
            range_from_event(&event).map(|range| {
                info!(range = %range, "User selected range");
                app.select_range(range)
            })
        }

        Event::Tick => None,
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
