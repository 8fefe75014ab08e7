use std::path::Path;

use sb_core::memory::{MemorySurface, RecordingPresenter};
use sb_core::{PassReport, RuntimeOptions, Session};

use crate::settings::{read_cards, read_settings};

pub struct SimulateOptions {
    pub settings_path: String,
    pub cards_path: String,
    /// Right-click and confirm the first card with this identity
    pub toggle: Option<String>,
    pub verbose: bool,
}

type OfflineSession = Session<MemorySurface, RecordingPresenter>;

pub fn run_simulate(opts: SimulateOptions) -> Result<(), String> {
    let record = read_settings(Path::new(&opts.settings_path))?;
    let cards = read_cards(Path::new(&opts.cards_path))?;
    let card_count = cards.len();

    let surface = MemorySurface::with_cards(cards);
    let mut session = Session::new(surface, RecordingPresenter::new(), &RuntimeOptions::default());

    let report = session.load(record);
    println!("Initial pass over {} cards", card_count);
    print_report(&session, &report, opts.verbose);

    if let Some(name) = opts.toggle.as_deref() {
        let key = session
            .surface()
            .all()
            .iter()
            .find(|card| card.identity.as_deref().map(str::trim) == Some(name))
            .map(|card| card.key())
            .ok_or_else(|| format!("No card with identity '{}'", name))?;

        let menu = session.on_context_menu(key, 0, 0);
        if let Some(title) = menu.native_title {
            println!();
            println!("Menu item: {}", title);
        }

        let pending = session.begin_toggle(None).map_err(|e| e.to_string())?;
        let report = session.finish_toggle(pending, Ok(()));
        if let Some(toast) = session.presenter().last_toast() {
            println!("Toast:     {}", toast);
        }
        print_report(&session, &report, opts.verbose);
    }

    let again = session.reconcile();
    println!();
    println!("Repeat pass: {} changes", again.changes());
    if again.changes() > 0 {
        return Err("Repeated pass was not a no-op".to_string());
    }
    Ok(())
}

fn print_report(session: &OfflineSession, report: &PassReport, verbose: bool) {
    if let Some(reason) = report.inactive {
        println!("  Inactive:  {:?}", reason);
    }
    println!("  Evaluated: {}", report.evaluated);
    println!("  Hidden:    {}", report.hidden.len());
    println!("  Restored:  {}", report.restored.len());
    println!("  Now hidden: {} of {}", session.surface().hidden_count(), session.surface().all().len());

    for (key, reason) in &report.hidden {
        println!("    - card {} hidden for {}", key.0, reason);
    }

    if verbose {
        for card in session.surface().all() {
            println!(
                "    [{}] {:<20} {:<8} tags: {}",
                card.key().0,
                card.identity.as_deref().unwrap_or("<none>"),
                if card.hidden { "hidden" } else { "visible" },
                card.tags.join(", ")
            );
        }
    }
}
