//! Plinko Drop entry point
//!
//! The browser build is driven through `plinko_drop::web::PlinkoEngine`; the
//! native binary runs a headless batch of drops and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    plinko_drop::platform::init_logging();
    log::info!("Plinko Drop (web) loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use plinko_drop::{
        AutoBetConfig, AutoBetSession, BetStrategy, DropController, EngineSettings, History,
        MemoryStore, RiskLevel, Wager,
    };

    plinko_drop::platform::init_logging();

    let mut args = std::env::args().skip(1);
    let rows = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(12);
    let risk = args
        .next()
        .and_then(|s| RiskLevel::from_str(&s))
        .unwrap_or_default();
    let drops = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(200);

    log::info!(
        "Plinko Drop (native) - {} drops, {} rows, {} risk",
        drops,
        rows,
        risk.as_str()
    );

    let mut controller = DropController::new(MemoryStore::new(), EngineSettings::load());
    let wager = Wager::new(rows, risk, 1.0);
    if let Err(e) = wager.validate() {
        log::error!("{}", e);
        return;
    }

    let mut history = History::with_limit(drops);
    let mut requested = 0;

    // Keep a handful of balls falling at once, like a player spamming drop
    while history.len() < drops {
        while requested < drops && controller.in_flight_count() < 8 {
            match controller.request_drop(wager) {
                Ok(_) => requested += 1,
                Err(e) => {
                    log::warn!("Drop refused: {}", e);
                    break;
                }
            }
        }
        history.extend(controller.advance(1.0 / 60.0));
    }

    let stats = history.stats();
    let peak = stats.slot_distribution.values().copied().max().unwrap_or(1).max(1);
    for slot in 0..plinko_drop::slot_count(rows) {
        let count = stats.slot_distribution.get(&slot).copied().unwrap_or(0);
        let bar = "#".repeat(count * 40 / peak);
        log::info!("slot {:>2} {:>6} {}", slot, count, bar);
    }
    log::info!(
        "Wagered {:.2}, returned {:.2} (RTP {:.1}%), win rate {:.1}%, longest losing streak {}, {} physics divergences",
        stats.total_bets,
        stats.total_payout,
        if stats.total_bets > 0.0 {
            stats.total_payout / stats.total_bets * 100.0
        } else {
            0.0
        },
        stats.win_rate * 100.0,
        history.streaks().longest_loss,
        controller.divergences()
    );

    // Same board under a martingale auto-bet
    let config = AutoBetConfig {
        rounds: drops as u32,
        stop_on_loss: Some(5.0),
        strategy: BetStrategy::Martingale,
        ..AutoBetConfig::default()
    };
    let mut session = AutoBetSession::new(config, Wager::new(rows, risk, 0.01));
    session.run_instant(&mut controller);
    let stats = session.stats();
    log::info!(
        "Martingale: {} rounds, profit {:.4}, biggest loss {:.4}, stopped: {:?}",
        session.round(),
        stats.total_profit,
        stats.biggest_loss,
        session.stop_reason()
    );
}
