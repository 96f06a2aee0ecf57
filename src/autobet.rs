//! Auto-bet sessions
//!
//! A session places a fixed number of drops with one wager, adjusting the
//! stake after every landing according to a [`BetStrategy`], and stops early
//! once the cumulative profit reaches a target or the cumulative loss reaches
//! a limit.

use serde::{Deserialize, Serialize};

use crate::engine::{DropController, DropTicket, Wager};
use crate::overrides::OverrideStore;
use crate::result::DropResult;
use crate::stats::{ResultStats, Streaks};

/// Upper bound on rounds in one session
pub const MAX_ROUNDS: u32 = 10_000;

/// Golden-ratio step used by [`BetStrategy::Fibonacci`]
const GOLDEN_RATIO: f64 = 1.618;
const GOLDEN_RATIO_INV: f64 = 0.618;

/// How the stake changes after each drop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStrategy {
    /// Same stake every round
    #[default]
    Fixed,
    /// Double after a loss, back to the base stake otherwise
    Martingale,
    /// Grow by the golden ratio after a loss, shrink by it otherwise
    Fibonacci,
    /// Double after a win, back to the base stake otherwise
    Paroli,
}

impl BetStrategy {
    pub const ALL: [BetStrategy; 4] = [
        BetStrategy::Fixed,
        BetStrategy::Martingale,
        BetStrategy::Fibonacci,
        BetStrategy::Paroli,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BetStrategy::Fixed => "fixed",
            BetStrategy::Martingale => "martingale",
            BetStrategy::Fibonacci => "fibonacci",
            BetStrategy::Paroli => "paroli",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(BetStrategy::Fixed),
            "martingale" => Some(BetStrategy::Martingale),
            "fibonacci" => Some(BetStrategy::Fibonacci),
            "paroli" => Some(BetStrategy::Paroli),
            _ => None,
        }
    }

    /// Next stake before clamping
    pub fn adjust(&self, last: &DropResult, current_bet: f64, base_bet: f64) -> f64 {
        let profit = last.profit();
        match self {
            BetStrategy::Fixed => current_bet,
            BetStrategy::Martingale => {
                if profit < 0.0 {
                    current_bet * 2.0
                } else {
                    base_bet
                }
            }
            BetStrategy::Fibonacci => {
                if profit < 0.0 {
                    current_bet * GOLDEN_RATIO
                } else {
                    last.bet * GOLDEN_RATIO_INV
                }
            }
            BetStrategy::Paroli => {
                if profit > 0.0 {
                    current_bet * 2.0
                } else {
                    base_bet
                }
            }
        }
    }
}

/// Auto-bet parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoBetConfig {
    pub rounds: u32,
    /// Stop once cumulative profit reaches this amount
    pub stop_on_win: Option<f64>,
    /// Stop once cumulative loss reaches this amount
    pub stop_on_loss: Option<f64>,
    pub strategy: BetStrategy,
    pub min_bet: f64,
    pub max_bet: f64,
    /// Pause between a landing and the next drop (animated sessions)
    pub interval_secs: f32,
}

impl Default for AutoBetConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            stop_on_win: None,
            stop_on_loss: None,
            strategy: BetStrategy::Fixed,
            min_bet: 0.000_000_01,
            max_bet: 1.0,
            interval_secs: 1.0,
        }
    }
}

impl AutoBetConfig {
    /// Clamp `bet` into `[min_bet, max_bet]`
    pub fn clamp_bet(&self, bet: f64) -> f64 {
        if !bet.is_finite() {
            return self.min_bet;
        }
        bet.max(self.min_bet).min(self.max_bet)
    }

    /// Stake for the round after `last`
    pub fn adjusted_bet(&self, last: &DropResult, current_bet: f64, base_bet: f64) -> f64 {
        self.clamp_bet(self.strategy.adjust(last, current_bet, base_bet))
    }
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    RoundsComplete { rounds: u32 },
    ProfitTarget { profit: f64 },
    LossLimit { loss: f64 },
    Cancelled,
    /// The controller refused a drop
    BetRejected { error: String },
}

/// Stop condition on the cumulative profit of `results`. Non-positive
/// thresholds are ignored.
pub fn should_stop(
    results: &[DropResult],
    stop_on_win: Option<f64>,
    stop_on_loss: Option<f64>,
) -> Option<StopReason> {
    let win = stop_on_win.filter(|v| *v > 0.0);
    let loss = stop_on_loss.filter(|v| *v > 0.0);
    if (win.is_none() && loss.is_none()) || results.is_empty() {
        return None;
    }

    let profit = ResultStats::from_results(results).total_profit;
    if win.is_some_and(|target| profit >= target) {
        return Some(StopReason::ProfitTarget { profit });
    }
    if loss.is_some_and(|limit| -profit >= limit) {
        return Some(StopReason::LossLimit { loss: -profit });
    }
    None
}

/// Progress snapshot for the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoBetStatus {
    pub running: bool,
    pub round: u32,
    pub total_rounds: u32,
    pub remaining: u32,
    pub current_bet: f64,
    pub stop_reason: Option<StopReason>,
    pub stats: ResultStats,
    pub streaks: Streaks,
}

/// One run of automatic drops
#[derive(Debug, Clone)]
pub struct AutoBetSession {
    config: AutoBetConfig,
    wager: Wager,
    current_bet: f64,
    round: u32,
    results: Vec<DropResult>,
    pending: Option<DropTicket>,
    wait: f32,
    stop_reason: Option<StopReason>,
}

impl AutoBetSession {
    pub fn new(mut config: AutoBetConfig, wager: Wager) -> Self {
        if config.rounds > MAX_ROUNDS {
            log::warn!("Auto-bet limited to {} rounds (asked {})", MAX_ROUNDS, config.rounds);
            config.rounds = MAX_ROUNDS;
        }
        if !(config.min_bet > 0.0 && config.max_bet >= config.min_bet) {
            log::warn!(
                "Invalid auto-bet limits {}..{}, using defaults",
                config.min_bet,
                config.max_bet
            );
            let defaults = AutoBetConfig::default();
            config.min_bet = defaults.min_bet;
            config.max_bet = defaults.max_bet;
        }
        let base_bet = config.clamp_bet(wager.bet);
        log::info!(
            "Auto-bet started: {} rounds, {} strategy, bet {}",
            config.rounds,
            config.strategy.as_str(),
            base_bet
        );
        Self {
            config,
            wager: Wager {
                bet: base_bet,
                ..wager
            },
            current_bet: base_bet,
            round: 0,
            results: Vec::new(),
            pending: None,
            wait: 0.0,
            stop_reason: None,
        }
    }

    pub fn config(&self) -> &AutoBetConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.stop_reason.is_none()
    }

    /// Rounds started so far
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_rounds(&self) -> u32 {
        self.config.rounds
    }

    pub fn remaining(&self) -> u32 {
        self.config.rounds.saturating_sub(self.round)
    }

    /// Landed drops of this session, oldest first
    pub fn results(&self) -> &[DropResult] {
        &self.results
    }

    /// Stake the next drop will use
    pub fn current_bet(&self) -> f64 {
        self.current_bet
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }

    /// Drop the session is waiting on
    pub fn pending(&self) -> Option<DropTicket> {
        self.pending
    }

    pub fn stats(&self) -> ResultStats {
        ResultStats::from_results(&self.results)
    }

    pub fn streaks(&self) -> Streaks {
        Streaks::from_results(&self.results)
    }

    pub fn status(&self) -> AutoBetStatus {
        AutoBetStatus {
            running: self.is_running(),
            round: self.round,
            total_rounds: self.config.rounds,
            remaining: self.remaining(),
            current_bet: self.current_bet,
            stop_reason: self.stop_reason.clone(),
            stats: self.stats(),
            streaks: self.streaks(),
        }
    }

    /// End the session. A drop already in flight still lands in the
    /// controller but is not counted here.
    pub fn stop(&mut self) {
        self.finish(StopReason::Cancelled);
    }

    fn finish(&mut self, reason: StopReason) {
        if self.stop_reason.is_some() {
            return;
        }
        log::info!("Auto-bet stopped after {} rounds: {:?}", self.round, reason);
        self.pending = None;
        self.stop_reason = Some(reason);
    }

    fn record(&mut self, result: DropResult) {
        self.current_bet = self
            .config
            .adjusted_bet(&result, self.current_bet, self.wager.bet);
        self.results.push(result);
    }

    fn check_stop(&self) -> Option<StopReason> {
        if self.round >= self.config.rounds {
            return Some(StopReason::RoundsComplete {
                rounds: self.round,
            });
        }
        should_stop(&self.results, self.config.stop_on_win, self.config.stop_on_loss)
    }

    fn next_wager(&self) -> Wager {
        Wager {
            bet: self.current_bet,
            ..self.wager
        }
    }

    /// Play every round with no animation. Returns the session's results.
    pub fn run_instant<S: OverrideStore>(
        &mut self,
        controller: &mut DropController<S>,
    ) -> &[DropResult] {
        while self.is_running() {
            if let Some(reason) = self.check_stop() {
                self.finish(reason);
                break;
            }
            match controller.resolve_instant(self.next_wager()) {
                Ok(result) => {
                    self.round += 1;
                    self.record(result);
                }
                Err(e) => self.finish(StopReason::BetRejected {
                    error: e.to_string(),
                }),
            }
        }
        &self.results
    }

    /// Per-frame driver for animated play. `landed` is what
    /// [`DropController::advance`] returned this frame. Returns the ticket
    /// of a drop started on this frame.
    pub fn step<S: OverrideStore>(
        &mut self,
        controller: &mut DropController<S>,
        frame_dt: f32,
        landed: &[DropResult],
    ) -> Option<DropTicket> {
        if !self.is_running() {
            return None;
        }

        if let Some(ticket) = self.pending {
            if let Some(result) = landed.iter().find(|r| r.id == ticket.0) {
                self.record(result.clone());
                self.pending = None;
                self.wait = self.config.interval_secs.max(0.0);
            } else if controller.plan(ticket).is_none() {
                // Cancelled from outside
                self.finish(StopReason::Cancelled);
                return None;
            } else {
                return None;
            }
        }

        if self.wait > 0.0 {
            self.wait -= frame_dt.max(0.0);
            if self.wait > 0.0 {
                return None;
            }
        }

        if let Some(reason) = self.check_stop() {
            self.finish(reason);
            return None;
        }

        match controller.request_drop(self.next_wager()) {
            Ok(ticket) => {
                self.round += 1;
                self.pending = Some(ticket);
                log::debug!("Auto-bet round {}/{}", self.round, self.config.rounds);
                Some(ticket)
            }
            Err(e) => {
                self.finish(StopReason::BetRejected {
                    error: e.to_string(),
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{MemoryStore, save_distribution_override, save_payout_override};
    use crate::settings::{AnimationMode, EngineSettings};
    use crate::tables::RiskLevel;
    use crate::SeededRng;

    fn landed(bet: f64, multiplier: f64) -> DropResult {
        DropResult {
            id: 0,
            final_slot: 0,
            path: Vec::new(),
            payout_multiplier: multiplier,
            bet,
            rows: 8,
            risk: RiskLevel::Medium,
            timestamp_ms: 0.0,
        }
    }

    /// Controller whose 8-row low-risk drops always land in slot 0 and pay `multiplier`
    fn rigged(multiplier: f64, settings: EngineSettings) -> DropController<MemoryStore> {
        let mut store = MemoryStore::new();
        let mut distribution = vec![0.0; 9];
        distribution[0] = 100.0;
        save_distribution_override(&mut store, 8, &distribution).unwrap();
        save_payout_override(&mut store, 8, RiskLevel::Low, &[multiplier; 9]).unwrap();
        DropController::with_rng(store, settings, SeededRng::new(5))
    }

    #[test]
    fn test_strategy_names() {
        for strategy in BetStrategy::ALL {
            assert_eq!(BetStrategy::from_str(strategy.as_str()), Some(strategy));
        }
        assert_eq!(BetStrategy::from_str("labouchere"), None);
        let config: AutoBetConfig = serde_json::from_str(r#"{"strategy":"paroli"}"#).unwrap();
        assert_eq!(config.strategy, BetStrategy::Paroli);
        assert_eq!(config.rounds, 10);
    }

    #[test]
    fn test_strategy_adjustments() {
        let win = landed(0.1, 2.0);
        let loss = landed(0.1, 0.5);
        let even = landed(0.1, 1.0);

        assert_eq!(BetStrategy::Fixed.adjust(&loss, 0.1, 0.05), 0.1);

        assert_eq!(BetStrategy::Martingale.adjust(&loss, 0.1, 0.05), 0.2);
        assert_eq!(BetStrategy::Martingale.adjust(&win, 0.1, 0.05), 0.05);
        assert_eq!(BetStrategy::Martingale.adjust(&even, 0.1, 0.05), 0.05);

        assert_eq!(BetStrategy::Paroli.adjust(&win, 0.1, 0.05), 0.2);
        assert_eq!(BetStrategy::Paroli.adjust(&even, 0.1, 0.05), 0.05);

        assert!((BetStrategy::Fibonacci.adjust(&loss, 0.1, 0.05) - 0.1618).abs() < 1e-12);
        assert!((BetStrategy::Fibonacci.adjust(&win, 0.1, 0.05) - 0.0618).abs() < 1e-12);
    }

    #[test]
    fn test_adjusted_bet_is_clamped() {
        let config = AutoBetConfig {
            strategy: BetStrategy::Martingale,
            ..AutoBetConfig::default()
        };
        assert_eq!(config.adjusted_bet(&landed(0.8, 0.0), 0.8, 0.1), 1.0);
        assert_eq!(config.clamp_bet(0.0), config.min_bet);
        assert_eq!(config.clamp_bet(f64::NAN), config.min_bet);
    }

    #[test]
    fn test_should_stop() {
        let results = [landed(1.0, 3.0), landed(1.0, 0.5)];
        // profit is +1.5
        assert_eq!(should_stop(&results, None, None), None);
        assert_eq!(
            should_stop(&results, Some(1.5), None),
            Some(StopReason::ProfitTarget { profit: 1.5 })
        );
        assert_eq!(should_stop(&results, Some(2.0), None), None);
        // A profit must never trip the loss limit
        assert_eq!(should_stop(&results, None, Some(1.0)), None);

        let results = [landed(1.0, 0.25), landed(1.0, 0.25)];
        assert_eq!(
            should_stop(&results, Some(5.0), Some(1.5)),
            Some(StopReason::LossLimit { loss: 1.5 })
        );
        assert_eq!(should_stop(&results, Some(0.0), Some(-1.0)), None);
        assert_eq!(should_stop(&[], Some(1.0), Some(1.0)), None);
    }

    #[test]
    fn test_instant_session_runs_all_rounds() {
        let mut controller = rigged(1.0, EngineSettings::default());
        let config = AutoBetConfig {
            rounds: 25,
            ..AutoBetConfig::default()
        };
        let mut session = AutoBetSession::new(config, Wager::new(8, RiskLevel::Low, 0.5));
        let results = session.run_instant(&mut controller);
        assert_eq!(results.len(), 25);
        assert!(results.iter().all(|r| r.bet == 0.5 && r.final_slot == 0));
        assert!(!session.is_running());
        assert_eq!(session.remaining(), 0);
        assert_eq!(
            session.stop_reason(),
            Some(&StopReason::RoundsComplete { rounds: 25 })
        );
    }

    #[test]
    fn test_instant_session_stops_on_loss() {
        let mut controller = rigged(0.0, EngineSettings::default());
        let config = AutoBetConfig {
            rounds: 100,
            stop_on_loss: Some(1.0),
            strategy: BetStrategy::Martingale,
            ..AutoBetConfig::default()
        };
        let mut session = AutoBetSession::new(config, Wager::new(8, RiskLevel::Low, 0.1));
        session.run_instant(&mut controller);

        // 0.1 + 0.2 + 0.4 lost, then 0.8 takes the loss to 1.5
        let bets: Vec<f64> = session.results().iter().map(|r| r.bet).collect();
        assert_eq!(bets.len(), 4);
        assert!((bets[3] - 0.8).abs() < 1e-12);
        assert!(matches!(session.stop_reason(), Some(StopReason::LossLimit { .. })));
        assert_eq!(session.current_bet(), 1.0);
        assert_eq!(session.streaks().current_loss, 4);
    }

    #[test]
    fn test_instant_session_stops_on_profit() {
        let mut controller = rigged(3.0, EngineSettings::default());
        let config = AutoBetConfig {
            rounds: 100,
            stop_on_win: Some(1.0),
            ..AutoBetConfig::default()
        };
        let mut session = AutoBetSession::new(config, Wager::new(8, RiskLevel::Low, 0.2));
        session.run_instant(&mut controller);
        // Each round nets 0.4
        assert_eq!(session.round(), 3);
        assert!(matches!(session.stop_reason(), Some(StopReason::ProfitTarget { .. })));
    }

    #[test]
    fn test_rejected_wager_ends_session() {
        let mut controller = rigged(1.0, EngineSettings::default());
        let mut session = AutoBetSession::new(AutoBetConfig::default(), Wager::new(30, RiskLevel::Low, 0.5));
        assert!(session.run_instant(&mut controller).is_empty());
        assert!(matches!(session.stop_reason(), Some(StopReason::BetRejected { .. })));
    }

    #[test]
    fn test_animated_session() {
        let settings = EngineSettings {
            animation: AnimationMode::Simple,
            path_step_secs: 0.05,
            ..EngineSettings::default()
        };
        let mut controller = rigged(2.0, settings);
        let config = AutoBetConfig {
            rounds: 3,
            strategy: BetStrategy::Paroli,
            interval_secs: 0.2,
            ..AutoBetConfig::default()
        };
        let mut session = AutoBetSession::new(config, Wager::new(8, RiskLevel::Low, 0.1));

        let dt = 1.0 / 30.0;
        let first = session.step(&mut controller, dt, &[]);
        assert!(first.is_some());
        assert_eq!(controller.in_flight_count(), 1);
        // No second ball while one is pending
        assert_eq!(session.step(&mut controller, dt, &[]), None);

        let mut frames = 0;
        while session.is_running() && frames < 10_000 {
            let landed = controller.advance(dt);
            session.step(&mut controller, dt, &landed);
            assert!(controller.in_flight_count() <= 1);
            frames += 1;
        }

        let bets: Vec<f64> = session.results().iter().map(|r| r.bet).collect();
        assert_eq!(bets.len(), 3);
        assert!((bets[1] - 0.2).abs() < 1e-12 && (bets[2] - 0.4).abs() < 1e-12);
        assert_eq!(session.stop_reason(), Some(&StopReason::RoundsComplete { rounds: 3 }));
        let status = session.status();
        assert!(!status.running);
        assert_eq!(status.stats.drops, 3);
        assert_eq!(status.streaks.current_win, 3);
    }

    #[test]
    fn test_cancelled_drop_stops_session() {
        let mut controller = rigged(1.0, EngineSettings::default());
        let mut session = AutoBetSession::new(AutoBetConfig::default(), Wager::new(8, RiskLevel::Low, 0.5));
        session.step(&mut controller, 0.01, &[]);
        controller.cancel_all();
        assert_eq!(session.step(&mut controller, 0.01, &[]), None);
        assert_eq!(session.stop_reason(), Some(&StopReason::Cancelled));

        let mut session = AutoBetSession::new(AutoBetConfig::default(), Wager::new(8, RiskLevel::Low, 0.5));
        session.stop();
        assert!(session.run_instant(&mut controller).is_empty());
        assert_eq!(session.step(&mut controller, 0.01, &[]), None);
    }
}
