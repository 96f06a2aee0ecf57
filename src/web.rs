//! Browser bindings
//!
//! Thin wasm-bindgen wrapper over [`DropController`] backed by LocalStorage.
//! Structured values cross the boundary as JSON strings or flat arrays.

use wasm_bindgen::prelude::*;

use crate::autobet::{AutoBetConfig, AutoBetSession};
use crate::engine::{DropController, DropTicket, Wager};
use crate::overrides::{self, LocalStorageStore};
use crate::settings::EngineSettings;
use crate::stats::History;
use crate::tables::RiskLevel;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_risk(risk: &str) -> Result<RiskLevel, JsValue> {
    RiskLevel::from_str(risk).ok_or_else(|| js_error(format!("unknown risk level '{}'", risk)))
}

#[wasm_bindgen]
pub struct PlinkoEngine {
    controller: DropController<LocalStorageStore>,
    history: History,
    autobet: Option<AutoBetSession>,
}

#[wasm_bindgen]
impl PlinkoEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> PlinkoEngine {
        crate::platform::init_logging();
        let mut controller = DropController::new(LocalStorageStore, EngineSettings::load());
        controller.resize(width, height);
        log::info!("Plinko engine ready ({}x{})", width, height);
        PlinkoEngine {
            controller,
            history: History::default(),
            autobet: None,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.controller.resize(width, height);
    }

    /// Start a drop, returning its ticket id
    pub fn drop_ball(&mut self, rows: u32, risk: &str, bet: f64) -> Result<f64, JsValue> {
        let wager = Wager::new(rows, parse_risk(risk)?, bet);
        self.controller
            .request_drop(wager)
            .map(|t| t.0 as f64)
            .map_err(js_error)
    }

    /// Step all balls and any running auto-bet; returns landed results as a
    /// JSON array
    pub fn advance(&mut self, frame_dt: f32) -> Result<String, JsValue> {
        let results = self.controller.advance(frame_dt);
        if let Some(session) = self.autobet.as_mut() {
            session.step(&mut self.controller, frame_dt, &results);
        }
        self.history.extend(results.iter().cloned());
        serde_json::to_string(&results).map_err(js_error)
    }

    /// Settle a drop with no animation; returns the result as JSON
    pub fn drop_instant(&mut self, rows: u32, risk: &str, bet: f64) -> Result<String, JsValue> {
        let wager = Wager::new(rows, parse_risk(risk)?, bet);
        let result = self.controller.resolve_instant(wager).map_err(js_error)?;
        let json = serde_json::to_string(&result).map_err(js_error)?;
        self.history.push(result);
        Ok(json)
    }

    /// `[x, y, x, y, ...]` newest first for one ball in flight
    pub fn trail(&self, id: f64) -> Vec<f32> {
        self.controller
            .trail(DropTicket(id as u64))
            .unwrap_or_default()
            .into_iter()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Landed drops, oldest first, as a JSON array
    pub fn history(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.history.results()).map_err(js_error)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Totals over the history as JSON
    pub fn stats(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.history.stats()).map_err(js_error)
    }

    /// Win and loss streaks over the history as JSON
    pub fn streaks(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.history.streaks()).map_err(js_error)
    }

    /// Start an auto-bet session, replacing any running one. The first drop
    /// goes out on the next `advance`.
    pub fn start_autobet(&mut self, config: &str, rows: u32, risk: &str, bet: f64) -> Result<(), JsValue> {
        let config: AutoBetConfig = serde_json::from_str(config).map_err(js_error)?;
        let wager = Wager::new(rows, parse_risk(risk)?, bet);
        wager.validate().map_err(js_error)?;
        if let Some(session) = self.autobet.as_mut() {
            session.stop();
        }
        self.autobet = Some(AutoBetSession::new(config, wager));
        Ok(())
    }

    pub fn stop_autobet(&mut self) {
        if let Some(session) = self.autobet.as_mut() {
            session.stop();
        }
    }

    pub fn autobet_running(&self) -> bool {
        self.autobet.as_ref().is_some_and(|s| s.is_running())
    }

    /// Progress of the current or last auto-bet session as JSON (`null` if none)
    pub fn autobet_status(&self) -> Result<String, JsValue> {
        let status = self.autobet.as_ref().map(|s| s.status());
        serde_json::to_string(&status).map_err(js_error)
    }

    /// `[id, x, y, id, x, y, ...]` for every ball in flight
    pub fn ball_positions(&self) -> Vec<f32> {
        self.controller
            .ball_positions()
            .into_iter()
            .flat_map(|(t, p)| [t.0 as f32, p.x, p.y])
            .collect()
    }

    /// Peg hits since the last call as a JSON array of `[id, event]`
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        let events = self.controller.drain_events();
        serde_json::to_string(&events).map_err(js_error)
    }

    pub fn cancel(&mut self, id: f64) -> bool {
        self.controller.cancel(DropTicket(id as u64))
    }

    pub fn cancel_all(&mut self) -> usize {
        self.controller.cancel_all()
    }

    pub fn in_flight(&self) -> usize {
        self.controller.in_flight_count()
    }

    pub fn distribution(&self, rows: u32) -> Vec<f64> {
        self.controller.tables().distribution(rows)
    }

    pub fn payouts(&self, rows: u32, risk: &str) -> Result<Vec<f64>, JsValue> {
        Ok(self.controller.tables().payouts(rows, parse_risk(risk)?))
    }

    pub fn save_distribution(&mut self, rows: u32, values: Vec<f64>) -> Result<(), JsValue> {
        overrides::save_distribution_override(self.controller.tables_mut().store_mut(), rows, &values)
            .map_err(js_error)
    }

    pub fn save_payouts(&mut self, rows: u32, risk: &str, values: Vec<f64>) -> Result<(), JsValue> {
        let risk = parse_risk(risk)?;
        overrides::save_payout_override(self.controller.tables_mut().store_mut(), rows, risk, &values)
            .map_err(js_error)
    }

    pub fn reset_overrides(&mut self) {
        let store = self.controller.tables_mut().store_mut();
        overrides::clear_distribution_overrides(store);
        overrides::clear_payout_overrides(store);
    }

    /// Replace settings from JSON and persist them
    pub fn set_settings(&mut self, json: &str) {
        let settings = EngineSettings::from_json(json);
        settings.save();
        self.controller.set_settings(settings);
    }

    pub fn settings(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.settings()).map_err(js_error)
    }

    pub fn divergences(&self) -> f64 {
        self.controller.divergences() as f64
    }
}
