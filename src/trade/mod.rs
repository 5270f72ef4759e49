//! Trade decisions
//!
//! Per-signal state machine `Detected -> Analyzed -> {Traded | Skipped}`
//! plus the take-profit / stop-loss close checks applied on every price
//! tick. The engine decides; the position book owns and mutates positions.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::types::{CloseReason, DetectedTicker, Position, TradingSettings};

/// Lifecycle of a signal with respect to trading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Detected,
    Analyzed,
    Traded,
    Skipped,
}

/// What to do with a freshly analyzed signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDecision {
    /// Open a position at the configured size
    Open { size: Decimal },
    Skip,
}

pub struct TradeDecisionEngine {
    states: HashMap<Uuid, SignalState>,
}

impl TradeDecisionEngine {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    pub fn on_detected(&mut self, signal_id: Uuid) {
        self.states.insert(signal_id, SignalState::Detected);
    }

    /// Decide whether an analyzed signal opens a position.
    ///
    /// The single gate is the auto-trade switch. Confidence is advisory
    /// only: every analyzed signal is eligible while auto-trade is on.
    pub fn decide(&mut self, signal: &DetectedTicker, settings: &TradingSettings) -> OpenDecision {
        self.states.insert(signal.id, SignalState::Analyzed);

        if !settings.auto_trade_enabled {
            self.states.insert(signal.id, SignalState::Skipped);
            return OpenDecision::Skip;
        }

        OpenDecision::Open {
            size: settings.position_size,
        }
    }

    pub fn mark_traded(&mut self, signal_id: Uuid) {
        self.states.insert(signal_id, SignalState::Traded);
    }

    pub fn mark_skipped(&mut self, signal_id: Uuid) {
        self.states.insert(signal_id, SignalState::Skipped);
    }

    pub fn state(&self, signal_id: Uuid) -> Option<SignalState> {
        self.states.get(&signal_id).copied()
    }

    /// TP/SL check against a freshly repriced position.
    ///
    /// Take-profit wins when both thresholds would fire on the same tick.
    pub fn check_close(
        &self,
        position: &Position,
        settings: &TradingSettings,
    ) -> Option<CloseReason> {
        if !position.is_open() {
            return None;
        }
        if position.pnl_percent >= settings.take_profit_percent {
            return Some(CloseReason::TakeProfit);
        }
        if position.pnl_percent <= -settings.stop_loss_percent {
            return Some(CloseReason::StopLoss);
        }
        None
    }
}

impl Default for TradeDecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn analyzed_signal(confidence: u8) -> DetectedTicker {
        let mut sig = DetectedTicker::new("PEPE", "@CryptoWhale", "$PEPE", Utc::now());
        sig.analyzed = true;
        sig.confidence = confidence;
        sig
    }

    fn position_at(entry: Decimal, current: Decimal) -> Position {
        let mut pos = Position::new("PEPE", entry, dec!(500));
        pos.revalue(current);
        pos
    }

    #[test]
    fn test_auto_trade_on_opens_at_position_size() {
        let mut engine = TradeDecisionEngine::new();
        let settings = TradingSettings::default();
        let sig = analyzed_signal(89);

        let decision = engine.decide(&sig, &settings);
        assert_eq!(decision, OpenDecision::Open { size: dec!(500) });
    }

    #[test]
    fn test_auto_trade_off_skips_any_confidence() {
        let mut engine = TradeDecisionEngine::new();
        let settings = TradingSettings {
            auto_trade_enabled: false,
            ..Default::default()
        };

        for confidence in [0, 50, 89, 100] {
            let sig = analyzed_signal(confidence);
            assert_eq!(engine.decide(&sig, &settings), OpenDecision::Skip);
            assert_eq!(engine.state(sig.id), Some(SignalState::Skipped));
        }
    }

    #[test]
    fn test_low_confidence_still_trades_when_enabled() {
        // Confidence is advisory; it does not gate execution
        let mut engine = TradeDecisionEngine::new();
        let settings = TradingSettings::default();
        let sig = analyzed_signal(1);

        assert!(matches!(
            engine.decide(&sig, &settings),
            OpenDecision::Open { .. }
        ));
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut engine = TradeDecisionEngine::new();
        let settings = TradingSettings::default();
        let sig = analyzed_signal(75);

        engine.on_detected(sig.id);
        assert_eq!(engine.state(sig.id), Some(SignalState::Detected));

        engine.decide(&sig, &settings);
        assert_eq!(engine.state(sig.id), Some(SignalState::Analyzed));

        engine.mark_traded(sig.id);
        assert_eq!(engine.state(sig.id), Some(SignalState::Traded));
    }

    #[test]
    fn test_take_profit_at_threshold() {
        let engine = TradeDecisionEngine::new();
        let settings = TradingSettings::default(); // TP 25, SL 10

        // ~25.04% gain crosses the 25% line
        let pos = position_at(dec!(0.00001234), dec!(0.00001543));
        assert_eq!(
            engine.check_close(&pos, &settings),
            Some(CloseReason::TakeProfit)
        );
    }

    #[test]
    fn test_stop_loss_at_12_percent_loss() {
        let engine = TradeDecisionEngine::new();
        let settings = TradingSettings::default();

        let pos = position_at(dec!(100), dec!(88));
        assert_eq!(
            engine.check_close(&pos, &settings),
            Some(CloseReason::StopLoss)
        );
    }

    #[test]
    fn test_8_percent_loss_stays_open() {
        let engine = TradeDecisionEngine::new();
        let settings = TradingSettings::default();

        let pos = position_at(dec!(100), dec!(92));
        assert_eq!(engine.check_close(&pos, &settings), None);
    }

    #[test]
    fn test_closed_position_is_ignored() {
        let engine = TradeDecisionEngine::new();
        let settings = TradingSettings::default();

        let mut pos = position_at(dec!(100), dec!(150));
        pos.closed_at = Some(Utc::now());
        assert_eq!(engine.check_close(&pos, &settings), None);
    }

    #[test]
    fn test_settings_change_applies_to_future_checks_only() {
        let engine = TradeDecisionEngine::new();
        let mut settings = TradingSettings::default();

        let pos = position_at(dec!(100), dec!(112));
        assert_eq!(engine.check_close(&pos, &settings), None);

        settings.take_profit_percent = dec!(12);
        assert_eq!(
            engine.check_close(&pos, &settings),
            Some(CloseReason::TakeProfit)
        );
    }
}
