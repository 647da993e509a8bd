//! DLS classification and the early-warning override
//!
//! Fixed boundaries: [0,29] GREEN, [30,60] AMBER, [61,100] RED.
//! The model can escalate to RED, never downgrade.

use serde::{Deserialize, Serialize};

use crate::logic::config::EarlyWarning;

/// Upper bound (exclusive) of GREEN
pub const AMBER_FROM: u8 = 30;
/// Upper bound (inclusive) of AMBER
pub const AMBER_TO: u8 = 60;

/// Severity ordering GREEN < AMBER < RED
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DlsState {
    Green,
    Amber,
    Red,
}

impl DlsState {
    pub fn from_dls(dls: u8) -> Self {
        if dls < AMBER_FROM {
            DlsState::Green
        } else if dls <= AMBER_TO {
            DlsState::Amber
        } else {
            DlsState::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DlsState::Green => "GREEN",
            DlsState::Amber => "AMBER",
            DlsState::Red => "RED",
        }
    }
}

impl std::fmt::Display for DlsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RED when the model is confident and the heuristic is already elevated
pub fn effective_state(state: DlsState, dls: u8, risk: Option<f32>, rule: &EarlyWarning) -> DlsState {
    match risk {
        Some(r) if r > rule.risk_threshold && dls >= rule.min_dls => DlsState::Red,
        _ => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_boundaries() {
        assert_eq!(DlsState::from_dls(0), DlsState::Green);
        assert_eq!(DlsState::from_dls(29), DlsState::Green);
        assert_eq!(DlsState::from_dls(30), DlsState::Amber);
        assert_eq!(DlsState::from_dls(60), DlsState::Amber);
        assert_eq!(DlsState::from_dls(61), DlsState::Red);
        assert_eq!(DlsState::from_dls(100), DlsState::Red);
    }

    #[test]
    fn test_severity_order() {
        assert!(DlsState::Green < DlsState::Amber);
        assert!(DlsState::Amber < DlsState::Red);
    }

    #[test]
    fn test_early_warning_escalates() {
        let rule = EarlyWarning::default();
        assert_eq!(effective_state(DlsState::Amber, 50, Some(0.9), &rule), DlsState::Red);
        assert_eq!(effective_state(DlsState::Amber, 40, Some(0.9), &rule), DlsState::Amber);
        assert_eq!(effective_state(DlsState::Amber, 50, Some(0.65), &rule), DlsState::Amber);
        assert_eq!(effective_state(DlsState::Amber, 50, None, &rule), DlsState::Amber);
    }

    #[test]
    fn test_early_warning_never_downgrades() {
        let rule = EarlyWarning::default();
        for dls in 0..=100u8 {
            let state = DlsState::from_dls(dls);
            for risk in [None, Some(0.0), Some(0.5), Some(0.99)] {
                assert!(effective_state(state, dls, risk, &rule) >= state);
            }
        }
    }

    #[test]
    fn test_state_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&DlsState::Amber).unwrap(), "\"AMBER\"");
    }
}
