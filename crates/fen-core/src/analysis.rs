//! Analysis provider wire types, shared by the server and its clients.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPTH: u32 = 14;
pub const MAX_DEPTH: u32 = 40;
pub const DEFAULT_LINES: u32 = 1;
pub const MAX_LINES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub fen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multipv: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalKind {
    Cp,
    Mate,
    Unknown,
}

/// Score from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(rename = "type")]
    pub kind: EvalKind,
    pub value: Option<i32>,
}

impl Evaluation {
    pub fn cp(value: i32) -> Self {
        Self {
            kind: EvalKind::Cp,
            value: Some(value),
        }
    }

    pub fn mate(moves: i32) -> Self {
        Self {
            kind: EvalKind::Mate,
            value: Some(moves),
        }
    }

    pub fn unknown() -> Self {
        Self {
            kind: EvalKind::Unknown,
            value: None,
        }
    }

    /// Short label for display, e.g. `+0.35`, `#-3`, `?`.
    pub fn label(&self) -> String {
        match (self.kind, self.value) {
            (EvalKind::Cp, Some(cp)) => format!("{:+.2}", cp as f64 / 100.0),
            (EvalKind::Mate, Some(n)) => format!("#{n}"),
            _ => "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLine {
    /// First PV move in UCI notation.
    pub best_move: String,
    pub best_move_san: String,
    pub evaluation: Evaluation,
    /// Principal variation in SAN.
    pub pv: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub lines: Vec<AnalysisLine>,
    pub depth: u32,
    pub engine: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_wire_format() {
        let json = serde_json::to_value(Evaluation::cp(35)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "cp", "value": 35}));

        let unknown: Evaluation =
            serde_json::from_value(serde_json::json!({"type": "unknown", "value": null})).unwrap();
        assert_eq!(unknown, Evaluation::unknown());
    }

    #[test]
    fn test_request_omits_unset_parameters() {
        let req = AnalysisRequest {
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
            depth: None,
            multipv: Some(2),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("depth").is_none());
        assert_eq!(json["multipv"], 2);
    }

    #[test]
    fn test_evaluation_label() {
        assert_eq!(Evaluation::cp(35).label(), "+0.35");
        assert_eq!(Evaluation::cp(-120).label(), "-1.20");
        assert_eq!(Evaluation::mate(-3).label(), "#-3");
        assert_eq!(Evaluation::unknown().label(), "?");
    }
}
