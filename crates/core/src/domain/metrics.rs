use serde::{Deserialize, Serialize};

/// The four headline numbers shown above the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub cagr: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cagr,
    Sharpe,
    MaxDrawdown,
    Volatility,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Cagr,
        MetricKind::Sharpe,
        MetricKind::MaxDrawdown,
        MetricKind::Volatility,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Cagr => "CAGR",
            MetricKind::Sharpe => "Sharpe",
            MetricKind::MaxDrawdown => "Max Drawdown",
            MetricKind::Volatility => "Volatility (ann.)",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricKind::Cagr => "Average annual growth rate",
            MetricKind::Sharpe => "Return per unit of risk (higher is better)",
            MetricKind::MaxDrawdown => "Largest fall from a peak (closer to 0 is better)",
            MetricKind::Volatility => "How much the price swings",
        }
    }

    /// Ratios print as plain numbers, everything else as a percentage.
    pub fn format(self, value: f64) -> String {
        match self {
            MetricKind::Sharpe => format!("{value:.2}"),
            _ => format!("{:.2}%", value * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub kind: MetricKind,
    pub label: String,
    pub value: f64,
    pub display: String,
    pub help: String,
}

impl MetricCard {
    pub fn new(kind: MetricKind, value: f64) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            value,
            display: kind.format(value),
            help: kind.help().to_string(),
        }
    }
}

/// Whatever subset of the headline metrics could be computed, plus one
/// grouped warning when any of them failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricCards {
    pub cards: Vec<MetricCard>,
    pub warning: Option<String>,
}

impl MetricCards {
    pub fn get(&self, kind: MetricKind) -> Option<f64> {
        self.cards.iter().find(|c| c.kind == kind).map(|c| c.value)
    }

    /// All four present.
    pub fn snapshot(&self) -> Option<MetricSnapshot> {
        Some(MetricSnapshot {
            cagr: self.get(MetricKind::Cagr)?,
            sharpe: self.get(MetricKind::Sharpe)?,
            max_drawdown: self.get(MetricKind::MaxDrawdown)?,
            volatility: self.get(MetricKind::Volatility)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_ratios_and_percentages() {
        assert_eq!(MetricKind::Cagr.format(0.1234), "12.34%");
        assert_eq!(MetricKind::MaxDrawdown.format(-0.25), "-25.00%");
        assert_eq!(MetricKind::Sharpe.format(1.456), "1.46");
    }

    #[test]
    fn snapshot_requires_every_card() {
        let mut cards = MetricCards {
            cards: vec![
                MetricCard::new(MetricKind::Cagr, 0.1),
                MetricCard::new(MetricKind::Sharpe, 1.0),
                MetricCard::new(MetricKind::MaxDrawdown, -0.2),
            ],
            warning: None,
        };
        assert!(cards.snapshot().is_none());
        cards.cards.push(MetricCard::new(MetricKind::Volatility, 0.3));
        let snap = cards.snapshot().unwrap();
        assert_eq!(snap.max_drawdown, -0.2);
    }
}
