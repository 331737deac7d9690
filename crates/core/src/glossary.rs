//! Static reference text for the metrics shown in the report.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GlossaryEntry {
    pub term: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "no_notes")]
    pub notes: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct GlossarySection {
    pub title: &'static str,
    pub entries: &'static [GlossaryEntry],
}

#[derive(Debug, Serialize)]
pub struct GlossaryGroup {
    pub title: &'static str,
    pub sections: &'static [GlossarySection],
}

fn no_notes(notes: &&[&str]) -> bool {
    notes.is_empty()
}

const fn entry(term: &'static str, description: &'static str) -> GlossaryEntry {
    GlossaryEntry {
        term,
        description,
        notes: &[],
    }
}

pub static GLOSSARY: [GlossaryGroup; 2] = [
    GlossaryGroup {
        title: "Returns & Risk",
        sections: &[
            GlossarySection {
                title: "Returns",
                entries: &[
                    entry(
                        "Cumulative Return",
                        "Total return from the start of the period to today.",
                    ),
                    entry(
                        "CAGR (Compound Annual Growth Rate)",
                        "Annualized compound growth rate: how much the investment grew, on average, each year.",
                    ),
                    entry(
                        "Expected Daily/Monthly/Yearly %",
                        "Average (geometric) return you could expect per day, month or year.",
                    ),
                    entry("Best Day/Month/Year", "Return of the best single day, month or year."),
                    entry("Worst Day/Month/Year", "Return of the worst single day, month or year."),
                    entry(
                        "Win Days/Month/Year %",
                        "Share of days, months or years that ended with a gain (hit rate).",
                    ),
                ],
            },
            GlossarySection {
                title: "Risk",
                entries: &[
                    entry(
                        "Max Drawdown (MDD)",
                        "Largest fall from a previous peak. In the worst case, this is how much you could have lost.",
                    ),
                    entry(
                        "Volatility (ann.)",
                        "Annualized standard deviation of returns: how violently the price swings.",
                    ),
                    entry(
                        "Longest DD Days",
                        "Longest time, in days, it took to climb back to a previous peak.",
                    ),
                    entry("Avg. Drawdown", "Average depth of a drawdown."),
                    entry(
                        "Avg. Drawdown Days",
                        "Average number of days from the start of a drawdown to its recovery.",
                    ),
                    entry(
                        "Value-at-Risk (VaR)",
                        "Largest loss expected within a given confidence level (usually 95%).",
                    ),
                ],
            },
        ],
    },
    GlossaryGroup {
        title: "Risk-Adjusted & Other Statistics",
        sections: &[
            GlossarySection {
                title: "Risk-Adjusted",
                entries: &[
                    GlossaryEntry {
                        term: "Sharpe Ratio",
                        description: "(Return - risk-free rate) / volatility. Excess return earned per unit of risk; one of the most important figures.",
                        notes: &["1.0 or more: good", "2.0 or more: very good", "3.0 or more: excellent"],
                    },
                    entry(
                        "Sortino Ratio",
                        "Like Sharpe, but only downside volatility counts as risk, which is closer to what an investor feels.",
                    ),
                    entry(
                        "Calmar Ratio",
                        "CAGR divided by max drawdown: how much return was earned for the worst fall endured.",
                    ),
                    entry(
                        "Information Ratio",
                        "Excess return over the benchmark divided by tracking error: how consistently the benchmark was beaten.",
                    ),
                ],
            },
            GlossarySection {
                title: "Other Statistics",
                entries: &[
                    GlossaryEntry {
                        term: "Beta",
                        description: "Sensitivity to the market (benchmark).",
                        notes: &[
                            "1.0: moves with the market",
                            "> 1.0: moves more than the market (aggressive)",
                            "< 1.0: moves less than the market (defensive)",
                        ],
                    },
                    entry(
                        "Alpha",
                        "Excess return not explained by the market's return; a measure of manager skill.",
                    ),
                    entry(
                        "R^2 (coefficient of determination)",
                        "How much of the movement is explained by the benchmark. Closer to 1 means it tracks the benchmark closely.",
                    ),
                    entry(
                        "Kurtosis",
                        "How peaked the return distribution is. Higher values mean extreme gains or losses (fat tails) are more likely.",
                    ),
                    entry(
                        "Skew",
                        "Asymmetry of the return distribution. Positive: large gains are more frequent; negative: large losses are.",
                    ),
                    entry(
                        "Kelly Criterion",
                        "Position size that maximizes long-run growth while avoiding ruin.",
                    ),
                ],
            },
        ],
    },
];

pub fn glossary() -> &'static [GlossaryGroup] {
    &GLOSSARY
}
