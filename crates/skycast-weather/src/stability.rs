//! Markov-chain weather stability analysis.
//!
//! A four-state model of sky-condition evolution drives a Monte Carlo
//! estimate of the risk that weather degrades (rain or storm) within a short
//! horizon. The transition table is a hand-authored constant reflecting
//! plausible persistence, not a model learned from data.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Row-sum tolerance when validating a transition table.
const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Discretized weather regime used by the stability model.
///
/// Deliberately coarser than [`crate::types::SkyCondition`]: `Storm` subsumes
/// heavy rain and thunder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherState {
    Clear,
    Cloudy,
    LightRain,
    Storm,
}

impl WeatherState {
    /// All states, in the fixed order transition rows are stored and sampled.
    pub const ALL: [WeatherState; 4] = [
        WeatherState::Clear,
        WeatherState::Cloudy,
        WeatherState::LightRain,
        WeatherState::Storm,
    ];

    /// Map a WMO weather code onto the four-state model.
    ///
    /// Total over the integer domain. Unrecognized codes (fog is handled, but
    /// e.g. snow, sleet, codes 68-79, negatives) fall back to `Cloudy`; an
    /// inherited simplification kept as-is.
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 | 45 | 48 => Self::Cloudy,
            51..=67 | 80..=82 => Self::LightRain,
            c if c >= 95 => Self::Storm,
            _ => Self::Cloudy,
        }
    }

    /// True for the states that count as degraded weather
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::LightRain | Self::Storm)
    }

    /// Wording used in stability messages
    pub fn description(self) -> &'static str {
        match self {
            Self::Clear => "clear skies",
            Self::Cloudy => "cloudy skies",
            Self::LightRain => "light rain",
            Self::Storm => "stormy conditions",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Clear => 0,
            Self::Cloudy => 1,
            Self::LightRain => 2,
            Self::Storm => 3,
        }
    }
}

/// A transition table with a row that does not sum to 1.0
#[derive(Debug, thiserror::Error)]
#[error("transition row for {state:?} sums to {sum}, expected 1.0")]
pub struct InvalidTableError {
    pub state: WeatherState,
    pub sum: f64,
}

/// Per-state probability distribution over next-state outcomes.
///
/// Rows and columns follow [`WeatherState::ALL`] order. The table is
/// immutable once built; share it freely across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    rows: [[f64; 4]; 4],
}

impl Default for TransitionTable {
    fn default() -> Self {
        // Persistence-heavy for clear weather, self-sustaining storms,
        // gradual decay for improving weather.
        Self {
            rows: [
                [0.85, 0.12, 0.03, 0.00],
                [0.25, 0.55, 0.15, 0.05],
                [0.10, 0.30, 0.50, 0.10],
                [0.05, 0.15, 0.40, 0.40],
            ],
        }
    }
}

impl TransitionTable {
    /// Build a table from explicit rows, validating that each row is a
    /// probability distribution.
    pub fn new(rows: [[f64; 4]; 4]) -> Result<Self, InvalidTableError> {
        for (i, row) in rows.iter().enumerate() {
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(InvalidTableError {
                    state: WeatherState::ALL[i],
                    sum,
                });
            }
        }
        Ok(Self { rows })
    }

    /// The outgoing distribution for one state
    pub fn row(&self, state: WeatherState) -> [f64; 4] {
        self.rows[state.index()]
    }

    /// Probability of moving from `from` to `to` in one step
    pub fn probability(&self, from: WeatherState, to: WeatherState) -> f64 {
        self.rows[from.index()][to.index()]
    }

    /// Sample the next state by roulette-wheel selection.
    ///
    /// Draws one uniform value in [0,1) and walks the row in `ALL` order,
    /// returning the first state whose cumulative probability reaches the
    /// draw. The fall-through (cumulative sum short of 1.0 from float drift)
    /// keeps the current state; it cannot fire on a normalized table and is
    /// logged when it does.
    pub fn next_state<R: Rng + ?Sized>(&self, current: WeatherState, rng: &mut R) -> WeatherState {
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;

        for (state, probability) in WeatherState::ALL.iter().zip(self.row(current)) {
            cumulative += probability;
            if cumulative >= draw {
                return *state;
            }
        }

        tracing::warn!(
            ?current,
            draw,
            cumulative,
            "transition row exhausted below draw; keeping current state"
        );
        current
    }
}

/// Tuning knobs for the Monte Carlo run.
///
/// The defaults (100 trials, 3-hour horizon) are the inherited constants;
/// they are configuration, not re-derived values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Independent simulation trials per prediction
    pub trials: u32,
    /// Default horizon in hours (one Markov step per hour)
    pub horizon_hours: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            horizon_hours: 3,
        }
    }
}

/// Result of one stability prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Percentage of trials that hit rain or storm within the horizon
    pub risk_score: f64,
    pub stability_message: String,
}

/// Select the advice message for a risk score and starting regime.
///
/// Pure mapping, split out so threshold boundaries are testable without the
/// Monte Carlo layer. Thresholds: <20 stable, <50 moderate, else unstable.
pub fn stability_message(risk_score: f64, start: WeatherState) -> String {
    let from = start.description();
    if risk_score < 20.0 {
        format!(
            "Markov analysis: conditions should hold steady from {from}; only a {risk_score:.1}% chance of rain moving in."
        )
    } else if risk_score < 50.0 {
        format!(
            "Markov analysis: moderate stability from {from}; a {risk_score:.1}% chance conditions turn wet."
        )
    } else {
        format!(
            "Markov analysis: HIGH instability from {from}; the model sees a {risk_score:.1}% risk of deteriorating weather. Stay alert."
        )
    }
}

/// Monte Carlo stability predictor over the four-state Markov model.
///
/// Intentionally stochastic: repeated calls with the same input return
/// different scores. Tests should assert statistical bands (or inject a
/// seeded generator via [`StabilityPredictor::predict_with_rng`]), never
/// exact values.
#[derive(Debug, Clone)]
pub struct StabilityPredictor {
    table: TransitionTable,
    config: StabilityConfig,
}

impl StabilityPredictor {
    /// Predictor over the built-in transition table
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            table: TransitionTable::default(),
            config,
        }
    }

    /// Predictor over a custom table (used by tests and experiments)
    pub fn with_table(table: TransitionTable, config: StabilityConfig) -> Self {
        Self { table, config }
    }

    pub fn config(&self) -> StabilityConfig {
        self.config
    }

    /// Predict at the configured default horizon
    pub fn predict_default_horizon(&self, start_code: i32) -> RiskAssessment {
        self.predict(start_code, self.config.horizon_hours)
    }

    /// Estimate the risk of degraded weather within `hours_ahead` hours.
    ///
    /// Total over any integer code; `hours_ahead = 0` reports zero risk.
    pub fn predict(&self, start_code: i32, hours_ahead: u32) -> RiskAssessment {
        self.predict_with_rng(start_code, hours_ahead, &mut rand::thread_rng())
    }

    /// Like [`predict`](Self::predict), with an injected random source
    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        start_code: i32,
        hours_ahead: u32,
        rng: &mut R,
    ) -> RiskAssessment {
        let start = WeatherState::from_wmo_code(start_code);

        let mut degraded = 0u32;
        for _ in 0..self.config.trials {
            if self.run_trial(start, hours_ahead, rng) {
                degraded += 1;
            }
        }

        let risk_score = if self.config.trials == 0 {
            0.0
        } else {
            f64::from(degraded) / f64::from(self.config.trials) * 100.0
        };

        tracing::debug!(start_code, ?start, hours_ahead, risk_score, "stability prediction");

        RiskAssessment {
            risk_score,
            stability_message: stability_message(risk_score, start),
        }
    }

    /// One bounded random walk; true as soon as rain or storm shows up.
    /// Later steps are skipped once the outcome is decided.
    fn run_trial<R: Rng + ?Sized>(&self, start: WeatherState, hours_ahead: u32, rng: &mut R) -> bool {
        let mut state = start;
        for _ in 0..hours_ahead {
            state = self.table.next_state(state, rng);
            if state.is_degraded() {
                return true;
            }
        }
        false
    }
}
