use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::score::ScoreBreakdown;

/// One step of the fixed scoring pipeline. Order here is the
/// order the aggregator executes them in; events in a `ScoringTrace`
/// appear in this order for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Normalization,
    NameComparison,
    AltNameComparison,
    GovIdComparison,
    CryptoComparison,
    ContactComparison,
    AddressComparison,
    DateComparison,
    SupportingInfo,
    Aggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringEvent {
    pub timestamp: DateTime<Utc>,
    pub phase: Phase,
    pub description: String,
    pub data: Map<String, Value>,
    pub duration_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringTrace {
    pub session_id: Uuid,
    pub events: Vec<ScoringEvent>,
    pub breakdown: ScoreBreakdown,
    pub duration_ms: f64,
    pub metadata: Map<String, Value>,
}

/// Per-call trace buffer used by the `Enabled` variant of
/// [`ScoringContext`]. Not constructed directly by callers.
#[derive(Debug)]
pub struct EnabledTrace {
    session_id: Uuid,
    started: Instant,
    events: Vec<ScoringEvent>,
    metadata: Map<String, Value>,
}

impl EnabledTrace {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started: Instant::now(),
            events: Vec::new(),
            metadata: Map::new(),
        }
    }

    fn push(&mut self, phase: Phase, description: String, data: Map<String, Value>, duration_ms: Option<f64>) {
        self.events.push(ScoringEvent {
            timestamp: Utc::now(),
            phase,
            description,
            data,
            duration_ms,
        });
    }

    fn finish(self, breakdown: ScoreBreakdown) -> ScoringTrace {
        ScoringTrace {
            session_id: self.session_id,
            events: self.events,
            breakdown,
            duration_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            metadata: self.metadata,
        }
    }
}

/// Null-object tracing handle. `Disabled` is a zero-sized
/// singleton whose operations are no-ops; `Enabled` buffers events for
/// the duration of one scoring call. The scorer is written once against
/// this enum and pays no cost when tracing is off.
///
/// A Rust `enum` expresses the "interface with two concrete types" note
/// in the design notes more cheaply than a trait object: no vtable, no
/// heap allocation for the `Disabled` arm, and the match stays
/// exhaustive if a third variant is ever added.
#[derive(Debug, Default)]
pub enum ScoringContext {
    #[default]
    Disabled,
    Enabled(EnabledTrace),
}

impl ScoringContext {
    pub fn disabled() -> Self {
        ScoringContext::Disabled
    }

    pub fn enabled() -> Self {
        ScoringContext::Enabled(EnabledTrace::new())
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ScoringContext::Enabled(_))
    }

    /// Runs `f`, timing it when tracing is enabled. Disabled contexts
    /// run `f` directly with no timing overhead.
    pub fn traced<T>(&mut self, phase: Phase, description: impl Into<String>, f: impl FnOnce() -> T) -> T {
        match self {
            ScoringContext::Disabled => f(),
            ScoringContext::Enabled(trace) => {
                let start = Instant::now();
                let result = f();
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                trace.push(phase, description.into(), Map::new(), Some(duration_ms));
                result
            }
        }
    }

    /// Records a structured event with no timing, e.g. a clamp warning.
    /// A no-op when tracing is disabled.
    pub fn record(&mut self, phase: Phase, description: impl Into<String>, data: Map<String, Value>) {
        if let ScoringContext::Enabled(trace) = self {
            trace.push(phase, description.into(), data, None);
        }
    }

    /// Consumes the context, producing the recorded trace alongside the
    /// final breakdown. `None` for a disabled context.
    pub fn into_trace(self, breakdown: ScoreBreakdown) -> Option<ScoringTrace> {
        match self {
            ScoringContext::Disabled => None,
            ScoringContext::Enabled(trace) => Some(trace.finish(breakdown)),
        }
    }
}
