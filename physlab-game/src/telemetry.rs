//! Fire-and-forget game events delivered to the host application.
//!
//! The core only ever writes events; it never reads them back. A session
//! without a sink simply drops them.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Wire-level event kinds understood by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ScreenChange,
    PredictionMade,
    AnswerSubmitted,
    SliderChanged,
    ButtonClicked,
    GameStarted,
    GameCompleted,
    HintRequested,
    CorrectAnswer,
    IncorrectAnswer,
    PhaseChanged,
    ValueChanged,
    SelectionMade,
    TimerExpired,
    AchievementUnlocked,
    StruggleDetected,
}

/// One emitted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub event_type: EventType,
    pub game_type: String,
    pub game_title: String,
    /// Free-form payload specific to `event_type`.
    #[serde(default)]
    pub details: serde_json::Value,
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Receiver for game events.
pub trait TelemetrySink {
    fn record(&mut self, event: GameEvent);
}

impl<F> TelemetrySink for F
where
    F: FnMut(GameEvent),
{
    fn record(&mut self, event: GameEvent) {
        self(event);
    }
}

/// Sink that keeps every event in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    #[must_use]
    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.event_type == event_type)
            .count()
    }

    #[must_use]
    pub fn last(&self) -> Option<GameEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl TelemetrySink for RecordingSink {
    fn record(&mut self, event: GameEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Source of event timestamps.
pub type Clock = fn() -> i64;

#[must_use]
pub fn wall_clock_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Stamps and forwards events for one game instance.
pub struct TelemetryEmitter {
    game_type: String,
    game_title: String,
    sink: Option<Box<dyn TelemetrySink>>,
    clock: Clock,
}

impl std::fmt::Debug for TelemetryEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryEmitter")
            .field("game_type", &self.game_type)
            .field("game_title", &self.game_title)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl TelemetryEmitter {
    #[must_use]
    pub fn new(
        game_type: impl Into<String>,
        game_title: impl Into<String>,
        sink: Option<Box<dyn TelemetrySink>>,
    ) -> Self {
        Self {
            game_type: game_type.into(),
            game_title: game_title.into(),
            sink,
            clock: wall_clock_millis,
        }
    }

    /// Replace the timestamp source, e.g. with a fixed clock in tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn emit(&mut self, event_type: EventType, details: serde_json::Value) {
        let Some(sink) = self.sink.as_mut() else {
            log::trace!("{}: dropped {event_type:?} (no sink)", self.game_type);
            return;
        };
        sink.record(GameEvent {
            event_type,
            game_type: self.game_type.clone(),
            game_title: self.game_title.clone(),
            details,
            timestamp: (self.clock)(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const fn fixed_clock() -> i64 {
        1_700_000_000_000
    }

    #[test]
    fn event_serializes_with_host_field_names() {
        let event = GameEvent {
            event_type: EventType::PhaseChanged,
            game_type: "gas-laws".to_string(),
            game_title: "Gas Laws".to_string(),
            details: json!({ "from": "hook", "to": "predict" }),
            timestamp: 42,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["eventType"], "phase_changed");
        assert_eq!(value["gameType"], "gas-laws");
        assert_eq!(value["gameTitle"], "Gas Laws");
        assert_eq!(value["details"]["to"], "predict");
        assert_eq!(value["timestamp"], 42);
    }

    #[test]
    fn emitter_stamps_and_forwards() {
        let sink = RecordingSink::new();
        let mut emitter = TelemetryEmitter::new(
            "chladni-patterns",
            "Chladni",
            Some(Box::new(sink.clone())),
        )
        .with_clock(fixed_clock);
        emitter.emit(EventType::GameStarted, json!({}));
        emitter.emit(EventType::HintRequested, json!({ "phase": "play" }));
        assert_eq!(sink.events().len(), 2);
        let last = sink.last().unwrap();
        assert_eq!(last.timestamp, 1_700_000_000_000);
        assert_eq!(last.game_type, "chladni-patterns");
        assert_eq!(sink.count(EventType::GameStarted), 1);

        sink.clear();
        assert!(sink.events().is_empty());
        emitter.emit(EventType::SliderChanged, json!({}));
        assert_eq!(sink.count(EventType::SliderChanged), 1);
        assert_eq!(sink.count(EventType::GameStarted), 0);
    }

    #[test]
    fn closures_are_sinks_and_missing_sink_is_silent() {
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        let mut emitter = TelemetryEmitter::new(
            "gas-laws",
            "Gas Laws",
            Some(Box::new(move |_event: GameEvent| *counter.borrow_mut() += 1)),
        );
        emitter.emit(EventType::SliderChanged, json!({}));
        assert_eq!(*seen.borrow(), 1);

        let mut silent = TelemetryEmitter::new("gas-laws", "Gas Laws", None);
        assert!(!silent.has_sink());
        silent.emit(EventType::SliderChanged, json!({}));
    }

    #[test]
    fn wall_clock_is_positive() {
        assert!(wall_clock_millis() > 0);
    }
}
