#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use relay_engine::{EngineEvent, Phase, PhaseProgress, ProgressSink};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(relay_logging::initialize_for_tests);
}

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    pub fn progress(&self, phase: Phase) -> Vec<PhaseProgress> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Progress(progress) if progress.phase == phase => Some(*progress),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A localhost port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
