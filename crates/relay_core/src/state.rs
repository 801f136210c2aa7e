use crate::CycleSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Fetching,
    Distributing,
}

/// Scheduler phase. There is no terminal state; the loop runs until the process stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    Running(Stage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerState {
    phase: CyclePhase,
    distribute: bool,
    server_count: usize,
    cycle: u64,
    current: CycleSummary,
    last_summary: Option<CycleSummary>,
}

impl SchedulerState {
    pub fn new(distribute: bool, server_count: usize) -> Self {
        Self {
            phase: CyclePhase::Idle,
            distribute,
            server_count,
            cycle: 0,
            current: CycleSummary::default(),
            last_summary: None,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Number of cycles started so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last_summary(&self) -> Option<&CycleSummary> {
        self.last_summary.as_ref()
    }

    pub(crate) fn should_distribute(&self, fetched: usize) -> bool {
        self.distribute && self.server_count > 0 && fetched > 0
    }

    pub(crate) fn begin_cycle(&mut self) {
        self.cycle += 1;
        self.current = CycleSummary {
            cycle: self.cycle,
            ..CycleSummary::default()
        };
        self.phase = CyclePhase::Running(Stage::Loading);
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        self.phase = CyclePhase::Running(stage);
    }

    pub(crate) fn current_mut(&mut self) -> &mut CycleSummary {
        &mut self.current
    }

    /// Moves back to idle and returns the finished cycle's summary.
    pub(crate) fn finish_cycle(&mut self) -> CycleSummary {
        self.phase = CyclePhase::Idle;
        let summary = std::mem::take(&mut self.current);
        self.last_summary = Some(summary.clone());
        summary
    }
}
