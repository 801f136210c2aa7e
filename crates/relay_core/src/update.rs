use crate::{CyclePhase, Effect, Msg, SchedulerState, Stage};

/// Pure update function: applies a message to the scheduler state and returns
/// the effects the driver must execute next.
///
/// Messages that do not fit the current phase are ignored.
pub fn update(mut state: SchedulerState, msg: Msg) -> (SchedulerState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (CyclePhase::Idle, Msg::CycleDue) => {
            state.begin_cycle();
            vec![Effect::LoadUrls]
        }
        (CyclePhase::Running(Stage::Loading), Msg::UrlsLoaded(urls)) => {
            state.current_mut().url_count = urls.len();
            if urls.is_empty() {
                finish(&mut state)
            } else {
                state.enter(Stage::Fetching);
                vec![Effect::FetchAll(urls)]
            }
        }
        (CyclePhase::Running(Stage::Fetching), Msg::FetchCompleted(images)) => {
            state.current_mut().fetched = images.len();
            if state.should_distribute(images.len()) {
                state.enter(Stage::Distributing);
                vec![Effect::Distribute(images)]
            } else {
                finish(&mut state)
            }
        }
        (CyclePhase::Running(Stage::Distributing), Msg::DistributionCompleted(report)) => {
            state.current_mut().distribution = Some(report);
            finish(&mut state)
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn finish(state: &mut SchedulerState) -> Vec<Effect> {
    let summary = state.finish_cycle();
    vec![Effect::ReportCycle(summary), Effect::SleepInterval]
}
