use std::sync::Once;

use pretty_assertions::assert_eq;
use relay_core::{
    update, CyclePhase, CycleSummary, DistributionReport, Effect, FetchedImage, Msg,
    SchedulerState, Stage, UrlSet,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(relay_logging::initialize_for_tests);
}

fn urls(list: &[&str]) -> UrlSet {
    list.iter().copied().collect()
}

fn images(names: &[&str]) -> Vec<FetchedImage> {
    names
        .iter()
        .map(|name| FetchedImage::new(format!("scraped_images/{name}")))
        .collect()
}

#[test]
fn full_cycle_walks_load_fetch_distribute() {
    init_logging();
    let state = SchedulerState::new(true, 2);

    let (state, effects) = update(state, Msg::CycleDue);
    assert_eq!(state.phase(), CyclePhase::Running(Stage::Loading));
    assert_eq!(state.cycle(), 1);
    assert_eq!(effects, vec![Effect::LoadUrls]);

    let loaded = urls(&["http://x/a.png", "http://x/b.png"]);
    let (state, effects) = update(state, Msg::UrlsLoaded(loaded.clone()));
    assert_eq!(state.phase(), CyclePhase::Running(Stage::Fetching));
    assert_eq!(effects, vec![Effect::FetchAll(loaded)]);

    let fetched = images(&["a.png"]);
    let (state, effects) = update(state, Msg::FetchCompleted(fetched.clone()));
    assert_eq!(state.phase(), CyclePhase::Running(Stage::Distributing));
    assert_eq!(effects, vec![Effect::Distribute(fetched)]);

    let report = DistributionReport {
        total: 2,
        attempted: 2,
        delivered: 1,
        failed: 1,
    };
    let (state, effects) = update(state, Msg::DistributionCompleted(report));
    let expected = CycleSummary {
        cycle: 1,
        url_count: 2,
        fetched: 1,
        distribution: Some(report),
    };
    assert_eq!(state.phase(), CyclePhase::Idle);
    assert_eq!(state.last_summary(), Some(&expected));
    assert_eq!(
        effects,
        vec![Effect::ReportCycle(expected), Effect::SleepInterval]
    );
}

#[test]
fn empty_url_set_skips_to_sleep() {
    init_logging();
    let (state, _) = update(SchedulerState::new(true, 1), Msg::CycleDue);
    let (state, effects) = update(state, Msg::UrlsLoaded(UrlSet::new()));

    assert_eq!(state.phase(), CyclePhase::Idle);
    assert_eq!(
        effects,
        vec![
            Effect::ReportCycle(CycleSummary {
                cycle: 1,
                ..CycleSummary::default()
            }),
            Effect::SleepInterval,
        ]
    );
}

#[test]
fn nothing_fetched_skips_distribution() {
    init_logging();
    let (state, _) = update(SchedulerState::new(true, 1), Msg::CycleDue);
    let (state, _) = update(state, Msg::UrlsLoaded(urls(&["http://x/a.png"])));
    let (state, effects) = update(state, Msg::FetchCompleted(Vec::new()));

    assert_eq!(state.phase(), CyclePhase::Idle);
    assert_eq!(effects.last(), Some(&Effect::SleepInterval));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::Distribute(_))));
}

#[test]
fn disabled_distribution_ends_after_fetch() {
    init_logging();
    let (state, _) = update(SchedulerState::new(false, 3), Msg::CycleDue);
    let (state, _) = update(state, Msg::UrlsLoaded(urls(&["http://x/a.png"])));
    let (state, effects) = update(state, Msg::FetchCompleted(images(&["a.png"])));

    assert_eq!(state.phase(), CyclePhase::Idle);
    assert_eq!(
        effects,
        vec![
            Effect::ReportCycle(CycleSummary {
                cycle: 1,
                url_count: 1,
                fetched: 1,
                distribution: None,
            }),
            Effect::SleepInterval,
        ]
    );
}

#[test]
fn no_servers_ends_after_fetch() {
    init_logging();
    let (state, _) = update(SchedulerState::new(true, 0), Msg::CycleDue);
    let (state, _) = update(state, Msg::UrlsLoaded(urls(&["http://x/a.png"])));
    let (state, effects) = update(state, Msg::FetchCompleted(images(&["a.png"])));

    assert_eq!(state.phase(), CyclePhase::Idle);
    assert_eq!(effects.last(), Some(&Effect::SleepInterval));
}

#[test]
fn cycle_due_while_running_is_ignored() {
    init_logging();
    let (state, _) = update(SchedulerState::new(true, 1), Msg::CycleDue);
    let (next, effects) = update(state.clone(), Msg::CycleDue);

    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn each_cycle_starts_from_scratch() {
    init_logging();
    let mut state = SchedulerState::new(true, 1);
    for cycle in 1..=3u64 {
        let (next, _) = update(state, Msg::CycleDue);
        let (next, _) = update(next, Msg::UrlsLoaded(urls(&["http://x/a.png"])));
        let (next, _) = update(next, Msg::FetchCompleted(Vec::new()));
        assert_eq!(next.cycle(), cycle);
        assert_eq!(next.last_summary().map(|s| s.cycle), Some(cycle));
        assert_eq!(next.last_summary().map(|s| s.fetched), Some(0));
        state = next;
    }
}
