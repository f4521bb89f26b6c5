use std::collections::VecDeque;
use std::vec::Vec;

use super::*;
use crate::pmu::dvfs::DigBias;
use crate::usart::TxStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    TxStatus(TxStatus),
    SelectXtal(u32, bool),
    EnablePll,
    ConfigurePll(u32, PllClock),
    Commit(FrequencyCommit),
    Ticks(Vec<u32>),
    SlowCycle,
}

/// Records every port call. The console reports the scripted statuses in
/// order, then idle.
#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
    console: VecDeque<TxStatus>,
    polls: usize,
}

impl Recorder {
    fn with_console(statuses: &[TxStatus]) -> Self {
        Self {
            console: statuses.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn commit(&self) -> Option<FrequencyCommit> {
        self.events.iter().find_map(|e| match e {
            Event::Commit(c) => Some(*c),
            _ => None,
        })
    }
}

impl ClockPort for Recorder {
    fn tx_status(&mut self) -> TxStatus {
        self.polls += 1;
        let status = self.console.pop_front().unwrap_or(TxStatus::IDLE);
        self.events.push(Event::TxStatus(status));
        status
    }

    fn select_xtal(&mut self, xtal: XtalClock, settle: bool) {
        self.events.push(Event::SelectXtal(xtal.mhz(), settle));
    }

    fn enable_pll(&mut self) {
        self.events.push(Event::EnablePll);
    }

    fn configure_pll(&mut self, xtal: XtalClock, pll: PllClock) {
        self.events.push(Event::ConfigurePll(xtal.mhz(), pll));
    }

    fn commit_frequency(&mut self, commit: &FrequencyCommit) {
        self.events.push(Event::Commit(*commit));
    }

    fn store_ticks_per_us(&mut self, ticks: &[u32]) {
        self.events.push(Event::Ticks(ticks.to_vec()));
    }

    fn wait_slow_cycle(&mut self) {
        self.events.push(Event::SlowCycle);
    }
}

fn control_at(mhz: u32, source: SocClockSource) -> CpuClockControl<Recorder> {
    CpuClockControl::new(Recorder::default(), ClockState::new(mhz, source), &Config::default())
}

#[test]
fn resolve_covers_the_supported_set() {
    for clock in CpuClock::ALL {
        let plan = resolve(clock.mhz()).unwrap();
        assert_eq!(plan.target, clock);
        assert_eq!(resolve(clock.mhz()), resolve(clock.mhz()));
    }

    assert_eq!(resolve(80).unwrap().pll, PllClock::_320M);
    assert_eq!(resolve(160).unwrap().pll, PllClock::_320M);
    assert_eq!(resolve(240).unwrap().pll, PllClock::_480M);
    assert_eq!(resolve(240).unwrap().bias, DigBias::High);
    assert_eq!(resolve(160).unwrap().bias, DigBias::Normal);
}

#[test]
fn resolve_rejects_everything_else() {
    for mhz in [0, 26, 40, 81, 120, 320, 480, u32::MAX] {
        assert_eq!(resolve(mhz), Err(UnsupportedFrequency { mhz }));
    }
}

#[test]
fn divider_codes_are_distinct() {
    let codes = CpuClock::ALL.map(|c| c.plan().period.bits());
    assert_eq!(codes, [0, 1, 2]);
}

#[test]
fn apb_word_is_the_same_for_every_target() {
    assert_eq!(PLL_APB_FREQ_WORD, 0x4c4b_4c4b);
    for clock in CpuClock::ALL {
        assert_eq!(FrequencyCommit::for_plan(&clock.plan()).apb_freq_word, PLL_APB_FREQ_WORD);
    }
}

#[test]
fn switch_runs_the_steps_in_order() {
    let mut clocks = control_at(40, SocClockSource::Xtal);

    clocks.set_cpu_frequency(160);

    assert_eq!(
        clocks.port().events,
        [
            Event::TxStatus(TxStatus::IDLE),
            Event::SelectXtal(40, true),
            Event::EnablePll,
            Event::ConfigurePll(40, PllClock::_320M),
            Event::Commit(FrequencyCommit {
                period: CpuPeriod::Sel160,
                bias: DigBias::Normal,
                source: SocClockSource::Pll,
                apb_freq_word: 0x4c4b_4c4b,
            }),
            Event::Ticks(vec![160]),
            Event::SlowCycle,
        ]
    );
    assert_eq!(clocks.state().cpu_mhz(), 160);
    assert_eq!(clocks.state().source(), SocClockSource::Pll);
}

#[test]
fn switch_waits_for_the_console_to_drain() {
    let busy = [
        TxStatus { fifo_count: 12, tx_state: 1 },
        TxStatus { fifo_count: 3, tx_state: 1 },
        TxStatus { fifo_count: 0, tx_state: 1 },
    ];
    let port = Recorder::with_console(&busy);
    let mut clocks: CpuClockControl<_> =
        CpuClockControl::new(port, ClockState::new(80, SocClockSource::Pll), &Config::default());

    clocks.set_cpu_clock(CpuClock::_240MHz);

    // three busy reads, then the idle one, all before the crystal switch
    assert_eq!(clocks.port().polls, 4);
    assert!(clocks.port().console.is_empty());
    assert_eq!(
        clocks.port().events[..5],
        [
            Event::TxStatus(busy[0]),
            Event::TxStatus(busy[1]),
            Event::TxStatus(busy[2]),
            Event::TxStatus(TxStatus::IDLE),
            Event::SelectXtal(40, true),
        ]
    );
}

#[test]
fn same_frequency_is_a_noop() {
    let mut clocks = control_at(240, SocClockSource::Pll);

    clocks.set_cpu_frequency(240);

    assert_eq!(clocks.port().polls, 0);
    assert!(clocks.port().events.is_empty());
    assert_eq!(clocks.state(), &ClockState::new(240, SocClockSource::Pll));
}

#[test]
fn unsupported_frequency_changes_nothing() {
    let mut clocks = control_at(160, SocClockSource::Pll);

    clocks.set_cpu_frequency(100);
    clocks.set_cpu_frequency(0);

    assert_eq!(clocks.port().polls, 0);
    assert!(clocks.port().events.is_empty());
    assert_eq!(clocks.state().cpu_mhz(), 160);
    assert_eq!(clocks.state().ticks_per_us(), &[160]);
}

#[test]
fn down_from_240_drops_the_bias() {
    let mut clocks = control_at(240, SocClockSource::Pll);

    clocks.set_cpu_frequency(80);

    let commit = clocks.port().commit().unwrap();
    assert_eq!(commit.bias, DigBias::Normal);
    assert_eq!(commit.period, CpuPeriod::Sel80);
    assert!(clocks
        .port()
        .events
        .contains(&Event::ConfigurePll(40, PllClock::_320M)));
    assert_eq!(clocks.state().ticks_per_us(), &[80]);
}

#[test]
fn up_from_xtal_raises_the_bias() {
    let config = ConfigBuilder::new().with_xtal(XtalClock::_26M).checked();
    let mut clocks: CpuClockControl<_> =
        CpuClockControl::new(Recorder::default(), ClockState::new(26, SocClockSource::Xtal), &config);

    clocks.set_cpu_frequency(240);

    let commit = clocks.port().commit().unwrap();
    assert_eq!(commit.bias, DigBias::High);
    assert_eq!(commit.source, SocClockSource::Pll);
    assert!(clocks
        .port()
        .events
        .contains(&Event::ConfigurePll(26, PllClock::_480M)));
}

#[test]
fn every_core_gets_the_same_ticks() {
    let mut clocks: CpuClockControl<Recorder, 2> =
        CpuClockControl::new(Recorder::default(), ClockState::new(80, SocClockSource::Pll), &Config::default());

    clocks.set_cpu_frequency(240);

    assert_eq!(clocks.state().ticks_per_us(), &[240, 240]);
    let ticks: Vec<_> = clocks
        .port()
        .events
        .iter()
        .filter(|e| matches!(e, Event::Ticks(_)))
        .collect();
    assert_eq!(ticks, [&Event::Ticks(vec![240, 240])]);
}

#[test]
fn settle_flag_reaches_the_port() {
    let config = ConfigBuilder::new().with_xtal_settle(false).checked();
    let mut clocks: CpuClockControl<_> =
        CpuClockControl::new(Recorder::default(), ClockState::new(80, SocClockSource::Pll), &config);

    clocks.set_cpu_frequency(160);

    assert_eq!(clocks.port().events[1], Event::SelectXtal(40, false));
}

#[test]
fn back_to_back_switches() {
    let mut clocks = control_at(80, SocClockSource::Pll);

    clocks.set_cpu_frequency(240);
    clocks.set_cpu_frequency(240);
    clocks.set_cpu_frequency(160);

    let commits: Vec<_> = clocks
        .port()
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Commit(c) => Some(c.period),
            _ => None,
        })
        .collect();
    assert_eq!(commits, [CpuPeriod::Sel240, CpuPeriod::Sel160]);

    let (port, state) = clocks.release();
    assert_eq!(port.polls, 2);
    assert_eq!(state.cpu_mhz(), 160);
}

#[test]
fn nothing_touches_the_clock_before_the_console_is_idle() {
    let busy = [TxStatus { fifo_count: 1, tx_state: 0 }];
    let mut clocks: CpuClockControl<_> = CpuClockControl::new(
        Recorder::with_console(&busy),
        ClockState::new(240, SocClockSource::Pll),
        &Config::default(),
    );

    clocks.set_cpu_frequency(80);

    let events = &clocks.port().events;
    let last_poll = events
        .iter()
        .rposition(|e| matches!(e, Event::TxStatus(_)))
        .unwrap();
    let first_step = events
        .iter()
        .position(|e| !matches!(e, Event::TxStatus(_)))
        .unwrap();
    assert_eq!(events[last_poll], Event::TxStatus(TxStatus::IDLE));
    assert!(last_poll < first_step);
    assert_eq!(events[first_step], Event::SelectXtal(40, true));
}

#[test]
fn init_applies_the_configured_clock() {
    let config = ConfigBuilder::new().with_cpu_clock(CpuClock::_160MHz).checked();
    let mut clocks: CpuClockControl<_> =
        CpuClockControl::new(Recorder::default(), ClockState::new(40, SocClockSource::Xtal), &config);

    init(&mut clocks, &config);

    assert_eq!(clocks.state().cpu_mhz(), 160);
    assert_eq!(clocks.port().commit().map(|c| c.period), Some(CpuPeriod::Sel160));
}

#[test]
fn default_config_targets_the_fastest_clock() {
    let config = Config::default();
    assert_eq!(config.cpu_clock(), CpuClock::_240MHz);
    assert_eq!(config.xtal(), XtalClock::_40M);
}

#[test]
#[should_panic(expected = "XTAL frequency out of valid range")]
fn out_of_range_xtal_is_rejected() {
    let _ = ConfigBuilder::new().with_xtal(XtalClock::Other(0)).checked();
}
