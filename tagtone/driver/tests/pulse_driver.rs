//! Start/stop/status behavior through the public driver API.

use tagtone::sim::{run_until_idle, RegisterWrite, SimTimer};
use tagtone::{
    CarrierGenerator, GeneratorState, PinResolver, PlayDuration, PulseDriver, SignalGenerator,
    ToggleBudget, UnoPins,
};
use tagtone_core::{PulseConfig, TimerChannel};

const CARRIER_PIN: u8 = 3;
const SIGNAL_PIN: u8 = 9;

fn generators() -> (CarrierGenerator<SimTimer>, SignalGenerator<SimTimer>) {
    (
        CarrierGenerator::new(SimTimer::new(TimerChannel::Channel2), PulseConfig::DEFAULT),
        SignalGenerator::new(SimTimer::new(TimerChannel::Channel1), PulseConfig::DEFAULT),
    )
}

#[test]
fn play_then_is_playing() {
    let (carrier, signal) = generators();
    let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);

    driver.begin_carrier(CARRIER_PIN).unwrap();
    assert!(!driver.is_playing());
    driver.play_carrier().unwrap();
    assert!(driver.is_playing());

    driver.begin_signal(SIGNAL_PIN).unwrap();
    driver.play_signal(20).unwrap();
    assert!(driver.is_playing());
}

#[test]
fn signal_finishes_low_after_budget() {
    let (carrier, signal) = generators();
    let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
    driver.begin_signal(SIGNAL_PIN).unwrap();
    driver.play_signal(50).unwrap();

    assert_eq!(run_until_idle(&signal, 10_000), 180);
    assert!(!driver.is_playing());

    let pin = UnoPins.resolve(SIGNAL_PIN).unwrap();
    signal.with_timer(|timer| {
        assert!(!timer.is_high(pin));
        assert_eq!(timer.toggles(), 180);
    });
}

#[test]
fn stop_at_any_point_forces_low() {
    let pin = UnoPins.resolve(CARRIER_PIN).unwrap();
    for events in [0, 1, 7, 31, 32, 33, 40, 65, 66, 500, 5759] {
        let (carrier, signal) = generators();
        let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
        driver.begin_carrier(CARRIER_PIN).unwrap();
        driver.play_carrier().unwrap();
        for _ in 0..events {
            carrier.on_compare_match();
        }

        driver.stop();
        assert!(!driver.is_playing(), "after {} events", events);
        assert_eq!(carrier.state(), GeneratorState::Idle);
        assert!(!carrier.with_timer(|timer| timer.is_high(pin)));

        // A match already pending when stop ran leaves the pin low too.
        carrier.on_compare_match();
        assert!(!carrier.is_playing());
        assert!(!carrier.with_timer(|timer| timer.is_high(pin)));
    }
}

#[test]
fn stop_signal_mid_play() {
    let (carrier, signal) = generators();
    let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
    driver.begin_signal(SIGNAL_PIN).unwrap();
    driver.play_signal_for(PlayDuration::Indefinite).unwrap();
    for _ in 0..1001 {
        signal.on_compare_match();
    }
    let pin = UnoPins.resolve(SIGNAL_PIN).unwrap();
    assert!(signal.with_timer(|timer| timer.is_high(pin)));

    driver.stop();
    assert!(!driver.is_playing());
    assert!(!signal.with_timer(|timer| timer.is_high(pin)));
}

#[test]
fn replay_resets_instead_of_stacking() {
    let (carrier, signal) = generators();
    let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
    driver.begin_carrier(CARRIER_PIN).unwrap();
    driver.play_carrier().unwrap();
    for _ in 0..1000 {
        carrier.on_compare_match();
    }
    assert_eq!(carrier.status().channel.budget, ToggleBudget::new(4760));

    driver.play_carrier().unwrap();
    let status = carrier.status();
    assert_eq!(status.channel.budget, ToggleBudget::new(5760));
    assert_eq!(status.gate_remaining, status.gate_cycle);
    assert!(status.signal_on);
    assert_eq!(run_until_idle(&carrier, 100_000), 5760);

    driver.begin_signal(SIGNAL_PIN).unwrap();
    driver.play_signal(1000).unwrap();
    for _ in 0..100 {
        signal.on_compare_match();
    }
    driver.play_signal(10).unwrap();
    assert_eq!(signal.status().budget, ToggleBudget::new(36));
    assert_eq!(run_until_idle(&signal, 100_000), 36);
}

#[test]
fn configure_is_idempotent() {
    let (carrier, signal) = generators();
    let pin = UnoPins.resolve(CARRIER_PIN).unwrap();

    carrier.configure(pin);
    let first = carrier.status();
    let first_writes: Vec<RegisterWrite> = carrier.with_timer(|timer| {
        let writes = timer.writes().to_vec();
        timer.clear_writes();
        writes
    });

    carrier.configure(pin);
    let second = carrier.status();
    let second_writes = carrier.with_timer(|timer| timer.writes().to_vec());

    assert_eq!(first, second);
    assert_eq!(first_writes, second_writes);
    assert_eq!(
        first_writes,
        vec![RegisterWrite::Ctc, RegisterWrite::ClockSelect(0b001)]
    );

    let signal_pin = UnoPins.resolve(SIGNAL_PIN).unwrap();
    signal.configure(signal_pin);
    let first = signal.status();
    signal.configure(signal_pin);
    assert_eq!(first, signal.status());
}

#[test]
fn play_writes_compare_before_enabling() {
    let (carrier, signal) = generators();
    let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
    driver.begin_signal(SIGNAL_PIN).unwrap();
    signal.with_timer(|timer| timer.clear_writes());

    driver.play_signal(5).unwrap();
    let writes = signal.with_timer(|timer| timer.writes().to_vec());
    assert_eq!(
        writes,
        vec![
            RegisterWrite::Compare(4443),
            RegisterWrite::InterruptEnable(true)
        ]
    );
}

#[test]
fn invalid_pin_is_reported() {
    let (carrier, signal) = generators();
    let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
    assert!(driver.begin_signal(20).is_err());
    assert!(driver.play_signal(10).is_err());
    assert!(!driver.is_playing());
}
