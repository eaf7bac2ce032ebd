//! Compare-match handler benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagtone::sim::SimTimer;
use tagtone::{CarrierGenerator, PinResolver, PlayDuration, SignalGenerator, UnoPins};
use tagtone_core::{PulseConfig, TimerChannel};

fn benchmark_carrier_match(c: &mut Criterion) {
    let carrier = CarrierGenerator::new(SimTimer::new(TimerChannel::Channel2), PulseConfig::DEFAULT);
    carrier.configure(UnoPins.resolve(3).unwrap());

    c.bench_function("carrier_compare_match", |b| {
        b.iter(|| {
            if !carrier.is_playing() {
                carrier.play().unwrap();
            }
            black_box(&carrier).on_compare_match();
        })
    });
}

fn benchmark_signal_match(c: &mut Criterion) {
    let signal = SignalGenerator::new(SimTimer::new(TimerChannel::Channel1), PulseConfig::DEFAULT);
    signal.configure(UnoPins.resolve(9).unwrap());
    signal.play_for(PlayDuration::Indefinite).unwrap();

    c.bench_function("signal_compare_match", |b| {
        b.iter(|| black_box(&signal).on_compare_match())
    });
}

criterion_group!(benches, benchmark_carrier_match, benchmark_signal_match);
criterion_main!(benches);
