use criterion::{Criterion, black_box, criterion_group, criterion_main};
use laptrace::{
    LapKey, TelemetryCharts,
    api::{LapTime, TelemetrySample},
    charts::TelemetryEntry,
    colors::DRIVER_PALETTE,
    lap_times::chart_laps,
};

fn create_lap_times(count: u32) -> Vec<LapTime> {
    (1..=count)
        .map(|lap_number| LapTime {
            lap_number,
            lap_time: Some(format!(
                "0 days 00:01:{:02}.{:03}000",
                30 + lap_number % 5,
                (lap_number * 37) % 1000
            )),
            compound: None,
            is_personal_best: None,
        })
        .collect()
}

fn create_telemetry(samples: usize, offset: f64) -> Vec<TelemetrySample> {
    (0..samples)
        .map(|i| TelemetrySample {
            distance: i as f64 * 5. + offset,
            speed: 100. + (i % 200) as f64,
            throttle: (i % 100) as f64,
            brake: i % 50 > 40,
            ..Default::default()
        })
        .collect()
}

fn bench_lap_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("lap_times");
    let race_distance = create_lap_times(78);

    group.bench_function("chart_laps_78", |b| {
        b.iter(|| black_box(chart_laps(black_box(&race_distance))));
    });

    group.finish();
}

fn bench_telemetry_charts(c: &mut Criterion) {
    let mut group = c.benchmark_group("telemetry_charts");
    let keys: Vec<LapKey> = (0..10).map(|i| LapKey::new(i.to_string(), 5)).collect();
    let telemetry: Vec<Vec<TelemetrySample>> = (0..10)
        .map(|i| create_telemetry(700, i as f64 * 0.5))
        .collect();

    group.bench_function("build_10_laps", |b| {
        b.iter(|| {
            let entries = keys.iter().zip(&telemetry).enumerate().map(|(i, (key, samples))| {
                TelemetryEntry {
                    key,
                    driver_name: "Driver",
                    base_color: DRIVER_PALETTE[i],
                    samples,
                }
            });
            black_box(TelemetryCharts::build(entries))
        });
    });

    let charts = TelemetryCharts::build(keys.iter().zip(&telemetry).map(|(key, samples)| {
        TelemetryEntry {
            key,
            driver_name: "Driver",
            base_color: DRIVER_PALETTE[0],
            samples,
        }
    }));
    group.bench_function("nearest_distance_and_readout", |b| {
        b.iter(|| {
            let distance = charts.nearest_distance(black_box(1234.3));
            black_box(distance.map(|d| charts.readout(d)))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lap_times, bench_telemetry_charts);
criterion_main!(benches);
