//! Benchmarks for tailwatch-model firm fitting and event testing.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::Rng;
use tailwatch_model::{EventTester, FactorRegression, Firm, Selection, ThresholdBank, factor_panel};
use tailwatch_primitives::{
    Date, DateSeries, FactorSet, FirmData, FirmMeta, FundamentalsRecord, Ticker,
};

fn day(i: usize) -> Date {
    Date::from_ymd_opt(2015, 1, 1).unwrap().iter_days().nth(i).unwrap()
}

fn random_series(n_days: usize, scale: f64) -> DateSeries {
    let mut rng = rand::thread_rng();
    (0..n_days).map(|i| (day(i), (rng.r#gen::<f64>() - 0.5) * scale)).collect()
}

fn random_fundamentals() -> Vec<FundamentalsRecord> {
    let mut rng = rand::thread_rng();
    (0..4)
        .map(|y| {
            let date = Date::from_ymd_opt(2015 + y, 12, 31).unwrap();
            let values = [
                rng.gen_range(1e8..1e11),
                rng.gen_range(1e7..1e10),
                rng.gen_range(1e6..1e9),
                rng.gen_range(1e5..1e7),
                rng.gen_range(1e8..1e11),
            ];
            FundamentalsRecord::from_values(date, values.map(Some))
        })
        .collect()
}

fn random_firms(n_firms: usize, n_days: usize) -> Vec<Firm> {
    let rf = random_series(n_days, 0.0002);
    let market = random_series(n_days, 0.02);
    (0..n_firms)
        .map(|k| {
            let mut data =
                FirmData::new(FirmMeta::simple(Ticker::new(format!("F{k:04}"))), rf.clone(), market.clone());
            data.daily_returns = Some(random_series(n_days, 0.04));
            data.fundamentals = Some(random_fundamentals());
            Firm::new(data, 100.0)
        })
        .collect()
}

fn bench_factor_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_fit");

    for n_days in [250, 1250, 2500] {
        group.throughput(Throughput::Elements(n_days as u64));
        group.bench_with_input(BenchmarkId::new("five_factor", n_days), &n_days, |b, &n_days| {
            let factors = FactorSet {
                smb: random_series(n_days, 0.01),
                hms: random_series(n_days, 0.01),
                rmw: random_series(n_days, 0.01),
                cma: random_series(n_days, 0.01),
            };
            let sp = random_series(n_days, 0.04);
            let mp = random_series(n_days, 0.02);
            let regression = FactorRegression::five_factor();

            b.iter(|| {
                let panel = factor_panel(black_box(&sp), black_box(&mp), black_box(&factors));
                regression.fit(&panel).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_selection_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_build");
    group.sample_size(20);

    for n_firms in [20, 100, 300] {
        group.throughput(Throughput::Elements(n_firms as u64));
        group.bench_with_input(BenchmarkId::new("n_firms", n_firms), &n_firms, |b, &n_firms| {
            let firms = random_firms(n_firms, 500);
            b.iter(|| Selection::new("BENCH", black_box(firms.clone())).unwrap());
        });
    }

    group.finish();
}

fn bench_event_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_test");

    let firms = random_firms(200, 500);
    let tester = EventTester::new(ThresholdBank::default());

    for n_dates in [1, 10, 60] {
        group.bench_with_input(BenchmarkId::new("n_dates", n_dates), &n_dates, |b, &n_dates| {
            let dates: Vec<Date> = (400..400 + n_dates).map(day).collect();
            b.iter(|| tester.run(black_box(&firms), black_box(&dates)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_factor_fit, bench_selection_build, bench_event_test);
criterion_main!(benches);
