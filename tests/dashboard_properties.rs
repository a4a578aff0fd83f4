use bike_dashboard::data::{FilterSelection, RentalDataset, RentalLoader, Season, WorkingDayFilter};
use bike_dashboard::pipeline::summarize;
use bike_dashboard::stats::{ChartView, DashboardSummary};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;
use std::io::Write;

/// Two years of synthetic hourly observations with the real schema.
fn fixture_csv() -> String {
    let mut csv = String::from(
        "datetime,season,holiday,workingday,weather,temp,atemp,humidity,windspeed,casual,registered,count\n",
    );
    for year in [2011, 2012] {
        for month in 1..=12u32 {
            for day in [1u32, 10, 19] {
                let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
                let workingday = u32::from(!matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
                let season = (month - 1) / 3 + 1;
                for hour in (0..24u32).step_by(3) {
                    let weather = hour % 4 + 1;
                    let temp = 5.0 + month as f64 * 2.1 + hour as f64 * 0.3;
                    let humidity = 30 + (hour * 7 + day) % 60;
                    let casual = (hour * 5 + month * 3) % 90;
                    let registered = (hour * 11 + day * 2 + workingday * 40) % 400;
                    let count = casual + registered;
                    writeln!(
                        csv,
                        "{}-{:02}-{:02} {:02}:00:00,{},0,{},{},{:.2},{:.3},{},{:.4},{},{},{}",
                        year,
                        month,
                        day,
                        hour,
                        season,
                        workingday,
                        weather,
                        temp,
                        temp + 2.5,
                        humidity,
                        (hour as f64) * 1.7,
                        casual,
                        registered,
                        count
                    )
                    .unwrap();
                }
            }
        }
    }
    csv
}

fn load_fixture() -> RentalDataset {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(fixture_csv().as_bytes()).unwrap();
    file.flush().unwrap();
    RentalLoader::load_csv(file.path()).unwrap()
}

fn subsets<T: Copy + Ord>(items: &[T]) -> Vec<BTreeSet<T>> {
    (0..1u32 << items.len())
        .map(|bits| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, item)| *item)
                .collect()
        })
        .collect()
}

fn all_selections(dataset: &RentalDataset) -> Vec<FilterSelection> {
    let mut selections = Vec::new();
    for years in subsets(dataset.years()) {
        for seasons in subsets(dataset.seasons()) {
            for working_day in WorkingDayFilter::ALL {
                selections.push(FilterSelection {
                    years: years.clone(),
                    seasons: seasons.clone(),
                    working_day,
                });
            }
        }
    }
    selections
}

fn datetimes(df: &polars::prelude::DataFrame) -> Vec<String> {
    df.column("datetime")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap().to_string())
        .collect()
}

fn same_float(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() <= 1e-9 * a.abs().max(1.0)
}

#[test]
fn fixture_loads_with_every_year_and_season() {
    let dataset = load_fixture();
    assert_eq!(dataset.row_count(), 2 * 12 * 3 * 8);
    assert_eq!(dataset.years(), &[2011, 2012]);
    assert_eq!(dataset.seasons(), &Season::ALL);

    let all = FilterSelection::all(&dataset);
    assert_eq!(all.years.len(), 2);
    assert_eq!(all.seasons.len(), 4);
    assert_eq!(all.working_day, WorkingDayFilter::Both);
}

/// Rows of `df` accepted by `selection`, checked one row at a time.
fn matching_rows(df: &polars::prelude::DataFrame, selection: &FilterSelection) -> usize {
    let years = df.column("year").unwrap().i32().unwrap();
    let seasons = df.column("season").unwrap().str().unwrap();
    let working = df.column("workingday").unwrap().i64().unwrap();
    years
        .into_iter()
        .zip(seasons)
        .zip(working)
        .filter(|((year, season), wd)| {
            selection.matches(year.map(i64::from), season.and_then(Season::from_label), *wd)
        })
        .count()
}

#[test]
fn every_filter_combination_yields_a_subset() {
    let dataset = load_fixture();
    let full: HashSet<String> = datetimes(dataset.dataframe()).into_iter().collect();

    for selection in all_selections(&dataset) {
        let filtered = selection.apply(&dataset).unwrap();
        assert!(filtered.height() <= dataset.row_count());

        for ts in datetimes(&filtered) {
            assert!(full.contains(&ts), "{ts} not in the source data");
        }

        // every kept row matches, and every matching row is kept
        assert_eq!(matching_rows(&filtered, &selection), filtered.height());
        assert_eq!(
            matching_rows(dataset.dataframe(), &selection),
            filtered.height(),
            "{:?}",
            selection
        );
    }
}

#[test]
fn empty_selections_produce_empty_views() {
    let dataset = load_fixture();
    let selection = FilterSelection {
        years: BTreeSet::new(),
        ..FilterSelection::all(&dataset)
    };
    let summary = summarize(&dataset, &selection).unwrap();

    assert_eq!(summary.kpis.rows, 0);
    assert_eq!(summary.kpis.total, 0);
    assert!(summary.kpis.mean.is_nan());
    assert_eq!(summary.kpis.max, None);
    for view in ChartView::ALL {
        if let Some(series) = summary.series(view) {
            assert!(series.is_empty());
        }
    }
}

#[test]
fn grouped_means_stay_within_count_range() {
    let dataset = load_fixture();
    let full = DashboardSummary::compute(dataset.dataframe(), dataset.numeric_columns()).unwrap();
    let max = full.kpis.max.unwrap() as f64;

    for selection in all_selections(&dataset) {
        let summary = summarize(&dataset, &selection).unwrap();
        if let Some(m) = summary.kpis.max {
            assert!(m as f64 <= max);
        }
        for view in ChartView::ALL {
            for group in summary.series(view).unwrap_or_default() {
                assert!(group.rows > 0);
                assert!(
                    (0.0..=max).contains(&group.mean),
                    "{} / {}: {} outside [0, {}]",
                    view.title(),
                    group.label,
                    group.mean,
                    max
                );
            }
        }
    }
}

#[test]
fn full_selection_reproduces_full_aggregates() {
    let dataset = load_fixture();
    let full = DashboardSummary::compute(dataset.dataframe(), dataset.numeric_columns()).unwrap();
    let selected = summarize(&dataset, &FilterSelection::all(&dataset)).unwrap();

    assert_eq!(selected.kpis.rows, full.kpis.rows);
    assert_eq!(selected.kpis.total, full.kpis.total);
    assert_eq!(selected.kpis.max, full.kpis.max);
    assert!(same_float(selected.kpis.mean, full.kpis.mean));

    for view in ChartView::ALL {
        let (a, b) = (selected.series(view), full.series(view));
        assert_eq!(a.map(<[_]>::len), b.map(<[_]>::len));
        for (x, y) in a.unwrap_or_default().iter().zip(b.unwrap_or_default()) {
            assert_eq!(x.label, y.label);
            assert_eq!(x.rows, y.rows);
            assert!(same_float(x.mean, y.mean), "{}: {} vs {}", x.label, x.mean, y.mean);
        }
    }

    assert_eq!(selected.correlation.columns, full.correlation.columns);
    for (row_a, row_b) in selected.correlation.values.iter().zip(&full.correlation.values) {
        for (a, b) in row_a.iter().zip(row_b) {
            assert!(same_float(*a, *b));
        }
    }
}

#[test]
fn views_cover_expected_categories() {
    let dataset = load_fixture();
    let summary = summarize(&dataset, &FilterSelection::all(&dataset)).unwrap();

    let seasons: Vec<&str> = summary.by_season.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(seasons, vec!["spring", "summer", "fall", "winter"]);
    assert_eq!(summary.by_hour.len(), 8);
    assert_eq!(summary.by_hour.first().map(|c| c.label.as_str()), Some("0"));
    assert_eq!(summary.by_hour.last().map(|c| c.label.as_str()), Some("21"));
    assert_eq!(summary.by_month.len(), 12);
    assert_eq!(summary.by_month[0].label, "jan");
    assert_eq!(summary.by_weather.len(), 4);
    assert_eq!(summary.by_working_day.len(), 2);

    let rows: usize = summary.by_season.iter().map(|c| c.rows).sum();
    assert_eq!(rows, dataset.row_count());

    assert!(summary.correlation.columns.contains(&"count".to_string()));
    let count = summary
        .correlation
        .columns
        .iter()
        .position(|c| c == "count")
        .unwrap();
    assert!((summary.correlation.get(count, count).unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn working_day_only_keeps_weekdays() {
    let dataset = load_fixture();
    let selection = FilterSelection {
        working_day: WorkingDayFilter::WorkingOnly,
        ..FilterSelection::all(&dataset)
    };
    let summary = summarize(&dataset, &selection).unwrap();

    let labels: Vec<&str> = summary.by_working_day.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Working"]);
    assert_eq!(summary.by_working_day[0].rows, summary.kpis.rows);
}
