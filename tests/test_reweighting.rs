use flavnet::reweight::{categorize, direct_ratio, FieldNames, DEFAULT_PT_EDGES};
use flavnet::{
    Binning, CorrectionTable, Dataset, Flavor, NnError, RecordSource, ReweightConfig, ReweightEstimator,
    TableSource,
};

/// One jet per entry: (pt, eta, flavor, truth label).
fn jets(rows: &[(f64, f64, Flavor, i32)]) -> TableSource {
    let flag = |f: Flavor| rows.iter().map(|r| (r.2 == f) as i32).collect::<Vec<_>>();
    TableSource::new()
        .with_doubles("pt", rows.iter().map(|r| r.0).collect()).unwrap()
        .with_floats("eta", rows.iter().map(|r| r.1 as f32).collect()).unwrap()
        .with_ints("light", flag(Flavor::Light)).unwrap()
        .with_ints("charm", flag(Flavor::Charm)).unwrap()
        .with_ints("bottom", flag(Flavor::Bottom)).unwrap()
        .with_ints("truthflav", rows.iter().map(|r| r.3).collect()).unwrap()
}

fn two_by_two() -> ReweightConfig {
    ReweightConfig {
        pt_bins: Binning::new(vec![20.0, 50.0, 200.0]).unwrap(),
        eta_bins: Binning::new(vec![0.0, 1.2, 2.5]).unwrap(),
        sample_fraction: 1.0,
        ..ReweightConfig::default()
    }
}

fn temp_path(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("flavnet-{}-{}", std::process::id(), name))
        .to_string_lossy()
        .into_owned()
}

fn assert_grid(actual: &[Vec<f64>], expected: &[[f64; 2]; 2]) {
    for (row, exp_row) in actual.iter().zip(expected) {
        for (a, e) in row.iter().zip(exp_row) {
            assert!((a - e).abs() < 1e-12, "got {actual:?}, expected {expected:?}");
        }
    }
}

// ============================================================================
// Binning
// ============================================================================

#[test]
fn categorize_default_pt_edges() {
    let edges = DEFAULT_PT_EDGES;
    assert_eq!(categorize(25.0, &edges), 0);
    assert_eq!(categorize(500.0, &edges), 9);
    assert_eq!(categorize(5.0, &edges), 0);
    assert_eq!(categorize(139.99, &edges), 7);
}

// ============================================================================
// Direct ratio
// ============================================================================

#[test]
fn direct_ratio_floors_and_caps() {
    assert_eq!(direct_ratio(0, 0, 1.0, 20.0), 1.0);
    assert_eq!(direct_ratio(1000, 1, 1.0, 20.0), 20.0);
}

#[test]
fn direct_ratio_table_from_records() {
    let mut rows = vec![(30.0, 0.5, Flavor::Light, 0); 40];
    rows.extend(vec![(30.0, -0.5, Flavor::Bottom, 5); 4]);
    rows.extend(vec![(30.0, 0.1, Flavor::Charm, 4); 2]);
    rows.extend(vec![(100.0, 2.0, Flavor::Light, 0); 1000]);
    rows.push((100.0, 2.0, Flavor::Bottom, 5));
    let mut source = jets(&rows);

    let est = ReweightEstimator::new(two_by_two()).unwrap();
    let table = est.determine_reweighting(&mut source, false, false).unwrap();

    // 40 light / 4 bottom, 40 light / (5 * 2 charm)
    assert_eq!(table.bottom_correction()[0][0], 10.0);
    assert_eq!(table.charm_correction()[0][0], 4.0);
    // capped
    assert_eq!(table.bottom_correction()[1][1], 20.0);
    assert_eq!(table.charm_correction()[1][1], 20.0);
    // empty cells floor both counts at 1
    assert_eq!(table.bottom_correction()[0][1], 1.0);
    assert_eq!(table.charm_correction()[1][0], 0.2);
}

// ============================================================================
// CDF method
// ============================================================================

fn cdf_sample() -> TableSource {
    jets(&[
        (30.0, 0.5, Flavor::Light, 0),
        (30.0, 1.5, Flavor::Light, 0),
        (80.0, -0.5, Flavor::Light, 0),
        (80.0, 2.0, Flavor::Light, 0),
        (25.0, 0.2, Flavor::Bottom, 5),
        (45.0, -1.0, Flavor::Bottom, 5),
    ])
}

#[test]
fn cdf_corrections_absolute() {
    let est = ReweightEstimator::new(two_by_two()).unwrap();
    let table = est.determine_reweighting(&mut cdf_sample(), true, false).unwrap();
    // all bottom in the first cell: CDF is 1 everywhere
    assert_grid(table.bottom_correction(), &[[0.5, 0.5], [0.5, 0.5]]);
    // no charm at all: neutral
    assert_grid(table.charm_correction(), &[[1.0, 1.0], [1.0, 1.0]]);
}

#[test]
fn cdf_corrections_relative_to_light() {
    let est = ReweightEstimator::new(two_by_two()).unwrap();
    let table = est.determine_reweighting(&mut cdf_sample(), true, true).unwrap();
    // light CDF [[.25, .5], [.5, 1]] -> light factor [[2, 1], [1, .5]]
    assert_grid(table.bottom_correction(), &[[0.25, 0.5], [0.5, 1.0]]);
    assert_grid(table.charm_correction(), &[[0.5, 1.0], [1.0, 2.0]]);
}

#[test]
fn run_uses_config_flags() {
    let mut config = two_by_two();
    config.cdf = false;
    let est = ReweightEstimator::new(config).unwrap();
    let table = est.run(&mut cdf_sample()).unwrap();
    // light 1 / bottom 2 in the first cell
    assert_eq!(table.bottom_correction()[0][0], 0.5);
}

// ============================================================================
// Sampling and cuts
// ============================================================================

#[test]
fn quality_cuts_and_truth_sentinel() {
    let mut config = two_by_two();
    config.fields.truth = Some("truthflav".into());
    let est = ReweightEstimator::new(config).unwrap();

    let mut source = jets(&[
        (30.0, 0.5, Flavor::Bottom, 5),
        (15.0, 0.5, Flavor::Bottom, 5),    // pt too low
        (1500.0, 0.5, Flavor::Bottom, 5),  // pt too high
        (30.0, -2.7, Flavor::Bottom, 5),   // outside the tracker
        (30.0, 0.5, Flavor::Bottom, 100),  // truth sentinel
        (30.0, 0.5, Flavor::Light, 0),
    ]);
    let hists = est.accumulate(&mut source).unwrap();
    assert_eq!(hists.bottom.total(), 1);
    assert_eq!(hists.light.total(), 1);
    assert_eq!(hists.rejected, 4);
}

#[test]
fn default_fraction_reads_the_first_tenth() {
    let mut config = two_by_two();
    config.sample_fraction = 0.1;
    let est = ReweightEstimator::new(config).unwrap();

    let mut rows = vec![(30.0, 0.5, Flavor::Light, 0); 10];
    rows.extend(vec![(30.0, 0.5, Flavor::Bottom, 5); 90]);
    let hists = est.accumulate(&mut jets(&rows)).unwrap();
    assert_eq!(hists.light.total(), 10);
    assert_eq!(hists.bottom.total(), 0);
}

#[test]
fn unflagged_rows_are_counted_not_filled() {
    let mut source = TableSource::new()
        .with_doubles("pt", vec![30.0, 40.0]).unwrap()
        .with_doubles("eta", vec![0.1, 0.2]).unwrap()
        .with_ints("light", vec![0, 1]).unwrap()
        .with_ints("charm", vec![0, 0]).unwrap()
        .with_ints("bottom", vec![0, 0]).unwrap();
    let est = ReweightEstimator::new(two_by_two()).unwrap();
    let hists = est.accumulate(&mut source).unwrap();
    assert_eq!(hists.unflagged, 1);
    assert_eq!(hists.light.total(), 1);
}

#[test]
fn missing_flavor_field_is_reported() {
    let mut source = TableSource::new()
        .with_doubles("pt", vec![30.0]).unwrap()
        .with_doubles("eta", vec![0.1]).unwrap()
        .with_ints("light", vec![0]).unwrap();
    let est = ReweightEstimator::new(two_by_two()).unwrap();
    assert!(matches!(est.accumulate(&mut source), Err(NnError::UnknownField(ref n)) if n == "charm"));
}

// ============================================================================
// Queries and persistence
// ============================================================================

#[test]
fn physics_reweighting_per_record() {
    let mut source = cdf_sample();
    let est = ReweightEstimator::new(two_by_two()).unwrap();
    let table = est.determine_reweighting(&mut source, false, false).unwrap();

    source.select_row(0).unwrap();
    assert_eq!(table.get_physics_reweighting(&source).unwrap(), 1.0);

    source.select_row(5).unwrap(); // bottom, pt 45, |eta| 1.0 -> cell (0, 0)
    let first = table.get_physics_reweighting(&source).unwrap();
    let second = table.get_physics_reweighting(&source).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, table.bottom_correction()[0][0]);
    assert_eq!(first, table.factor(Flavor::Bottom, 45.0, -1.0));
}

#[test]
fn correction_table_json_round_trip() {
    let est = ReweightEstimator::new(two_by_two()).unwrap();
    let table = est.determine_reweighting(&mut cdf_sample(), true, true).unwrap();
    let path = temp_path("corrections.json");
    table.save_json(&path).unwrap();
    let loaded = CorrectionTable::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, table);
    assert_eq!(loaded.pt_bins().edges(), &[20.0, 50.0, 200.0]);
}

#[test]
fn dataset_owns_a_shared_frozen_table() {
    let mut dataset = Dataset::new(cdf_sample());
    dataset.set_pt_bins(vec![20.0, 50.0, 200.0]).unwrap();
    dataset.set_eta_bins(vec![0.0, 1.2, 2.5]).unwrap();
    dataset.reweight_config_mut().sample_fraction = 1.0;
    assert!(dataset.bind_controls(&[("light", "int"), ("bottom", "int")]).is_empty());

    let table = dataset.determine_reweighting(false, false).unwrap();
    assert_eq!(dataset.correction_table().unwrap().as_ref(), table.as_ref());

    for i in 0..dataset.num_entries() {
        dataset.at(i).unwrap();
        let expected = if dataset.get_value("light").unwrap() == 1.0 {
            1.0
        } else {
            let pt = dataset.get_value("pt").unwrap();
            let eta = dataset.get_value("eta").unwrap();
            table.factor(Flavor::Bottom, pt, eta)
        };
        assert_eq!(dataset.get_physics_reweighting().unwrap(), expected);
    }
}

#[test]
fn custom_field_names() {
    let mut source = TableSource::new()
        .with_doubles("jet_pt", vec![30.0, 30.0]).unwrap()
        .with_doubles("jet_eta", vec![0.1, 0.1]).unwrap()
        .with_ints("is_u", vec![1, 0]).unwrap()
        .with_ints("is_c", vec![0, 0]).unwrap()
        .with_ints("is_b", vec![0, 1]).unwrap();
    let mut config = two_by_two();
    config.fields = FieldNames {
        pt: "jet_pt".into(),
        eta: "jet_eta".into(),
        light: "is_u".into(),
        charm: "is_c".into(),
        bottom: "is_b".into(),
        truth: None,
    };
    let table = ReweightEstimator::new(config).unwrap()
        .determine_reweighting(&mut source, false, false)
        .unwrap();
    source.select_row(1).unwrap();
    assert_eq!(table.get_physics_reweighting(&source).unwrap(), 1.0);
}
