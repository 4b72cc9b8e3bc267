//! House Batch Integration Test
//!
//! Exercises the full batch path: discover House_*.csv files in a directory,
//! process each independently, write one mission file per source. Mirrors
//! what the `flowbench` binary does, but against tempfile-created fixtures.

use flowbench::config::BenchConfig;
use flowbench::pipeline::{process_directory, process_file};
use flowbench::types::{Fixture, FlowControlMission};
use flowbench::writer::mission_output_path;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: &str = "TS,Toilet,Faucet,ClothesWasher,Dishwasher,Shower,Bathtub";

/// Write a house CSV with the given data rows under `dir`.
fn write_house_file(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create house csv");
    writeln!(file, "{HEADER}").expect("write header");
    for row in rows {
        writeln!(file, "{row}").expect("write row");
    }
    path
}

/// Timestamp for a row at the reference 10 s interval, starting 08:00:00.
fn ts(row: usize) -> String {
    let secs = 8 * 3600 + row * 10;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Build rows where `active` maps fixture ordinal -> (start_row, volumes).
fn rows_with_events(total_rows: usize, active: &[(usize, usize, &[f64])]) -> Vec<String> {
    (0..total_rows)
        .map(|row| {
            let mut cells = vec![0.0f64; 6];
            for &(fixture, start, volumes) in active {
                if row >= start && row < start + volumes.len() {
                    cells[fixture] = volumes[row - start];
                }
            }
            let joined: Vec<String> = cells.iter().map(ToString::to_string).collect();
            format!("{},{}", ts(row), joined.join(","))
        })
        .collect()
}

fn read_missions(path: &Path) -> Vec<FlowControlMission> {
    let raw = std::fs::read_to_string(path).expect("mission file readable");
    serde_json::from_str(&raw).expect("mission file parses")
}

#[test]
fn batch_processes_every_house_independently() {
    let dir = tempfile::tempdir().expect("temp dir");

    // House 1: one toilet flush.
    let rows = rows_with_events(6, &[(0, 1, &[2.0, 3.0, 1.0])]);
    write_house_file(dir.path(), "House_1.csv", &rows);

    // House 2: faucet then shower, interleaved start rows.
    let rows = rows_with_events(12, &[(4, 2, &[2.0, 2.0]), (1, 6, &[0.5, 0.5, 0.5])]);
    write_house_file(dir.path(), "House_2.csv", &rows);

    // Unrelated file that must be ignored by discovery.
    std::fs::write(dir.path().join("readme.txt"), "not a house").expect("write file");

    let results =
        process_directory(dir.path(), &BenchConfig::default()).expect("batch runs");
    assert_eq!(results.len(), 2);
    for (path, result) in &results {
        let report = result
            .as_ref()
            .unwrap_or_else(|e| panic!("{} failed: {e}", path.display()));
        assert!(report.output.exists());
    }

    let house_1 = read_missions(&dir.path().join("House_1_mission.json"));
    assert_eq!(house_1.len(), 1);
    assert_eq!(house_1[0].actual_end_use, Some(Fixture::Toilet));

    let house_2 = read_missions(&dir.path().join("House_2_mission.json"));
    assert_eq!(house_2.len(), 2);
    // Shower started at row 2, faucet at row 6: chronological, not valve, order.
    assert_eq!(house_2[0].actual_end_use, Some(Fixture::Shower));
    assert_eq!(house_2[1].actual_end_use, Some(Fixture::Faucet));
}

#[test]
fn one_bad_house_does_not_block_the_others() {
    let dir = tempfile::tempdir().expect("temp dir");

    let rows = rows_with_events(5, &[(3, 1, &[1.5, 1.5])]);
    write_house_file(dir.path(), "House_good.csv", &rows);

    // Missing every fixture column: fatal for this file only.
    std::fs::write(
        dir.path().join("House_broken.csv"),
        "TS,SomethingElse\n08:00:00,1\n",
    )
    .expect("write broken csv");

    let results =
        process_directory(dir.path(), &BenchConfig::default()).expect("batch runs");
    assert_eq!(results.len(), 2);

    let broken = results
        .iter()
        .find(|(path, _)| path.ends_with("House_broken.csv"))
        .expect("broken file in results");
    assert!(broken.1.is_err());
    assert!(
        !dir.path().join("House_broken_mission.json").exists(),
        "failed file must not leave partial output"
    );

    let good = results
        .iter()
        .find(|(path, _)| path.ends_with("House_good.csv"))
        .expect("good file in results");
    let report = good.1.as_ref().expect("good file processed");
    assert_eq!(report.missions_written, 1);

    let missions = read_missions(&dir.path().join("House_good_mission.json"));
    assert_eq!(missions[0].actual_end_use, Some(Fixture::Dishwasher));
    assert_eq!(missions[0].valve_id, 3);
}

#[test]
fn mission_json_matches_testbed_contract() {
    let dir = tempfile::tempdir().expect("temp dir");

    let rows = rows_with_events(6, &[(2, 1, &[2.0, 3.0, 1.0])]);
    let path = write_house_file(dir.path(), "House_contract.csv", &rows);

    let report = process_file(&path, &BenchConfig::default()).expect("file processes");
    assert_eq!(report.output, mission_output_path(&path));

    let raw = std::fs::read_to_string(&report.output).expect("output readable");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("output is JSON");
    let missions = parsed.as_array().expect("top level array");
    assert_eq!(missions.len(), 1);

    let mission = &missions[0];
    assert_eq!(mission["valve_id"], 2);
    assert_eq!(mission["actual_end_use"], "ClothesWasher");
    assert_eq!(mission["duration_scaling_factor"], 1);
    assert_eq!(mission["actual_start_time"], "08:00:10");
    assert_eq!(
        mission["flow_trajectory"],
        serde_json::json!([[10.0, 12.0], [20.0, 18.0], [30.0, 6.0]])
    );
}

#[test]
fn custom_testbed_limits_change_filtering() {
    let dir = tempfile::tempdir().expect("temp dir");

    // Peak 30 l/min: above the default 20 l/min ceiling.
    let rows = rows_with_events(5, &[(1, 1, &[5.0, 3.0])]);
    let path = write_house_file(dir.path(), "House_wide.csv", &rows);

    let report = process_file(&path, &BenchConfig::default()).expect("file processes");
    assert_eq!(report.missions_written, 0);
    assert_eq!(report.filter.above_ceiling, 1);

    let config: BenchConfig = toml::from_str(
        r#"
        [testbed]
        max_peak_flow_lpm = 40.0
        "#,
    )
    .expect("config parses");
    let report = process_file(&path, &config).expect("file processes");
    assert_eq!(report.missions_written, 1);
}
