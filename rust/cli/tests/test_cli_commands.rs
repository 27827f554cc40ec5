//! End-to-end command tests driven through `pokersim_cli::run` with in-memory
//! output buffers.

use serde_json::Value;

fn run(args: &[&str]) -> (i32, String, String) {
    let mut argv = vec!["pokersim"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = pokersim_cli::run(argv, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn seat_totals(stats: &Value) -> Vec<u64> {
    let map = stats.as_object().expect("statistics object");
    (0..map.len())
        .map(|seat| {
            map[&seat.to_string()]
                .as_object()
                .unwrap()
                .values()
                .map(|v| v.as_u64().unwrap())
                .sum()
        })
        .collect()
}

#[test]
fn sim_prints_one_block_per_seat() {
    let (code, out, err) = run(&[
        "sim", "--rounds", "1000", "--seats", "4", "--seed", "7", "--progress-every", "250",
    ]);
    assert_eq!(code, 0, "stderr: {}", err);
    assert!(out.starts_with("Simulated: 1000 rounds x 4 seats (draw, seed 7)"));
    for seat in 0..4 {
        assert!(out.contains(&format!("Seat {}: 1000 hands", seat)));
    }
    assert!(err.contains("0250/1000 25.00%"));
    assert!(err.contains("1000/1000 100.00%"));
}

#[test]
fn sim_json_conserves_hands_per_seat() {
    let (code, out, _) = run(&[
        "sim", "--rounds", "2000", "--seats", "6", "--seed", "3", "--json", "--progress-every", "0",
    ]);
    assert_eq!(code, 0);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["completed_rounds"].as_u64(), Some(2000));
    assert_eq!(doc["total_rounds"].as_u64(), Some(2000));
    assert_eq!(doc["variant"].as_str(), Some("draw"));
    assert_eq!(seat_totals(&doc["statistics"]), vec![2000; 6]);
}

#[test]
fn same_seed_gives_same_statistics() {
    let args = [
        "sim", "--rounds", "500", "--seats", "3", "--seed", "99", "--json", "--progress-every", "0",
    ];
    let (_, a, _) = run(&args);
    let (_, b, _) = run(&args);
    let a: Value = serde_json::from_str(&a).unwrap();
    let b: Value = serde_json::from_str(&b).unwrap();
    assert_eq!(a["statistics"], b["statistics"]);
}

#[test]
fn parallel_flag_matches_sequential_statistics() {
    let base = [
        "sim", "--rounds", "3000", "--seats", "4", "--seed", "11", "--json", "--progress-every", "0",
    ];
    let (_, seq, _) = run(&base);
    let mut par_args = base.to_vec();
    par_args.push("--parallel");
    let (code, par, _) = run(&par_args);
    assert_eq!(code, 0);
    let seq: Value = serde_json::from_str(&seq).unwrap();
    let par: Value = serde_json::from_str(&par).unwrap();
    assert_eq!(seq["statistics"], par["statistics"]);
}

#[test]
fn break_after_exits_130_with_partial_report() {
    let (code, out, err) = run(&[
        "sim", "--rounds", "10000", "--seats", "4", "--seed", "5", "--break-after", "5000",
        "--progress-every", "0",
    ]);
    assert_eq!(code, 130);
    assert!(out.starts_with("Simulated: 5000 rounds x 4 seats"));
    assert!(out.contains("Seat 3: 5000 hands"));
    assert!(err.contains("Interrupted: saved 5000/10000 rounds"));
    assert!(!err.contains("Error:"));
}

#[test]
fn sim_output_then_stats_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["run.pksm", "run.pksm.zst"] {
        let path = dir.path().join("logs").join(name);
        let path_str = path.to_str().unwrap();
        let (code, sim_out, _) = run(&[
            "sim", "--rounds", "800", "--seats", "5", "--seed", "21", "--variant", "holdem",
            "--output", path_str, "--json", "--progress-every", "0",
        ]);
        assert_eq!(code, 0);
        assert!(path.exists());

        let (code, stats_out, err) = run(&["stats", "--input", path_str, "--json"]);
        assert_eq!(code, 0, "stderr: {}", err);
        let sim: Value = serde_json::from_str(&sim_out).unwrap();
        let stats: Value = serde_json::from_str(&stats_out).unwrap();
        assert_eq!(stats["header"]["rounds"].as_u64(), Some(800));
        assert_eq!(stats["header"]["seats"].as_u64(), Some(5));
        assert_eq!(stats["header"]["seed"].as_u64(), Some(21));
        assert_eq!(stats["statistics"], sim["statistics"]);
    }
}

#[test]
fn interrupted_sim_saves_completed_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.pksm");
    let path_str = path.to_str().unwrap();
    let (code, _, _) = run(&[
        "sim", "--rounds", "1000", "--seats", "2", "--seed", "8", "--break-after", "400",
        "--output", path_str, "--progress-every", "0",
    ]);
    assert_eq!(code, 130);

    let (code, out, _) = run(&["stats", "--input", path_str]);
    assert_eq!(code, 0);
    assert!(out.starts_with("Rounds: 400 Seats: 2 Variant: draw Seed: 8"));
    assert!(out.contains("Seat 1: 400 hands"));
}

#[test]
fn discard_rounds_with_output_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.pksm");
    let (code, _, err) = run(&[
        "sim", "--rounds", "10", "--discard-rounds", "--output", path.to_str().unwrap(),
    ]);
    assert_eq!(code, 2);
    assert!(err.contains("Error:"));
    assert!(!path.exists());
}

#[test]
fn seat_flag_accepts_full_table_and_rejects_eleven() {
    let (code, _, _) = run(&["sim", "--rounds", "1", "--seats", "10", "--progress-every", "0"]);
    assert_eq!(code, 0);
    let (code, _, err) = run(&["sim", "--rounds", "1", "--seats", "11"]);
    assert_eq!(code, 2);
    assert!(err.contains("Commands:"));
}

#[test]
fn eval_prints_category_key_and_record() {
    let (code, out, _) = run(&["eval", "9h", "9c", "2d", "2s", "5h"]);
    assert_eq!(code, 0);
    assert!(out.contains("Hand: TwoPair"));
    assert!(out.contains("Record: 000000000002925000"));
}

#[test]
fn eval_rejects_duplicates_and_short_hands() {
    let (code, _, err) = run(&["eval", "As", "As", "Kd", "Qh", "Jc"]);
    assert_eq!(code, 2);
    assert!(err.contains("Error:"));

    let (code, _, _) = run(&["eval", "As", "Kd", "Qh", "Jc"]);
    assert_eq!(code, 2);
}

#[test]
fn deal_matches_across_invocations() {
    let args = ["deal", "--seats", "4", "--seed", "123", "--round", "17"];
    let (code, a, _) = run(&args);
    let (_, b, _) = run(&args);
    assert_eq!(code, 0);
    assert_eq!(a, b);
    assert!(a.starts_with("Seed: 123 Round: 17 Variant: draw"));
}

#[test]
fn stats_on_missing_file_exits_2() {
    let (code, _, err) = run(&["stats", "--input", "/nonexistent/dir/run.pksm"]);
    assert_eq!(code, 2);
    assert!(err.contains("Failed to open"));
}

#[test]
fn unknown_command_lists_commands() {
    let (code, out, err) = run(&["frobnicate"]);
    assert_eq!(code, 2);
    assert!(out.is_empty());
    for c in ["sim", "deal", "eval", "stats", "bench", "cfg"] {
        assert!(err.contains(&format!("  {}", c)));
    }
}

#[test]
fn help_goes_to_stdout() {
    let (code, out, err) = run(&["--help"]);
    assert_eq!(code, 0);
    assert!(out.contains("Monte-Carlo poker hand simulator"));
    assert!(err.is_empty());
}

#[test]
fn bench_reports_throughput() {
    let (code, out, _) = run(&["bench", "--hands", "2000", "--seed", "4"]);
    assert_eq!(code, 0);
    assert!(out.starts_with("Benchmark: 2000 hands in"));
}

#[test]
fn failed_run_exits_2_and_saves_partial_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("narrow.pksm");
    let path_str = path.to_str().unwrap();
    let (code, out, err) = run(&[
        "sim", "--rounds", "300", "--seats", "3", "--seed", "6", "--index-bytes", "1",
        "--output", path_str, "--progress-every", "0",
    ]);
    assert_eq!(code, 2);
    assert!(out.starts_with("Simulated: 256 rounds x 3 seats"));
    assert!(err.contains("simulation failed after 256 rounds"));

    let (code, stats_out, _) = run(&["stats", "--input", path_str, "--json"]);
    assert_eq!(code, 0);
    let stats: Value = serde_json::from_str(&stats_out).unwrap();
    assert_eq!(stats["header"]["rounds"].as_u64(), Some(256));
    assert_eq!(stats["header"]["index_bytes"].as_u64(), Some(1));
    assert_eq!(seat_totals(&stats["statistics"]), vec![256; 3]);
}
