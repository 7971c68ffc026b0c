use image::{Rgb, RgbImage};
use lane_detect::preproc::{LanePreprocessor, PreprocParams};
use lane_detect::{
    run_sequence, DebugOutputs, DetectionMode, FrameReport, LaneTracker, MemorySource, RunConfig,
    RunPaths, Runner, TrackerParams,
};
use std::fs;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Dark road with two bright stripes in the lower part of the frame.
fn road_frame() -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        let on_stripe = y >= 260 && ((230..245).contains(&x) || (395..410).contains(&x));
        if on_stripe {
            Rgb([230, 230, 230])
        } else {
            Rgb([50, 50, 50])
        }
    })
}

#[test]
fn runner_survives_an_empty_frame_between_good_ones() {
    init();
    let pre = LanePreprocessor::new(PreprocParams::default()).expect("preprocessor");
    let tracker = LaneTracker::new(TrackerParams::default()).expect("tracker");
    let mut runner = Runner::new(pre, tracker);

    let mut source = MemorySource::new([road_frame(), RgbImage::new(0, 0), road_frame()]);
    let summary = runner.run(&mut source);

    assert_eq!(summary.frames_read, 3);
    assert_eq!(summary.frames_processed, 2);
    assert_eq!(summary.failed_frames, 1);
    assert_eq!(summary.final_mode, DetectionMode::Combined);
    assert!(runner.tracker().fits().is_some());
}

#[test]
fn directory_run_writes_every_artifact() {
    init();
    let input = tempfile::tempdir().expect("input");
    let output = tempfile::tempdir().expect("output");
    for i in 0..3 {
        road_frame()
            .save(input.path().join(format!("{i:03}.png")))
            .expect("save");
    }

    let windows_dir = output.path().join("windows");
    let histogram = output.path().join("hist.json");
    let report = output.path().join("report.jsonl");
    let config = RunConfig {
        debug: DebugOutputs {
            histogram_path: Some(histogram.display().to_string()),
            windows_dir: Some(windows_dir.display().to_string()),
        },
        ..RunConfig::default()
    };
    let paths = RunPaths {
        input: input.path().to_path_buf(),
        output: output.path().join("frames"),
        report: Some(report.clone()),
    };

    let summary = run_sequence(&config, &paths).expect("run");
    assert_eq!(summary.frames_processed, 3);
    assert_eq!(summary.failed_frames, 0);

    for i in 0..3 {
        assert!(paths.output.join(format!("frame_{i:06}.png")).is_file());
        assert!(windows_dir.join(format!("windows_{i:06}.png")).is_file());
    }
    assert!(histogram.is_file());

    let text = fs::read_to_string(&report).expect("report");
    let reports: Vec<FrameReport> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[2].index, 2);
    assert!(reports[0]
        .source
        .as_deref()
        .is_some_and(|s| s.ends_with("000.png")));
}

#[test]
fn invalid_config_stops_before_any_output() {
    let dir = tempfile::tempdir().expect("dir");
    let mut config = RunConfig::default();
    config.preproc.target_width = 0;
    let paths = RunPaths {
        input: dir.path().to_path_buf(),
        output: dir.path().join("frames"),
        report: None,
    };
    assert!(run_sequence(&config, &paths).is_err());
    assert!(!paths.output.exists());
}
