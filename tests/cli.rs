use std::fs;

use assert_cmd::Command;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("labelprep 0.1.0\n");
}

// Normalize subcommand tests

#[test]
fn normalize_csv_writes_label_files() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("boxes.csv");
    fs::write(
        &input,
        "filename,width,height,class_id,xmin,ymin,xmax,ymax\n\
         cow_01.jpg,1920,1080,0,800,600,850,680\n",
    )
    .expect("write csv");
    let out = temp.path().join("labels");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("normalize")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Successfully created label file"));

    let content = fs::read_to_string(out.join("cow_01.txt")).expect("read label file");
    assert_eq!(content, "0 0.429688 0.592593 0.026042 0.074074\n");
}

#[test]
fn normalize_json_output_format() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("boxes.json");
    fs::write(
        &input,
        r#"[{"filename": "a.jpg", "width": 100, "height": 100,
             "labels": [{"class_id": 1, "box": [10, 10, 30, 50]}]}]"#,
    )
    .expect("write json");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("normalize")
        .arg(&input)
        .arg("--output-dir")
        .arg(temp.path().join("labels"))
        .args(["--output", "json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"lines_written\": 1"));
}

#[test]
fn normalize_reject_fails_on_out_of_bounds_box() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("boxes.csv");
    fs::write(
        &input,
        "filename,width,height,class_id,xmin,ymin,xmax,ymax\n\
         wide.jpg,100,100,0,50,50,150,90\n",
    )
    .expect("write csv");
    let out = temp.path().join("labels");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("normalize")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .args(["--bounds", "reject"]);
    cmd.assert().failure();
    assert!(!out.join("wide.txt").exists());
}

#[test]
fn normalize_unsupported_format_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let input = temp.path().join("boxes.xml");
    fs::write(&input, "<annotations/>").expect("write input");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("normalize").arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unsupported format"));
}

// Remap subcommand tests

fn write_one_based_labels(dir: &std::path::Path) {
    fs::create_dir_all(dir).expect("create labels dir");
    fs::write(
        dir.join("img_1.txt"),
        "1 0.5 0.5 0.1 0.1\n2 0.2 0.2 0.1 0.1\n5 0.1 0.2 0.3 0.4\n",
    )
    .expect("write label");
    fs::write(dir.join("img_2.txt"), "0 0.1 0.2 0.3 0.4\n").expect("write label");
}

#[test]
fn remap_defaults_to_dry_run() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let labels = temp.path().join("labels");
    write_one_based_labels(&labels);
    let before = fs::read_to_string(labels.join("img_1.txt")).expect("read label");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("remap").arg("--root").arg(&labels);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Files changed: 0"))
        .stdout(predicates::str::contains("Files that would change"))
        .stdout(predicates::str::contains("Unexpected class id lines skipped: 1"))
        .stdout(predicates::str::contains(
            "Warnings: 1 lines already had class id 0",
        ));

    let after = fs::read_to_string(labels.join("img_1.txt")).expect("read label");
    assert_eq!(before, after);
}

#[test]
fn remap_apply_rewrites_files() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let labels = temp.path().join("labels");
    write_one_based_labels(&labels);

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("remap").arg("--root").arg(&labels).arg("--apply");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Files changed: 1"))
        .stdout(predicates::str::contains("Total valid lines kept: 3"));

    let content = fs::read_to_string(labels.join("img_1.txt")).expect("read label");
    assert_eq!(content, "0 0.5 0.5 0.1 0.1\n1 0.2 0.2 0.1 0.1\n");
    let untouched = fs::read_to_string(labels.join("img_2.txt")).expect("read label");
    assert_eq!(untouched, "0 0.1 0.2 0.3 0.4\n");
}

#[test]
fn remap_custom_mapping() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let labels = temp.path().join("labels");
    write_one_based_labels(&labels);

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("remap")
        .arg("--root")
        .arg(&labels)
        .args(["--map", "5:4", "--apply"]);
    cmd.assert().success();

    let content = fs::read_to_string(labels.join("img_1.txt")).expect("read label");
    assert_eq!(content, "4 0.1 0.2 0.3 0.4\n");
}

#[test]
fn remap_invalid_mapping_fails() {
    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.args(["remap", "--map", "1-0"]);
    cmd.assert().failure();
}

#[test]
fn remap_missing_root_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("remap").arg("--root").arg(temp.path().join("nope"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("does not exist"));
}

// Split subcommand tests

fn seed_images(dir: &std::path::Path, count: usize) {
    fs::create_dir_all(dir).expect("create images dir");
    for i in 0..count {
        fs::write(dir.join(format!("img_{i:02}.jpg")), b"jpg").expect("write image");
    }
}

#[test]
fn split_reports_partition_sizes() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = temp.path().join("raw");
    seed_images(&images, 10);

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("split")
        .arg("--images")
        .arg(&images)
        .arg("--labels")
        .arg(temp.path().join("labels"))
        .arg("--out")
        .arg(temp.path().join("processed"));
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Dataset prepared: 8 train, 2 val images"));

    let train = fs::read_dir(temp.path().join("processed/images/train"))
        .expect("read train dir")
        .count();
    assert_eq!(train, 8);
}

#[test]
fn split_uses_project_layout_by_default() {
    let temp = tempfile::tempdir().expect("create temp dir");
    seed_images(&temp.path().join("datasets/raw_images"), 5);

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("split")
        .arg("--project")
        .arg(temp.path())
        .args(["--output", "json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"seed\": 42"));

    assert!(temp.path().join("datasets/processed/images/val").is_dir());
}

#[test]
fn split_strict_fails_without_labels() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = temp.path().join("raw");
    seed_images(&images, 4);

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("split")
        .arg("--images")
        .arg(&images)
        .arg("--labels")
        .arg(temp.path().join("missing_labels"))
        .arg("--out")
        .arg(temp.path().join("processed"))
        .arg("--strict");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("does not exist"));
}

#[test]
fn split_rejects_ratio_out_of_range() {
    let temp = tempfile::tempdir().expect("create temp dir");
    seed_images(&temp.path().join("raw"), 2);

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("split")
        .arg("--images")
        .arg(temp.path().join("raw"))
        .arg("--out")
        .arg(temp.path().join("processed"))
        .args(["--ratio", "1.5"]);
    cmd.assert().failure();
}

// Pipeline subcommand tests

#[test]
fn pipeline_fails_when_trainer_missing() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("pipeline")
        .arg("--project")
        .arg(temp.path())
        .arg("--skip-labeling")
        .env("LABELPREP_TRAINER", "labelprep-no-such-trainer");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("teat_detector_v8n"));

    assert!(temp.path().join("dataset.yaml").is_file());
    assert!(temp.path().join("models").is_dir());
}

// Validate subcommand tests

#[test]
fn validate_fails_without_weights() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("validate").arg("--project").arg(temp.path());
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("best_teat_detector_v8n.pt"))
        .stderr(predicates::str::contains("weights file not found"));
}
