#![allow(dead_code)]

use labelprep::label::LabelRecord;
use labelprep::normalize::ImageLabels;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Six decimals of a normalized coordinate, expressed in pixels.
pub fn eps_label(image_w: u32, image_h: u32) -> f64 {
    image_w.max(image_h) as f64 * 1e-6
}

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Integer-aligned boxes with `0 <= xmin < xmax <= width` (same for y).
pub fn arb_record_within(width: u32, height: u32) -> BoxedStrategy<LabelRecord> {
    (0u32..width, 0u32..height, 0u32..8)
        .prop_flat_map(move |(xmin, ymin, class_id)| {
            (
                Just(xmin),
                Just(ymin),
                (xmin + 1)..=width,
                (ymin + 1)..=height,
                Just(class_id),
            )
        })
        .prop_map(|(xmin, ymin, xmax, ymax, class_id)| {
            LabelRecord::from_xyxy(
                class_id,
                [xmin as f64, ymin as f64, xmax as f64, ymax as f64],
            )
        })
        .boxed()
}

pub fn arb_image_labels(max_labels: usize) -> BoxedStrategy<ImageLabels> {
    ("[a-z]{1,8}", 2u32..=4096, 2u32..=4096)
        .prop_flat_map(move |(stem, width, height)| {
            (
                Just(format!("{stem}.jpg")),
                Just(width),
                Just(height),
                proptest::collection::vec(arb_record_within(width, height), 0..=max_labels),
            )
        })
        .prop_map(|(filename, width, height, labels)| ImageLabels {
            filename,
            width,
            height,
            labels,
        })
        .boxed()
}

/// Distinct image file names with mixed extension case.
pub fn arb_image_names(max: usize) -> BoxedStrategy<Vec<String>> {
    proptest::collection::btree_set("[a-z0-9]{1,10}", 0..=max)
        .prop_flat_map(|stems| {
            let count = stems.len();
            (
                Just(stems.into_iter().collect::<Vec<_>>()),
                proptest::collection::vec(prop::sample::select(vec!["jpg", "JPEG", "png"]), count),
            )
        })
        .prop_map(|(stems, exts)| {
            stems
                .into_iter()
                .zip(exts)
                .map(|(stem, ext)| format!("{stem}.{ext}"))
                .collect()
        })
        .boxed()
}
