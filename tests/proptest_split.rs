use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use labelprep::split::{plan_split, split_dataset, train_count, SplitOptions};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn split_is_a_partition_of_the_input(
        names in proptest_helpers::arb_image_names(24),
        ratio in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let paths: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        let plan = plan_split(paths, ratio, seed);

        prop_assert_eq!(plan.train.len(), train_count(names.len(), ratio));
        prop_assert_eq!(plan.train.len() + plan.val.len(), names.len());

        let train: BTreeSet<_> = plan.train.iter().collect();
        let val: BTreeSet<_> = plan.val.iter().collect();
        prop_assert!(train.is_disjoint(&val));

        let all: BTreeSet<PathBuf> = plan.train.iter().chain(&plan.val).cloned().collect();
        let expected: BTreeSet<PathBuf> = names.iter().map(PathBuf::from).collect();
        prop_assert_eq!(all, expected);
    }

    #[test]
    fn plan_ignores_discovery_order(
        names in proptest_helpers::arb_image_names(24),
        seed in any::<u64>(),
    ) {
        let forward: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        let mut backward = forward.clone();
        backward.reverse();

        prop_assert_eq!(plan_split(forward, 0.8, seed), plan_split(backward, 0.8, seed));
    }

    #[test]
    fn split_dataset_copies_labels_only_for_labeled_images(
        names in proptest_helpers::arb_image_names(12),
        labeled_mask in proptest::collection::vec(any::<bool>(), 12),
        seed in any::<u64>(),
    ) {
        let temp = tempfile::tempdir().expect("create temp dir");
        let images_dir = temp.path().join("raw");
        let labels_dir = temp.path().join("labels");
        fs::create_dir_all(&images_dir).expect("create images dir");
        fs::create_dir_all(&labels_dir).expect("create labels dir");

        let mut labeled = BTreeSet::new();
        for (name, is_labeled) in names.iter().zip(&labeled_mask) {
            fs::write(images_dir.join(name), b"img").expect("write image");
            if *is_labeled {
                let label = PathBuf::from(name).with_extension("txt");
                fs::write(labels_dir.join(&label), "0 0.5 0.5 0.1 0.1\n").expect("write label");
                labeled.insert(name.clone());
            }
        }

        let opts = SplitOptions {
            images_dir,
            labels_dir,
            output_dir: temp.path().join("processed"),
            ratio: 0.8,
            seed,
            clean: false,
        };
        let report = split_dataset(&opts).expect("split");

        prop_assert_eq!(report.total_images(), names.len());
        prop_assert_eq!(
            report.train.labels_copied + report.val.labels_copied,
            labeled.len()
        );
        prop_assert_eq!(report.unlabeled_count(), names.len() - labeled.len());

        for (partition, part) in [("train", &report.train), ("val", &report.val)] {
            for name in &part.images {
                let label = PathBuf::from(name).with_extension("txt");
                let label_out = opts.output_dir.join("labels").join(partition).join(&label);
                prop_assert!(opts.output_dir.join("images").join(partition).join(name).is_file());
                prop_assert_eq!(label_out.is_file(), labeled.contains(name));
            }
        }
    }
}
