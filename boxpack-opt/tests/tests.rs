#[cfg(test)]
mod tests {
    use boxpack::entities::BPInstance;
    use boxpack::geometry::{PlacedRect, Rect};
    use boxpack::io::export::{export, export_instance};
    use boxpack::io::generator::ProblemSpecification;
    use boxpack::io::import::import;
    use boxpack_opt::algorithm::{AlgorithmKind, init};
    use boxpack_opt::bench::run_battery;
    use boxpack_opt::config::BPConfig;
    use test_case::test_case;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn spec(container_size: i32, max_side: i32, n_boxes: usize) -> ProblemSpecification {
        ProblemSpecification::new(container_size, 1, max_side, 1, max_side, n_boxes)
    }

    const ALL: [AlgorithmKind; 12] = AlgorithmKind::ALL;

    #[test_case(spec(20, 7, 100); "small boxes")]
    #[test_case(spec(10, 10, 40); "boxes up to the container size")]
    #[test_case(ProblemSpecification::new(30, 10, 20, 2, 8, 50); "wide boxes")]
    #[test_case(ProblemSpecification::new(15, 1, 3, 10, 15, 60); "tall boxes")]
    fn every_algorithm_packs_every_box(spec: ProblemSpecification) {
        init_logger();
        let instance = spec.generate(spec.default_seed()).unwrap();
        let config = BPConfig::default();

        for kind in ALL {
            let solution = init(kind, &instance, &config).optimize();
            assert!(solution.verify(), "{kind} produced overlapping or out of bounds boxes");
            assert_eq!(solution.n_boxes(), instance.boxes.len(), "{kind} lost boxes");
            assert!(solution.n_containers() >= instance.lower_bound);
            assert!(solution.containers.iter().all(|c| !c.is_empty()), "{kind} left an empty container");
        }
    }

    #[test_case(AlgorithmKind::GreedyOnlineNormalPosFirstFit)]
    #[test_case(AlgorithmKind::GreedyAreaDescNormalPosCircTouchBestFit)]
    #[test_case(AlgorithmKind::GreedyAdaptiveBfSpace)]
    #[test_case(AlgorithmKind::LocalSearchLocalSequence)]
    #[test_case(AlgorithmKind::LocalSearchRepackSpace)]
    #[test_case(AlgorithmKind::LocalSearchRelaxedSpace)]
    fn single_box_lands_in_the_corner(kind: AlgorithmKind) {
        let instance = BPInstance::new(20, vec![Rect::new(7, 7)]).unwrap();
        let solution = init(kind, &instance, &BPConfig::default()).optimize();
        assert_eq!(solution.n_containers(), 1);
        assert_eq!(solution.containers[0], vec![PlacedRect::new(0, 0, 7, 7)]);
    }

    #[test_case(AlgorithmKind::GreedyOnlineNormalPosCircTouch)]
    #[test_case(AlgorithmKind::GreedyOnlineSpaceFf)]
    #[test_case(AlgorithmKind::LocalSearchRepackSpace)]
    fn full_container_forces_a_second_one(kind: AlgorithmKind) {
        let instance = BPInstance::new(10, vec![Rect::new(10, 10), Rect::new(1, 1)]).unwrap();
        let solution = init(kind, &instance, &BPConfig::default()).optimize();
        assert!(solution.verify());
        assert_eq!(solution.n_containers(), 2);
        assert_eq!(solution.lower_bound, 2);
    }

    #[test]
    fn zero_step_limit_changes_nothing() {
        let spec = spec(20, 7, 60);
        let instance = spec.generate(spec.default_seed()).unwrap();
        let config = BPConfig::default();

        for kind in ALL {
            let mut algorithm = init(kind, &instance, &config);
            let (solution, done) = algorithm.optimize_step(0);
            assert!(!done, "{kind} finished without doing anything");
            match kind.is_local_search() {
                // the initial solution is already complete
                true => assert_eq!(solution.n_boxes(), instance.boxes.len()),
                false => assert_eq!(solution.n_boxes(), 0),
            }
        }
    }

    #[test_case(AlgorithmKind::GreedyAreaDescSpaceFf)]
    #[test_case(AlgorithmKind::LocalSearchLocalSequence)]
    #[test_case(AlgorithmKind::LocalSearchRelaxedSpace)]
    fn stepping_reaches_the_same_end(kind: AlgorithmKind) {
        let spec = spec(20, 7, 80);
        let instance = spec.generate(spec.default_seed()).unwrap();
        let config = BPConfig::default();

        let full = init(kind, &instance, &config).optimize();

        let mut algorithm = init(kind, &instance, &config);
        let stepped = loop {
            let (solution, done) = algorithm.optimize_step(3);
            assert!(solution.verify() || kind == AlgorithmKind::LocalSearchRelaxedSpace);
            if done {
                break solution;
            }
        };
        assert!(stepped.verify());
        assert_eq!(stepped.n_containers(), full.n_containers());
        assert_eq!(stepped.containers, full.containers);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let spec = spec(20, 7, 80);
        let instance = spec.generate(spec.default_seed()).unwrap();
        let config = BPConfig {
            prng_seed: Some(42),
            ..BPConfig::default()
        };
        for kind in [AlgorithmKind::LocalSearchRepackSpace, AlgorithmKind::LocalSearchRelaxedSpace] {
            let a = init(kind, &instance, &config).optimize();
            let b = init(kind, &instance, &config).optimize();
            assert_eq!(a.containers, b.containers, "{kind} is not deterministic");
        }
    }

    #[test]
    fn instance_survives_export_and_import() {
        let spec = spec(20, 7, 50);
        let instance = spec.generate(spec.default_seed()).unwrap();
        let ext = export_instance(&instance, "generated");
        let json = serde_json::to_string(&ext).unwrap();
        let reimported = import(&serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(reimported.boxes, instance.boxes);
        assert_eq!(reimported.lower_bound, instance.lower_bound);

        let solution = init(AlgorithmKind::GreedyAreaDescNormalPosCircTouch, &reimported, &BPConfig::default()).optimize();
        let ext_solution = export(&solution, solution.time_stamp);
        assert_eq!(ext_solution.n_containers, solution.n_containers());
        assert_eq!(
            ext_solution.containers.iter().map(|c| c.boxes.len()).sum::<usize>(),
            instance.boxes.len()
        );
    }

    #[test]
    fn battery_reports_every_algorithm() {
        init_logger();
        let spec = ProblemSpecification {
            samples: 3,
            ..spec(15, 6, 40)
        };
        let kinds = [
            AlgorithmKind::GreedyOnlineNormalPosFirstFit,
            AlgorithmKind::GreedyAreaDescNormalPosCircTouchBestFit,
            AlgorithmKind::LocalSearchRepackSpace,
        ];
        let results = run_battery(&spec, &kinds, &BPConfig::default()).unwrap();

        assert_eq!(results.len(), kinds.len());
        for (result, kind) in results.iter().zip(kinds) {
            assert_eq!(result.kind, kind);
            assert_eq!(result.n_samples, 3);
            assert!(result.avg_surplus >= 0.0);
            assert!(0.0 < result.avg_k1_density && result.avg_k1_density <= 1.0);
        }
    }

    #[test]
    fn battery_rejects_zero_samples() {
        let spec = ProblemSpecification {
            samples: 0,
            ..spec(15, 6, 40)
        };
        assert!(run_battery(&spec, &AlgorithmKind::ALL, &BPConfig::default()).is_err());
    }
}
