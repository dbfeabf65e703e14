#[cfg(test)]
mod tests {
    use crate::kinematics::NR_loop_closure::{SolveStatus, solve_one};
    use crate::kinematics::analytical::initial_guess;
    use crate::kinematics::linkage::{LinkageParameters, angle_difference_deg};
    use crate::kinematics::sweep::{ContinuationSweep, SeedingStrategy, angle_range, sweep};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn full_turn() -> Vec<f64> {
        angle_range(0.0, 360.0, 1.0).unwrap()
    }

    #[test]
    fn test_full_turn_baseline() {
        // regression baseline for the 6-2-5-5 crank-rocker: no missing samples
        let params = LinkageParameters::default();
        let result = sweep(&params, &full_turn()).unwrap();
        assert_eq!(result.len(), 361);
        assert_eq!(result.missing_count(), 0);
        assert_eq!(result.count_status(SolveStatus::Converged), 361);
        // the turn closes on the configuration it started from
        let angles = result.angles();
        let (first, last) = (angles[0].unwrap(), angles[360].unwrap());
        assert!((first.0 - last.0).abs() < 1e-6);
        assert!((first.1 - last.1).abs() < 1e-6);
    }

    #[test]
    fn test_sweep_samples_close_the_loop() {
        let params = LinkageParameters::default();
        let result = sweep(&params, &full_turn()).unwrap();
        for sample in result.samples() {
            let (theta3, theta4) = sample.angles.unwrap();
            let f = params.residuals(
                sample.theta2_deg.to_radians(),
                theta3.to_radians(),
                theta4.to_radians(),
            );
            assert!(f.norm() < 1e-8, "residual {} at {}°", f.norm(), sample.theta2_deg);
        }
    }

    #[test]
    fn test_random_guesses_round_trip() {
        let params = LinkageParameters::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let theta2_deg = rng.random_range(0.0..360.0);
            let (t3, t4) = initial_guess(&params, theta2_deg).unwrap();
            let guess = (
                t3 + rng.random_range(-15.0f64..15.0).to_radians(),
                t4 + rng.random_range(-15.0f64..15.0).to_radians(),
            );
            let outcome = solve_one(&params, theta2_deg, guess, true);
            assert!(outcome.converged, "no convergence at {}°", theta2_deg);
            let f = params.residuals(theta2_deg.to_radians(), outcome.theta3, outcome.theta4);
            assert!(f[0].abs() < 1e-9 && f[1].abs() < 1e-9);
            let history = outcome.history.unwrap();
            assert!(history.final_norm().unwrap() < 1e-9);
            assert!(history.max_consecutive_increases() <= 3);
        }
    }

    #[test]
    fn test_warm_start_keeps_branch_continuity() {
        let params = LinkageParameters::default();
        let result = sweep(&params, &full_turn()).unwrap();
        assert!(result.max_step_deg() < 2.0, "step {}", result.max_step_deg());
        let theta3 = result.theta3_deg();
        let theta4 = result.theta4_deg();
        for i in 0..360 {
            assert!((theta3[i + 1] - theta3[i]).abs() < 2.0);
            assert!((theta4[i + 1] - theta4[i]).abs() < 2.0);
        }
    }

    #[test]
    fn test_warm_start_never_jumps_to_crossed_branch() {
        // every sample must agree with the open-configuration closed form up to 2*pi
        for params in [
            LinkageParameters::default(),
            LinkageParameters::new(6.0, 2.0, 5.5, 5.0).unwrap(),
            LinkageParameters::new(7.0, 3.0, 6.0, 5.0).unwrap(),
        ] {
            let result = sweep(&params, &full_turn()).unwrap();
            assert_eq!(result.missing_count(), 0);
            for sample in result.samples() {
                let (theta3, theta4) = sample.angles.unwrap();
                let (open3, open4) = initial_guess(&params, sample.theta2_deg).unwrap();
                assert!(angle_difference_deg(theta3, open3.to_degrees()).abs() < 1e-6);
                assert!(angle_difference_deg(theta4, open4.to_degrees()).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_reseeded_sweep_matches_warm_start() {
        let params = LinkageParameters::default();
        let theta2 = angle_range(0.0, 360.0, 3.0).unwrap();
        let warm = sweep(&params, &theta2).unwrap();
        let reseed = ContinuationSweep {
            seeding: SeedingStrategy::Reseed,
            ..ContinuationSweep::new()
        }
        .run(&params, &theta2)
        .unwrap();
        assert_eq!(reseed.theta2_deg(), warm.theta2_deg());
        assert_eq!(reseed.missing_count(), 0);
        for (a, b) in reseed.angles().iter().zip(warm.angles()) {
            let (a, b) = (a.unwrap(), b.unwrap());
            assert!(angle_difference_deg(a.0, b.0).abs() < 1e-6);
            assert!(angle_difference_deg(a.1, b.1).abs() < 1e-6);
        }
    }

    #[test]
    fn test_no_closed_form_falls_back_and_reports() {
        // non-Grashof linkage, not assemblable beyond about 68°
        let params = LinkageParameters::new(4.0, 3.0, 2.0, 2.0).unwrap();
        let theta2 = [180.0, 90.0, 60.0, 30.0];
        assert!(initial_guess(&params, 180.0).is_none());

        // the fallback (45°, 45°) has theta3 == theta4, so the very first Jacobian is singular
        // and the chain never gets anchored: all four samples are missing
        let plain = sweep(&params, &theta2).unwrap();
        assert_eq!(plain.len(), 4);
        assert_eq!(plain.samples()[0].status, SolveStatus::SingularJacobian);
        assert_eq!(plain.samples()[0].iterations, 1);
        assert_eq!(plain.missing_indices(), vec![0, 1, 2, 3]);

        let anchored = ContinuationSweep {
            anchor_from_closed_form: true,
            ..ContinuationSweep::new()
        }
        .run(&params, &theta2)
        .unwrap();
        assert_eq!(anchored.missing_indices(), vec![0, 1]);
        for sample in &anchored.samples()[2..] {
            let (theta3, theta4) = sample.angles.unwrap();
            let f = params.residuals(
                sample.theta2_deg.to_radians(),
                theta3.to_radians(),
                theta4.to_radians(),
            );
            assert!(f.norm() < 1e-8);
        }
    }

    #[test]
    fn test_failed_sample_does_not_poison_the_chain() {
        // 180° cannot be assembled; later samples are seeded with 60°, not the failed iterate
        let params = LinkageParameters::new(4.0, 3.0, 2.0, 2.0).unwrap();
        let result = sweep(&params, &[60.0, 180.0, 55.0, 50.0]).unwrap();
        assert_eq!(result.missing_indices(), vec![1]);
        assert_ne!(result.samples()[1].status, SolveStatus::Converged);
    }

    #[test]
    fn test_sweep_with_histories() {
        let params = LinkageParameters::default();
        let tracked = ContinuationSweep {
            track_history: true,
            ..ContinuationSweep::new()
        };
        let result = tracked.run(&params, &angle_range(0.0, 90.0, 5.0).unwrap()).unwrap();
        for sample in result.samples() {
            let history = sample.history.as_ref().unwrap();
            assert_eq!(history.len(), sample.iterations);
            assert!(history.final_norm().unwrap() < 1e-9);
        }
    }

    #[test]
    fn test_independent_sweeps_in_parallel() {
        let params_list = [
            LinkageParameters::default(),
            LinkageParameters::new(6.0, 2.0, 5.5, 5.0).unwrap(),
            LinkageParameters::new(5.0, 1.5, 4.0, 4.5).unwrap(),
        ];
        let theta2 = angle_range(0.0, 360.0, 2.0).unwrap();
        let results = ContinuationSweep::new()
            .sweep_independent(&params_list, &theta2)
            .unwrap();
        assert_eq!(results.len(), 3);
        for (params, result) in params_list.iter().zip(&results) {
            assert_eq!(result.missing_count(), 0);
            assert_eq!(result, &sweep(params, &theta2).unwrap());
        }
        let with_bad = [
            LinkageParameters::default(),
            LinkageParameters {
                r3: 0.0,
                ..LinkageParameters::default()
            },
        ];
        assert!(ContinuationSweep::new().sweep_independent(&with_bad, &theta2).is_err());
    }

    #[test]
    fn test_malformed_input_never_looks_solved() {
        let valid = LinkageParameters::default();
        let zero_crank = LinkageParameters { r2: 0.0, ..valid };
        let negative_crank = LinkageParameters { r2: -2.0, ..valid };
        assert_eq!(initial_guess(&zero_crank, 45.0), None);
        assert_eq!(initial_guess(&negative_crank, 45.0), None);
        assert_eq!(initial_guess(&valid, f64::NAN), None);

        // a seed that would close the loop of the mirrored linkage must still be refused
        let guess = (-0.527, -2.238);
        let outcome = solve_one(&negative_crank, 45.0, guess, false);
        assert!(!outcome.converged);
        assert_eq!(outcome.status, SolveStatus::InvalidInput);
        assert!(sweep(&negative_crank, &[45.0]).is_err());
    }
}
