use crate::Utils::task_config::LinkageTask;
use crate::kinematics::NR_loop_closure::solve_one;
use crate::kinematics::analytical::initial_guess;
use crate::kinematics::error::KinematicsError;
use crate::kinematics::four_bar::FourBar;
use crate::kinematics::linkage::LinkageParameters;
use crate::kinematics::sweep::{ContinuationSweep, SeedingStrategy, angle_range, sweep};
use log::info;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tabled::{builder::Builder, settings::Style};

/// Linkages used throughout the examples
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ExampleLinkage {
    /// r1 = 6, r2 = 2, r3 = 5, r4 = 5
    CrankRocker,
    LongCoupler,
    WideFrame,
    ShortCrank,
    /// frame is the shortest link, both side links rotate fully
    DoubleCrank,
    /// cannot be assembled for crank angles beyond about 68°
    NonGrashof,
}

impl ExampleLinkage {
    pub fn params(&self) -> LinkageParameters {
        let (r1, r2, r3, r4) = match self {
            ExampleLinkage::CrankRocker => (6.0, 2.0, 5.0, 5.0),
            ExampleLinkage::LongCoupler => (6.0, 2.0, 5.5, 5.0),
            ExampleLinkage::WideFrame => (7.0, 3.0, 6.0, 5.0),
            ExampleLinkage::ShortCrank => (5.0, 1.5, 4.0, 4.5),
            ExampleLinkage::DoubleCrank => (2.0, 6.0, 5.0, 5.0),
            ExampleLinkage::NonGrashof => (4.0, 3.0, 2.0, 2.0),
        };
        LinkageParameters { r1, r2, r3, r4 }
    }
}

pub fn linkage_examples(example: usize) -> Result<(), KinematicsError> {
    match example {
        0 => {
            // full turn of the crank at 1° resolution
            let params = ExampleLinkage::CrankRocker.params();
            let result = sweep(&params, &angle_range(0.0, 360.0, 1.0)?)?;
            result.log_statistics();
            for sample in result.samples().iter().step_by(30) {
                info!(
                    "theta2 = {:>5.1}°: (theta3, theta4) = {:?}",
                    sample.theta2_deg, sample.angles
                );
            }
        }
        1 => {
            // single crank angle seeded 20° away from the closed form
            let params = ExampleLinkage::CrankRocker.params();
            let (theta3, theta4) = initial_guess(&params, 45.0)
                .ok_or(KinematicsError::NoRealSolution { theta2_deg: 45.0 })?;
            let offset = 20f64.to_radians();
            let outcome = solve_one(&params, 45.0, (theta3 + offset, theta4 + offset), true);
            info!(
                "{} after {} iterations, angles = {:?}°",
                outcome.status,
                outcome.iterations,
                outcome.angles_degrees()
            );
            if let Some(history) = &outcome.history {
                history.log_history();
            }
        }
        2 => {
            // warm start vs closed form reseeded at every sample
            let params = ExampleLinkage::WideFrame.params();
            let theta2 = angle_range(0.0, 360.0, 2.0)?;
            let warm = sweep(&params, &theta2)?;
            let reseed = ContinuationSweep {
                seeding: SeedingStrategy::Reseed,
                ..ContinuationSweep::new()
            }
            .run(&params, &theta2)?;
            let mut builder = Builder::default();
            builder.push_record(["seeding", "converged", "missing", "max step, deg"]);
            for (seeding, result) in [("warm start", &warm), ("reseed", &reseed)] {
                builder.push_record([
                    seeding.to_string(),
                    result.converged_count().to_string(),
                    result.missing_count().to_string(),
                    format!("{:.4}", result.max_step_deg()),
                ]);
            }
            let mut table = builder.build();
            table.with(Style::modern_rounded());
            info!("\n{}", table);
        }
        3 => {
            // non-Grashof linkage: only part of the turn can be assembled
            let params = ExampleLinkage::NonGrashof.params();
            let theta2 = angle_range(0.0, 180.0, 10.0)?;
            let plain = sweep(&params, &theta2)?;
            let anchored = ContinuationSweep {
                anchor_from_closed_form: true,
                ..ContinuationSweep::new()
            }
            .run(&params, &theta2)?;
            info!("missing without anchoring: {:?}", plain.missing_indices());
            info!("missing with anchoring: {:?}", anchored.missing_indices());
        }
        4 => {
            // coupler curve of the stateful linkage
            let mut linkage = FourBar::with_params(ExampleLinkage::LongCoupler.params())?;
            let curve = linkage.trace(&angle_range(0.0, 360.0, 15.0)?);
            info!("{} linkage, coupler curve:", linkage.mechanism_type());
            for point in curve {
                info!("x = {:>8.4}, y = {:>8.4}", point.x, point.y);
            }
        }
        5 => {
            // every example linkage swept in parallel
            let all: Vec<ExampleLinkage> = ExampleLinkage::iter().collect();
            let params_list: Vec<LinkageParameters> = all.iter().map(|e| e.params()).collect();
            let results = ContinuationSweep::new()
                .sweep_independent(&params_list, &angle_range(0.0, 360.0, 5.0)?)?;
            let mut builder = Builder::default();
            builder.push_record(["linkage", "type", "converged", "missing"]);
            for ((example, params), result) in all.iter().zip(&params_list).zip(&results) {
                builder.push_record([
                    format!("{:?}", example),
                    params.mechanism_type().to_string(),
                    result.converged_count().to_string(),
                    result.missing_count().to_string(),
                ]);
            }
            let mut table = builder.build();
            table.with(Style::modern_rounded());
            info!("\n{}", table);
        }
        6 => {
            // the same sweep described by a TOML task
            let document = r#"
                [linkage]
                r1 = 6.0
                r2 = 2.0
                r3 = 5.0
                r4 = 5.0

                [sweep]
                start_deg = 0.0
                end_deg = 360.0
                step_deg = 10.0
                track_history = true
            "#;
            let task: LinkageTask = document.parse()?;
            let result = task.run()?;
            let worst = result
                .samples()
                .iter()
                .map(|s| s.iterations)
                .max()
                .unwrap_or(0);
            info!("largest number of iterations per sample: {}", worst);
        }
        _ => {
            info!("no example number {}", example);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::linkage::MechanismType;

    #[test]
    fn test_example_linkages_are_valid() {
        for example in ExampleLinkage::iter() {
            assert!(example.params().validate().is_ok(), "{:?}", example);
        }
        assert_eq!(ExampleLinkage::CrankRocker.params(), LinkageParameters::default());
        assert_eq!(
            ExampleLinkage::DoubleCrank.params().mechanism_type(),
            MechanismType::DoubleCrank
        );
        assert_eq!(
            ExampleLinkage::NonGrashof.params().mechanism_type(),
            MechanismType::NonGrashof
        );
    }

    #[test]
    fn test_all_examples_run() {
        for example in 0..8 {
            assert!(linkage_examples(example).is_ok(), "example {} failed", example);
        }
    }
}
