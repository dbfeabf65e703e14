//! Position analysis of the planar four-bar linkage.
//!  Example#1
//! ```
//!  use RustedLinkage::kinematics::linkage::LinkageParameters;
//!  use RustedLinkage::kinematics::sweep::{angle_range, sweep};
//!  // the shortest way: full turn of the crank at 1° resolution
//!    let params = LinkageParameters::new(6.0, 2.0, 5.0, 5.0).unwrap();
//!    let theta2 = angle_range(0.0, 360.0, 1.0).unwrap();
//!    let result = sweep(&params, &theta2).unwrap();
//!    assert_eq!(result.len(), 361);
//!    println!("theta3 = {:?}", result.theta3_deg());
//!  ```
//! Example#2
//! ```
//!  // one crank angle, seeded 20° away from the closed form, with convergence history
//!  use RustedLinkage::kinematics::linkage::LinkageParameters;
//!  use RustedLinkage::kinematics::analytical::initial_guess;
//!  use RustedLinkage::kinematics::NR_loop_closure::solve_one;
//!    let params = LinkageParameters::default();
//!    let (theta3, theta4) = initial_guess(&params, 45.0).unwrap();
//!    let offset = 20f64.to_radians();
//!    let outcome = solve_one(&params, 45.0, (theta3 + offset, theta4 + offset), true);
//!    assert!(outcome.converged);
//!    for (i, norm) in outcome.history.unwrap().entries() {
//!        println!("iteration = {}, error = {:e}", i, norm);
//!    }
//!  ```
pub mod NR_loop_closure;
/// closed-form seed of the Newton-Raphson iteration
pub mod analytical;
/// per-iteration error norms of one solve
pub mod convergence;
pub mod error;
/// stateful linkage driven one crank angle at a time
pub mod four_bar;
/// link lengths, loop-closure residuals and Jacobian, Grashof classification
pub mod linkage;
/// continuation over a sequence of crank angles
pub mod sweep;
mod kinematics_tests;
