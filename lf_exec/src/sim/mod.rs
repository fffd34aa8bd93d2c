//! # Simulated robot
//!
//! A differential drive robot following the edge of a dark disc, used when no hardware is
//! present and by the integration tests.
//!
//! The robot starts at the origin facing along +X with the line sensor exactly on the edge of the
//! disc, which curves away to the left. Wheel motion is integrated exactly along circular arcs
//! from the demanded speeds, so the only odometry error comes from encoder quantisation.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::Params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector2;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::{loc::Pose, params::LfParams};
use comms_if::eqpt::{ActuatorError, DriveIf, EncoderCounts, SensIf, SensorError};
use util::maths::{clamp, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle to the simulated robot.
///
/// All handles, including the sensor and drive handles made by `split`, share the same world.
#[derive(Clone)]
pub struct SimRobot {
    world: Rc<RefCell<SimWorld>>,
}

/// Sensor equipment of the simulated robot.
pub struct SimSensors {
    world: Rc<RefCell<SimWorld>>,
}

/// Drive equipment of the simulated robot.
pub struct SimDrive {
    world: Rc<RefCell<SimWorld>>,
}

struct SimWorld {
    params: Params,

    wheel_base_m: f64,
    light_black: f64,
    light_white: f64,
    m_per_tick: f64,

    /// Centre of the disc
    track_centre_m: Vector2<f64>,

    /// True pose of the robot
    pose: Pose,

    /// Total distance travelled by each wheel
    left_dist_m: f64,
    right_dist_m: f64,

    /// Current speed demands
    left_speed_ms: f64,
    right_speed_ms: f64,

    sim_time_s: f64,
    last_update: Option<Instant>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimRobot {
    /// Create a new simulated robot.
    ///
    /// The wheel base and the sensor calibration are taken from the session
    /// parameters so the simulation matches what the software expects.
    pub fn new(params: Params, lf_params: &LfParams) -> Self {
        let track_centre_m = Vector2::new(params.sensor_offset_m, params.track_radius_m);

        debug!("Simulated track centre at {:?}", track_centre_m);

        Self {
            world: Rc::new(RefCell::new(SimWorld {
                params,
                wheel_base_m: lf_params.loc.wheel_base_m,
                light_black: lf_params.sampler.light_black,
                light_white: lf_params.sampler.light_white,
                m_per_tick: lf_params.sampler.m_per_tick,
                track_centre_m,
                pose: Pose::default(),
                left_dist_m: 0.0,
                right_dist_m: 0.0,
                left_speed_ms: 0.0,
                right_speed_ms: 0.0,
                sim_time_s: 0.0,
                last_update: None,
            }))
        }
    }

    /// Create the sensor and drive equipment of this robot.
    pub fn split(&self) -> (SimSensors, SimDrive) {
        (
            SimSensors { world: self.world.clone() },
            SimDrive { world: self.world.clone() }
        )
    }

    /// Get the true pose of the robot.
    pub fn true_pose(&self) -> Pose {
        self.world.borrow().pose
    }

    /// Get the simulated time.
    pub fn sim_time_s(&self) -> f64 {
        self.world.borrow().sim_time_s
    }

    /// Signed distance of the sensor from the line, positive off the disc.
    pub fn sensor_offset_from_line_m(&self) -> f64 {
        self.world.borrow().sensor_offset_from_line_m()
    }
}

impl SimWorld {
    /// Advance the simulation by one step.
    fn step(&mut self) {
        let dt_s = match self.params.time_step_s {
            Some(dt) => dt,
            None => {
                let now = Instant::now();
                let dt = match self.last_update {
                    Some(prev) => (now - prev).as_secs_f64(),
                    None => 0.0
                };
                self.last_update = Some(now);
                dt
            }
        };

        self.advance(dt_s);
    }

    fn advance(&mut self, dt_s: f64) {
        let d_left = self.left_speed_ms * dt_s;
        let d_right = self.right_speed_ms * dt_s;

        self.left_dist_m += d_left;
        self.right_dist_m += d_right;
        self.sim_time_s += dt_s;

        let d_center = (d_left + d_right) / 2.0;
        let d_theta = (d_right - d_left) / self.wheel_base_m;

        // Exact motion along the arc, the chord is shorter than the arc
        let chord = if d_theta.abs() > 1e-9 {
            2.0 * d_center / d_theta * (d_theta / 2.0).sin()
        }
        else {
            d_center
        };

        let theta_mid = self.pose.heading_rad + d_theta / 2.0;
        self.pose.position_m += chord * Vector2::new(theta_mid.cos(), theta_mid.sin());
        self.pose.heading_rad = wrap_pi(self.pose.heading_rad + d_theta);
    }

    fn sensor_offset_from_line_m(&self) -> f64 {
        let sensor_pos = self.pose.position_m
            + self.params.sensor_offset_m * self.pose.forward2();

        (sensor_pos - self.track_centre_m).norm() - self.params.track_radius_m
    }

    fn light(&self) -> f64 {
        let (frac, _) = clamp(
            0.5 + self.sensor_offset_from_line_m() / self.params.sensor_footprint_m,
            0.0,
            1.0
        );

        self.light_black + (self.light_white - self.light_black) * frac
    }

    fn ticks(&self, dist_m: f64) -> i64 {
        (dist_m / self.m_per_tick).round() as i64
    }
}

impl SensIf for SimSensors {
    fn read_line_sensor(&mut self) -> Result<f64, SensorError> {
        let mut world = self.world.borrow_mut();

        world.step();

        Ok(world.light())
    }

    fn read_encoders(&mut self) -> Result<EncoderCounts, SensorError> {
        let world = self.world.borrow();

        Ok(EncoderCounts {
            left_ticks: world.ticks(world.left_dist_m),
            right_ticks: world.ticks(world.right_dist_m),
        })
    }
}

impl DriveIf for SimDrive {
    fn set_motor_speeds(&mut self, left: f64, right: f64) -> Result<(), ActuatorError> {
        if !left.is_finite() || !right.is_finite() {
            return Err(ActuatorError::DemsRejected { left, right });
        }

        let mut world = self.world.borrow_mut();
        world.left_speed_ms = left;
        world.right_speed_ms = right;

        Ok(())
    }
}
