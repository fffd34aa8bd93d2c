//! # Line Follower Executable Parameters
//!
//! This module provides the parameters for the executable, and gathers the parameters of every
//! module so they can be loaded and validated together at the start of a session.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{ctrl_loop, line_ctrl, loc, loco_ctrl, sampler};
use util::params::{self, LoadError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the executable itself, from `lf_exec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LfExecParams {

    /// Number of trajectory records which may wait to be archived before new
    /// records are dropped.
    pub log_queue_capacity: usize,

    /// Stop after this many cycles, runs until stopped if not given.
    #[serde(default)]
    pub max_cycles: Option<u64>,

    /// Control loop parameters
    pub ctrl_loop: ctrl_loop::Params,
}

/// All parameters for a control session.
#[derive(Debug, Clone)]
pub struct LfParams {
    pub log_queue_capacity: usize,
    pub max_cycles: Option<u64>,

    pub ctrl_loop: ctrl_loop::Params,
    pub line_ctrl: line_ctrl::Params,
    pub loco_ctrl: loco_ctrl::Params,
    pub loc: loc::Params,
    pub sampler: sampler::Params,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl LfParams {
    /// Load all parameter files from the parameters directory and validate them.
    pub fn load() -> Result<Self, LoadError> {
        let exec: LfExecParams = params::load("lf_exec.toml")?;

        let p = Self {
            log_queue_capacity: exec.log_queue_capacity,
            max_cycles: exec.max_cycles,
            ctrl_loop: exec.ctrl_loop,
            line_ctrl: params::load("line_ctrl.toml")?,
            loco_ctrl: params::load("loco_ctrl.toml")?,
            loc: params::load("loc.toml")?,
            sampler: params::load("sampler.toml")?,
        };

        p.validate()?;

        Ok(p)
    }

    /// Validate every set of parameters.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.log_queue_capacity == 0 {
            return Err(LoadError::InvalidParam(
                "lf_exec: log_queue_capacity must be at least 1".into()
            ));
        }

        self.ctrl_loop.validate()?;
        self.line_ctrl.validate()?;
        self.loco_ctrl.validate()?;
        self.loc.validate()?;
        self.sampler.validate()
    }
}
