//! Training table parameters and the rest-decay policy
//!
//! A [`TrainingProtocol`] is validated once at construction, so every table it
//! describes is finite: rests shrink by a positive decrement and the table
//! ends as soon as the next rest would fall below the floor.

use crate::config::TrainingConfig;
use crate::error::{Result, TrainerError};
use std::time::Duration;

/// Validated training table parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingProtocol {
    initial_rest: u32,
    rest_decrement: u32,
    minimum_rest: u32,
    hold_fraction: f64,
    default_reference_hold: u32,
}

impl TrainingProtocol {
    /// Build a protocol from raw parameters
    ///
    /// # Errors
    ///
    /// Returns `TrainerError::Protocol` if the decrement or initial rest is
    /// zero, if `hold_fraction` is outside `(0, 1]`, or if the default
    /// reference hold is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use co2trainer::timer::TrainingProtocol;
    ///
    /// let protocol = TrainingProtocol::new(90, 15, 15, 0.5, 30).unwrap();
    /// assert_eq!(protocol.hold_target(Some(40)), 20);
    /// assert_eq!(protocol.total_rounds(), 6);
    /// ```
    pub fn new(
        initial_rest: u32,
        rest_decrement: u32,
        minimum_rest: u32,
        hold_fraction: f64,
        default_reference_hold: u32,
    ) -> Result<Self> {
        if initial_rest == 0 {
            return Err(
                TrainerError::Protocol("initial rest must be greater than 0".to_string()).into(),
            );
        }
        if rest_decrement == 0 {
            return Err(
                TrainerError::Protocol("rest decrement must be greater than 0".to_string()).into(),
            );
        }
        if !(hold_fraction > 0.0 && hold_fraction <= 1.0) {
            return Err(TrainerError::Protocol(format!(
                "hold fraction must be in (0, 1], got {}",
                hold_fraction
            ))
            .into());
        }
        if default_reference_hold == 0 {
            return Err(TrainerError::Protocol(
                "default reference hold must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(Self {
            initial_rest,
            rest_decrement,
            minimum_rest,
            hold_fraction,
            default_reference_hold,
        })
    }

    /// Build a protocol from the `training` configuration section
    pub fn from_config(config: &TrainingConfig) -> Result<Self> {
        Self::new(
            config.initial_rest_seconds,
            config.rest_decrement_seconds,
            config.minimum_rest_seconds,
            config.hold_fraction,
            config.default_reference_hold_seconds,
        )
    }

    /// Length of the first rest
    pub fn initial_rest(&self) -> u32 {
        self.initial_rest
    }

    /// Amount each rest shrinks by
    pub fn rest_decrement(&self) -> u32 {
        self.rest_decrement
    }

    /// Shortest rest that still starts a round
    pub fn minimum_rest(&self) -> u32 {
        self.minimum_rest
    }

    /// Fraction of the reference hold used per round
    pub fn hold_fraction(&self) -> f64 {
        self.hold_fraction
    }

    /// Reference used when none (or a non-positive one) is supplied
    pub fn default_reference_hold(&self) -> u32 {
        self.default_reference_hold
    }

    /// Per-round hold target for a reference max hold
    ///
    /// A missing or zero reference is replaced by the default reference, so
    /// the result is always at least one second.
    pub fn hold_target(&self, reference_max_hold: Option<u32>) -> u32 {
        let reference = reference_max_hold
            .filter(|seconds| *seconds > 0)
            .unwrap_or(self.default_reference_hold);
        let target = (f64::from(reference) * self.hold_fraction).ceil();
        (target as u32).max(1)
    }

    /// Rest that follows `current_rest`, or `None` when the table is over
    pub fn next_rest(&self, current_rest: u32) -> Option<u32> {
        current_rest
            .checked_sub(self.rest_decrement)
            .filter(|next| *next >= self.minimum_rest)
    }

    /// Every rest of the table, in order
    pub fn rest_schedule(&self) -> Vec<u32> {
        std::iter::successors(Some(self.initial_rest), |rest| self.next_rest(*rest)).collect()
    }

    /// Number of rounds a table runs when it is not aborted
    pub fn total_rounds(&self) -> u32 {
        self.rest_schedule().len() as u32
    }

    /// Wall-clock length of an uninterrupted table at one second per unit
    pub fn estimated_duration(&self, hold_target: u32) -> Duration {
        let rests: u64 = self.rest_schedule().iter().map(|r| u64::from(*r)).sum();
        let holds = u64::from(hold_target) * u64::from(self.total_rounds());
        Duration::from_secs(rests + holds)
    }
}

impl Default for TrainingProtocol {
    fn default() -> Self {
        Self {
            initial_rest: 90,
            rest_decrement: 15,
            minimum_rest: 15,
            hold_fraction: 0.5,
            default_reference_hold: 30,
        }
    }
}
