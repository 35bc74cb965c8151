//! # Circuit Breaker Module
//!
//! This module implements the circuit breaker pattern for the consolidation
//! service. After repeated failures the service is skipped for a while, so a
//! dead endpoint does not add its timeout to every grocery-list build.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
}

/// Circuit breaker for consolidation service calls
///
/// # State Machine
///
/// - **Closed**: Normal operation, calls pass through
/// - **Open**: Failure threshold reached, calls are skipped
/// - **Reset**: Once the reset window has elapsed the next call is let through
///
/// # Configuration
///
/// Uses `RecoveryConfig` for:
/// - `circuit_breaker_threshold`: Failures before opening (default: 5)
/// - `circuit_breaker_reset_secs`: Time before attempting reset (default: 60s)
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use groceries::circuit_breaker::CircuitBreaker;
    /// use groceries::config::RecoveryConfig;
    ///
    /// let circuit_breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(!circuit_breaker.is_open());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    // A panic while holding the lock leaves plain counters behind, still usable
    fn state(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if the circuit breaker is open (skipping calls)
    ///
    /// Resets to closed once the reset window has elapsed.
    pub fn is_open(&self) -> bool {
        let mut state = self.state();

        if state.failure_count < self.config.circuit_breaker_threshold {
            return false;
        }

        let Some(last_time) = state.last_failure_time else {
            return false;
        };
        if last_time.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs) {
            return true;
        }

        info!(
            failures = state.failure_count,
            "Circuit breaker reset window elapsed, trying the service again"
        );
        *state = BreakerState::default();
        false
    }

    /// Record a failed service call
    pub fn record_failure(&self) {
        let mut state = self.state();
        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());

        if state.failure_count == self.config.circuit_breaker_threshold {
            warn!(
                failures = state.failure_count,
                reset_secs = self.config.circuit_breaker_reset_secs,
                "Circuit breaker opened for consolidation service"
            );
        }
    }

    /// Record a successful service call, closing the circuit
    pub fn record_success(&self) {
        *self.state() = BreakerState::default();
    }

    /// Consecutive failures recorded since the last success or reset
    pub fn failure_count(&self) -> u32 {
        self.state().failure_count
    }
}
