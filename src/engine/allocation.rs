//! Slider normalization toward a fixed USD target.
//!
//! The engine is a reducer: it takes the current [`AllocationState`], the
//! per-asset USD ceilings and one slider event, and returns the next state.
//! It holds no state of its own between calls and never fails; degenerate
//! inputs (zero ceilings, zero target) resolve through guarded denominators.

use std::str::FromStr;
use std::sync::Arc;

use crate::models::allocation::AllocationState;
use crate::traits::telemetry::{AllocationTelemetry, NoopTelemetry, RejectReason};

/// Absolute USD slack when comparing the total against the target
pub const DEFAULT_TOLERANCE_USD: f64 = 0.01;

/// Floor for floating comparisons and denominators
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Which sliders stay movable once the target is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// No slider may increase; any slider may decrease.
    #[default]
    ActiveSlider,
    /// No slider may increase; only the active slider may decrease, the rest
    /// are frozen until the total drops or the state is reset.
    AllSliders,
}

impl FromStr for LockPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "active_slider" | "active-slider" => Ok(Self::ActiveSlider),
            "all" | "all_sliders" | "all-sliders" => Ok(Self::AllSliders),
            other => Err(anyhow::anyhow!("Unknown lock policy: {}", other)),
        }
    }
}

/// Tunables of the allocation engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub target_usd: f64,
    pub tolerance_usd: f64,
    pub epsilon: f64,
    pub lock_policy: LockPolicy,
}

impl EngineConfig {
    pub fn new(target_usd: f64) -> Self {
        Self {
            target_usd: target_usd.max(0.0),
            tolerance_usd: DEFAULT_TOLERANCE_USD,
            epsilon: DEFAULT_EPSILON,
            lock_policy: LockPolicy::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance_usd: f64) -> Self {
        self.tolerance_usd = tolerance_usd.abs();
        self
    }

    pub fn with_lock_policy(mut self, lock_policy: LockPolicy) -> Self {
        self.lock_policy = lock_policy;
        self
    }
}

/// Turns raw slider positions into effective percentages
#[derive(Clone)]
pub struct AllocationEngine {
    config: EngineConfig,
    telemetry: Arc<dyn AllocationTelemetry>,
}

impl AllocationEngine {
    /// Create an engine that reports nowhere
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    /// Attach a telemetry sink
    pub fn with_telemetry(mut self, telemetry: Arc<dyn AllocationTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn target_usd(&self) -> f64 {
        self.config.target_usd
    }

    /// Zeroed state for `asset_count` assets
    pub fn initial_state(&self, asset_count: usize) -> AllocationState {
        AllocationState::new(asset_count)
    }

    /// Check if `total_usd` already satisfies the target (lock threshold)
    pub fn is_target_met(&self, total_usd: f64) -> bool {
        total_usd >= self.config.target_usd - self.config.tolerance_usd
    }

    fn is_within_tolerance(&self, total_usd: f64) -> bool {
        (total_usd - self.config.target_usd).abs() <= self.config.tolerance_usd
    }

    /// Check if raising slider `index` would be refused in `state`.
    ///
    /// Only increases are covered; under [`LockPolicy::AllSliders`] a
    /// decrease can still be refused, see [`AllocationEngine::rejection`].
    pub fn is_slider_locked(&self, state: &AllocationState, index: usize) -> bool {
        index >= state.asset_count() || self.is_target_met(state.total_allocated_usd)
    }

    /// Why moving slider `index` to `value` would be refused, if it would
    pub fn rejection(
        &self,
        state: &AllocationState,
        index: usize,
        value: f64,
    ) -> Option<RejectReason> {
        self.rejection_normalized(state, index, normalize_slider(value))
    }

    fn rejection_normalized(
        &self,
        state: &AllocationState,
        index: usize,
        requested: f64,
    ) -> Option<RejectReason> {
        if index >= state.asset_count() {
            return Some(RejectReason::UnknownAsset);
        }
        if !self.is_target_met(state.total_allocated_usd) {
            return None;
        }

        let current = state.slider_values[index];
        if requested > current {
            return Some(RejectReason::TargetLocked);
        }

        match self.config.lock_policy {
            LockPolicy::ActiveSlider => None,
            LockPolicy::AllSliders => match state.active_slider {
                Some(active) if active != index && requested != current => {
                    Some(RejectReason::SliderFrozen)
                }
                _ => None,
            },
        }
    }

    /// Apply a move of slider `index` to `value` (0..=100).
    ///
    /// `limits` are the per-asset USD ceilings in the same order as the
    /// state's vectors. A rejected move returns `state` unchanged.
    pub fn update(
        &self,
        state: &AllocationState,
        limits: &[f64],
        index: usize,
        value: f64,
    ) -> AllocationState {
        let requested = normalize_slider(value);

        if let Some(reason) = self.rejection_normalized(state, index, requested) {
            self.telemetry.update_rejected(index, value, reason);
            return state.clone();
        }

        let EngineConfig {
            target_usd,
            epsilon,
            ..
        } = self.config;

        // Every other asset's contribution is frozen during this update
        let others_usd: f64 = (0..state.asset_count())
            .filter(|&j| j != index)
            .map(|j| state.contribution_usd(j, limits))
            .sum();
        let limit = limits.get(index).copied().unwrap_or(0.0).max(0.0);
        let missing = target_usd - others_usd;

        let effective = if missing <= epsilon {
            state.effective_values[index].min(requested)
        } else {
            let pct_needed = missing / limit.max(epsilon) * 100.0;
            pct_needed.min(requested).min(100.0).max(0.0)
        };

        let total = others_usd + effective / 100.0 * limit;
        let is_complete = self.is_within_tolerance(total);

        let mut next = state.clone();
        next.slider_values[index] = requested;
        next.effective_values[index] = effective;
        next.total_allocated_usd = total;
        next.is_complete = is_complete;
        next.active_slider = is_complete.then_some(index);

        self.telemetry.update_applied(index, &next);
        next
    }

    /// Re-derive the total under new ceilings.
    ///
    /// Called after a price/balance refresh so that the total always matches
    /// the ceilings it is displayed against. Effective values are kept unless
    /// the grown ceilings push the total past the target; the excess is then
    /// cut from the active slider first and from the others in reverse order.
    pub fn refresh(&self, state: &AllocationState, limits: &[f64]) -> AllocationState {
        let EngineConfig {
            target_usd,
            tolerance_usd,
            ..
        } = self.config;

        let mut next = state.clone();
        let mut total = Self::total_usd(&next, limits);
        let mut closing = state.active_slider;

        if total > target_usd + tolerance_usd {
            let order: Vec<usize> = state
                .active_slider
                .into_iter()
                .chain((0..state.asset_count()).rev().filter(|&j| Some(j) != state.active_slider))
                .collect();

            let mut excess = total - target_usd;
            let mut last_cut = None;
            for (position, &j) in order.iter().enumerate() {
                if excess <= 0.0 {
                    break;
                }
                let limit = limits.get(j).copied().unwrap_or(0.0);
                let contribution = next.contribution_usd(j, limits);
                if limit <= 0.0 || contribution <= 0.0 {
                    continue;
                }
                let cut = contribution.min(excess);
                next.effective_values[j] = ((contribution - cut) / limit * 100.0).max(0.0);
                excess -= cut;
                last_cut = Some(position);
            }

            // The slider now closing the gap is the last one cut, or the next
            // contributing one when that cut emptied it
            closing = last_cut.and_then(|position| {
                order[position..]
                    .iter()
                    .copied()
                    .find(|&j| next.contribution_usd(j, limits) > 0.0)
            });
            total = Self::total_usd(&next, limits);
        }

        let is_complete = self.is_within_tolerance(total);
        next.total_allocated_usd = total;
        next.is_complete = is_complete;
        next.active_slider = if is_complete { closing } else { None };
        next
    }

    fn total_usd(state: &AllocationState, limits: &[f64]) -> f64 {
        (0..state.asset_count())
            .map(|j| state.contribution_usd(j, limits))
            .sum()
    }

    /// All sliders back to zero, lock cleared
    pub fn reset(&self, asset_count: usize) -> AllocationState {
        self.telemetry.state_reset(asset_count);
        AllocationState::new(asset_count)
    }
}

/// Clamp to `0..=100` and round to the nearest integer
pub fn normalize_slider(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = DEFAULT_TOLERANCE_USD;

    fn engine(target: f64) -> AllocationEngine {
        AllocationEngine::new(EngineConfig::new(target))
    }

    #[test]
    fn two_asset_walkthrough() {
        let engine = engine(1000.0);
        let limits = [600.0, 800.0];
        let state = engine.initial_state(2);

        let state = engine.update(&state, &limits, 0, 100.0);
        assert_eq!(state.effective_values, vec![100.0, 0.0]);
        assert!((state.total_allocated_usd - 600.0).abs() < 1e-9);
        assert!(!state.is_complete);
        assert_eq!(state.active_slider, None);

        let state = engine.update(&state, &limits, 1, 100.0);
        assert!((state.effective_values[1] - 50.0).abs() < 1e-9);
        assert!((state.total_allocated_usd - 1000.0).abs() < TOL);
        assert!(state.is_complete);
        assert_eq!(state.active_slider, Some(1));
        assert!(engine.is_slider_locked(&state, 0));
    }

    #[test]
    fn increase_after_target_is_rejected() {
        let engine = engine(1000.0);
        let limits = [600.0, 800.0, 500.0];
        let mut state = engine.initial_state(3);
        state = engine.update(&state, &limits, 0, 100.0);
        state = engine.update(&state, &limits, 1, 100.0);
        assert!(state.is_complete);

        let after = engine.update(&state, &limits, 2, 30.0);
        assert_eq!(after, state);
    }

    #[test]
    fn decrease_after_target_is_accepted_and_clears_completion() {
        let engine = engine(1000.0);
        let limits = [600.0, 800.0];
        let mut state = engine.initial_state(2);
        state = engine.update(&state, &limits, 0, 100.0);
        state = engine.update(&state, &limits, 1, 100.0);

        let state = engine.update(&state, &limits, 0, 80.0);
        assert_eq!(state.slider_values[0], 80.0);
        assert!((state.effective_values[0] - 80.0).abs() < 1e-9);
        assert!((state.total_allocated_usd - 880.0).abs() < 1e-9);
        assert!(!state.is_complete);
        assert_eq!(state.active_slider, None);
    }

    #[test]
    fn slider_value_is_clamped_and_rounded() {
        let engine = engine(10_000.0);
        let limits = [100.0];
        let state = engine.initial_state(1);

        assert_eq!(engine.update(&state, &limits, 0, 150.0).slider_values[0], 100.0);
        assert_eq!(engine.update(&state, &limits, 0, -5.0).slider_values[0], 0.0);
        assert_eq!(engine.update(&state, &limits, 0, 42.6).slider_values[0], 43.0);
        assert_eq!(engine.update(&state, &limits, 0, f64::NAN).slider_values[0], 0.0);
    }

    #[test]
    fn zero_ceiling_contributes_nothing() {
        let engine = engine(1000.0);
        let limits = [0.0, 2000.0];
        let state = engine.update(&engine.initial_state(2), &limits, 0, 100.0);

        assert_eq!(state.slider_values[0], 100.0);
        assert_eq!(state.total_allocated_usd, 0.0);
        assert!(state.effective_values[0] <= state.slider_values[0]);
    }

    #[test]
    fn no_room_left_freezes_effective_value() {
        let engine = engine(1000.0);
        // Ceilings grew after the first asset was set, so it alone covers the target
        let mut state = engine.initial_state(2);
        state.slider_values = vec![100.0, 40.0];
        state.effective_values = vec![100.0, 40.0];
        state.total_allocated_usd = 1200.0;
        let limits = [1000.0, 500.0];

        let next = engine.update(&state, &limits, 1, 20.0);
        assert_eq!(next.effective_values[1], 20.0);
        assert!((next.total_allocated_usd - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_index_is_ignored() {
        let engine = engine(1000.0);
        let state = engine.initial_state(2);
        assert_eq!(engine.update(&state, &[1.0, 1.0], 5, 50.0), state);
    }

    #[test]
    fn reset_zeroes_everything() {
        let engine = engine(1000.0);
        let limits = [600.0, 800.0];
        let mut state = engine.initial_state(2);
        state = engine.update(&state, &limits, 0, 100.0);
        state = engine.update(&state, &limits, 1, 100.0);
        assert!(state.is_complete);

        let cleared = engine.reset(state.asset_count());
        assert_eq!(cleared, AllocationState::new(2));
        assert_eq!(engine.reset(2), cleared);
    }

    #[test]
    fn all_sliders_policy_freezes_non_active_sliders() {
        let engine = AllocationEngine::new(
            EngineConfig::new(1000.0).with_lock_policy(LockPolicy::AllSliders),
        );
        let limits = [600.0, 800.0];
        let mut state = engine.initial_state(2);
        state = engine.update(&state, &limits, 0, 100.0);
        state = engine.update(&state, &limits, 1, 100.0);
        assert_eq!(state.active_slider, Some(1));

        assert_eq!(engine.update(&state, &limits, 0, 50.0), state);

        let lowered = engine.update(&state, &limits, 1, 25.0);
        assert!((lowered.total_allocated_usd - 800.0).abs() < 1e-9);
        assert!(!lowered.is_complete);
    }

    #[test]
    fn refresh_tracks_new_ceilings() {
        let engine = engine(1000.0);
        let mut state = engine.initial_state(2);
        state = engine.update(&state, &[600.0, 800.0], 0, 100.0);
        state = engine.update(&state, &[600.0, 800.0], 1, 100.0);

        let refreshed = engine.refresh(&state, &[500.0, 800.0]);
        assert!((refreshed.total_allocated_usd - 900.0).abs() < 1e-9);
        assert!(!refreshed.is_complete);
        assert_eq!(refreshed.active_slider, None);
        assert_eq!(refreshed.effective_values, state.effective_values);
    }

    #[test]
    fn refresh_trims_excess_when_ceilings_grow() {
        let engine = engine(1000.0);
        let mut state = engine.initial_state(2);
        state = engine.update(&state, &[600.0, 800.0], 0, 100.0);
        state = engine.update(&state, &[600.0, 800.0], 1, 100.0);

        let refreshed = engine.refresh(&state, &[900.0, 1200.0]);
        assert!((refreshed.total_allocated_usd - 1000.0).abs() < TOL);
        assert!(refreshed.is_complete);
        assert_eq!(refreshed.active_slider, Some(1));
        assert_eq!(refreshed.effective_values[0], 100.0);
        assert!((refreshed.effective_values[1] - 100.0 / 12.0).abs() < 1e-9);
        assert_eq!(refreshed.slider_values, state.slider_values);

        let lowered = engine.update(&refreshed, &[900.0, 1200.0], 0, 50.0);
        assert!(!lowered.is_complete);
    }

    #[test]
    fn refresh_cuts_past_the_active_slider_when_needed() {
        let engine = engine(1000.0);
        let mut state = engine.initial_state(3);
        state = engine.update(&state, &[400.0, 400.0, 400.0], 0, 100.0);
        state = engine.update(&state, &[400.0, 400.0, 400.0], 1, 100.0);
        state = engine.update(&state, &[400.0, 400.0, 400.0], 2, 100.0);
        assert_eq!(state.active_slider, Some(2));

        let refreshed = engine.refresh(&state, &[1000.0, 1000.0, 1000.0]);
        assert!((refreshed.total_allocated_usd - 1000.0).abs() < TOL);
        assert!(refreshed.is_complete);
        assert_eq!(refreshed.effective_values[2], 0.0);
        assert_eq!(refreshed.effective_values[1], 0.0);
        assert_eq!(refreshed.effective_values[0], 100.0);
        assert_eq!(refreshed.active_slider, Some(0));
        for j in 0..3 {
            assert!(refreshed.effective_values[j] <= refreshed.slider_values[j]);
        }
    }

    #[test]
    fn rejection_matches_update_under_both_policies() {
        let limits = [600.0, 800.0];
        let active = engine(1000.0);
        let all = AllocationEngine::new(
            EngineConfig::new(1000.0).with_lock_policy(LockPolicy::AllSliders),
        );

        for engine in [&active, &all] {
            let mut state = engine.initial_state(2);
            state = engine.update(&state, &limits, 0, 50.0);
            state = engine.update(&state, &limits, 1, 100.0);
            assert_eq!(state.active_slider, Some(1));

            assert_eq!(engine.rejection(&state, 0, 60.0), Some(RejectReason::TargetLocked));
            assert_eq!(engine.rejection(&state, 0, 50.4), None);
            assert_eq!(engine.rejection(&state, 1, 30.0), None);
            assert_eq!(engine.rejection(&state, 9, 0.0), Some(RejectReason::UnknownAsset));
            assert!(engine.is_slider_locked(&state, 0));
            assert_eq!(engine.update(&state, &limits, 0, 60.0), state);
        }

        let mut state = all.initial_state(2);
        state = all.update(&state, &limits, 0, 50.0);
        state = all.update(&state, &limits, 1, 100.0);
        assert_eq!(all.rejection(&state, 0, 40.0), Some(RejectReason::SliderFrozen));
        assert_eq!(all.update(&state, &limits, 0, 40.0), state);
        assert_eq!(active.rejection(&state, 0, 40.0), None);
    }

    #[test]
    fn random_walk_keeps_invariants() {
        let engine = engine(1000.0);
        let limits = [300.0, 450.0, 0.0, 900.0];
        let mut state = engine.initial_state(limits.len());
        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;

        for _ in 0..2_000 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let index = (seed >> 33) as usize % limits.len();
            let value = ((seed >> 12) % 121) as f64 - 10.0;

            let before = state.clone();
            state = engine.update(&state, &limits, index, value);

            let expected: f64 = (0..limits.len())
                .map(|j| state.effective_values[j] / 100.0 * limits[j])
                .sum();
            assert!((state.total_allocated_usd - expected).abs() < 1e-6);
            assert!(state.total_allocated_usd <= 1000.0 + TOL);
            for j in 0..limits.len() {
                assert!(state.effective_values[j] <= state.slider_values[j]);
                assert!(state.effective_values[j] <= 100.0);
                assert!(state.effective_values[j] >= 0.0);
            }
            if before.is_complete && normalize_slider(value) > before.slider_values[index] {
                assert_eq!(state, before);
            }
        }
    }
}
