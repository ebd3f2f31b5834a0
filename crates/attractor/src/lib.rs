//! Discrete-time Lorenz integrator.
//!
//! The Lorenz system is a three-variable nonlinear ODE exhibiting
//! deterministic chaos:
//!
//! ```text
//!   dx/dt = σ(y − x)
//!   dy/dt = x(ρ − z) − y
//!   dz/dt = xy − βz
//! ```
//!
//! We advance it with explicit (forward) Euler steps at a fixed Δt, which is
//! all the demo needs: the motion only has to look organic, not be
//! numerically faithful. Forward Euler at Δt = 0.01 is stable enough for the
//! stock coefficients (σ=10, ρ=28, β=8/3) but can diverge if the state is
//! perturbed far off the attractor; callers that feed their own constants
//! should keep that in mind.
//!
//! Everything here is pure arithmetic over `f64`: no side effects, no hidden
//! state, total over real inputs. Given the same seed and Δt the trajectory
//! is fully reproducible.

/// Fixed step size used by the demos.
pub const DEFAULT_DT: f64 = 0.01;

/// Starting point used by the demos; close to, but not on, the attractor.
pub const DEFAULT_SEED: LorenzState = LorenzState {
    x: 0.1,
    y: 0.0,
    z: 0.0,
};

/// Coefficients of the Lorenz system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LorenzParams {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for LorenzParams {
    /// The classic chaotic regime: σ=10, ρ=28, β=8/3.
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

/// A point in Lorenz phase space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LorenzState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LorenzState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another state; used to measure trajectory
    /// separation.
    pub fn distance(&self, other: &LorenzState) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Advances a state one forward-Euler step of size `dt`.
///
/// Pure transition function: same inputs, same output, nothing mutated.
pub fn step(state: LorenzState, params: LorenzParams, dt: f64) -> LorenzState {
    let dx = params.sigma * (state.y - state.x);
    let dy = state.x * (params.rho - state.z) - state.y;
    let dz = state.x * state.y - params.beta * state.z;
    LorenzState {
        x: state.x + dx * dt,
        y: state.y + dy * dt,
        z: state.z + dz * dt,
    }
}

/// Owns a trajectory's mutable state and advances it one step per call.
///
/// This is the explicit render-loop counterpart of the demo's per-frame
/// update: the scene asks for exactly one step each animation frame.
#[derive(Debug, Clone)]
pub struct Integrator {
    params: LorenzParams,
    dt: f64,
    state: LorenzState,
}

impl Integrator {
    pub fn new(params: LorenzParams, dt: f64, seed: LorenzState) -> Self {
        Self {
            params,
            dt,
            state: seed,
        }
    }

    /// Current position without advancing.
    pub fn state(&self) -> LorenzState {
        self.state
    }

    pub fn params(&self) -> LorenzParams {
        self.params
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Applies one step in place and returns the new state.
    pub fn advance(&mut self) -> LorenzState {
        self.state = step(self.state, self.params, self.dt);
        self.state
    }

    /// Applies `n` steps in place and returns the final state.
    pub fn advance_by(&mut self, n: usize) -> LorenzState {
        for _ in 0..n {
            self.advance();
        }
        self.state
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(LorenzParams::default(), DEFAULT_DT, DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn first_step_from_demo_seed_matches_hand_computation() {
        // x' = 0.1 + 10·(0 − 0.1)·0.01 = 0.09
        // y' = 0 + (0.1·(28 − 0) − 0)·0.01 = 0.028
        // z' = 0 + (0.1·0 − 8/3·0)·0.01 = 0
        let next = step(DEFAULT_SEED, LorenzParams::default(), DEFAULT_DT);
        assert_close(next.x, 0.09);
        assert_close(next.y, 0.028);
        assert_close(next.z, 0.0);
    }

    #[test]
    fn step_is_deterministic_and_stateless() {
        let params = LorenzParams::default();
        let state = LorenzState::new(1.5, -2.25, 17.0);
        let first = step(state, params, DEFAULT_DT);
        let second = step(state, params, DEFAULT_DT);
        assert_eq!(first, second);
        // The input is untouched by value semantics; re-running a whole
        // trajectory reproduces it bit for bit.
        let mut a = Integrator::default();
        let mut b = Integrator::default();
        assert_eq!(a.advance_by(500), b.advance_by(500));
    }

    #[test]
    fn origin_is_a_fixed_point() {
        let origin = LorenzState::default();
        let next = step(origin, LorenzParams::default(), DEFAULT_DT);
        assert_eq!(next, origin);
    }

    #[test]
    fn nearby_trajectories_diverge() {
        // Chaotic sensitivity, not a bug: a 1e-6 perturbation in x stays
        // small while both trajectories settle onto the attractor, then
        // grows to order one within 25 simulated seconds.
        let mut reference = Integrator::default();
        let mut perturbed = Integrator::new(
            LorenzParams::default(),
            DEFAULT_DT,
            LorenzState::new(DEFAULT_SEED.x + 1e-6, DEFAULT_SEED.y, DEFAULT_SEED.z),
        );
        let early_separation = reference.advance_by(1000).distance(&perturbed.advance_by(1000));
        assert!(
            early_separation < 1e-2,
            "separation blew up during settling: {early_separation}"
        );
        let separation = reference.advance_by(1500).distance(&perturbed.advance_by(1500));
        assert!(
            separation > 1.0,
            "trajectories stayed together: separation {separation}"
        );
    }

    #[test]
    fn integrator_advance_matches_free_function() {
        let mut integrator = Integrator::default();
        let mut state = DEFAULT_SEED;
        for _ in 0..50 {
            state = step(state, LorenzParams::default(), DEFAULT_DT);
            assert_eq!(integrator.advance(), state);
        }
    }
}
