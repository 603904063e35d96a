/// Tolerance used for floating-point comparisons inside the planners
pub const EPSILON: f64 = 1e-9;

/// Denominator used by the allocation planner when target percents sum to zero
pub const DEFAULT_TARGET_DENOMINATOR: f64 = 100.0;

/// Allowed deviation of the target sum from 100 before `nonHundredTarget` fires
pub const TARGET_SUM_TOLERANCE: f64 = 0.1;

/// Leftover cash with a smaller magnitude is reported as zero
pub const LEFTOVER_SNAP_THRESHOLD: f64 = 0.005;

/// Largest amount or percent the planners accept. Larger finite inputs are
/// clamped so sums of values and deposits stay finite.
pub const MAX_PLANNABLE_AMOUNT: f64 = 1e15;

/// Upper bound on iterations of the leftover share-grant loop
pub const MAX_SHARE_GRANT_ITERATIONS: usize = 1000;

/// Minimum fractional remainder for a floor-rounded position to receive
/// one more share out of leftover cash. Any positive remainder qualifies.
pub const FLOOR_GRANT_THRESHOLD: f64 = 0.0;

/// Minimum fractional remainder for a nearest-rounded position to receive
/// one more share out of leftover cash (round half up).
pub const NEAREST_GRANT_THRESHOLD: f64 = 0.5;

/// Default drift band, in percentage points, used by the drift report
pub const DEFAULT_DRIFT_BAND: f64 = 5.0;
