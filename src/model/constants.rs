// Model constants
pub const K_FACTOR: f64 = 20.0;
pub const MAJOR_BASELINE: f64 = 1500.0;
pub const NON_MAJOR_BASELINE: f64 = 1200.0;
pub const REGRESSION: f64 = 0.333;
pub const HOME_FIELD: f64 = 25.0;
// Elo logistic scale
pub const LOGISTIC_SCALE: f64 = 400.0;
// Upper end of the regression range a run is expected to use
pub const REGRESSION_SOFT_MAX: f64 = 0.5;
