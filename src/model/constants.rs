// Model constants
pub const DEFAULT_RATING: f64 = 25.0;
pub const DEFAULT_VOLATILITY: f64 = DEFAULT_RATING / 3.0;
pub const BETA: f64 = DEFAULT_VOLATILITY / 2.0;
pub const TAU: f64 = DEFAULT_VOLATILITY / 100.0;
pub const CONSERVATIVE_MULTIPLIER: f64 = 3.0;
