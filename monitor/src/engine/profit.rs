/// Amount the profit figure is quoted against.
pub const NOTIONAL: f64 = 10_000.0;

/// Flat round-trip transaction cost (0.4 % of [`NOTIONAL`]).
pub const FIXED_FEE: f64 = 40.0;

/// Profit of selling a [`NOTIONAL`]-sized position bought at `reference`
/// at `price`, net of [`FIXED_FEE`]. Display only.
pub fn derived_profit(price: f64, reference: f64) -> f64 {
    if price <= 0.0 {
        return -FIXED_FEE;
    }
    NOTIONAL / price * (price - reference) - FIXED_FEE
}
