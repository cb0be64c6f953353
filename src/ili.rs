//! Infrastructure Leakage Index.
//!
//! ILI = CARL / UARL, where UARL (litres/day) = (18·Lm + 0.8·Nc + 25·Lp) × P
//! with Lm mains length in km, Nc connections, Lp private pipe length in km
//! and P pressure in metres of head.

/// Metres of head per bar.
pub const METRES_HEAD_PER_BAR: f64 = 10.2;
/// Assumed private (service) pipe length per connection, in km.
pub const PRIVATE_PIPE_KM_PER_CONNECTION: f64 = 0.008;

/// Unavoidable Annual Real Losses in m³/year.
pub fn uarl_m3_per_year(pipe_length_km: f64, customers: i64, pressure_bar: f64) -> f64 {
    let pressure_m = pressure_bar * METRES_HEAD_PER_BAR;
    let connections = customers as f64;
    let private_pipe_km = PRIVATE_PIPE_KM_PER_CONNECTION * connections;
    let uarl_litres_per_day =
        (18.0 * pipe_length_km + 0.8 * connections + 25.0 * private_pipe_km) * pressure_m;
    uarl_litres_per_day * 365.0 / 1000.0
}

/// Returns `None` when pipe length, customers or pressure is zero, or when
/// UARL is not positive. Negative real losses give a negative index.
pub fn estimate_ili(
    real_losses_m3y: f64,
    pipe_length_km: f64,
    customers: i64,
    pressure_bar: f64,
) -> Option<f64> {
    if pipe_length_km == 0.0 || customers == 0 || pressure_bar == 0.0 {
        return None;
    }
    let uarl = uarl_m3_per_year(pipe_length_km, customers, pressure_bar);
    (uarl > 0.0).then(|| real_losses_m3y / uarl)
}
