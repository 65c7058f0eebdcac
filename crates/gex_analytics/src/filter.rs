//! Strike window around ATM.

use gex_core::chain::ChainSnapshot;
use gex_core::types::{Component, ComputationError};

/// Default number of strikes kept on each side of ATM.
pub const DEFAULT_STRIKE_RADIUS: usize = 5;

/// Keeps the strikes in `[atm_idx − radius, atm_idx + radius)` of the
/// sorted strike ladder, clipped to its bounds.
///
/// That is `radius` strikes below ATM, ATM itself, and `radius − 1` above.
///
/// # Errors
/// `ComputationError::InvalidParameter` if `radius` is zero.
///
/// # Examples
/// ```
/// use gex_analytics::filter::filter_near_strikes;
/// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
/// use gex_core::types::Date;
///
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// let rows = (0..11)
///     .map(|i| StrikeRow::new(23750.0 + 50.0 * i as f64, SideQuote::new(1), SideQuote::new(1)))
///     .collect();
/// let snapshot = ChainSnapshot::new(24010.0, expiry, rows).unwrap();
///
/// let near = filter_near_strikes(&snapshot, 2).unwrap();
/// assert_eq!(near.strikes(), vec![23900.0, 23950.0, 24000.0, 24050.0]);
/// ```
pub fn filter_near_strikes(
    snapshot: &ChainSnapshot,
    radius: usize,
) -> Result<ChainSnapshot, ComputationError> {
    if radius == 0 {
        return Err(ComputationError::InvalidParameter {
            component: Component::StrikeFilter,
            name: "radius",
            value: 0.0,
        });
    }

    let strikes = snapshot.strikes();
    let atm = snapshot.nearest_index(snapshot.spot());
    let low = strikes[atm.saturating_sub(radius)];
    let high = strikes[(atm + radius).min(strikes.len()) - 1];

    snapshot
        .retain_strikes(|k| k >= low && k <= high)
        .map_err(|source| ComputationError::Snapshot {
            component: Component::StrikeFilter,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gex_core::chain::{SideQuote, StrikeRow};
    use gex_core::types::Date;

    fn ladder(spot: f64, n: usize) -> ChainSnapshot {
        let rows = (0..n)
            .map(|i| StrikeRow::new(100.0 + 10.0 * i as f64, SideQuote::new(1), SideQuote::new(1)))
            .collect();
        ChainSnapshot::new(spot, Date::from_ymd(2025, 1, 30).unwrap(), rows).unwrap()
    }

    #[test]
    fn test_window_is_asymmetric() {
        let snap = ladder(150.0, 11);
        let near = filter_near_strikes(&snap, 3).unwrap();
        assert_eq!(near.strikes(), vec![120.0, 130.0, 140.0, 150.0, 160.0, 170.0]);
        assert_eq!(near.spot(), 150.0);
    }

    #[test]
    fn test_window_clips_at_edges() {
        let low = filter_near_strikes(&ladder(100.0, 11), 5).unwrap();
        assert_eq!(low.strikes(), vec![100.0, 110.0, 120.0, 130.0, 140.0]);

        let high = filter_near_strikes(&ladder(200.0, 11), 5).unwrap();
        assert_eq!(high.strikes(), vec![150.0, 160.0, 170.0, 180.0, 190.0, 200.0]);
    }

    #[test]
    fn test_radius_one_keeps_atm_and_one_below() {
        let near = filter_near_strikes(&ladder(151.0, 11), 1).unwrap();
        assert_eq!(near.strikes(), vec![140.0, 150.0]);
    }

    #[test]
    fn test_zero_radius_rejected() {
        let err = filter_near_strikes(&ladder(150.0, 3), 0).unwrap_err();
        assert_eq!(err.component(), Component::StrikeFilter);
    }
}
