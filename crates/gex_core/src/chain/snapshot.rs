//! Validated chain snapshot.

use crate::types::{Date, OptionSide, SnapshotError};

use super::quote::SideQuote;

/// One strike of the chain with both sides.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrikeRow {
    /// Strike price
    pub strike: f64,
    /// Call side
    pub call: SideQuote,
    /// Put side
    pub put: SideQuote,
}

impl StrikeRow {
    /// Creates a strike row.
    pub fn new(strike: f64, call: SideQuote, put: SideQuote) -> Self {
        Self { strike, call, put }
    }

    /// Quote for the requested side.
    #[inline]
    pub fn side(&self, side: OptionSide) -> &SideQuote {
        match side {
            OptionSide::Call => &self.call,
            OptionSide::Put => &self.put,
        }
    }
}

/// Flat persisted row: a strike row that also repeats spot and expiry.
///
/// This is the shape of stored snapshots and vendor downloads. Use
/// [`ChainSnapshot::from_records`] to collapse the repeated columns into a
/// single validated spot and expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRecord {
    /// Strike price
    pub strike: f64,
    /// Underlying price at capture time
    pub spot: f64,
    /// Expiry as ISO text (`YYYY-MM-DD`)
    pub expiry: String,
    /// Call side
    pub call: SideQuote,
    /// Put side
    pub put: SideQuote,
}

/// One (strike, side) leg borrowed from a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct OptionLeg<'a> {
    /// Strike price
    pub strike: f64,
    /// Call or put
    pub side: OptionSide,
    /// Quote for this leg
    pub quote: &'a SideQuote,
}

/// A single capture of one expiry's option chain.
///
/// Invariants established by the constructors:
/// - at least one strike
/// - spot is finite and positive
/// - strikes are finite, positive and unique
/// - rows are sorted by ascending strike
///
/// # Examples
/// ```
/// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
/// use gex_core::types::{Date, SnapshotError};
///
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// let rows = vec![
///     StrikeRow::new(24100.0, SideQuote::new(10), SideQuote::new(20)),
///     StrikeRow::new(24000.0, SideQuote::new(30), SideQuote::new(40)),
/// ];
/// let snapshot = ChainSnapshot::new(24060.0, expiry, rows).unwrap();
/// assert_eq!(snapshot.strikes(), vec![24000.0, 24100.0]);
///
/// let dup = vec![
///     StrikeRow::new(24000.0, SideQuote::new(1), SideQuote::new(1)),
///     StrikeRow::new(24000.0, SideQuote::new(2), SideQuote::new(2)),
/// ];
/// assert_eq!(
///     ChainSnapshot::new(24060.0, expiry, dup).unwrap_err(),
///     SnapshotError::DuplicateStrike { strike: 24000.0 }
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChainSnapshot {
    spot: f64,
    expiry: Date,
    rows: Vec<StrikeRow>,
}

impl ChainSnapshot {
    /// Builds a snapshot from strike rows, validating all invariants.
    ///
    /// Rows may arrive in any order.
    ///
    /// # Errors
    /// - `SnapshotError::EmptySnapshot` if `rows` is empty
    /// - `SnapshotError::InvalidSpot` if spot is not finite and positive
    /// - `SnapshotError::InvalidStrike` if any strike is not finite and positive
    /// - `SnapshotError::DuplicateStrike` if a strike repeats
    pub fn new(spot: f64, expiry: Date, mut rows: Vec<StrikeRow>) -> Result<Self, SnapshotError> {
        if rows.is_empty() {
            return Err(SnapshotError::EmptySnapshot);
        }
        if !(spot.is_finite() && spot > 0.0) {
            return Err(SnapshotError::InvalidSpot { spot });
        }
        if let Some(row) = rows
            .iter()
            .find(|r| !(r.strike.is_finite() && r.strike > 0.0))
        {
            return Err(SnapshotError::InvalidStrike { strike: row.strike });
        }

        rows.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        if let Some(pair) = rows.windows(2).find(|w| w[0].strike == w[1].strike) {
            return Err(SnapshotError::DuplicateStrike {
                strike: pair[0].strike,
            });
        }

        Ok(Self { spot, expiry, rows })
    }

    /// Builds a snapshot from flat records that each repeat spot and expiry.
    ///
    /// The first record fixes spot and expiry; every other record must carry
    /// exactly the same values.
    ///
    /// # Errors
    /// Everything [`ChainSnapshot::new`] raises, plus
    /// `SnapshotError::Date` for an unparseable expiry and
    /// `SnapshotError::InconsistentSpot` / `SnapshotError::InconsistentExpiry`
    /// when a record disagrees with the first one.
    pub fn from_records(records: Vec<ChainRecord>) -> Result<Self, SnapshotError> {
        let first = records.first().ok_or(SnapshotError::EmptySnapshot)?;
        let spot = first.spot;
        let expiry_text = first.expiry.trim().to_string();
        let expiry = Date::parse(&expiry_text)?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            if record.spot != spot {
                return Err(SnapshotError::InconsistentSpot {
                    strike: record.strike,
                    expected: spot,
                    found: record.spot,
                });
            }
            if record.expiry.trim() != expiry_text {
                return Err(SnapshotError::InconsistentExpiry {
                    strike: record.strike,
                    expected: expiry_text,
                    found: record.expiry,
                });
            }
            rows.push(StrikeRow::new(record.strike, record.call, record.put));
        }

        Self::new(spot, expiry, rows)
    }

    /// Underlying price at capture time.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Expiry shared by every row.
    #[inline]
    pub fn expiry(&self) -> Date {
        self.expiry
    }

    /// Rows in ascending strike order.
    #[inline]
    pub fn rows(&self) -> &[StrikeRow] {
        &self.rows
    }

    /// Number of strikes.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a constructed snapshot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Strikes in ascending order.
    pub fn strikes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strike).collect()
    }

    /// Row for an exact strike.
    pub fn row(&self, strike: f64) -> Option<&StrikeRow> {
        self.rows
            .binary_search_by(|r| r.strike.total_cmp(&strike))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Every (strike, side) leg, calls before puts within a strike.
    pub fn legs(&self) -> impl Iterator<Item = OptionLeg<'_>> + '_ {
        self.rows.iter().flat_map(|row| {
            OptionSide::ALL.into_iter().map(move |side| OptionLeg {
                strike: row.strike,
                side,
                quote: row.side(side),
            })
        })
    }

    /// Index of the strike closest to `target`; ties go to the lower strike.
    pub fn nearest_index(&self, target: f64) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, row) in self.rows.iter().enumerate() {
            let dist = (row.strike - target).abs();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        best
    }

    /// Strike closest to `target`; ties go to the lower strike.
    ///
    /// # Examples
    /// ```
    /// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
    /// use gex_core::types::Date;
    ///
    /// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
    /// let rows = [24000.0, 24050.0, 24100.0]
    ///     .into_iter()
    ///     .map(|k| StrikeRow::new(k, SideQuote::new(1), SideQuote::new(1)))
    ///     .collect();
    /// let snapshot = ChainSnapshot::new(24060.0, expiry, rows).unwrap();
    /// assert_eq!(snapshot.nearest_strike(24060.0), 24050.0);
    /// assert_eq!(snapshot.nearest_strike(24075.0), 24050.0);
    /// ```
    pub fn nearest_strike(&self, target: f64) -> f64 {
        self.rows[self.nearest_index(target)].strike
    }

    /// Smallest gap between consecutive strikes; `None` with a single strike.
    ///
    /// # Examples
    /// ```
    /// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
    /// use gex_core::types::Date;
    ///
    /// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
    /// let rows = [24000.0, 24050.0, 24100.0, 24200.0]
    ///     .into_iter()
    ///     .map(|k| StrikeRow::new(k, SideQuote::new(1), SideQuote::new(1)))
    ///     .collect();
    /// let snapshot = ChainSnapshot::new(24060.0, expiry, rows).unwrap();
    /// assert_eq!(snapshot.min_strike_gap(), Some(50.0));
    /// ```
    pub fn min_strike_gap(&self) -> Option<f64> {
        self.rows
            .windows(2)
            .map(|w| w[1].strike - w[0].strike)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// New snapshot with only the rows whose strike satisfies `keep`.
    ///
    /// # Errors
    /// `SnapshotError::EmptySnapshot` if no row is kept.
    pub fn retain_strikes<F>(&self, mut keep: F) -> Result<Self, SnapshotError>
    where
        F: FnMut(f64) -> bool,
    {
        let rows: Vec<StrikeRow> = self
            .rows
            .iter()
            .filter(|r| keep(r.strike))
            .cloned()
            .collect();
        if rows.is_empty() {
            return Err(SnapshotError::EmptySnapshot);
        }
        Ok(Self {
            spot: self.spot,
            expiry: self.expiry,
            rows,
        })
    }
}

impl AsRef<ChainSnapshot> for ChainSnapshot {
    fn as_ref(&self) -> &ChainSnapshot {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(strike: f64, spot: f64, expiry: &str) -> ChainRecord {
        ChainRecord {
            strike,
            spot,
            expiry: expiry.to_string(),
            call: SideQuote::new(100),
            put: SideQuote::new(200),
        }
    }

    fn expiry() -> Date {
        Date::from_ymd(2025, 1, 30).unwrap()
    }

    #[test]
    fn test_rows_are_sorted() {
        let rows = vec![
            StrikeRow::new(24100.0, SideQuote::new(1), SideQuote::new(1)),
            StrikeRow::new(23900.0, SideQuote::new(1), SideQuote::new(1)),
            StrikeRow::new(24000.0, SideQuote::new(1), SideQuote::new(1)),
        ];
        let snapshot = ChainSnapshot::new(24000.0, expiry(), rows).unwrap();
        assert_eq!(snapshot.strikes(), vec![23900.0, 24000.0, 24100.0]);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            ChainSnapshot::new(100.0, expiry(), Vec::new()).unwrap_err(),
            SnapshotError::EmptySnapshot
        );
        assert_eq!(
            ChainSnapshot::from_records(Vec::new()).unwrap_err(),
            SnapshotError::EmptySnapshot
        );
    }

    #[test]
    fn test_invalid_spot_rejected() {
        let rows = vec![StrikeRow::new(100.0, SideQuote::new(1), SideQuote::new(1))];
        for spot in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ChainSnapshot::new(spot, expiry(), rows.clone()),
                Err(SnapshotError::InvalidSpot { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_strike_rejected() {
        let rows = vec![StrikeRow::new(f64::NAN, SideQuote::new(1), SideQuote::new(1))];
        assert!(matches!(
            ChainSnapshot::new(100.0, expiry(), rows),
            Err(SnapshotError::InvalidStrike { .. })
        ));
    }

    #[test]
    fn test_from_records_collapses_spot_and_expiry() {
        let snapshot = ChainSnapshot::from_records(vec![
            record(24050.0, 24060.0, "2025-01-30"),
            record(24000.0, 24060.0, "2025-01-30"),
        ])
        .unwrap();
        assert_eq!(snapshot.spot(), 24060.0);
        assert_eq!(snapshot.expiry(), expiry());
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_from_records_rejects_inconsistent_spot() {
        let err = ChainSnapshot::from_records(vec![
            record(24000.0, 24060.0, "2025-01-30"),
            record(24050.0, 24061.0, "2025-01-30"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SnapshotError::InconsistentSpot {
                strike: 24050.0,
                expected: 24060.0,
                found: 24061.0,
            }
        );
    }

    #[test]
    fn test_from_records_rejects_inconsistent_expiry() {
        let err = ChainSnapshot::from_records(vec![
            record(24000.0, 24060.0, "2025-01-30"),
            record(24050.0, 24060.0, "2025-02-06"),
        ])
        .unwrap_err();
        assert!(matches!(err, SnapshotError::InconsistentExpiry { strike, .. } if strike == 24050.0));
    }

    #[test]
    fn test_from_records_rejects_bad_expiry() {
        let err = ChainSnapshot::from_records(vec![record(24000.0, 24060.0, "30/01/2025")])
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Date(_)));
    }

    #[test]
    fn test_row_lookup_and_legs() {
        let snapshot = ChainSnapshot::from_records(vec![
            record(24000.0, 24060.0, "2025-01-30"),
            record(24050.0, 24060.0, "2025-01-30"),
        ])
        .unwrap();

        assert_eq!(snapshot.row(24050.0).map(|r| r.call.oi()), Some(100));
        assert!(snapshot.row(24025.0).is_none());

        let legs: Vec<(f64, OptionSide, u64)> = snapshot
            .legs()
            .map(|leg| (leg.strike, leg.side, leg.quote.oi()))
            .collect();
        assert_eq!(
            legs,
            vec![
                (24000.0, OptionSide::Call, 100),
                (24000.0, OptionSide::Put, 200),
                (24050.0, OptionSide::Call, 100),
                (24050.0, OptionSide::Put, 200),
            ]
        );
    }

    #[test]
    fn test_nearest_strike_ignores_nan_target() {
        let rows = vec![
            StrikeRow::new(100.0, SideQuote::new(1), SideQuote::new(1)),
            StrikeRow::new(110.0, SideQuote::new(1), SideQuote::new(1)),
        ];
        let snapshot = ChainSnapshot::new(104.0, expiry(), rows).unwrap();
        assert_eq!(snapshot.nearest_index(104.0), 0);
        assert_eq!(snapshot.nearest_index(106.0), 1);
        assert_eq!(snapshot.nearest_index(f64::NAN), 0);
    }

    #[test]
    fn test_min_strike_gap_single_strike() {
        let rows = vec![StrikeRow::new(100.0, SideQuote::new(1), SideQuote::new(1))];
        let snapshot = ChainSnapshot::new(100.0, expiry(), rows).unwrap();
        assert_eq!(snapshot.min_strike_gap(), None);
    }

    #[test]
    fn test_retain_strikes() {
        let rows = (0..5)
            .map(|i| StrikeRow::new(100.0 + i as f64, SideQuote::new(1), SideQuote::new(1)))
            .collect();
        let snapshot = ChainSnapshot::new(102.0, expiry(), rows).unwrap();

        let kept = snapshot.retain_strikes(|k| k >= 103.0).unwrap();
        assert_eq!(kept.strikes(), vec![103.0, 104.0]);
        assert_eq!(kept.spot(), 102.0);
        assert_eq!(
            snapshot.retain_strikes(|_| false).unwrap_err(),
            SnapshotError::EmptySnapshot
        );
    }
}
