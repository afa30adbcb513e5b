//! Price-versus-level trigger evaluation.

use sentinel_domain::entities::PriceLevel;
use sentinel_domain::enums::{LevelKind, TriggerDirection};

/// Classifies `current` against `level` using a band of
/// `±level.price × tolerance`.
///
/// Crossings are edge-triggered: a breakdown (breakout) is only reported
/// when there is no previous price or the previous price was still above
/// (below) the band edge. A price sitting inside the band is a touch.
/// A price already beyond the band on both observations yields `None`.
#[must_use]
pub fn level_trigger(
    level: &PriceLevel,
    current: f64,
    previous: Option<f64>,
    tolerance: f64,
) -> Option<TriggerDirection> {
    let band = level.band(tolerance);

    match level.kind {
        LevelKind::Support => {
            let edge = band.lower();
            if current <= edge {
                return previous
                    .is_none_or(|prev| prev > edge)
                    .then_some(TriggerDirection::Breakdown);
            }
        }
        LevelKind::Resistance => {
            let edge = band.upper();
            if current >= edge {
                return previous
                    .is_none_or(|prev| prev < edge)
                    .then_some(TriggerDirection::Breakout);
            }
        }
    }

    band.contains(current).then_some(TriggerDirection::Touch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn level(price: f64, kind: LevelKind) -> PriceLevel {
        PriceLevel {
            price,
            kind,
            touches: 3,
            timeframe: "4h".to_string(),
            last_touched: Utc::now(),
        }
    }

    #[test]
    fn test_support_breakdown_requires_crossing() {
        let support = level(100.0, LevelKind::Support);

        assert_eq!(
            level_trigger(&support, 98.0, Some(101.0), 0.01),
            Some(TriggerDirection::Breakdown)
        );
        assert_eq!(
            level_trigger(&support, 98.0, None, 0.01),
            Some(TriggerDirection::Breakdown)
        );
        // Already below on the previous observation.
        assert_eq!(level_trigger(&support, 98.0, Some(97.0), 0.01), None);
    }

    #[test]
    fn test_resistance_breakout_requires_crossing() {
        let resistance = level(200.0, LevelKind::Resistance);

        assert_eq!(
            level_trigger(&resistance, 203.0, Some(199.0), 0.01),
            Some(TriggerDirection::Breakout)
        );
        assert_eq!(level_trigger(&resistance, 203.0, Some(202.5), 0.01), None);
    }

    #[test]
    fn test_price_in_band_is_touch() {
        let support = level(100.0, LevelKind::Support);
        let resistance = level(100.0, LevelKind::Resistance);

        assert_eq!(
            level_trigger(&support, 100.5, Some(100.5), 0.01),
            Some(TriggerDirection::Touch)
        );
        assert_eq!(
            level_trigger(&resistance, 99.5, None, 0.01),
            Some(TriggerDirection::Touch)
        );
    }

    #[test]
    fn test_price_away_from_level_is_none() {
        // Above a support band or below a resistance band never triggers.
        assert_eq!(
            level_trigger(&level(100.0, LevelKind::Support), 110.0, Some(90.0), 0.01),
            None
        );
        assert_eq!(
            level_trigger(&level(100.0, LevelKind::Resistance), 90.0, Some(110.0), 0.01),
            None
        );
    }

    #[test]
    fn test_band_edge_counts_as_crossing() {
        let support = level(100.0, LevelKind::Support);
        // Exactly on the lower edge with a previous price inside the band.
        assert_eq!(
            level_trigger(&support, 99.0, Some(100.0), 0.01),
            Some(TriggerDirection::Breakdown)
        );
        // Exactly on the edge again: no crossing, and no touch either.
        assert_eq!(level_trigger(&support, 99.0, Some(99.0), 0.01), None);
    }
}
