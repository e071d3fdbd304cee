use crate::stats::ScenarioStats;

/// Borrowed view over drained frame data for verification helpers.
pub struct DrainReport<'a> {
    pub frames: &'a [u32],
    pub max_depth: Option<usize>,
}

pub type CheckResult = Result<(), String>;

fn verify_delivery(
    drain: &DrainReport<'_>,
    stats: &ScenarioStats,
    expected_frames: u32,
) -> CheckResult {
    if drain.frames.len() as u32 != expected_frames {
        return Err(format!(
            "drained {} frames (expected {})",
            drain.frames.len(),
            expected_frames
        ));
    }
    if let Some(pos) = drain
        .frames
        .iter()
        .enumerate()
        .position(|(i, &id)| id != i as u32)
    {
        return Err(format!(
            "frame ordering mismatch at position {}: got {}",
            pos, drain.frames[pos]
        ));
    }
    if stats.produced != expected_frames {
        return Err(format!(
            "stats produced {} frames (expected {})",
            stats.produced, expected_frames
        ));
    }
    if stats.consumed != expected_frames {
        return Err(format!(
            "stats consumed {} frames (expected {})",
            stats.consumed, expected_frames
        ));
    }
    Ok(())
}

pub fn verify_flood(
    drain: &DrainReport<'_>,
    stats: &ScenarioStats,
    expected_frames: u32,
) -> CheckResult {
    verify_delivery(drain, stats, expected_frames)?;
    if stats.full_rejections != 0 {
        return Err(format!(
            "queue reported {} Full rejections (expected 0)",
            stats.full_rejections
        ));
    }
    if stats.empty_reads != 0 {
        return Err(format!(
            "queue reported {} Empty reads (expected 0)",
            stats.empty_reads
        ));
    }
    Ok(())
}

pub fn verify_burst(
    drain: &DrainReport<'_>,
    stats: &ScenarioStats,
    expected_frames: u32,
    slot_budget: usize,
) -> CheckResult {
    verify_flood(drain, stats, expected_frames)?;
    if let Some(depth) = drain.max_depth {
        if depth > slot_budget {
            return Err(format!(
                "queue depth {} exceeded slot budget {}",
                depth, slot_budget
            ));
        }
    }
    Ok(())
}

pub fn verify_backpressure(
    drain: &DrainReport<'_>,
    stats: &ScenarioStats,
    expected_frames: u32,
) -> CheckResult {
    verify_delivery(drain, stats, expected_frames)?;
    if stats.full_rejections == 0 {
        return Err("backpressure scenario expected Full rejections, observed none".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(produced: u32, full_rejections: u32) -> ScenarioStats {
        ScenarioStats {
            produced,
            consumed: produced,
            full_rejections,
            ..ScenarioStats::default()
        }
    }

    #[test]
    fn flood_accepts_in_order_delivery() {
        let frames = [0, 1, 2, 3];
        let drain = DrainReport {
            frames: &frames,
            max_depth: None,
        };
        assert!(verify_flood(&drain, &stats(4, 0), 4).is_ok());
        assert!(verify_flood(&drain, &stats(4, 1), 4).is_err());
        assert!(verify_flood(&drain, &stats(4, 0), 5).is_err());
    }

    #[test]
    fn ordering_mismatch_is_reported() {
        let frames = [0, 2, 1];
        let drain = DrainReport {
            frames: &frames,
            max_depth: None,
        };
        let err = verify_flood(&drain, &stats(3, 0), 3).unwrap_err();
        assert!(err.contains("position 1"), "{err}");
    }

    #[test]
    fn burst_enforces_slot_budget() {
        let frames = [0, 1];
        let drain = DrainReport {
            frames: &frames,
            max_depth: Some(3),
        };
        assert!(verify_burst(&drain, &stats(2, 0), 2, 4).is_ok());
        assert!(verify_burst(&drain, &stats(2, 0), 2, 2).is_err());
    }

    #[test]
    fn backpressure_requires_rejections() {
        let frames = [0, 1];
        let drain = DrainReport {
            frames: &frames,
            max_depth: None,
        };
        assert!(verify_backpressure(&drain, &stats(2, 1), 2).is_ok());
        assert!(verify_backpressure(&drain, &stats(2, 0), 2).is_err());
    }
}
