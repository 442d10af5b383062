//! Batched world to local transformations.

use super::*;
use itertools::Itertools;
use rtcore::stat_inc;

/// Finds the value of the first pending lane and returns it together with
/// the mask of all pending lanes holding the same value. Those lanes are no
/// longer pending afterwards. Returns `None` when no lane is pending.
///
/// * `pending` - Lanes not processed yet.
/// * `values`  - Value per lane.
pub fn next_unique<const K: usize>(
    pending: &mut [bool; K],
    values: &[usize; K],
) -> Option<(usize, [bool; K])> {
    let first = pending.iter().position(|p| *p)?;
    let value = values[first];

    let mut mask = [false; K];
    for ((m, p), v) in mask.iter_mut().zip(pending.iter_mut()).zip(values.iter()) {
        if *p && *v == value {
            *m = true;
            *p = false;
        }
    }
    Some((value, mask))
}

impl Instance {
    /// Returns the world to local transformations for a batch of global
    /// times. Lanes that are not `valid` are `None`. Lanes may fall into
    /// different time segments.
    ///
    /// * `valid` - Active lanes; at least one must be active.
    /// * `time`  - Global time per lane.
    pub fn get_world_to_local_lanes<const K: usize>(
        &self,
        valid: &[bool; K],
        time: &[Float; K],
    ) -> [Option<Transform>; K] {
        assert!(valid.iter().any(|v| *v), "no active lanes");
        stat_inc!(WORLD_TO_LOCAL_BATCHES, 1);

        let mut result: [Option<Transform>; K] = [None; K];

        if self.num_time_steps() == 1 {
            let w2l = self.get_local_to_world0().inverse();
            for (r, v) in result.iter_mut().zip(valid.iter()) {
                if *v {
                    *r = Some(w2l);
                }
            }
            return result;
        }

        let mut itime = [0_usize; K];
        let mut ftime = [0.0 as Float; K];
        for k in 0..K {
            (itime[k], ftime[k]) = self.time_segment(time[k]);
        }

        let same_segment = (0..K).filter(|k| valid[*k]).map(|k| itime[k]).all_equal();
        let (space0, space1) = if same_segment {
            let first = (0..K).find(|k| valid[*k]).unwrap_or(0);
            let i = itime[first];
            (
                [self.local2world[i]; K],
                [self.local2world[i + 1]; K],
            )
        } else {
            stat_inc!(DIVERGENT_BATCHES, 1);

            let mut space0 = [IDENTITY_MATRIX; K];
            let mut space1 = [IDENTITY_MATRIX; K];
            let mut pending = *valid;
            let mut iterations = 0;
            while let Some((i, lanes)) = next_unique(&mut pending, &itime) {
                iterations += 1;
                debug_assert!(iterations <= K);
                for k in (0..K).filter(|k| lanes[*k]) {
                    space0[k] = self.local2world[i];
                    space1[k] = self.local2world[i + 1];
                }
            }
            (space0, space1)
        };

        for k in (0..K).filter(|k| valid[*k]) {
            let m = self.interpolate(&space0[k], &space1[k], ftime[k]);
            result[k] = Some(Transform::new(m).inverse());
        }
        result
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
