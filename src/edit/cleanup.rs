use tracing::trace;

use crate::command::Transaction;
use crate::error::Result;
use crate::graph::{SegmentId, VertexId};

/// A surviving segment of the walk, with its resolved endpoint order.
#[derive(Clone, Copy, Debug)]
struct WalkEntry {
    seg: SegmentId,
    start: VertexId,
    end: VertexId,
}

/// Simplifies an ordered run of connected segments after an edit.
///
/// Two local rules are applied in one walk along the chain:
///
/// * a zero-length segment is removed, and the segment after it is
///   re-pointed onto the surviving vertex;
/// * two consecutive parallel segments with identical attributes merge
///   into one, provided their shared vertex carries nothing else.
///
/// The rules run inside the caller's transaction, so the simplification
/// undoes together with the edit that caused it. A second pass over the
/// same chain records no further ops.
///
/// # Errors
///
/// Returns an error if the chain references detached or unknown segments.
pub fn cleanup_chain(txn: &mut Transaction<'_>, chain: &[SegmentId]) -> Result<()> {
    let mut kept: Vec<WalkEntry> = Vec::with_capacity(chain.len());
    let mut expected_start: Option<VertexId> = None;

    for (i, &seg) in chain.iter().enumerate() {
        if !txn.doc().traces.is_live(seg) {
            continue;
        }

        let start = match expected_start {
            Some(v) => v,
            // Orient the first segment toward the rest of the chain.
            None => first_start(txn, seg, &chain[i + 1..])?,
        };
        let next_start = txn.doc().traces.other_vertex(seg, start)?;
        expected_start = Some(next_start);

        if txn.doc().traces.is_zero_length(seg)? {
            trace!(?seg, "cleanup: removing zero-length segment");
            txn.detach_segment(seg)?;
            continue;
        }

        let Some(prev) = kept.last().copied() else {
            kept.push(WalkEntry {
                seg,
                start,
                end: next_start,
            });
            continue;
        };

        if can_merge(txn, &prev, seg, start, next_start)? {
            trace!(?seg, into = ?prev.seg, "cleanup: merging collinear run");
            txn.swap_vertex(seg, start, prev.start)?;
            txn.detach_segment(prev.seg)?;
            kept.pop();
            kept.push(WalkEntry {
                seg,
                start: prev.start,
                end: next_start,
            });
        } else if prev.end != start {
            // An earlier removal left a gap: reconnect onto the survivor.
            if prev.end == next_start {
                txn.detach_segment(seg)?;
            } else {
                txn.swap_vertex(seg, start, prev.end)?;
                kept.push(WalkEntry {
                    seg,
                    start: prev.end,
                    end: next_start,
                });
            }
        } else {
            kept.push(WalkEntry {
                seg,
                start,
                end: next_start,
            });
        }
    }
    Ok(())
}

fn first_start(
    txn: &Transaction<'_>,
    seg: SegmentId,
    rest: &[SegmentId],
) -> Result<VertexId> {
    let g = &txn.doc().traces;
    for &next in rest {
        if !g.is_live(next) {
            continue;
        }
        if let Some(shared) = g.common_vertex(seg, next) {
            return Ok(g.other_vertex(seg, shared)?);
        }
        break;
    }
    Ok(g.segment(seg)?.v1)
}

fn can_merge(
    txn: &Transaction<'_>,
    prev: &WalkEntry,
    seg: SegmentId,
    start: VertexId,
    next_start: VertexId,
) -> Result<bool> {
    let g = &txn.doc().traces;
    if !g.parallel(prev.seg, seg)? || g.attrs(prev.seg)? != g.attrs(seg)? {
        return Ok(false);
    }
    // The merge must not swallow a junction or close the chain on itself.
    if prev.start == next_start {
        return Ok(false);
    }
    let joinable = if prev.end == start {
        g.degree(start) == 2
    } else {
        g.degree(prev.end) == 1 && g.degree(start) == 1
    };
    Ok(joinable)
}

/// Deletes a segment and heals the trace around it.
///
/// When the segment's two neighbors are a matched collinear pair they are
/// merged into one span; otherwise a sole neighbor is re-pointed across
/// the gap so the trace stays connected.
///
/// # Errors
///
/// Returns an error if the segment is not live.
pub fn remove_and_join(txn: &mut Transaction<'_>, seg: SegmentId) -> Result<()> {
    let data = *txn.doc().traces.segment(seg)?;
    let (v1, v2) = (data.v1, data.v2);
    let n1 = txn.doc().traces.other_segments_at(v1, seg);
    let n2 = txn.doc().traces.other_segments_at(v2, seg);

    if let ([a], [b]) = (n1.as_slice(), n2.as_slice()) {
        let g = &txn.doc().traces;
        let far_b = g.other_vertex(*b, v2)?;
        if g.parallel(*a, *b)?
            && g.attrs(*a)? == g.attrs(*b)?
            && g.other_vertex(*a, v1)? != far_b
        {
            let (a, b) = (*a, *b);
            txn.swap_vertex(a, v1, far_b)?;
            txn.detach_segment(b)?;
            txn.detach_segment(seg)?;
            return Ok(());
        }
    }

    if let Some(&a) = n1.first() {
        if txn.doc().traces.other_vertex(a, v1)? != v2 {
            txn.swap_vertex(a, v1, v2)?;
        }
    } else if let Some(&b) = n2.first() {
        if txn.doc().traces.other_vertex(b, v2)? != v1 {
            txn.swap_vertex(b, v2, v1)?;
        }
    }
    txn.detach_segment(seg)?;
    Ok(())
}
