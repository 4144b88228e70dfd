//! Container adapters: [`Traverse`](crate::Traverse) for the dynamically
//! shaped containers.
//!
//! Every adapter follows the same wire discipline: an 8-byte little-endian
//! element-count header, then the elements in iteration order. Unpacking
//! clears the existing container and re-inserts element by element, so a
//! map or set re-derives its own internal layout from the restored entries
//! rather than trusting anything about the producer's layout. Hash
//! containers therefore round-trip as equal *multisets*; iteration order is
//! not part of the format. Length headers whose elements consume no bytes
//! are capped, so a corrupt header cannot stall the unpack loop.
//!
//! Covered here:
//!
//! - sequences: `Vec`, `VecDeque`;
//! - maps: `BTreeMap`, std and hashbrown `HashMap`;
//! - sets: `BTreeSet`, std and hashbrown `HashSet`;
//! - `Option` (single presence byte, then the payload when present);
//! - `Box` (transparent indirection for sized payloads; `Box<dyn Base>`
//!   handles are wired up separately by [`poly_base!`](crate::poly_base)).

mod boxed;
mod map;
mod option;
mod seq;
mod set;

use crate::error::{WalkError, WalkResult};
use crate::walker::Walker;

// Upper bound on the element count a zero-width element type may claim.
// Such elements consume no bytes, so a hostile length header would
// otherwise spin the unpack loop for up to 2^64 iterations.
const ZERO_WIDTH_RUN_LIMIT: usize = 1 << 20;

pub(crate) fn guard_zero_width_run(
    walker: &Walker<'_>,
    before: usize,
    count: usize,
) -> WalkResult<()> {
    if walker.position() == before && count > ZERO_WIDTH_RUN_LIMIT {
        return Err(WalkError::InvalidData {
            offset: before,
            reason: "length header exceeds the zero-width element limit".into(),
        });
    }
    Ok(())
}
