use crate::error::{WalkError, WalkResult};
use crate::traverse::{Reconstruct, Traverse};
use crate::walker::{Mode, Walker};

// -----------------------------------------------------------------------------
// String

/// Length header, then the raw UTF-8 bytes. The byte count in the header is
/// the *byte* length, not the character count.
impl Traverse for String {
    fn traverse(&self, walker: &mut Walker<'_>) -> WalkResult<()> {
        walker.put_len(self.len())?;
        walker.note_run::<u8>(self.len());
        walker.put(self.as_bytes())
    }

    fn traverse_mut(&mut self, walker: &mut Walker<'_>) -> WalkResult<()> {
        if walker.mode() != Mode::Unpacking {
            return self.traverse(walker);
        }
        let len = walker.take_len()?;
        walker.note_run::<u8>(len);
        let offset = walker.position();
        let raw = walker.take(len)?;
        *self = String::from_utf8(raw.to_vec()).map_err(|_| WalkError::InvalidData {
            offset,
            reason: "string bytes are not valid UTF-8".into(),
        })?;
        Ok(())
    }
}

impl Reconstruct for String {
    fn reconstruct() -> WalkResult<Self> {
        Ok(String::new())
    }
}
