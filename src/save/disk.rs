use crate::error::Result;
use std::path::Path;

/// for types that can be written to and loaded from disk. writes go
/// through persist(), which lands the payload in a sibling temp file
/// and renames it into place, so an interrupt never leaves a
/// half-written artifact behind.
pub trait Disk: Sized {
    /// the name of the entity, for logs and default file names
    fn name() -> String;
    /// write to disk
    fn save(&self, path: &Path) -> Result<()>;
    /// read from disk
    fn load(path: &Path) -> Result<Self>;
    /// check if the artifact exists on disk
    fn done(path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
    /// atomic write: temp file in the same directory, then rename
    fn persist(path: &Path, payload: &[u8]) -> Result<()> {
        let ref tmp = path.with_extension("tmp");
        std::fs::write(tmp, payload)?;
        std::fs::rename(tmp, path)?;
        Ok(())
    }
}
