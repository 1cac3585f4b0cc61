use anyhow::{Context, Result};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MigrateOptions {
    pub confirm_before_push: bool,
    pub confirm_before_next: bool,
    pub ignore_failure: bool,
    pub lfs: Option<LargeFilePattern>,
}

/// Path glob selecting the files moved into large-file storage.
#[derive(Clone, Debug, PartialEq)]
pub struct LargeFilePattern(glob::Pattern);

impl LargeFilePattern {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

pub fn parse_lfs_pattern(val: &str) -> Result<LargeFilePattern> {
    let pattern = glob::Pattern::new(val)
        .with_context(|| format!("invalid --lfs pattern `{}`", val))?;

    Ok(LargeFilePattern(pattern))
}
