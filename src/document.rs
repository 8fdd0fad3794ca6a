//! Config document builder
//!
//! An ordered, append-only list of directives on top of a fixed preamble.
//! Repeated keys are kept as-is: `save` accumulates and `sentinel ...`
//! directives are scoped by their group argument, not by key identity.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};

/// One `key arg1 arg2 ...` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub args: Vec<String>,
}

impl Directive {
    pub fn new<I, S>(key: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Shorthand for building a [`Directive`]
#[macro_export]
macro_rules! directive {
    ($key:expr $(, $arg:expr)* $(,)?) => {
        $crate::document::Directive {
            key: ::std::string::String::from($key),
            args: ::std::vec![$(::std::string::String::from($arg)),*],
        }
    };
}

/// Preamble plus directives, bound to the path it will be committed to
#[derive(Debug)]
pub struct ConfigDocument {
    path: PathBuf,
    preamble: &'static str,
    directives: Vec<Directive>,
}

impl ConfigDocument {
    pub fn new(path: impl Into<PathBuf>, preamble: &'static str) -> Self {
        Self {
            path: path.into(),
            preamble,
            directives: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn append<I, S>(&mut self, key: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Directive::new(key, args));
    }

    pub fn push(&mut self, directive: Directive) {
        debug!("append {}", directive);
        self.directives.push(directive);
    }

    pub fn extend(&mut self, directives: impl IntoIterator<Item = Directive>) {
        for d in directives {
            self.push(d);
        }
    }

    /// Preamble followed by one line per directive, in insertion order
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.preamble.len() + self.directives.len() * 32);
        out.push_str(self.preamble);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        for d in &self.directives {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out
    }

    /// Write the rendered document to its path.
    ///
    /// The text goes to a sibling temp file which is synced and then renamed
    /// over the target, so readers see either the old file or the new one.
    pub fn commit(self) -> Result<()> {
        let rendered = self.render();
        write_atomic(&self.path, rendered.as_bytes()).map_err(|source| Error::Commit {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "Wrote {} directives to {:?}",
            self.directives.len(),
            self.path
        );
        Ok(())
    }
}

/// Temp path next to `path` (same directory, so the rename stays on one filesystem)
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write-to-temp, fsync, rename. An existing target's permissions carry over;
/// the temp file is removed if any step fails.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let temp_path = temp_path_for(path);

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        if let Ok(meta) = fs::metadata(path)
            && meta.is_file()
        {
            file.set_permissions(meta.permissions())?;
        }
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
