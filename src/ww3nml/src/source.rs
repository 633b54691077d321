// ww3nml/src/source.rs

//! File references rendered into namelists.

use std::path::{Path, PathBuf};

/// Something a file-valued namelist field can point at.
///
/// Only the textual form matters here; resolving or fetching the source is
/// the caller's business.
pub trait SourceRef {
    fn render_path(&self) -> String;
}

impl SourceRef for str {
    fn render_path(&self) -> String {
        self.to_string()
    }
}

impl SourceRef for String {
    fn render_path(&self) -> String {
        self.clone()
    }
}

impl SourceRef for Path {
    fn render_path(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

impl SourceRef for PathBuf {
    fn render_path(&self) -> String {
        self.as_path().render_path()
    }
}

impl<T: SourceRef + ?Sized> SourceRef for &T {
    fn render_path(&self) -> String {
        (**self).render_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_and_strings() {
        assert_eq!("depth.inp".render_path(), "depth.inp");
        assert_eq!(PathBuf::from("grids/depth.inp").render_path(), "grids/depth.inp");
        let path = Path::new("a/b.msh");
        assert_eq!((&path).render_path(), "a/b.msh");
    }
}
