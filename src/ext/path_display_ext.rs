use std::path::{Component, Path, PathBuf};

/// Renders `path` as an absolute, lexically normalised path for messages.
///
/// Symlinks are deliberately not resolved: the tools report the path the way
/// the walk sees it, and the path may not exist at all.
pub fn display_absolute(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(current_dir) => current_dir.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    normalize_path(&absolute).display().to_string()
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

pub trait PathDisplayExt {
    fn display_absolute(&self) -> String;
}

impl PathDisplayExt for Path {
    fn display_absolute(&self) -> String {
        display_absolute(self)
    }
}

impl PathDisplayExt for PathBuf {
    fn display_absolute(&self) -> String {
        display_absolute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/../a", "/a")]
    #[case("/", "/")]
    fn normalizes_absolute_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Path::new(input).display_absolute(), expected);
    }

    #[test]
    fn relative_paths_become_absolute() {
        let shown = Path::new("some/relative").display_absolute();
        assert!(Path::new(&shown).is_absolute());
        assert!(shown.ends_with("some/relative"));
    }
}
