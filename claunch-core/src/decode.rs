use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

pub fn decode(name: &str) -> BTreeSet<PathBuf> {
    decode_under(Path::new("/"), name)
}

// Every `/` and every leading `.` of a component is encoded as `-`, so one dash
// can mean several things. Only segmentations that exist as directories under
// `root` are kept.
pub fn decode_under(root: &Path, name: &str) -> BTreeSet<PathBuf> {
    let mut results = BTreeSet::new();

    // One leading dash stands for the root separator.
    let name = name.strip_prefix('-').unwrap_or(name);
    if name.is_empty() {
        return results;
    }

    search(root, name, &mut results);
    results
}

pub fn encode(path: &Path) -> String {
    let mut encoded = String::new();
    for component in path.components() {
        if let Component::Normal(name) = component {
            let name = name.to_string_lossy();
            encoded.push('-');
            match name.strip_prefix('.') {
                Some(rest) => {
                    encoded.push('-');
                    encoded.push_str(rest);
                }
                None => encoded.push_str(&name),
            }
        }
    }
    encoded
}

fn search(prefix: &Path, remainder: &str, results: &mut BTreeSet<PathBuf>) {
    if remainder.is_empty() {
        emit_if_dir(prefix.to_path_buf(), results);
        return;
    }

    if remainder.starts_with('-') {
        search_dotted(prefix, remainder, results);
        return;
    }

    // Every dash may be a separator; the whole remainder may also be one
    // component with literal dashes.
    for (dash, _) in remainder.match_indices('-') {
        descend(prefix, &remainder[..dash], &remainder[dash + 1..], results);
    }
    emit_component(prefix, remainder, results);
}

fn search_dotted(prefix: &Path, remainder: &str, results: &mut BTreeSet<PathBuf>) {
    let rest = remainder
        .strip_prefix("--")
        .or_else(|| remainder.strip_prefix('-'))
        .unwrap_or(remainder);
    if rest.is_empty() {
        return;
    }

    for (dash, _) in rest.match_indices('-') {
        if dash == 0 {
            continue;
        }
        let component = format!(".{}", &rest[..dash]);
        descend(prefix, &component, &rest[dash + 1..], results);
    }
    emit_component(prefix, &format!(".{rest}"), results);
}

fn descend(prefix: &Path, component: &str, remainder: &str, results: &mut BTreeSet<PathBuf>) {
    if !is_plain_component(component) {
        return;
    }
    let next = prefix.join(component);
    if next.is_dir() {
        search(&next, remainder, results);
    }
}

fn emit_component(prefix: &Path, component: &str, results: &mut BTreeSet<PathBuf>) {
    if is_plain_component(component) {
        emit_if_dir(prefix.join(component), results);
    }
}

fn emit_if_dir(candidate: PathBuf, results: &mut BTreeSet<PathBuf>) {
    // `is_dir` reports false for anything that vanished or cannot be stat'ed.
    if candidate.is_dir() {
        results.insert(candidate);
    }
}

fn is_plain_component(component: &str) -> bool {
    !component.is_empty() && component != "." && component != ".."
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::{decode_under, encode};

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).expect("mkdir");
        }
    }

    fn set(root: &Path, dirs: &[&str]) -> BTreeSet<PathBuf> {
        dirs.iter().map(|dir| root.join(dir)).collect()
    }

    #[test]
    fn decodes_plain_path() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["Users/alice/work/lempire"]);

        let decoded = decode_under(temp.path(), "-Users-alice-work-lempire");
        assert_eq!(decoded, set(temp.path(), &["Users/alice/work/lempire"]));
    }

    #[test]
    fn keeps_literal_dashes_in_last_component() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["Users/alice/work/my-app"]);

        let decoded = decode_under(temp.path(), "-Users-alice-work-my-app");
        assert_eq!(decoded, set(temp.path(), &["Users/alice/work/my-app"]));
    }

    #[test]
    fn keeps_literal_dashes_in_middle_component() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["src/my-org/api"]);

        let decoded = decode_under(temp.path(), "-src-my-org-api");
        assert_eq!(decoded, set(temp.path(), &["src/my-org/api"]));
    }

    #[test]
    fn returns_every_valid_segmentation() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["a/b/c", "a/b-c"]);

        let decoded = decode_under(temp.path(), "-a-b-c");
        assert_eq!(decoded, set(temp.path(), &["a/b/c", "a/b-c"]));
    }

    #[test]
    fn separator_and_literal_dash_both_survive() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["work/my/app", "work/my-app"]);

        let decoded = decode_under(temp.path(), "-work-my-app");
        assert_eq!(decoded, set(temp.path(), &["work/my/app", "work/my-app"]));
    }

    #[test]
    fn decodes_top_level_dot_component() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &[".meteor", "meteor", "-meteor"]);

        let decoded = decode_under(temp.path(), "--meteor");
        assert_eq!(decoded, set(temp.path(), &[".meteor"]));
    }

    #[test]
    fn decodes_nested_dot_component() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["home/bob/.config/nvim"]);

        let decoded = decode_under(temp.path(), "-home-bob--config-nvim");
        assert_eq!(decoded, set(temp.path(), &["home/bob/.config/nvim"]));
    }

    #[test]
    fn decodes_dot_component_with_dashes() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["home/.dot-files/bin"]);

        let decoded = decode_under(temp.path(), "-home--dot-files-bin");
        assert_eq!(decoded, set(temp.path(), &["home/.dot-files/bin"]));
    }

    #[test]
    fn trailing_dash_names_the_parent() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["srv"]);

        let decoded = decode_under(temp.path(), "-srv-");
        assert_eq!(decoded, set(temp.path(), &["srv"]));
    }

    #[test]
    fn missing_directories_yield_empty_set() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["Users/alice"]);

        assert!(decode_under(temp.path(), "-Users-alice-gone").is_empty());
        assert!(decode_under(temp.path(), "-nothing-here").is_empty());
    }

    #[test]
    fn empty_and_dash_only_names_yield_empty_set() {
        let temp = tempdir().expect("tempdir");

        assert!(decode_under(temp.path(), "").is_empty());
        assert!(decode_under(temp.path(), "-").is_empty());
        assert!(decode_under(temp.path(), "--").is_empty());
    }

    #[test]
    fn regular_files_are_not_candidates() {
        let temp = tempdir().expect("tempdir");
        mkdirs(temp.path(), &["work"]);
        fs::write(temp.path().join("work/notes"), "x").expect("write");

        assert!(decode_under(temp.path(), "-work-notes").is_empty());
    }

    #[test]
    fn round_trips_encoded_paths() {
        let temp = tempdir().expect("tempdir");
        let dirs = [
            "Users/alice/work/my-app",
            "Users/alice/.config/claude-code",
            "opt/x-y-z/.cache",
            "srv/a.b/c",
        ];
        mkdirs(temp.path(), &dirs);

        for dir in dirs {
            let encoded = encode(Path::new(dir));
            let decoded = decode_under(temp.path(), &encoded);
            assert!(
                decoded.contains(&temp.path().join(dir)),
                "{encoded} should decode to {dir}, got {decoded:?}"
            );
        }
    }

    #[test]
    fn encode_replaces_separators_and_leading_dots() {
        assert_eq!(
            encode(Path::new("/Users/alice/work/my-app")),
            "-Users-alice-work-my-app"
        );
        assert_eq!(encode(Path::new("/home/bob/.meteor")), "-home-bob--meteor");
        assert_eq!(encode(Path::new("/srv/a.b")), "-srv-a.b");
    }
}
