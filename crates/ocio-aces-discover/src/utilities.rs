//! Path and reporting helpers.

use std::path::{Component, Path, PathBuf};

/// Returns the deepest directory shared by all given paths.
///
/// Comparison is component-wise, so `/a/bc` and `/a/bd` share `/a`, not
/// `/a/b`. Returns an empty path for an empty input.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use ocio_aces_discover::paths_common_ancestor;
///
/// let ancestor = paths_common_ancestor([
///     Path::new("/aces/idt/arri/a.ctl"),
///     Path::new("/aces/idt/sony/b.ctl"),
/// ]);
/// assert_eq!(ancestor, PathBuf::from("/aces/idt"));
/// ```
pub fn paths_common_ancestor<'a, I>(paths: I) -> PathBuf
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut iter = paths.into_iter();
    let Some(first) = iter.next() else {
        return PathBuf::new();
    };

    let mut common: Vec<Component<'a>> = first.components().collect();
    for path in iter {
        let shared = common
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }

    common.into_iter().collect()
}

/// Formats a message in a box of `=` and `*` characters.
///
/// Words are wrapped to fit `width` minus `padding` on each side; words
/// longer than a line are not broken.
///
/// ```text
/// ===============================================================================
/// *                                                                             *
/// *   output_transform                                                          *
/// *                                                                             *
/// ===============================================================================
/// ```
pub fn message_box(message: &str, width: usize, padding: usize) -> Vec<String> {
    let ideal_width = width.saturating_sub(padding * 2 + 2).max(1);
    let inner = |text: &str| {
        let fill = width.saturating_sub(text.chars().count() + padding * 2 + 2);
        format!("*{pad}{text}{}{pad}*", " ".repeat(fill), pad = " ".repeat(padding))
    };

    let mut lines = vec!["=".repeat(width), inner("")];
    for paragraph in message.split('\n') {
        let wrapped = wrap(&paragraph.replace('\t', "        "), ideal_width);
        if wrapped.is_empty() {
            lines.push(inner(" "));
        }
        lines.extend(wrapped.iter().map(|line| inner(line)));
    }
    lines.push(inner(""));
    lines.push("=".repeat(width));

    lines
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_ancestor() {
        let paths = [
            Path::new("/a/bc/x.clf"),
            Path::new("/a/bd/y.clf"),
            Path::new("/a/bd/z/w.clf"),
        ];
        assert_eq!(paths_common_ancestor(paths), PathBuf::from("/a"));
        assert_eq!(
            paths_common_ancestor([Path::new("/a/b/x.clf")]),
            PathBuf::from("/a/b/x.clf")
        );
        assert_eq!(paths_common_ancestor(std::iter::empty()), PathBuf::new());
    }

    #[test]
    fn boxed_message() {
        let lines = message_box("Lorem ipsum dolor sit amet", 20, 2);

        assert_eq!(lines.first().unwrap(), &"=".repeat(20));
        assert_eq!(lines.last().unwrap(), &"=".repeat(20));
        assert!(lines.iter().all(|l| l.chars().count() == 20));
        assert_eq!(lines[2], "*  Lorem ipsum     *");
        assert_eq!(lines[3], "*  dolor sit amet  *");
    }
}
