// Lilt - A non-blocking Statsd client for Rust!
//
// Copyright 2026 The Lilt Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Datadog style tag suffixes for metric lines.

const TAG_PREFIX: &str = "|#";

/// Generate a suffix conveying the given tags to a Statsd server.
///
/// When `prefix` is given it's expected to be an already rendered tag suffix
/// (such as the constant tags of a client, rendered with a `None` prefix) and
/// the tags are appended to it after a comma. Without a prefix the suffix
/// starts with `|#`. If there are no tags, the prefix (or an empty string) is
/// returned unchanged.
///
/// Note that tags are written in the *reverse* of the order they are given.
///
/// # Example
///
/// ```
/// use lilt::tag_string;
///
/// assert_eq!("", tag_string::<&str>(&[], None));
/// assert_eq!("|#b,a", tag_string(&["a", "b"], None));
/// assert_eq!("|#env:prod,b,a", tag_string(&["a", "b"], Some("|#env:prod")));
/// ```
pub fn tag_string<S>(tags: &[S], prefix: Option<&str>) -> String
where
    S: AsRef<str>,
{
    let mut out = String::with_capacity(size_hint(tags, prefix));
    write_tag_string(&mut out, tags, prefix);
    out
}

/// Append the tag suffix for `tags` and `prefix` to `out`.
///
/// Same format as `tag_string` without allocating an intermediate string.
pub(crate) fn write_tag_string<S>(out: &mut String, tags: &[S], prefix: Option<&str>)
where
    S: AsRef<str>,
{
    match prefix {
        Some(p) => {
            out.push_str(p);
            if tags.is_empty() {
                return;
            }
            out.push(',');
        }
        None => {
            if tags.is_empty() {
                return;
            }
            out.push_str(TAG_PREFIX);
        }
    }

    for (i, tag) in tags.iter().rev().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(tag.as_ref());
    }
}

pub(crate) fn size_hint<S>(tags: &[S], prefix: Option<&str>) -> usize
where
    S: AsRef<str>,
{
    let start = prefix.map_or(TAG_PREFIX.len(), |p| p.len() + 1);
    let kv: usize = tags.iter().map(|t| t.as_ref().len()).sum();
    start + kv + tags.len()
}
