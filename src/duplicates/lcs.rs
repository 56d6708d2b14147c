//! Longest common substring between two keys.
//!
//! Classic O(n·m) dynamic programming over characters, keeping only one
//! row of the table. The scan walks `a` left to right and `b` left to right
//! within each row, and only a strictly longer run replaces the best match, so
//! among equally long matches the one starting earliest in `a` wins, then the
//! one starting earliest in `b`.

/// A contiguous run shared by two strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonSubstring<'a> {
    /// The shared text, borrowed from the first string
    pub text: &'a str,
    /// Start offset in the first string, in characters
    pub a_offset: usize,
    /// Start offset in the second string, in characters
    pub b_offset: usize,
}

impl CommonSubstring<'_> {
    /// Length of the match in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the match is empty (never true for a returned match).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Find the longest common substring of `a` and `b`.
///
/// Returns `None` when the strings share no character.
///
/// # Example
///
/// ```
/// use s3dups::duplicates::longest_common_substring;
///
/// let m = longest_common_substring("a/b/file1.txt", "a/b/file2.txt").unwrap();
/// assert_eq!(m.text, "a/b/file");
/// assert_eq!(m.a_offset, 0);
/// ```
#[must_use]
pub fn longest_common_substring<'a>(a: &'a str, b: &str) -> Option<CommonSubstring<'a>> {
    let a_chars: Vec<(usize, char)> = a.char_indices().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() || b_chars.is_empty() {
        return None;
    }

    // prev[j + 1] = length of the common run ending at a[i - 1], b[j]
    let mut prev = vec![0usize; b_chars.len() + 1];
    let mut curr = vec![0usize; b_chars.len() + 1];
    let mut best_len = 0usize;
    let mut best_a_end = 0usize;
    let mut best_b_end = 0usize;

    for (i, &(_, ca)) in a_chars.iter().enumerate() {
        for (j, &cb) in b_chars.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            if curr[j + 1] > best_len {
                best_len = curr[j + 1];
                best_a_end = i + 1;
                best_b_end = j + 1;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    if best_len == 0 {
        return None;
    }

    let a_offset = best_a_end - best_len;
    let start = a_chars[a_offset].0;
    let end = a_chars.get(best_a_end).map_or(a.len(), |&(idx, _)| idx);

    Some(CommonSubstring {
        text: &a[start..end],
        a_offset,
        b_offset: best_b_end - best_len,
    })
}
