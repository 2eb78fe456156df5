//! Filepath: src/infra/utils.rs
//! Text helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

use std::fmt::Display;

/// Tokenizing and joining helpers
pub struct TextUtils;

impl TextUtils
{
    /// Split `text` on any char of `delims`, dropping empty tokens
    pub fn split_any<'a>(
        text: &'a str,
        delims: &str,
    ) -> Vec<&'a str>
    {
        text.split(|c: char| delims.contains(c))
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Split on whitespace; the tokenizer used for data lines
    pub fn words(text: &str) -> Vec<&str>
    {
        text.split_whitespace()
            .collect()
    }

    /// Join items with the given separator into a String
    pub fn join<I>(
        items: I,
        sep: &str,
    ) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut out = String::new();

        // Push parts with separator
        for (i, item) in items
            .into_iter()
            .enumerate()
        {
            if i > 0
            {
                out.push_str(sep);
            }

            out.push_str(&item.to_string());
        }

        // Return the constructed string
        out
    }

    /// Length of the longest common byte prefix, kept on a char boundary
    pub fn common_prefix_len(
        a: &str,
        b: &str,
    ) -> usize
    {
        let mut len = 0;

        for ((i, ca), cb) in a
            .char_indices()
            .zip(b.chars())
        {
            if ca != cb
            {
                break;
            }

            len = i + ca.len_utf8();
        }

        len
    }
}
