//! Line classification for the group config grammar.
//!
//! A raw line is either skipped (blank or comment), a directive
//! (`#include`, `#groupdef`, `#endgroupdef`) or a trimmed data line.

pub const INCLUDE: &str = "#include";
pub const GROUPDEF: &str = "#groupdef";
pub const ENDGROUPDEF: &str = "#endgroupdef";

/// Classified line with its payload borrowed from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `#include <path>`; payload may be empty (caller rejects it)
    Include(&'a str),
    /// `#groupdef <name>`; payload may hold several words (caller rejects it)
    GroupDef(&'a str),
    EndGroupDef,
    /// Any other non-comment content, trimmed
    Data(&'a str),
}

/// Classify one raw line; `None` for blank and comment-only lines.
pub fn classify(raw: &str) -> Option<Line<'_>> {
    let body = raw.trim_start();

    // Only the keyword matters for the block end; trailing text is ignored.
    if directive_arg(body, ENDGROUPDEF).is_some() {
        return Some(Line::EndGroupDef);
    }
    if let Some(arg) = directive_arg(body, GROUPDEF) {
        return Some(Line::GroupDef(strip_comment(arg, false)));
    }
    if let Some(arg) = directive_arg(body, INCLUDE) {
        return Some(Line::Include(strip_comment(arg, false)));
    }

    let data = strip_comment(body, true);
    if data.is_empty() {
        None
    } else {
        Some(Line::Data(data))
    }
}

/// Return the argument after `keyword` when the line starts with it as a
/// whole word.
fn directive_arg<'a>(body: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = body.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

/// Cut a trailing `//` comment (and `#` comment when `sharpen`) and trim.
pub fn strip_comment(text: &str, sharpen: bool) -> &str {
    let mut stop = text.len();
    if let Some(pos) = text.find("//") {
        stop = stop.min(pos);
    }
    if sharpen && let Some(pos) = text.find('#') {
        stop = stop.min(pos);
    }
    text[..stop].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \t  "), None);
        assert_eq!(classify("# a comment"), None);
        assert_eq!(classify("   // another"), None);
        assert_eq!(classify("#includes are not directives"), None);
    }

    #[test]
    fn directives_are_recognized_after_leading_whitespace() {
        assert_eq!(classify("  #include base.gcf"), Some(Line::Include("base.gcf")));
        assert_eq!(classify("#include"), Some(Line::Include("")));
        assert_eq!(classify("#groupdef FAST  "), Some(Line::GroupDef("FAST")));
        assert_eq!(classify("#groupdef A B"), Some(Line::GroupDef("A B")));
        assert_eq!(classify("\t#endgroupdef"), Some(Line::EndGroupDef));
        assert_eq!(classify("#endgroupdef // done"), Some(Line::EndGroupDef));
    }

    #[test]
    fn directive_arguments_drop_slash_comments() {
        assert_eq!(
            classify("#include shared/base.gcf // common"),
            Some(Line::Include("shared/base.gcf"))
        );
    }

    #[test]
    fn commented_out_directive_is_a_comment() {
        assert_eq!(classify("//#include base.gcf"), None);
    }

    #[test]
    fn data_lines_are_trimmed_and_stripped() {
        assert_eq!(
            classify("  online FAST enable=true   # fast accounts"),
            Some(Line::Data("online FAST enable=true"))
        );
        assert_eq!(
            classify("online FAST id=1// trailing"),
            Some(Line::Data("online FAST id=1"))
        );
        assert_eq!(classify("s1"), Some(Line::Data("s1")));
    }
}
