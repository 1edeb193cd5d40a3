//! Comment stripping and whitespace folding for raw DDL text.

/// Remove `--` and `/* */` comments, collapse every whitespace run to a single
/// space and trim the result.
///
/// Comment markers inside single-quoted literals and inside `"..."`,
/// `` `...` `` or `[...]` identifiers are kept as text.
pub fn normalize(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut pending_space = false;
    // Closing character of the quoted span being copied
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(close) = quote {
            if c == close {
                quote = None;
            }
            push_folded(&mut out, c, &mut pending_space);
            continue;
        }

        match c {
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                pending_space = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '\'' | '"' | '`' | '[' => {
                quote = Some(if c == '[' { ']' } else { c });
                push_folded(&mut out, c, &mut pending_space);
            }
            _ => push_folded(&mut out, c, &mut pending_space),
        }
    }

    out
}

fn push_folded(out: &mut String, c: char, pending_space: &mut bool) {
    if c.is_whitespace() {
        *pending_space = true;
        return;
    }
    if *pending_space && !out.is_empty() {
        out.push(' ');
    }
    *pending_space = false;
    out.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_collapses_whitespace() {
        let sql = "  CREATE   TABLE\n\tusers (\n  id INT\n)  ";
        assert_eq!(normalize(sql), "CREATE TABLE users ( id INT )");
    }

    #[rstest]
    #[case("CREATE TABLE t (id INT) -- trailing", "CREATE TABLE t (id INT)")]
    #[case("-- header\nCREATE TABLE t (id INT)", "CREATE TABLE t (id INT)")]
    #[case("CREATE TABLE t (id INT) /* block */", "CREATE TABLE t (id INT)")]
    #[case("CREATE /* multi\nline */ TABLE t (id INT)", "CREATE TABLE t (id INT)")]
    #[case("CREATE TABLE t (id INT -- pk\n)", "CREATE TABLE t (id INT )")]
    fn test_strips_comments(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(normalize(sql), expected);
    }

    #[test]
    fn test_comment_without_surrounding_space_still_separates() {
        assert_eq!(normalize("a--x\nb"), "a b");
    }

    #[test]
    fn test_unterminated_block_comment_drops_rest() {
        assert_eq!(normalize("CREATE TABLE t /* never closed"), "CREATE TABLE t");
    }

    #[test]
    fn test_keeps_markers_inside_literals() {
        let sql = "note TEXT DEFAULT '-- not a comment'";
        assert_eq!(normalize(sql), sql);
    }

    #[rstest]
    #[case("\"o'clock\" INT, -- note\n b INT", "\"o'clock\" INT, b INT")]
    #[case("`it's` INT, -- note\n b INT", "`it's` INT, b INT")]
    #[case("[don't] INT, /* note */ b INT", "[don't] INT, b INT")]
    #[case("\"a--b\" INT", "\"a--b\" INT")]
    #[case("[x/*y*/] INT", "[x/*y*/] INT")]
    fn test_quoted_identifiers_are_opaque(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(normalize(sql), expected);
    }
}
