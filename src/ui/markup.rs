//! Plain-text rendering of the light HTML the practice API embeds in
//! question prompts and solutions.

/// Split `html` into display lines: `<br>` breaks lines, other tags are
/// dropped, common entities decoded and MathJax delimiters removed.
pub fn to_lines(html: &str) -> Vec<String> {
    split_breaks(html)
        .into_iter()
        .map(|segment| strip_math(&decode_entities(&strip_tags(segment))))
        .collect()
}

fn split_breaks(html: &str) -> Vec<&str> {
    let lower = html.to_ascii_lowercase();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while let Some(found) = lower[pos..].find("<br") {
        let tag_start = pos + found;
        let rest = &lower[tag_start + 3..];
        // <br>, <br/> and <br /> only; not <bridge>
        let tag_end = match rest.chars().next() {
            Some('>') | Some('/') | Some(' ') => rest.find('>').map(|i| tag_start + 3 + i + 1),
            _ => None,
        };
        match tag_end {
            Some(end) => {
                segments.push(&html[start..tag_start]);
                start = end;
                pos = end;
            }
            None => pos = tag_start + 3,
        }
    }
    segments.push(&html[start..]);
    segments
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&tail[1..semi]).map(|c| (c, semi + 1)));
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "times" => Some('×'),
        "divide" => Some('÷'),
        "le" => Some('≤'),
        "ge" => Some('≥'),
        "ne" => Some('≠'),
        "minus" => Some('−'),
        "deg" => Some('°'),
        "pi" => Some('π'),
        "radic" => Some('√'),
        "sup1" => Some('¹'),
        "sup2" => Some('²'),
        "sup3" => Some('³'),
        "frac12" => Some('½'),
        "frac14" => Some('¼'),
        "frac34" => Some('¾'),
        "middot" => Some('·'),
        "plusmn" => Some('±'),
        "infin" => Some('∞'),
        "hellip" => Some('…'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "lsquo" => Some('‘'),
        "rsquo" => Some('’'),
        "ldquo" => Some('“'),
        "rdquo" => Some('”'),
        "cent" => Some('¢'),
        "pound" => Some('£'),
        "euro" => Some('€'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn strip_math(text: &str) -> String {
    text.replace("\\(", "")
        .replace("\\)", "")
        .replace("\\[", "")
        .replace("\\]", "")
        .replace("$$", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_br_form() {
        assert_eq!(
            to_lines("one<br>two<BR/>three<br />four"),
            vec!["one", "two", "three", "four"]
        );
    }

    #[test]
    fn keeps_other_br_prefixed_tags_inline() {
        assert_eq!(to_lines("a <bridge>b</bridge>"), vec!["a b"]);
    }

    #[test]
    fn strips_tags() {
        assert_eq!(
            to_lines("<p>If <b>x</b> is <i>odd</i></p>"),
            vec!["If x is odd"]
        );
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            to_lines("3 &lt; x &amp;&amp; x &ge; 1&nbsp;&#65;&#x42;"),
            vec!["3 < x && x ≥ 1 AB"]
        );
    }

    #[test]
    fn decodes_math_and_typographic_entities() {
        assert_eq!(
            to_lines("x&sup2; + y&sup3; = &frac12; &middot; z &plusmn; 1&hellip;"),
            vec!["x² + y³ = ½ · z ± 1…"]
        );
    }

    #[test]
    fn leaves_unknown_entities_alone() {
        assert_eq!(to_lines("AT&T &bogus; &"), vec!["AT&T &bogus; &"]);
    }

    #[test]
    fn removes_mathjax_delimiters() {
        assert_eq!(
            to_lines(r"Solve \(x^2 = 4\) and $$y$$ \[z\]"),
            vec!["Solve x^2 = 4 and y z"]
        );
    }

    #[test]
    fn empty_input_is_one_empty_line() {
        assert_eq!(to_lines(""), vec![String::new()]);
    }
}
