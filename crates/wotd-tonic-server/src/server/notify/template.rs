//! HTML template for the word of the day mail.
//!
//! Placeholders are written `{{ word }}` and `{{ definition }}` (inner
//! whitespace optional). Substituted values are HTML-escaped. Unknown
//! placeholders are left untouched.

use super::{NotifyError, WordOfTheDay};
use std::{borrow::Cow, path::Path};

const EMBEDDED: &str = include_str!("../../../templates/word_of_the_day.html");

#[derive(Clone, Debug)]
pub struct Template {
    source: Cow<'static, str>,
}

impl Template {
    /// The template compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            source: Cow::Borrowed(EMBEDDED),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, NotifyError> {
        let source = std::fs::read_to_string(path).map_err(|source| NotifyError::Template {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            source: Cow::Owned(source),
        })
    }

    pub fn render(&self, data: &WordOfTheDay) -> String {
        let mut out = String::with_capacity(self.source.len() + data.word.len());
        let mut rest = self.source.as_ref();

        while let Some(open) = rest.find("{{") {
            let Some(close) = rest[open..].find("}}") else {
                break;
            };
            let close = open + close;
            out.push_str(&rest[..open]);
            match rest[open + 2..close].trim() {
                "word" => push_escaped(&mut out, &data.word),
                "definition" => push_escaped(&mut out, &data.definition),
                _ => out.push_str(&rest[open..close + 2]),
            }
            rest = &rest[close + 2..];
        }
        out.push_str(rest);
        out
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(source: &'static str) -> Template {
        Template {
            source: Cow::Borrowed(source),
        }
    }

    fn data(word: &str, definition: &str) -> WordOfTheDay {
        WordOfTheDay {
            word: word.into(),
            definition: definition.into(),
        }
    }

    #[test]
    fn substitutes_placeholders() {
        let rendered = template("<h1>{{ word }}</h1><p>{{definition}}</p>")
            .render(&data("aurora", "a natural light display"));
        assert_eq!(rendered, "<h1>aurora</h1><p>a natural light display</p>");
    }

    #[test]
    fn escapes_values() {
        let rendered = template("{{ word }}|{{ definition }}")
            .render(&data("<b>&</b>", "it's \"quoted\""));
        assert_eq!(rendered, "&lt;b&gt;&amp;&lt;/b&gt;|it&#39;s &#34;quoted&#34;");
    }

    #[test]
    fn values_are_not_reinterpreted() {
        let rendered = template("{{ word }} {{ definition }}").render(&data("{{ definition }}", "x"));
        assert_eq!(rendered, "{{ definition }} x");
    }

    #[test]
    fn leaves_unknown_and_unterminated_placeholders() {
        let rendered = template("{{ other }} {{ word }} {{ broken").render(&data("lexicon", ""));
        assert_eq!(rendered, "{{ other }} lexicon {{ broken");
    }

    #[test]
    fn embedded_template_renders_both_fields() {
        let rendered = Template::embedded().render(&data("lexicon", "the vocabulary of a language"));
        assert!(rendered.contains("lexicon"));
        assert!(rendered.contains("the vocabulary of a language"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Template::from_file(Path::new("/definitely/not/here.html")).unwrap_err();
        assert!(matches!(err, NotifyError::Template { .. }));
    }
}
