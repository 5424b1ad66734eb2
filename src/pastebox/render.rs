//! Content renderer: turns one attachment into an HTML fragment based on its
//! render mode. Pure functions, no storage access.

use crate::model::{FileEntry, RenderMode};
use pulldown_cmark::{html, Options, Parser};

const BINARY_SAMPLE: usize = 8192;
const BINARY_THRESHOLD: f64 = 0.3;

pub const MISSING_FRAGMENT: &str = r#"<p class="error">File not found</p>"#;

/// Heuristic, not a content-type authority. Any NUL byte means binary; otherwise
/// more than 30% control bytes in the first 8 KiB. Empty input is text.
pub fn is_binary(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    if bytes.contains(&0) {
        return true;
    }
    let sample = &bytes[..bytes.len().min(BINARY_SAMPLE)];
    let control = sample
        .iter()
        .filter(|&&b| b < 9 || (b > 13 && b < 32) || b == 127)
        .count();
    control as f64 / sample.len() as f64 > BINARY_THRESHOLD
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Relative link to the attachment's byte-serving endpoint.
pub fn file_url(name: &str) -> String {
    format!("./files/{}", urlencoding::encode(name))
}

pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::empty());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn preformatted(text: &str) -> String {
    format!("<pre>{}</pre>", escape_html(text))
}

/// `content` is `None` when the attachment bytes are unavailable.
pub fn render_file(name: &str, content: Option<&str>, entry: &FileEntry) -> String {
    let Some(content) = content else {
        return MISSING_FRAGMENT.to_string();
    };

    match &entry.render {
        RenderMode::Highlighted => {
            let lang = if entry.file_type.is_empty() {
                "text"
            } else {
                entry.file_type.as_str()
            };
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
        }
        RenderMode::Image => format!(
            r#"<img src="{}" alt="{}" />"#,
            escape_html(&file_url(name)),
            escape_html(name)
        ),
        RenderMode::File => format!(
            r#"<div class="file-download"><a href="{}" download><span class="icon">📁</span> Download {}</a></div>"#,
            escape_html(&file_url(name)),
            escape_html(name)
        ),
        RenderMode::FileLink => format!(
            r#"<div class="file-link"><a href="{}" target="_blank" rel="noopener"><span class="icon">📎</span> {}</a></div>"#,
            escape_html(&file_url(name)),
            escape_html(name)
        ),
        RenderMode::Link => {
            let mut out = String::from(r#"<ul class="link-list">"#);
            for link in content.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
                let link = escape_html(link);
                out.push_str(&format!(
                    r#"<li><a href="{link}" target="_blank" rel="noopener">{link}</a></li>"#
                ));
            }
            out.push_str("</ul>");
            out
        }
        RenderMode::Rendered if entry.file_type == "markdown" => render_markdown(content),
        RenderMode::Plain | RenderMode::Rendered | RenderMode::Other(_) => preformatted(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(render: RenderMode, file_type: &str) -> FileEntry {
        FileEntry::new(render, file_type)
    }

    #[test]
    fn binary_heuristic() {
        assert!(is_binary(&[0u8; 100]));
        let sentence = b"The quick brown fox jumps over the lazy dog while the cat sleeps on the warm mat nearby today ok.";
        assert!(!is_binary(sentence));
        assert!(!is_binary(b""));
        assert!(!is_binary(b"tabs\tand\nnewlines\r\n"));
        assert!(is_binary(&[1u8, 2, 3, b'a']));
    }

    #[test]
    fn markdown_only_when_rendered() {
        let rendered = render_file("a.md", Some("# Hi"), &entry(RenderMode::Rendered, "markdown"));
        assert!(rendered.contains("<h1>Hi</h1>"));

        let plain = render_file("a.md", Some("# Hi"), &entry(RenderMode::Plain, "markdown"));
        assert_eq!(plain, "<pre># Hi</pre>");

        let not_md = render_file("a.md", Some("# Hi"), &entry(RenderMode::Rendered, "text"));
        assert_eq!(not_md, "<pre># Hi</pre>");
    }

    #[test]
    fn plain_and_highlighted_escape() {
        let plain = render_file("x", Some("<b>&</b>"), &entry(RenderMode::Plain, "text"));
        assert_eq!(plain, "<pre>&lt;b&gt;&amp;&lt;/b&gt;</pre>");

        let code = render_file("x.rs", Some("fn main() {}"), &entry(RenderMode::Highlighted, "rust"));
        assert_eq!(
            code,
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#
        );

        let untyped = render_file("x", Some("a"), &entry(RenderMode::Highlighted, ""));
        assert!(untyped.contains("language-text"));
    }

    #[test]
    fn attachment_modes_link_to_files() {
        let img = render_file("my pic.png", Some(""), &entry(RenderMode::Image, "image"));
        assert_eq!(img, r#"<img src="./files/my%20pic.png" alt="my pic.png" />"#);

        let dl = render_file("a.zip", Some(""), &entry(RenderMode::File, "file"));
        assert!(dl.contains(r#"class="file-download""#));
        assert!(dl.contains(r#"href="./files/a.zip" download"#));
        assert!(dl.contains("Download a.zip"));

        let ext = render_file("a.pdf", Some(""), &entry(RenderMode::FileLink, "file-link"));
        assert!(ext.contains(r#"class="file-link""#));
        assert!(ext.contains(r#"target="_blank" rel="noopener""#));
    }

    #[test]
    fn link_list_drops_blank_lines() {
        let html = render_file(
            "links",
            Some("https://a.example\n\n   \n  https://b.example  \n"),
            &entry(RenderMode::Link, "link"),
        );
        assert_eq!(
            html,
            concat!(
                r#"<ul class="link-list">"#,
                r#"<li><a href="https://a.example" target="_blank" rel="noopener">https://a.example</a></li>"#,
                r#"<li><a href="https://b.example" target="_blank" rel="noopener">https://b.example</a></li>"#,
                "</ul>"
            )
        );
    }

    #[test]
    fn missing_and_unknown() {
        assert_eq!(
            render_file("x", None, &entry(RenderMode::Plain, "text")),
            MISSING_FRAGMENT
        );
        let other = render_file("x", Some("a<b"), &entry(RenderMode::from("sparkly"), "text"));
        assert_eq!(other, "<pre>a&lt;b</pre>");
    }
}
