/*!
# HTMin: Minification.
*/

use crate::{
	attribute,
	Document,
	entity,
	HtminError,
	MinifyOptions,
	protect::{
		self,
		PLACEHOLDER,
		Registry,
	},
	SelectorCache,
	spec::VOID_TAGS,
	whitespace,
};
use regex::{
	Captures,
	Regex,
};
use std::{
	borrow::Cow,
	sync::LazyLock,
};



/// # Opening Tags.
///
/// This captures the tag name, the (quote-aware) attribute soup, and a
/// trailing slash, if any.
static RE_TAG: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r#"<([^/\s<>!]+)(?:\s+((?:"[^"]*"|'[^']*'|[^<>"'])*?)\s*|\s*)(/?)>"#)
		.expect("Invalid regex.")
);

/// # Attribute Within the Soup.
static RE_ATTR: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r#"([^\s=]+)(=(?:"[^"]*"|'[^']*'|\S*))?(?:\s+|$)"#).expect("Invalid regex.")
);

/// # Void Elements With Closing Tags.
static RE_VOID_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
	let tags = VOID_TAGS.join("|");
	Regex::new(&format!(r"<({tags})(\s[^>]*)></({tags})>")).expect("Invalid regex.")
});

/// # Newlines Around the Outer Tags.
const NEWLINES: [(&str, &str); 8] = [
	("html>\n", "html>"),
	("\n<html", "<html"),
	("html/>\n", "html/>"),
	("\n</html", "</html"),
	("head>\n", "head>"),
	("\n<head", "<head"),
	("head/>\n", "head/>"),
	("\n</head", "</head"),
];



#[derive(Debug, Default)]
/// # Minifier.
///
/// A configured minifier. Each instance keeps a cache of the selectors it
/// compiles, so it is worth holding onto one and reusing it.
///
/// Instances are `Send` and `Sync`; a single minifier can serve any number of
/// threads at once.
///
/// ## Examples
///
/// ```
/// use htmin::{Minifier, MinifyOptions};
///
/// let minifier = Minifier::new(MinifyOptions::default());
/// assert_eq!(
///     minifier.minify("<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>"),
///     "<ul> <li>One <li>Two </ul>",
/// );
/// ```
pub struct Minifier {
	/// # Options.
	options: MinifyOptions,

	/// # Selector Cache.
	selectors: SelectorCache,
}

impl From<MinifyOptions> for Minifier {
	#[inline]
	fn from(src: MinifyOptions) -> Self { Self::new(src) }
}

impl Minifier {
	#[must_use]
	/// # New.
	pub fn new(options: MinifyOptions) -> Self {
		Self {
			options,
			selectors: SelectorCache::default(),
		}
	}

	#[must_use]
	/// # Options.
	pub const fn options(&self) -> &MinifyOptions { &self.options }

	#[must_use]
	/// # Minify.
	///
	/// Minify the HTML document or fragment, leaving numeric character
	/// references as they are.
	///
	/// This never fails. If minification would not make the source any
	/// smaller, the (trimmed) source is returned instead.
	pub fn minify(&self, src: &str) -> String { self.minify_with(src, false) }

	#[must_use]
	/// # Minify With Options.
	///
	/// Same as `Minifier::minify`, but numeric character references like
	/// `&#233;` can optionally be decoded into the characters they represent
	/// (where it is safe to do so).
	pub fn minify_with(&self, src: &str, decode_numeric: bool) -> String {
		let src = src.trim();
		if src.is_empty() { return String::new(); }

		let mut registry = Registry::default();

		// The DOM pass.
		let dom = self.options.optimize_dom() && ! skip_dom(src);
		let (out, escaped) =
			if dom {
				match self.minify_dom(src, &mut registry, decode_numeric) {
					Ok(out) => (Cow::Owned(out), true),
					Err(_) => {
						registry = Registry::default();
						(Cow::Borrowed(src), false)
					},
				}
			}
			else { (Cow::Borrowed(src), false) };

		// Tidy up the space between attributes.
		let mut out = RE_TAG.replace_all(&out, |caps: &Captures| {
			let attrs = caps.get(2).map_or(Cow::Borrowed(""), |m| RE_ATTR.replace_all(m.as_str(), " $1$2"));
			format!("<{}{}{}>", &caps[1], attrs, &caps[3])
		}).into_owned();

		// Tidy up the space between tags.
		if self.options.remove_spaces_between_tags() && out.contains("> <") {
			out = out.replace("> <", "><");
		}

		// Put everything back.
		if registry.len() != 0 { out = registry.restore(&out).into_owned(); }
		if escaped { out = entity::unescape(&out).into_owned(); }

		// Final cleanup.
		cleanup(&mut out);

		// Only keep it if it is smaller.
		if out.len() < src.len() { out }
		else { src.to_owned() }
	}

	/// # Minify Source.
	///
	/// Load the source (a local file path or an `http(s)://` URL) and minify
	/// it.
	///
	/// ## Errors
	///
	/// This will return an error if the source cannot be loaded.
	pub fn minify_source(&self, src: &str) -> Result<String, HtminError> {
		crate::load(src).map(|raw| self.minify(&raw))
	}

	/// # DOM Pass.
	///
	/// Parse, clean, and serialize the source. The result is still escaped,
	/// and protected content is still swapped out.
	///
	/// ## Errors
	///
	/// This will return an error if any of the internal selectors fail to
	/// compile.
	fn minify_dom(&self, src: &str, registry: &mut Registry, decode_numeric: bool)
	-> Result<String, HtminError> {
		let opts = &self.options;
		let cache = &self.selectors;

		let escaped = entity::escape(src);
		let doc = Document::parse(&escaped);

		protect::protect(&doc, registry, cache)?;
		if opts.remove_comments() { protect::remove_comments(&doc, cache)?; }
		if opts.sum_up_whitespace() { whitespace::sum_up(&doc, cache)?; }

		let attrs = opts.optimize_attributes();
		let trim = opts.remove_whitespace_around_tags();
		if attrs || trim {
			for el in doc.find("*", cache)? {
				if attrs { attribute::optimize(&el, opts); }
				if trim { whitespace::trim_around(&el); }
			}
		}

		let out = doc.serialize(opts);
		if decode_numeric && let Cow::Owned(s) = entity::decode_numeric(&out) { Ok(s) }
		else { Ok(out) }
	}
}



#[must_use]
/// # Skip the DOM Pass?
///
/// Table fragments can't be parsed in isolation without the tree builder
/// tossing their tags, and anything already containing our placeholder
/// markup or sentinel characters would confuse the restoration.
fn skip_dom(src: &str) -> bool {
	if src.contains(PLACEHOLDER) || src.contains(entity::OPEN) { return true; }

	let Some(rest) = src.strip_prefix('<') else { return false; };
	let end = rest.find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
		.unwrap_or(rest.len());
	let tag = &rest[..end];

	["caption", "col", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr"]
		.iter()
		.any(|t| t.eq_ignore_ascii_case(tag))
}

/// # Cleanup.
///
/// Strip newlines hugging the `<html>`/`<head>` tags, redundant void-element
/// slashes, and void-element closing tags.
fn cleanup(out: &mut String) {
	for (from, to) in NEWLINES {
		if out.contains(from) { *out = out.replace(from, to); }
	}

	if out.contains("/>") {
		for tag in VOID_TAGS {
			for from in [format!("<{tag}/>"), format!("<{tag} />")] {
				if out.contains(&from) { *out = out.replace(&from, &format!("<{tag}>")); }
			}
		}
	}

	if out.contains("></") {
		*out = RE_VOID_CLOSE.replace_all(out.as_str(), |caps: &Captures|
			if caps[1] == caps[3] { format!("<{}{}>", &caps[1], &caps[2]) }
			else { caps[0].to_owned() }
		).into_owned();
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	/// # Test Document.
	const DOCUMENT: &str = include_str!("../skel/test-assets/document.html");

	/// # Test Fragment.
	const FRAGMENT: &str = include_str!("../skel/test-assets/fragment.html");

	#[test]
	fn t_send_sync() {
		fn is_send_sync<T: Send + Sync>() {}
		is_send_sync::<Minifier>();
	}

	#[test]
	fn t_minify() {
		let minifier = Minifier::default();
		for (raw, expected) in [
			("", ""),
			("   \n\t ", ""),
			(r#"<div class="b a a">x</div>"#, r#"<div class="a b">x</div>"#),
			(r#"<input type="text" value="">"#, "<input type=text>"),
			("<li>a</li><li>b</li>", "<li>a<li>b"),
			(r#"<div disabled="disabled">x</div>"#, "<div disabled>x</div>"),
			("<p>Hello   <b>World</b>  </p>", "<p>Hello <b>World</b> "),
			("<br/><br />", "<br><br>"),
			(r#"<a  href="/"   title="A   B" >x</a>"#, r#"<a href=/ title="A   B">x</a>"#),
			("<p>Ben &amp; Jerry&#39;s | 100%</p>\n", "<p>Ben &amp; Jerry&#39;s | 100%"),
			("<p>caf&#233;   au lait</p>", "<p>caf&#233; au lait"),
		] {
			assert_eq!(minifier.minify(raw), expected, "{raw}");
		}
	}

	#[test]
	fn t_minify_with() {
		let minifier = Minifier::default();
		assert_eq!(minifier.minify_with("<p>caf&#233;   au lait</p>", true), "<p>café au lait");
		assert_eq!(minifier.minify_with("<p>a&#60;b   c</p>", true), "<p>a&#60;b c");

		// Characters that would need quoting stay encoded in unquoted values.
		for (raw, expected) in [
			(r#"<div title="a&#61;b">x</div>"#, "<div title=a&#61;b>x</div>"),
			(r#"<div title="a&#96;b">x</div>"#, "<div title=a&#96;b>x</div>"),
			(r#"<div title="caf&#233;">x</div>"#, "<div title=café>x</div>"),
		] {
			let out = minifier.minify_with(raw, true);
			assert_eq!(out, expected, "{raw}");
			assert_eq!(minifier.minify_with(&out, true), out, "{raw}");
		}
	}

	#[test]
	fn t_protected() {
		let minifier = Minifier::default();

		// Conditional comments are untouchable.
		let raw = "<!--[if IE]>x<![endif]-->";
		assert_eq!(minifier.minify(raw), raw);

		let raw = "<div>\n  <!--[if lt IE 9]><p>Old  browser</p><![endif]-->\n  <!-- bye -->\n</div>";
		assert_eq!(minifier.minify(raw), "<div> <!--[if lt IE 9]><p>Old  browser</p><![endif]--> </div>");

		// Scripts and styles too.
		let script = "<script>\n\tif (a < b && c) { x += '  %  '; }\n</script>";
		let style = "<style>\n  p  >  a { color: red; }\n</style>";
		let raw = format!("<div>\n\n  {script}\n\n  {style}\n\n</div>");
		let out = minifier.minify(&raw);
		assert!(out.contains(script), "{out}");
		assert!(out.contains(style), "{out}");
		assert!(out.len() < raw.len());

		// Placeholder lookalikes skip the DOM entirely.
		let raw = r#"<p>  <htmin--saved-content data-htmin--saved-content="0"></htmin--saved-content></p>"#;
		assert_eq!(minifier.minify(raw), raw);

		// As do private-use characters that look like our own escapes.
		assert!(skip_dom("<p>\u{e000}amp\u{e001}   \u{e000}lbrace\u{e001}</p>"));
		assert_eq!(minifier.minify("<i>\u{e000}pipe\u{e001}</i> icon"), "<i>\u{e000}pipe\u{e001}</i> icon");
	}

	#[test]
	fn t_comment_text() {
		let minifier = Minifier::default();
		for (raw, expected) in [
			("<p>Hello <!-- name --> world</p>", "<p>Hello world"),
			("<div>a  <!-- x -->  b</div>", "<div>a b</div>"),
			("<p>one<!-- a --><!-- b -->two</p>", "<p>onetwo"),
			("<p>a <<!-- x -->b>c</p>", "<p>a &lt;b>c"),
			("<p>x <!-- y -->/p> z</p>", "<p>x /p> z"),
		] {
			assert_eq!(minifier.minify(raw), expected, "{raw}");
		}

		// Joining the halves must not conjure up a real element.
		let out = minifier.minify("<p>a <<!-- x -->b>c</p>");
		let doc = Document::parse(&out);
		assert!(doc.find("b", &SelectorCache::default()).expect("Selector failed.").is_empty());
	}

	#[test]
	fn t_idempotent() {
		let minifier = Minifier::default();
		for raw in [
			"<p>Hello <!-- name --> world</p>",
			"<div>a  <!-- x -->  b</div>",
			"<p>a <<!-- x -->b>c</p>",
			"<p>a < b  and  c</p>",
			"<ul>\n  <li>One</li>\n  <!-- two -->\n  <li>Three</li>\n</ul>",
			"<div>\n  <!--[if lt IE 9]><p>Old</p><![endif]-->\n  <!-- bye -->\n</div>",
			"<p>caf&#233;   &amp;   100%</p>",
			"<table><tr><td>x</td></tr></table>",
			"<pre>  a  <!-- b -->  c  </pre>",
			DOCUMENT,
			FRAGMENT,
		] {
			let once = minifier.minify(raw);
			assert_eq!(minifier.minify(&once), once, "{raw}");
		}

		// Same deal with numeric decoding.
		for raw in [r#"<div title="a&#61;b">caf&#233;  x</div>"#, "<p>a&#60;b   c</p>"] {
			let once = minifier.minify_with(raw, true);
			assert_eq!(minifier.minify_with(&once, true), once, "{raw}");
		}
	}

	#[test]
	fn t_table_fragment() {
		let minifier = Minifier::default();
		for raw in [
			"<tr><td>a</td></tr>",
			"<TD>a</TD>",
			"<tbody><tr><td>a</td></tr></tbody>",
		] {
			assert!(skip_dom(raw), "{raw}");
			assert_eq!(minifier.minify(raw), raw);
		}

		assert!(! skip_dom("<track src=a.vtt>"));
		assert!(! skip_dom("<table><tr><td>a</td></tr></table>"));
		assert!(! skip_dom("text"));

		// The attribute pass still runs.
		assert_eq!(minifier.minify(r#"<tr  class="x"><td>a</td></tr>"#), r#"<tr class="x"><td>a</td></tr>"#);
	}

	#[test]
	fn t_options() {
		let raw = "<div>\n  <p>A</p>\n  <!-- note -->\n  <p>B</p>\n</div>";

		let minifier = Minifier::default();
		assert_eq!(minifier.minify(raw), "<div> <p>A <p>B </div>");

		let minifier = Minifier::new(MinifyOptions::default().with_remove_comments(false));
		assert_eq!(minifier.minify(raw), "<div> <p>A <!-- note --> <p>B </div>");

		let minifier = Minifier::new(MinifyOptions::default().with_omit_end_tags(false));
		assert_eq!(minifier.minify(raw), "<div> <p>A</p> <p>B</p> </div>");

		let minifier = Minifier::new(
			MinifyOptions::default()
				.with_omit_end_tags(false)
				.with_remove_whitespace_around_tags(true)
		);
		assert_eq!(minifier.minify(raw), "<div><p>A</p><p>B</p></div>");

		let minifier = Minifier::new(
			MinifyOptions::default()
				.with_omit_end_tags(false)
				.with_remove_spaces_between_tags(true)
		);
		assert_eq!(minifier.minify(raw), "<div><p>A</p><p>B</p></div>");

		// No DOM, just the regex passes.
		let minifier = Minifier::new(MinifyOptions::default().with_optimize_dom(false));
		assert_eq!(
			minifier.minify(r#"<div   id="a"    class="b" >x</div>"#),
			r#"<div id="a" class="b">x</div>"#,
		);
	}

	#[test]
	fn t_strip_http() {
		let minifier = Minifier::new(MinifyOptions::default().with_strip_http_prefix(true));
		assert_eq!(
			minifier.minify(r#"<a href="https://example.com/">x</a>"#),
			"<a href=//example.com/>x</a>",
		);

		let minifier = Minifier::new(
			MinifyOptions::default()
				.with_strip_http_prefix(true)
				.with_http_domains(["example.org"])
		);
		assert_eq!(
			minifier.minify(r#"<a href="https://example.com/">x</a>"#),
			"<a href=https://example.com/>x</a>",
		);
	}

	#[test]
	fn t_cleanup() {
		for (raw, expected) in [
			("<html>\n<head>\n</head>", "<html><head></head>"),
			("<br/><hr />", "<br><hr>"),
			(r#"<img src="a"></img>"#, r#"<img src="a">"#),
			(r#"<img src="a"></br>"#, r#"<img src="a"></br>"#),
			("<div/>", "<div/>"),
		] {
			let mut out = String::from(raw);
			cleanup(&mut out);
			assert_eq!(out, expected, "{raw}");
		}
	}

	#[test]
	fn t_document() {
		let minifier = Minifier::default();
		let out = minifier.minify(DOCUMENT);
		assert_eq!(
			out,
			"<!DOCTYPE html><html lang=en><head><meta charset=utf-8><title>Test Page</title><link href=style.css rel=stylesheet><body><ul class=\"main nav\"> <li><a href=/>Home</a> <li><a href=/about>About</a> </ul> <p>Hello &amp; welcome!</p> <script type=text/javascript>\n\t\tvar x = 1 + 2;\n\t</script>",
		);

		// Idempotent.
		assert_eq!(minifier.minify(&out), out);
	}

	#[test]
	fn t_fragment() {
		let minifier = Minifier::default();
		let out = minifier.minify(FRAGMENT);
		assert!(out.len() < FRAGMENT.trim().len());
		assert!(! out.contains("<html"));
		assert!(! out.contains("<body"));
		assert!(! out.contains("<!-- "));
		assert!(out.contains("<pre>  keep\n    this  </pre>"), "{out}");
		assert!(out.contains("<textarea>  and\n  this</textarea>"), "{out}");
		assert!(out.contains("&copy; 2024 &mdash; Example"), "{out}");

		// Idempotent.
		assert_eq!(minifier.minify(&out), out);
	}

	#[test]
	fn t_never_grows() {
		let minifier = Minifier::default();
		for raw in [
			"<table><tr><td>x</td></tr></table>",
			"x",
			"<b>x</b>",
			"<html><head></head><body></body></html>",
			"<svg><rect/></svg>",
			"<p>&nbsp;</p>",
			DOCUMENT,
			FRAGMENT,
		] {
			assert!(minifier.minify(raw).len() <= raw.trim().len(), "{raw}");
		}
	}
}
