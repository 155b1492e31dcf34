/*!
# HTMin: Attributes.
*/

use crate::{
	Handle,
	MinifyOptions,
	dom::node::{
		Attributes,
		NodeInner,
	},
	spec,
};
use html5ever::tendril::StrTendril;



/// # Optimize Attributes.
///
/// Strip scheme prefixes, drop redundant attributes, sort class names, and
/// finally sort the attributes themselves, as configured.
pub(crate) fn optimize(el: &Handle, opts: &MinifyOptions) {
	let NodeInner::Element { ref name, ref attrs } = el.inner else { return; };
	let tag: &str = name.local.as_ref();

	let mut attrs = attrs.borrow_mut();
	if attrs.is_empty() { return; }

	let new: Attributes = attrs.iter()
		.filter_map(|(key, value)| {
			let mut value: StrTendril = StrTendril::from(value);

			// Scheme.
			if
				opts.strip_http_prefix() &&
				matches!(key, "href" | "src" | "action") &&
				! attrs.get("rel").is_some_and(|v| v.trim().eq_ignore_ascii_case("external")) &&
				! attrs.get("target").is_some_and(|v| v.trim().eq_ignore_ascii_case("_blank")) &&
				let Some(v) = strip_scheme(&value, opts)
			{
				value = StrTendril::from(v);
			}

			// Removal.
			if can_drop(tag, key, &value, &attrs, opts) { return None; }

			// Classes.
			if opts.sort_class_names() && key == "class" && let Some(v) = sort_classes(&value) {
				value = StrTendril::from(v);
			}

			Some((key.to_owned(), value))
		})
		.collect();

	*attrs = new;
	if opts.sort_attributes() { attrs.sort(); }
}

/// # Can Drop?
///
/// Returns `true` if the attribute is redundant given its element and the
/// element's other attributes.
fn can_drop(tag: &str, key: &str, value: &str, all: &Attributes, opts: &MinifyOptions) -> bool {
	let is = |k: &str, v: &str| all.get(k).is_some_and(|a| a.trim().eq_ignore_ascii_case(v));
	let value_is = |v: &str| value.trim().eq_ignore_ascii_case(v);

	// Defaults.
	if opts.remove_default_attributes() && match (tag, key) {
		("script", "language") => value_is("javascript"),
		("form", "method") => value_is("get"),
		("input", "type") => value_is("text"),
		("area", "shape") => value_is("rect"),
		_ => false,
	} { return true; }

	match (tag, key) {
		// Deprecated charset.
		("script", "charset") if opts.remove_script_charset() && ! all.has("src") => true,

		// Deprecated anchor name.
		("a", "name") if opts.remove_anchor_name() && all.get("id") == Some(value) => true,

		// Deprecated stylesheet type.
		("link", "type") if
			opts.remove_stylesheet_type() &&
			value_is("text/css") &&
			is("rel", "stylesheet") => true,

		// Deprecated script type.
		("script", "type") if
			opts.remove_script_type() &&
			all.has("src") &&
			spec::is_script_mime(value) => true,

		// Empty input value.
		("input", "value") if
			opts.remove_empty_input_value() &&
			value.is_empty() &&
			is("type", "text") => true,

		// Empty whatever.
		_ =>
			opts.remove_empty_attributes() &&
			spec::is_droppable_when_empty(key) &&
			value.trim().is_empty(),
	}
}

/// # Strip Scheme.
///
/// Turn `http://foo.com` or `https://foo.com` into `//foo.com`, assuming the
/// domain is eligible.
fn strip_scheme(value: &str, opts: &MinifyOptions) -> Option<String> {
	let bytes = value.as_bytes();
	let len =
		if bytes.len() > 7 && bytes[..7].eq_ignore_ascii_case(b"http://") { 7 }
		else if bytes.len() > 8 && bytes[..8].eq_ignore_ascii_case(b"https://") { 8 }
		else { return None; };

	let rest = &value[len..];
	let host = rest.split(['/', '?', '#', ':', '\u{E000}'])
		.next()
		.map(|h| h.rsplit('@').next().unwrap_or(h))
		.filter(|h| ! h.is_empty())?;

	if opts.strip_http_for(host) { Some(format!("//{rest}")) }
	else { None }
}

/// # Sort Classes.
///
/// Deduplicate and sort the class names, returning the new value if it
/// changed.
fn sort_classes(value: &str) -> Option<String> {
	let mut classes: Vec<&str> = value.split_ascii_whitespace().collect();
	classes.sort_unstable();
	classes.dedup();
	let out = classes.join(" ");
	if out == value { None }
	else { Some(out) }
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		Document,
		SelectorCache,
	};

	/// # Optimize and Return Attributes.
	fn attrs(raw: &str, opts: &MinifyOptions) -> Vec<(String, String)> {
		let doc = Document::parse(raw);
		let cache = SelectorCache::default();
		let el = doc.find("body > *", &cache)
			.expect("Selector failed.")
			.into_iter()
			.next()
			.or_else(|| doc.find("head > *", &cache).ok().and_then(|v| v.into_iter().next()))
			.expect("Missing element.");

		optimize(&el, opts);
		el.attrs()
			.expect("Missing attributes.")
			.iter()
			.map(|(k, v)| (k.to_owned(), v.to_owned()))
			.collect()
	}

	/// # Attribute Names.
	fn keys(raw: &str, opts: &MinifyOptions) -> Vec<String> {
		attrs(raw, opts).into_iter().map(|(k, _)| k).collect()
	}

	#[test]
	fn t_drop() {
		let opts = MinifyOptions::default();
		for (raw, expected) in [
			(r#"<script charset="utf-8">x</script>"#, &[][..]),
			(r#"<script charset="utf-8" src="a.js"></script>"#, &["charset", "src"]),
			(r#"<a id="top" name="top">x</a>"#, &["id"]),
			(r#"<a id="top" name="bottom">x</a>"#, &["id", "name"]),
			(r#"<link rel="stylesheet" type="text/css" href="a.css">"#, &["href", "rel"]),
			(r#"<link rel="Stylesheet" type="TEXT/CSS" href="a.css">"#, &["href", "rel"]),
			(r#"<link rel="icon" type="text/css" href="a.css">"#, &["href", "rel", "type"]),
			(r#"<script type="text/javascript" src="a.js"></script>"#, &["src"]),
			(r#"<script type="text/javascript">x</script>"#, &["type"]),
			(r#"<script type="module" src="a.js"></script>"#, &["src", "type"]),
			(r#"<input type="text" value="">"#, &["type"]),
			(r#"<input type="text" value=" ">"#, &["type", "value"]),
			(r#"<input type="hidden" value="">"#, &["type", "value"]),
			(r#"<div class=" " id="" style="" title="" lang="" dir="" onclick="">x</div>"#, &[]),
			(r#"<img alt="" src="a.png">"#, &["alt", "src"]),
			// Defaults are opt-in.
			(r#"<form method="get">x</form>"#, &["method"]),
			(r#"<input type="text">"#, &["type"]),
		] {
			assert_eq!(keys(raw, &opts), expected, "{raw}");
		}

		let opts = opts.with_remove_default_attributes(true);
		for (raw, expected) in [
			(r#"<script language="JavaScript">x</script>"#, &[][..]),
			(r#"<form method="GET" action="/">x</form>"#, &["action"]),
			(r#"<form method="post">x</form>"#, &["method"]),
			(r#"<input type="text" name="q">"#, &["name"]),
		] {
			assert_eq!(keys(raw, &opts), expected, "{raw}");
		}

		assert!(can_drop("area", "shape", "RECT", &Attributes::default(), &opts));
		assert!(! can_drop("area", "shape", "circle", &Attributes::default(), &opts));
	}

	#[test]
	fn t_disabled() {
		let opts = MinifyOptions::default()
			.with_remove_script_charset(false)
			.with_remove_anchor_name(false)
			.with_remove_empty_attributes(false)
			.with_sort_attributes(false);

		for (raw, expected) in [
			(r#"<script charset="utf-8">x</script>"#, &["charset"][..]),
			(r#"<a name="top" id="top">x</a>"#, &["name", "id"]),
			(r#"<div title="" class="">x</div>"#, &["title", "class"]),
		] {
			assert_eq!(keys(raw, &opts), expected, "{raw}");
		}
	}

	#[test]
	fn t_classes() {
		let opts = MinifyOptions::default();
		assert_eq!(
			attrs(r#"<div class="b a  a c">x</div>"#, &opts),
			[(String::from("class"), String::from("a b c"))],
		);

		let opts = opts.with_sort_class_names(false);
		assert_eq!(
			attrs(r#"<div class="b a  a c">x</div>"#, &opts),
			[(String::from("class"), String::from("b a  a c"))],
		);
	}

	#[test]
	fn t_sort() {
		let opts = MinifyOptions::default();
		assert_eq!(
			keys(r#"<img width="1" src="a.png" alt="A" height="1">"#, &opts),
			["alt", "height", "src", "width"],
		);

		let opts = opts.with_sort_attributes(false);
		assert_eq!(
			keys(r#"<img width="1" src="a.png" alt="A" height="1">"#, &opts),
			["width", "src", "alt", "height"],
		);
	}

	#[test]
	fn t_strip_scheme() {
		let opts = MinifyOptions::default().with_strip_http_prefix(true);
		for (raw, expected) in [
			(r#"<a href="http://example.com/">x</a>"#, "//example.com/"),
			(r#"<a href="HTTPS://example.com/a?b">x</a>"#, "//example.com/a?b"),
			(r#"<a href="http://example.com/" rel="external">x</a>"#, "http://example.com/"),
			(r#"<a href="http://example.com/" target="_blank">x</a>"#, "http://example.com/"),
			(r#"<a href="/local">x</a>"#, "/local"),
			(r#"<a href="http://">x</a>"#, "http://"),
			(r#"<a href="mailto:a@b.c">x</a>"#, "mailto:a@b.c"),
		] {
			let got = attrs(raw, &opts).into_iter()
				.find_map(|(k, v)| (k == "href").then_some(v))
				.expect("Missing href.");
			assert_eq!(got, expected, "{raw}");
		}

		// Other attributes are ignored.
		let got = attrs(r#"<a title="http://example.com/" href="/">x</a>"#, &opts);
		assert!(got.contains(&(String::from("title"), String::from("http://example.com/"))));

		// Domain restrictions.
		let opts = opts.with_http_domains(["example.com"]);
		assert_eq!(
			strip_scheme("http://www.example.com/x", &opts).as_deref(),
			Some("//www.example.com/x"),
		);
		assert_eq!(
			strip_scheme("https://user@example.com:8080/x", &opts).as_deref(),
			Some("//user@example.com:8080/x"),
		);
		assert!(strip_scheme("http://example.org/x", &opts).is_none());

		// Off by default.
		let opts = MinifyOptions::default();
		assert_eq!(
			keys(r#"<a href="http://example.com/">x</a>"#, &opts),
			["href"],
		);
		assert_eq!(
			attrs(r#"<a href="http://example.com/">x</a>"#, &opts)[0].1,
			"http://example.com/",
		);
	}
}
