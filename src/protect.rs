/*!
# HTMin: Content Protection.

Script and style bodies, along with conditional comments, are swapped out for
opaque placeholders before any other work is done, and restored verbatim at
the very end.
*/

use crate::{
	Attributes,
	Document,
	dom::node::NodeInner,
	Handle,
	HtminError,
	Node,
	SelectorCache,
};
use regex::{
	Captures,
	Regex,
};
use std::{
	borrow::Cow,
	sync::LazyLock,
};



/// # Placeholder Tag/Attribute Name.
pub(crate) const PLACEHOLDER: &str = "htmin--saved-content";

/// # Placeholder Restoration.
static RE_RESTORE: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r#"<htmin--saved-content data-htmin--saved-content=(?:"(\d*)"|(\d+))></htmin--saved-content>"#)
		.expect("Invalid regex.")
);

/// # Conditional Comment (Opening).
static RE_IF: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r"^\[if [^\]]+\]").expect("Invalid regex.")
);



#[derive(Debug, Default)]
/// # Protected Content Registry.
///
/// This holds the original text for each placeholder, indexed by ID. A new
/// registry is used for each minification.
pub(crate) struct Registry(Vec<String>);

impl Registry {
	/// # Save.
	///
	/// Store the content, returning the placeholder markup to use in its
	/// place.
	pub(crate) fn save(&mut self, raw: String) -> String {
		let id = self.save_id(raw);
		format!(r#"<{PLACEHOLDER} data-{PLACEHOLDER}="{id}"></{PLACEHOLDER}>"#)
	}

	/// # Save (Element).
	///
	/// Store the content, returning a placeholder element to use in its
	/// place. Unlike the markup returned by `Registry::save`, elements are
	/// serialized as-are rather than as text.
	pub(crate) fn save_element(&mut self, raw: String) -> Handle {
		let id = self.save_id(raw);
		let mut attrs = Attributes::default();
		attrs.set(&format!("data-{PLACEHOLDER}"), id.to_string());
		Node::new_element(PLACEHOLDER, attrs)
	}

	/// # Save (ID).
	fn save_id(&mut self, raw: String) -> usize {
		let id = self.0.len();
		self.0.push(raw);
		id
	}

	#[must_use]
	/// # Length.
	pub(crate) fn len(&self) -> usize { self.0.len() }

	#[must_use]
	/// # Restore.
	///
	/// Replace every placeholder in `src` with the content it stands for.
	/// Unknown IDs are replaced with nothing.
	pub(crate) fn restore<'a>(&self, src: &'a str) -> Cow<'a, str> {
		if self.0.is_empty() && ! src.contains(PLACEHOLDER) { return Cow::Borrowed(src); }

		RE_RESTORE.replace_all(src, |caps: &Captures| {
			caps.get(1).or_else(|| caps.get(2))
				.and_then(|m| m.as_str().parse::<usize>().ok())
				.and_then(|id| self.0.get(id))
				.map_or_else(String::new, String::clone)
		})
	}
}



#[must_use]
/// # Is Conditional Comment?
pub(crate) fn is_conditional(comment: &str) -> bool {
	RE_IF.is_match(comment) || comment.ends_with("[endif]")
}

/// # Protect.
///
/// Swap script/style contents and conditional comments for placeholders.
///
/// Scripts with a `src` attribute are left alone; their bodies are ignored
/// by browsers anyway.
///
/// ## Errors
///
/// This will return an error if the internal selectors cannot be compiled.
pub(crate) fn protect(doc: &Document, registry: &mut Registry, cache: &SelectorCache)
-> Result<(), HtminError> {
	for el in doc.find("script, style", cache)? {
		if el.attrs().is_some_and(|a| a.has("src")) { continue; }

		let raw = el.text_content();
		if raw.is_empty() { continue; }

		el.replace_children(vec![Node::new_text(registry.save(raw))]);
	}

	for comment in doc.find("comment", cache)? {
		let raw = match comment.inner {
			NodeInner::Comment { ref contents } if is_conditional(contents) =>
				// Downlevel-revealed markers were parsed from `<![if …]>` and
				// `<![endif]>`, not `<!--…-->`.
				if is_downlevel_marker(contents) { format!("<!{contents}>") }
				else { format!("<!--{contents}-->") },
			_ => continue,
		};

		comment.replace_with(registry.save_element(raw));
	}

	Ok(())
}

#[must_use]
/// # Downlevel-Revealed Marker?
///
/// Returns `true` if the comment is nothing but `[if …]` or `[endif]`.
fn is_downlevel_marker(contents: &str) -> bool {
	contents == "[endif]" ||
	RE_IF.find(contents).is_some_and(|m| m.end() == contents.len())
}

/// # Remove Comments.
///
/// Drop all ordinary comments. (Anything containing a `[` is left alone
/// just in case.)
///
/// ## Errors
///
/// This will return an error if the internal selectors cannot be compiled.
pub(crate) fn remove_comments(doc: &Document, cache: &SelectorCache)
-> Result<(), HtminError> {
	let mut removed = false;
	for comment in doc.find("comment", cache)? {
		if
			let NodeInner::Comment { ref contents } = comment.inner &&
			! contents.contains('[')
		{
			comment.detach();
			removed = true;
		}
	}

	// The text on either side of a comment is now adjacent.
	if removed { doc.root().normalize(); }

	Ok(())
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::MinifyOptions;

	#[test]
	fn t_registry() {
		let mut reg = Registry::default();
		let a = reg.save(String::from("alert(1);"));
		let b = reg.save(String::from("<!--[if IE]>x<![endif]-->"));
		assert_eq!(reg.len(), 2);
		assert_ne!(a, b);

		let src = format!("<script>{a}</script>{b}");
		assert_eq!(reg.restore(&src), "<script>alert(1);</script><!--[if IE]>x<![endif]-->");

		// Unquoted IDs work too.
		let src = r#"<b><htmin--saved-content data-htmin--saved-content=1></htmin--saved-content></b>"#;
		assert_eq!(reg.restore(src), "<b><!--[if IE]>x<![endif]--></b>");

		// Unknown IDs vanish.
		let src = r#"<b><htmin--saved-content data-htmin--saved-content="99"></htmin--saved-content></b>"#;
		assert_eq!(reg.restore(src), "<b></b>");

		// Nothing to do.
		assert!(matches!(Registry::default().restore("<b></b>"), Cow::Borrowed(_)));
	}

	#[test]
	fn t_conditional() {
		for (raw, expected) in [
			("[if IE]>x<![endif]", true),
			("[if lt IE 9]><p>Old</p><![endif]", true),
			("[if !IE]", true),
			("<![endif]", true),
			("[endif]", true),
			(" [if IE]", false),
			("[if]", false),
			("regular comment", false),
		] {
			assert_eq!(is_conditional(raw), expected, "{raw}");
		}

		assert!(is_downlevel_marker("[if !IE]"));
		assert!(is_downlevel_marker("[endif]"));
		assert!(! is_downlevel_marker("[if IE]>x<![endif]"));
	}

	#[test]
	fn t_protect() {
		let doc = Document::parse(
			"<script>if (a < b) { x(); }</script>\
			<script src=\"x.js\"></script>\
			<style>p  >  a { color: red; }</style>\
			<!--[if IE]><p>IE</p><![endif]-->\
			<!-- plain -->\
			<p>Text</p>"
		);
		let cache = SelectorCache::default();
		let mut reg = Registry::default();
		protect(&doc, &mut reg, &cache).expect("Protection failed.");
		assert_eq!(reg.len(), 3);

		let out = doc.serialize(&MinifyOptions::default().with_omit_end_tags(false));
		assert!(out.contains(PLACEHOLDER));
		assert!(! out.contains("color: red"));
		assert!(out.contains("<!-- plain -->"));

		let out = reg.restore(&out);
		assert!(out.contains("<script>if (a < b) { x(); }</script>"));
		assert!(out.contains("<style>p  >  a { color: red; }</style>"));
		assert!(out.contains("<!--[if IE]><p>IE</p><![endif]-->"));
		assert!(! out.contains(PLACEHOLDER));
	}

	#[test]
	fn t_remove_comments() {
		let doc = Document::parse("<p>A<!-- one -->B<!--[x]--></p>");
		let cache = SelectorCache::default();
		remove_comments(&doc, &cache).expect("Removal failed.");
		let out = doc.serialize(&MinifyOptions::default());
		assert_eq!(out, "<p>AB<!--[x]-->");

		// The text halves are rejoined.
		let p = doc.find("p", &cache).expect("Selector failed.").remove(0);
		assert_eq!(p.children.borrow().len(), 2);
		assert_eq!(p.first_child().expect("Missing text.").text_content(), "AB");
	}
}
