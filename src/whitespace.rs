/*!
# HTMin: Whitespace.
*/

use crate::{
	Document,
	Handle,
	HtminError,
	SelectorCache,
	spec,
};
use html5ever::tendril::StrTendril;
use regex::Regex;
use std::{
	borrow::Cow,
	sync::LazyLock,
};



/// # Runs of Whitespace.
///
/// Any two or more whitespace characters, or any line break.
static RE_SPACE: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r"[[:space:]]{2,}|[\r\n]+").expect("Invalid regex.")
);



/// # Sum Up Whitespace.
///
/// Collapse runs of whitespace in every text node not nested inside a
/// whitespace-sensitive element like `<pre>`.
///
/// ## Errors
///
/// This will return an error if the internal selectors cannot be compiled.
pub(crate) fn sum_up(doc: &Document, cache: &SelectorCache) -> Result<(), HtminError> {
	for node in doc.find("text", cache)? {
		if ! node.has_ancestor(|n| n.tag().is_some_and(spec::is_whitespace_sensitive)) {
			collapse(&node);
		}
	}

	Ok(())
}

/// # Trim Around.
///
/// For block-ish elements with children, collapse whitespace in the first
/// and last child text nodes, as well as the text nodes immediately before
/// and after the element.
pub(crate) fn trim_around(el: &Handle) {
	if ! el.tag().is_some_and(spec::is_trim_tag) || ! el.has_children() { return; }

	for node in [el.first_child(), el.last_child(), el.prev_sibling(), el.next_sibling()]
		.into_iter()
		.flatten()
	{
		collapse(&node);
	}
}

/// # Collapse Text Node.
///
/// This is a no-op for anything other than text nodes.
fn collapse(node: &Handle) {
	let mut new = None;
	if let Some(txt) = node.text() && let Cow::Owned(s) = RE_SPACE.replace_all(&txt, " ") {
		new.replace(StrTendril::from(s));
	}
	if let Some(new) = new { node.set_text(new); }
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::MinifyOptions;

	/// # Text Node Value.
	fn txt(node: Option<Handle>) -> String {
		node.and_then(|n| n.text().map(|t| t.to_string())).unwrap_or_default()
	}

	#[test]
	fn t_sum_up() {
		let doc = Document::parse(
			"<div>Hello \n\n  World\t\t!<pre>  keep\n  me  </pre><b>a\nb</b></div>"
		);
		let cache = SelectorCache::default();
		sum_up(&doc, &cache).expect("Sum-up failed.");

		let out = doc.serialize(&MinifyOptions::default().with_omit_end_tags(false));
		assert_eq!(out, "<div>Hello World !<pre>  keep\n  me  </pre><b>a b</b></div>");
	}

	#[test]
	fn t_trim_around() {
		let doc = Document::parse("<b>x\n\n</b>  \n  <div>\n  a  \n</div> \n\n y <span>  z  </span>");
		let cache = SelectorCache::default();
		for el in doc.find("*", &cache).expect("Selector failed.") { trim_around(&el); }

		let div = doc.find("div", &cache).expect("Selector failed.").remove(0);
		assert_eq!(div.text_content(), " a ");
		assert_eq!(txt(div.prev_sibling()), " ");
		assert_eq!(txt(div.next_sibling()), " y ");

		// Non-trim elements are untouched.
		let b = doc.find("b", &cache).expect("Selector failed.").remove(0);
		assert_eq!(b.text_content(), "x\n\n");
		let span = doc.find("span", &cache).expect("Selector failed.").remove(0);
		assert_eq!(span.text_content(), "  z  ");
	}
}
