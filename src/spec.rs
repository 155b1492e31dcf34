/*!
# HTMin: Questions of Spec.

Static lookup tables and the (pure) optional end tag rules.
*/



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # What Follows an Element?
///
/// This describes the content immediately following an element within its
/// parent, ignoring comments and whitespace-only text.
pub enum Following<'a> {
	/// # Nothing (End of Parent).
	Nothing,

	/// # Another Element.
	Element(&'a str),

	/// # Non-Whitespace Text.
	Text,
}



#[must_use]
/// # Is Void HTML Element?
///
/// These elements have no content and no closing tag.
pub const fn is_void_tag(tag: &str) -> bool {
	matches!(
		tag.as_bytes(),
		b"area" |
		b"base" |
		b"basefont" |
		b"bgsound" |
		b"br" |
		b"col" |
		b"command" |
		b"embed" |
		b"frame" |
		b"hr" |
		b"img" |
		b"input" |
		b"isindex" |
		b"keygen" |
		b"link" |
		b"meta" |
		b"param" |
		b"source" |
		b"track" |
		b"wbr"
	)
}

/// # Void Tags.
///
/// The same list as `is_void_tag`, for building patterns.
pub(crate) const VOID_TAGS: [&str; 20] = [
	"area", "base", "basefont", "bgsound", "br", "col", "command", "embed",
	"frame", "hr", "img", "input", "isindex", "keygen", "link", "meta",
	"param", "source", "track", "wbr",
];

#[must_use]
/// # Is Boolean Attribute?
///
/// The presence of these attributes is what matters, so their values can be
/// dropped entirely.
pub const fn is_boolean_attribute(key: &str) -> bool {
	matches!(
		key.as_bytes(),
		b"allowfullscreen" |
		b"async" |
		b"autofocus" |
		b"autoplay" |
		b"checked" |
		b"compact" |
		b"controls" |
		b"declare" |
		b"default" |
		b"defaultchecked" |
		b"defaultmuted" |
		b"defaultselected" |
		b"defer" |
		b"disabled" |
		b"enabled" |
		b"formnovalidate" |
		b"hidden" |
		b"indeterminate" |
		b"inert" |
		b"ismap" |
		b"itemscope" |
		b"loop" |
		b"multiple" |
		b"muted" |
		b"nohref" |
		b"noresize" |
		b"noshade" |
		b"novalidate" |
		b"nowrap" |
		b"open" |
		b"pauseonexit" |
		b"readonly" |
		b"required" |
		b"reversed" |
		b"scoped" |
		b"seamless" |
		b"selected" |
		b"sortable" |
		b"truespeed" |
		b"typemustmatch" |
		b"visible"
	)
}

#[must_use]
/// # Preserve Whitespace?
///
/// Whitespace inside these elements is left exactly as-is.
pub const fn is_whitespace_sensitive(tag: &str) -> bool {
	matches!(
		tag.as_bytes(),
		b"code" | b"pre" | b"script" | b"style" | b"textarea"
	)
}

#[must_use]
/// # Raw Text Element?
///
/// Text inside these elements is never parsed as markup, so needs no
/// escaping.
pub const fn is_raw_text(tag: &str) -> bool {
	matches!(
		tag.as_bytes(),
		b"iframe" | b"noembed" | b"noframes" | b"noscript" | b"plaintext" |
		b"script" | b"style" | b"textarea" | b"title" | b"xmp"
	)
}

#[must_use]
/// # Trim Around?
///
/// Whitespace around (and just inside) these elements can be tightened up
/// when `remove_whitespace_around_tags` is enabled.
pub const fn is_trim_tag(tag: &str) -> bool {
	matches!(
		tag.as_bytes(),
		b"article" | b"br" | b"div" | b"footer" | b"hr" | b"nav" | b"p" | b"script"
	)
}

#[must_use]
/// # Can Drop Whitespace-Only Children?
///
/// Whitespace-only text nodes directly inside these elements serve no
/// purpose and can be removed.
pub const fn can_drop_whitespace(tag: &str) -> bool {
	matches!(
		tag.as_bytes(),
		b"audio" |
		b"colgroup" |
		b"datalist" |
		b"head" |
		b"html" |
		b"optgroup" |
		b"picture" |
		b"select" |
		b"table" |
		b"tbody" |
		b"tfoot" |
		b"thead" |
		b"tr" |
		b"video"
	)
}

#[must_use]
/// # Is Executable Script Type?
///
/// Any of these are equivalent to the default script type.
pub fn is_script_mime(value: &str) -> bool {
	[
		"text/javascript",
		"text/ecmascript",
		"text/jscript",
		"application/javascript",
		"application/x-javascript",
		"application/ecmascript",
	].iter().any(|v| value.trim().eq_ignore_ascii_case(v))
}

#[must_use]
/// # Can Drop If Empty?
///
/// These attributes do nothing when their values are empty.
pub const fn is_droppable_when_empty(key: &str) -> bool {
	matches!(
		key.as_bytes(),
		b"class" |
		b"dir" |
		b"id" |
		b"lang" |
		b"onblur" |
		b"onchange" |
		b"onclick" |
		b"ondblclick" |
		b"onfocus" |
		b"onkeydown" |
		b"onkeypress" |
		b"onkeyup" |
		b"onmousedown" |
		b"onmousemove" |
		b"onmouseout" |
		b"onmouseover" |
		b"onmouseup" |
		b"style" |
		b"title"
	)
}

#[must_use]
/// # May Omit End Tag?
///
/// This implements a subset of the HTML optional tag rules, answering whether
/// the closing tag for an element named `tag` can be left off given what
/// follows it and what its parent is.
///
/// Start tag omission (`<html>`, `<tbody>`, `<colgroup>`, etc.) is not
/// supported.
pub fn may_omit_end_tag(tag: &str, next: Following<'_>, parent: Option<&str>) -> bool {
	// Text always needs the tag closed.
	if matches!(next, Following::Text) { return false; }

	match tag {
		"html" | "head" | "body" => true,
		"li" => followed_by(next, &["li"], true),
		"rp" => followed_by(next, &["rp", "rt"], true),
		"tr" => followed_by(next, &["tr"], true),
		"td" | "th" => followed_by(next, &["td", "th"], true),
		"dd" => followed_by(next, &["dd", "dt"], true),
		"dt" => followed_by(next, &["dd", "dt"], false),
		"option" => followed_by(next, &["option", "optgroup"], true),
		"p" => match next {
			Following::Nothing => parent.is_some_and(|p|
				! p.contains('-') &&
				! matches!(p, "a" | "audio" | "del" | "ins" | "map" | "noscript" | "video")
			),
			Following::Element(n) => closes_p(n),
			Following::Text => false,
		},
		_ => false,
	}
}

/// # Followed By?
///
/// Returns `true` if `next` is one of the elements in `set`, or if there is
/// nothing next and `or_nothing` is true.
fn followed_by(next: Following<'_>, set: &[&str], or_nothing: bool) -> bool {
	match next {
		Following::Nothing => or_nothing,
		Following::Element(n) => set.contains(&n),
		Following::Text => false,
	}
}

/// # Closes a Paragraph?
///
/// Starting one of these elements implicitly closes an open `<p>`. (Tables
/// only do so in no-quirks mode, so are excluded.)
const fn closes_p(tag: &str) -> bool {
	matches!(
		tag.as_bytes(),
		b"address" |
		b"article" |
		b"aside" |
		b"blockquote" |
		b"dir" |
		b"div" |
		b"dl" |
		b"fieldset" |
		b"footer" |
		b"form" |
		b"h1" |
		b"h2" |
		b"h3" |
		b"h4" |
		b"h5" |
		b"h6" |
		b"header" |
		b"hgroup" |
		b"hr" |
		b"menu" |
		b"nav" |
		b"ol" |
		b"p" |
		b"pre" |
		b"section" |
		b"ul"
	)
}

#[must_use]
/// Is (Only) Whitespace?
///
/// Returns `true` if the text is empty or contains only (ASCII) whitespace.
pub(crate) const fn is_whitespace(mut txt: &[u8]) -> bool {
	while let [b'\t' | b'\n' | b'\x0C' | b'\r' | b' ', rest @ ..] = txt { txt = rest; }
	txt.is_empty()
}
