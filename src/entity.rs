/*!
# HTMin: Entity Preservation.

The tree builder decodes character references as it goes, which would be bad
news for a minifier that wants to hand back the author's markup as-written.
To keep them intact, a handful of characters are swapped out for private-use
sentinel tokens before parsing, and swapped back once everything else is done.
*/

use regex::{
	Captures,
	Regex,
};
use std::{
	borrow::Cow,
	sync::LazyLock,
};



/// # Sentinel Open.
pub(crate) const OPEN: char = '\u{E000}';

/// # Sentinel Close.
const CLOSE: char = '\u{E001}';

/// # Characters Preserved Everywhere.
const GLOBAL: [(char, &str); 4] = [
	('&', "\u{E000}amp\u{E001}"),
	('|', "\u{E000}pipe\u{E001}"),
	('+', "\u{E000}plus\u{E001}"),
	('%', "\u{E000}pct\u{E001}"),
];

/// # Characters Preserved in Links.
const LINK: [(char, &str); 4] = [
	('[', "\u{E000}lsqb\u{E001}"),
	(']', "\u{E000}rsqb\u{E001}"),
	('{', "\u{E000}lcub\u{E001}"),
	('}', "\u{E000}rcub\u{E001}"),
];

/// # Links.
static RE_LINK: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r"(?i)\[?\bhttps?://[^\s<>]+(?:\(\w+\)|[^[:punct:]\s]|/|\}|\])")
		.expect("Invalid regex.")
);

/// # Escaped Numeric References.
static RE_NUMERIC: LazyLock<Regex> = LazyLock::new(||
	Regex::new("\u{E000}amp\u{E001}#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));")
		.expect("Invalid regex.")
);



#[must_use]
/// # Escape.
///
/// Replace `&`, `|`, `+`, and `%` with sentinel tokens, along with any
/// brackets or braces appearing inside `http(s)://` links.
///
/// If there's nothing to replace, the original is returned as-is.
pub fn escape(src: &str) -> Cow<'_, str> {
	// Links first.
	let mut out =
		if src.contains(['[', ']', '{', '}']) {
			RE_LINK.replace_all(src, |caps: &Captures| {
				let mut out = String::with_capacity(caps[0].len());
				push_escaped(&mut out, &caps[0], &LINK);
				out
			})
		}
		else { Cow::Borrowed(src) };

	// Then everything else.
	if out.contains(['&', '|', '+', '%']) {
		let mut tmp = String::with_capacity(out.len() + 64);
		push_escaped(&mut tmp, &out, &GLOBAL);
		out = Cow::Owned(tmp);
	}

	out
}

#[must_use]
/// # Unescape.
///
/// Reverse the changes made by `escape`.
pub fn unescape(src: &str) -> Cow<'_, str> {
	if ! src.contains(OPEN) { return Cow::Borrowed(src); }

	let mut out = src.to_owned();
	for (c, token) in GLOBAL.iter().chain(LINK.iter()) {
		if out.contains(token) {
			out = out.replace(token, c.encode_utf8(&mut [0_u8; 4]));
		}
	}
	Cow::Owned(out)
}

#[must_use]
/// # Decode Numeric References.
///
/// Replace (escaped) numeric character references like `&#233;` or `&#xE9;`
/// with the characters they represent, except where that would be unsafe or
/// unhelpful: markup-significant characters (including those which would
/// force an unquoted attribute value into quotes), controls, whitespace, and
/// non-breaking spaces are left as references.
///
/// This must be run against escaped markup, i.e. before `unescape`.
pub fn decode_numeric(src: &str) -> Cow<'_, str> {
	if ! src.contains(OPEN) { return Cow::Borrowed(src); }

	RE_NUMERIC.replace_all(src, |caps: &Captures| {
		let num =
			if let Some(hex) = caps.get(1) { u32::from_str_radix(hex.as_str(), 16).ok() }
			else { caps.get(2).and_then(|dec| dec.as_str().parse::<u32>().ok()) };

		match num.and_then(char::from_u32) {
			Some(c) if ! matches!(c, '<' | '>' | '&' | '"' | '\'' | '=' | '`' | '\u{a0}') &&
				! c.is_control() &&
				! c.is_whitespace() &&
				! (OPEN..=CLOSE).contains(&c) => c.to_string(),
			_ => caps[0].to_owned(),
		}
	})
}

/// # Push Escaped.
fn push_escaped(out: &mut String, src: &str, map: &[(char, &str)]) {
	for c in src.chars() {
		if let Some((_, token)) = map.iter().find(|(k, _)| *k == c) { out.push_str(token); }
		else { out.push(c); }
	}
}
