/*!
# HTMin: Selectors.

This module compiles the (small) subset of CSS selectors and path expressions
the minifier needs into a `Query` that can be matched against nodes.
*/

use crate::{
	Handle,
	HtminError,
	Node,
};
use std::{
	collections::HashMap,
	sync::{
		Arc,
		Mutex,
		PoisonError,
	},
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Compiled Query.
pub enum Query {
	/// # All Text Nodes.
	Text,

	/// # All Comment Nodes.
	Comment,

	/// # Element Paths.
	///
	/// A node matches if it matches any of the paths.
	Select(Vec<Path>),
}

impl Query {
	/// # Compile.
	///
	/// ## Errors
	///
	/// Returns an error if the selector is empty, malformed, or uses syntax
	/// outside the supported subset.
	pub fn new(src: &str) -> Result<Self, HtminError> {
		let src = src.trim();
		match src {
			"text" | "//text()" => Ok(Self::Text),
			"comment" | "//comment()" => Ok(Self::Comment),
			_ =>
				if src.starts_with('/') { Path::from_xpath(src).map(|p| Self::Select(vec![p])) }
				else {
					split_groups(src)?.into_iter()
						.map(Path::from_css)
						.collect::<Result<Vec<_>, _>>()
						.map(Self::Select)
				},
		}
	}

	#[must_use]
	/// # Matches?
	pub fn matches(&self, node: &Handle) -> bool {
		match self {
			Self::Text => node.is_text(),
			Self::Comment => node.is_comment(),
			Self::Select(paths) => node.is_element() && paths.iter().any(|p| p.matches(node)),
		}
	}
}



#[derive(Debug, Default)]
/// # Selector Cache.
///
/// Compiled queries are memoized by their literal selector string for the
/// lifetime of the cache. The cache is thread-safe, so one instance can be
/// shared by concurrent minifications.
pub struct SelectorCache(Mutex<HashMap<String, Arc<Query>>>);

impl SelectorCache {
	/// # Resolve.
	///
	/// Return the compiled query for `selector`, compiling and caching it
	/// first if needed.
	///
	/// ## Errors
	///
	/// Returns an error if the selector cannot be compiled. Failures are not
	/// cached.
	pub fn resolve(&self, selector: &str) -> Result<Arc<Query>, HtminError> {
		if let Some(q) = self.0.lock().unwrap_or_else(PoisonError::into_inner).get(selector) {
			return Ok(Arc::clone(q));
		}

		let query = Arc::new(Query::new(selector)?);
		self.0.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(selector.to_owned(), Arc::clone(&query));
		Ok(query)
	}

	#[must_use]
	/// # Length.
	///
	/// Return the number of cached queries.
	pub fn len(&self) -> usize { self.0.lock().unwrap_or_else(PoisonError::into_inner).len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.len() == 0 }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Combinator.
///
/// This describes how a step relates to the one before it. For the first
/// step, the "one before" is the document root.
pub enum Combinator {
	/// # Any Depth.
	Descendant,

	/// # Direct Child.
	Child,
}

#[derive(Debug, Clone, Eq, PartialEq)]
/// # Path.
///
/// A chain of compound selectors, matched right to left.
pub struct Path(Vec<(Combinator, Compound)>);

impl Path {
	/// # From CSS.
	fn from_css(src: &str) -> Result<Self, HtminError> {
		let mut out = Vec::new();
		let mut comb = Combinator::Descendant;
		let mut rest = src.trim();

		while ! rest.is_empty() {
			if let Some(r) = rest.strip_prefix('>') {
				// Two combinators in a row, or one at the start.
				if comb == Combinator::Child || out.is_empty() { return Err(HtminError::Selector); }
				comb = Combinator::Child;
				rest = r.trim_start();
				continue;
			}

			let (compound, r) = Compound::parse_css(rest)?;
			out.push((comb, compound));
			comb = Combinator::Descendant;

			// Whitespace is a descendant combinator, unless it is just
			// padding around a `>`.
			rest = r.trim_start();
		}

		if out.is_empty() || comb == Combinator::Child { Err(HtminError::Selector) }
		else { Ok(Self(out)) }
	}

	/// # From Path Expression.
	///
	/// Only element steps (`//name`, `/name`, `*`) with `[@attr]` and
	/// `[@attr='value']` predicates are supported.
	fn from_xpath(src: &str) -> Result<Self, HtminError> {
		let mut out = Vec::new();
		let mut rest = src;

		while ! rest.is_empty() {
			let (comb, r) =
				if let Some(r) = rest.strip_prefix("//") { (Combinator::Descendant, r) }
				else if let Some(r) = rest.strip_prefix('/') { (Combinator::Child, r) }
				else { return Err(HtminError::Selector); };

			let (compound, r) = Compound::parse_xpath(r)?;
			out.push((comb, compound));
			rest = r;
		}

		if out.is_empty() { Err(HtminError::Selector) }
		else { Ok(Self(out)) }
	}

	#[must_use]
	/// # Matches?
	fn matches(&self, node: &Handle) -> bool {
		self.0.split_last().is_some_and(|((comb, last), rest)|
			last.matches(node) && Self::matches_up(rest, *comb, node)
		)
	}

	/// # Match Remaining Steps.
	///
	/// `node` has matched the step following `steps`; `comb` is how that step
	/// relates to the last of `steps` (or to the root).
	fn matches_up(steps: &[(Combinator, Compound)], comb: Combinator, node: &Node) -> bool {
		let Some(((next_comb, next), rest)) = steps.split_last() else {
			// Only the root is left.
			return match comb {
				Combinator::Descendant => true,
				Combinator::Child => node.parent().is_some_and(|p| ! p.is_element()),
			};
		};

		let mut parent = node.parent();
		while let Some(p) = parent {
			if next.matches(&p) && Self::matches_up(rest, *next_comb, &p) { return true; }
			if comb == Combinator::Child { return false; }
			parent = p.parent();
		}

		false
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Compound Selector.
///
/// A tag (or `*`) with any number of id, class, and attribute tests.
pub struct Compound {
	/// # Tag Name.
	///
	/// `None` matches any element.
	tag: Option<String>,

	/// # IDs.
	ids: Vec<String>,

	/// # Classes.
	classes: Vec<String>,

	/// # Attribute Tests.
	attrs: Vec<AttrTest>,
}

impl Compound {
	/// # Parse (CSS).
	///
	/// Parse one compound from the start of `src`, returning it and whatever
	/// remains.
	fn parse_css(src: &str) -> Result<(Self, &str), HtminError> {
		let mut out = Self::default();
		let mut rest = src;

		// Type or universal.
		if let Some(r) = rest.strip_prefix('*') { rest = r; }
		else {
			let (name, r) = ident(rest);
			if ! name.is_empty() {
				out.tag.replace(name.to_ascii_lowercase());
				rest = r;
			}
		}

		loop {
			match rest.as_bytes().first() {
				Some(b'#') => {
					let (name, r) = ident(&rest[1..]);
					if name.is_empty() { return Err(HtminError::Selector); }
					out.ids.push(name.to_owned());
					rest = r;
				},
				Some(b'.') => {
					let (name, r) = ident(&rest[1..]);
					if name.is_empty() { return Err(HtminError::Selector); }
					out.classes.push(name.to_owned());
					rest = r;
				},
				Some(b'[') => {
					let (test, r) = AttrTest::parse(&rest[1..], false)?;
					out.attrs.push(test);
					rest = r;
				},
				Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0C') | None => break,
				Some(_) => return Err(HtminError::Selector),
			}
		}

		// It has to test _something_.
		if rest.len() == src.len() { Err(HtminError::Selector) }
		else { Ok((out, rest)) }
	}

	/// # Parse (Path Expression).
	fn parse_xpath(src: &str) -> Result<(Self, &str), HtminError> {
		let mut out = Self::default();
		let mut rest =
			if let Some(r) = src.strip_prefix('*') { r }
			else {
				let (name, r) = ident(src);
				if name.is_empty() { return Err(HtminError::Selector); }
				out.tag.replace(name.to_ascii_lowercase());
				r
			};

		while let Some(r) = rest.strip_prefix('[') {
			let (test, r) = AttrTest::parse(r, true)?;
			out.attrs.push(test);
			rest = r;
		}

		if rest.is_empty() || rest.starts_with('/') { Ok((out, rest)) }
		else { Err(HtminError::Selector) }
	}

	#[must_use]
	/// # Matches?
	fn matches(&self, node: &Node) -> bool {
		let Some(tag) = node.tag() else { return false; };
		if self.tag.as_ref().is_some_and(|t| t != tag) { return false; }
		if self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty() {
			return true;
		}

		let Some(attrs) = node.attrs() else { return false; };
		self.ids.iter().all(|id| attrs.get("id") == Some(id.as_str())) &&
		self.classes.iter().all(|c|
			attrs.get("class").is_some_and(|v| v.split_ascii_whitespace().any(|v| v == c))
		) &&
		self.attrs.iter().all(|t| t.matches(attrs.get(&t.key)))
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Attribute Operator.
enum AttrOp {
	/// # `[a]`
	Exists,

	/// # `[a=v]`
	Equals,

	/// # `[a~=v]`
	Includes,

	/// # `[a|=v]`
	DashMatch,

	/// # `[a^=v]`
	Prefix,

	/// # `[a$=v]`
	Suffix,

	/// # `[a*=v]`
	Substring,
}

#[derive(Debug, Clone, Eq, PartialEq)]
/// # Attribute Test.
struct AttrTest {
	/// # Key.
	key: String,

	/// # Operator.
	op: AttrOp,

	/// # Value.
	value: String,
}

impl AttrTest {
	/// # Parse.
	///
	/// `src` begins just after the opening `[`. Path expressions require an
	/// `@` before the key and only support existence and equality.
	fn parse(src: &str, xpath: bool) -> Result<(Self, &str), HtminError> {
		let mut rest = src.trim_start();
		if xpath { rest = rest.strip_prefix('@').ok_or(HtminError::Selector)?; }

		let (key, r) = split_ident(rest, true);
		if key.is_empty() { return Err(HtminError::Selector); }
		let key = key.to_ascii_lowercase();
		rest = r.trim_start();

		// Existence.
		if let Some(r) = rest.strip_prefix(']') {
			return Ok((Self { key, op: AttrOp::Exists, value: String::new() }, r));
		}

		let (op, r) = match rest.as_bytes() {
			[b'=', ..] => (AttrOp::Equals, &rest[1..]),
			[b'~', b'=', ..] if ! xpath => (AttrOp::Includes, &rest[2..]),
			[b'|', b'=', ..] if ! xpath => (AttrOp::DashMatch, &rest[2..]),
			[b'^', b'=', ..] if ! xpath => (AttrOp::Prefix, &rest[2..]),
			[b'$', b'=', ..] if ! xpath => (AttrOp::Suffix, &rest[2..]),
			[b'*', b'=', ..] if ! xpath => (AttrOp::Substring, &rest[2..]),
			_ => return Err(HtminError::Selector),
		};
		rest = r.trim_start();

		// The value might be quoted.
		let (value, r) = match rest.as_bytes().first() {
			Some(q @ (b'"' | b'\'')) => {
				let q = char::from(*q);
				let end = rest[1..].find(q).ok_or(HtminError::Selector)?;
				(&rest[1..=end], &rest[end + 2..])
			},
			_ if xpath => return Err(HtminError::Selector),
			_ => {
				let (v, r) = ident(rest);
				if v.is_empty() { return Err(HtminError::Selector); }
				(v, r)
			},
		};

		let rest = r.trim_start().strip_prefix(']').ok_or(HtminError::Selector)?;
		Ok((Self { key, op, value: value.to_owned() }, rest))
	}

	#[must_use]
	/// # Matches?
	fn matches(&self, value: Option<&str>) -> bool {
		let Some(v) = value else { return false; };
		match self.op {
			AttrOp::Exists => true,
			AttrOp::Equals => v == self.value,
			AttrOp::Includes => v.split_ascii_whitespace().any(|v| v == self.value),
			AttrOp::DashMatch => v == self.value || v.strip_prefix(self.value.as_str())
				.is_some_and(|r| r.starts_with('-')),
			AttrOp::Prefix => ! self.value.is_empty() && v.starts_with(self.value.as_str()),
			AttrOp::Suffix => ! self.value.is_empty() && v.ends_with(self.value.as_str()),
			AttrOp::Substring => ! self.value.is_empty() && v.contains(self.value.as_str()),
		}
	}
}



/// # Split Groups.
///
/// Split a selector list on top-level commas (i.e. not inside brackets or
/// quotes).
fn split_groups(src: &str) -> Result<Vec<&str>, HtminError> {
	let mut out = Vec::new();
	let mut quote: Option<char> = None;
	let mut depth = 0_usize;
	let mut start = 0;

	for (idx, c) in src.char_indices() {
		match (quote, c) {
			(Some(q), c) => if q == c { quote = None; },
			(None, '"' | '\'') => { quote.replace(c); },
			(None, '[') => { depth += 1; },
			(None, ']') => { depth = depth.checked_sub(1).ok_or(HtminError::Selector)?; },
			(None, ',') if depth == 0 => {
				out.push(src[start..idx].trim());
				start = idx + 1;
			},
			_ => {},
		}
	}

	if quote.is_some() || depth != 0 { return Err(HtminError::Selector); }
	out.push(src[start..].trim());

	if out.iter().any(|s| s.is_empty()) { Err(HtminError::Selector) }
	else { Ok(out) }
}

/// # Identifier.
///
/// Split off a leading identifier (letters, digits, `-`, `_`, or anything
/// non-ASCII).
fn ident(src: &str) -> (&str, &str) { split_ident(src, false) }

/// # Identifier (With Colons?).
///
/// Attribute keys can be namespaced, e.g. `xlink:href`.
fn split_ident(src: &str, colon: bool) -> (&str, &str) {
	let end = src.char_indices()
		.find(|&(_, c)| ! (
			c.is_ascii_alphanumeric() ||
			matches!(c, '-' | '_') ||
			(colon && c == ':') ||
			! c.is_ascii()
		))
		.map_or(src.len(), |(idx, _)| idx);
	src.split_at(end)
}
