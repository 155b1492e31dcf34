/*!
# HTMin: Serialization
*/

use crate::{
	Document,
	Handle,
	MinifyOptions,
	dom::node::NodeInner,
	spec::{
		self,
		Following,
	},
};
use html5ever::{
	ns,
	QualName,
};
use std::{
	collections::VecDeque,
	rc::Rc,
};



/// Back to HTML!
///
/// Serialize the tree back into a (hopefully!) valid HTML text document.
///
/// This borrows heavily from `markup5ever_rcdom::SerializableHandle`, but
/// doesn't actually leverage the `Serialize` trait.
pub(crate) fn serialize(doc: &Document, opts: &MinifyOptions) -> String {
	#[derive(Debug)]
	enum Stage {
		/// # Open Tag.
		Open(Handle, usize),

		/// # Close Tag.
		Close(Handle, usize),
	}

	// What we're writing to.
	let mut serializer = Serializer::new(doc, opts);

	// A stack to work with.
	let mut stack = VecDeque::new();
	stack.extend(
		doc.root().children.borrow()
			.iter()
			.enumerate()
			.map(|(idx, h)| Stage::Open(Rc::clone(h), idx))
	);

	while let Some(op) = stack.pop_front() {
		match op {
			Stage::Open(handle, idx) => match handle.inner {
				NodeInner::Element { .. } => {
					if serializer.start_elem(&handle) {
						let children = handle.children.borrow();
						stack.reserve(1 + children.len());
						stack.push_front(Stage::Close(Rc::clone(&handle), idx));
						for (idx, child) in children.iter().enumerate().rev() {
							stack.push_front(Stage::Open(Rc::clone(child), idx));
						}
					}
				},
				NodeInner::Text { ref contents } =>
					serializer.write_text(&handle, &contents.borrow(), idx),
				NodeInner::Comment { ref contents } => {
					serializer.writer.push_str("<!--");
					serializer.writer.push_str(contents);
					serializer.writer.push_str("-->");
				},
				NodeInner::Doctype { ref name, ref public_id, ref system_id } =>
					serializer.write_doctype(name, public_id, system_id),

				// Unused.
				NodeInner::Document |
				NodeInner::Ignored => {},
			},

			// Close it.
			Stage::Close(handle, idx) => serializer.end_elem(&handle, idx),
		}
	}

	serializer.writer
}



#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
/// # Quote Type
///
/// If an attribute value contains the same character used for quoting, it has
/// to be encoded, jumping from one to five bytes per occurrence.
///
/// Space can often be saved in such cases by wrapping the value with single
/// quotes instead of the usual double.
///
/// When quote omission is enabled, most values won't need quotes at all.
enum QuoteKind {
	#[default]
	/// # Double (") Quotes.
	Double,

	/// # Single (') Quotes.
	Single,

	/// # No Quotes.
	None,
}

impl QuoteKind {
	#[must_use]
	/// # For Attribute Value.
	const fn for_value(mut src: &[u8], unquoted: bool) -> Self {
		let mut double = 0;
		let mut single = 0;
		let mut unsafe_bytes = false;

		while let [n, rest @ ..] = src {
			match *n {
				b'"' => { double += 1; },
				b'\'' => { single += 1; },
				b'=' | b'<' | b'>' | b'`' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ' => {
					unsafe_bytes = true;
				},
				_ => {},
			}
			src = rest;
		}

		// No quotes at all?
		if unquoted && ! unsafe_bytes && double == 0 && single == 0 { Self::None }
		// Prefer single if there are fewer of them.
		else if single < double { Self::Single }
		// Otherwise stick with the default.
		else { Self::Double }
	}
}



/// Minification Serializer
///
/// This is roughly based on `html5ever::serialize::Serializer`, but doesn't
/// actually implement the trait.
struct Serializer<'a> {
	/// # Writer.
	writer: String,

	/// # Document.
	doc: &'a Document,

	/// # Options.
	opts: &'a MinifyOptions,

	/// # Whitespace-Sensitive Depth.
	///
	/// Text is passed through unchanged while this is non-zero.
	preserve: usize,
}

impl<'a> Serializer<'a> {
	#[must_use]
	/// # New Instance.
	fn new(doc: &'a Document, opts: &'a MinifyOptions) -> Self {
		Self {
			writer: String::with_capacity(256),
			doc,
			opts,
			preserve: 0,
		}
	}

	/// # Write Doctype.
	///
	/// This is only written if the source actually began with one.
	fn write_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
		if ! self.doc.structure().has_doctype() { return; }

		self.writer.push_str("<!DOCTYPE ");
		self.writer.push_str(name);
		if ! public_id.is_empty() {
			self.writer.push_str(" PUBLIC \"");
			self.writer.push_str(public_id);
			self.writer.push('"');
			if ! system_id.is_empty() {
				self.writer.push_str(" \"");
				self.writer.push_str(system_id);
				self.writer.push('"');
			}
		}
		else if ! system_id.is_empty() {
			self.writer.push_str(" SYSTEM \"");
			self.writer.push_str(system_id);
			self.writer.push('"');
		}
		self.writer.push('>');
	}

	#[must_use]
	/// # Write Opening Tag.
	///
	/// Returns `true` if the element's children (and closing tag) need to be
	/// dealt with.
	///
	/// Synthesized `<html>`, `<head>`, and `<body>` wrappers are skipped, but
	/// their children are not.
	fn start_elem(&mut self, handle: &Handle) -> bool {
		let NodeInner::Element { ref name, ref attrs } = handle.inner else { return false; };
		let html = matches!(name.ns, ns!(html));
		let tag: &str = name.local.as_ref();

		if html && spec::is_whitespace_sensitive(tag) { self.preserve += 1; }
		if html && ! self.doc.structure().is_literal(tag) { return true; }

		// Foreign elements without children close themselves.
		let self_closing = ! html && ! handle.has_children();

		// Opening tag.
		self.writer.push('<');
		self.writer.push_str(tag);

		// Attribute(s).
		let attrs = attrs.borrow();
		let last = attrs.len().saturating_sub(1);
		for (idx, (key, value)) in attrs.iter().enumerate() {
			self.write_attr(name, key, value, self_closing && idx == last);
		}

		if self_closing {
			self.writer.push_str("/>");
			false
		}
		else {
			self.writer.push('>');
			! (html && spec::is_void_tag(tag))
		}
	}

	/// # Write Closing Tag.
	///
	/// Note that for self-closing tags, the work will have already been done.
	fn end_elem(&mut self, handle: &Handle, idx: usize) {
		let NodeInner::Element { ref name, .. } = handle.inner else { return; };
		let html = matches!(name.ns, ns!(html));
		let tag: &str = name.local.as_ref();

		if html && spec::is_whitespace_sensitive(tag) {
			self.preserve = self.preserve.saturating_sub(1);
		}
		if html && ! self.doc.structure().is_literal(tag) { return; }
		if html && self.opts.omit_end_tags() && can_omit(handle, tag, idx) { return; }

		self.writer.push_str("</");
		self.writer.push_str(tag);
		self.writer.push('>');
	}

	/// # Write Tag Attribute.
	fn write_attr(&mut self, tag: &QualName, key: &str, value: &str, force_quote: bool) {
		self.writer.push(' ');
		self.writer.push_str(key);

		// Boolean attributes don't need values in HTML contexts.
		if
			self.opts.optimize_attributes() &&
			matches!(tag.ns, ns!(html)) &&
			spec::is_boolean_attribute(key) &&
			! (key == "hidden" && value.trim().eq_ignore_ascii_case("until-found"))
		{
			return;
		}

		// Empty values can go bare too.
		let unquoted = self.opts.omit_quotes() && ! force_quote;
		if unquoted && value.is_empty() { return; }

		match QuoteKind::for_value(value.as_bytes(), unquoted) {
			QuoteKind::None => {
				self.writer.push('=');
				self.writer.push_str(value);
			},
			QuoteKind::Double => self.write_quoted(value, '"', "&#34;"),
			QuoteKind::Single => self.write_quoted(value, '\'', "&#39;"),
		}
	}

	/// # Write Quoted Value.
	fn write_quoted(&mut self, value: &str, quote: char, esc: &str) {
		self.writer.push('=');
		self.writer.push(quote);
		for c in value.chars() {
			if c == quote { self.writer.push_str(esc); }
			else { self.writer.push(c); }
		}
		self.writer.push(quote);
	}

	/// # Write Text.
	fn write_text(&mut self, handle: &Handle, txt: &str, idx: usize) {
		if txt.is_empty() { return; }

		// Pass it through.
		if self.preserve != 0 || ! spec::is_whitespace(txt.as_bytes()) {
			let raw = handle.parent().is_some_and(|p|
				p.is_html() && p.tag().is_some_and(spec::is_raw_text)
			);
			if raw { self.writer.push_str(txt); }
			else { write_escaped_lt(&mut self.writer, txt); }
		}
		// Whitespace is worth at most one space, if that.
		else if ! self.writer.ends_with(' ') && ! self.drop_whitespace(handle, idx) {
			self.writer.push(' ');
		}
	}

	#[must_use]
	/// # Drop Whitespace-Only Text?
	///
	/// Returns `true` if a whitespace-only text node at this position can
	/// never render, or has been configured away.
	fn drop_whitespace(&self, handle: &Handle, idx: usize) -> bool {
		let Some(parent) = handle.parent() else { return true; };
		let Some(tag) = parent.tag() else { return true; }; // Root.

		if parent.is_html() {
			if spec::can_drop_whitespace(tag) { return true; }
			// Leading or trailing body whitespace.
			if tag == "body" {
				let children = parent.children.borrow();
				if
					! children[..idx].iter().any(is_solid) ||
					! children.iter().skip(idx + 1).any(is_solid)
				{
					return true;
				}
			}
		}

		if self.opts.remove_whitespace_around_tags() {
			let children = parent.children.borrow();
			let trim = |n: Option<&Handle>| n.is_some_and(|n|
				n.is_html() &&
				n.tag().is_some_and(|t| t != "script" && spec::is_trim_tag(t))
			);
			if
				trim(idx.checked_sub(1).and_then(|i| children.get(i))) ||
				trim(children.get(idx + 1))
			{
				return true;
			}
		}

		false
	}
}



/// # Write Text, Escaping Tag Openers.
///
/// A `<` that could begin a tag (or comment, etc.) in the reparsed output is
/// written as `&lt;`. This can happen when a node removed from between two
/// bits of text leaves something like `<` and `b>` side-by-side.
fn write_escaped_lt(out: &mut String, mut txt: &str) {
	while let Some(pos) = txt.find('<') {
		out.push_str(&txt[..pos]);
		let next = txt.as_bytes().get(pos + 1);
		if next.is_none_or(|&b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?')) {
			out.push_str("&lt;");
		}
		else { out.push('<'); }
		txt = &txt[pos + 1..];
	}
	out.push_str(txt);
}

#[must_use]
/// # Solid Node?
///
/// Elements and text with something other than whitespace are solid; comments
/// and the like are not.
fn is_solid(node: &Handle) -> bool {
	match node.inner {
		NodeInner::Element { .. } => true,
		NodeInner::Text { ref contents } => ! spec::is_whitespace(contents.borrow().as_bytes()),
		_ => false,
	}
}

#[must_use]
/// # Can Omit Closing Tag?
///
/// Figure out what follows the element (ignoring comments and whitespace)
/// and consult the rules.
fn can_omit(handle: &Handle, tag: &str, idx: usize) -> bool {
	let Some(parent) = handle.parent() else {
		return spec::may_omit_end_tag(tag, Following::Nothing, None);
	};

	let siblings = parent.children.borrow();
	let next = siblings.iter().skip(idx + 1).find(|n| is_solid(n));

	let following = match next {
		None => Following::Nothing,
		Some(n) => n.tag().map_or(Following::Text, Following::Element),
	};

	spec::may_omit_end_tag(tag, following, parent.tag())
}
