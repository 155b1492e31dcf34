/*!
# HTMin: DOM.
*/

pub(super) mod node;

use crate::{
	HtminError,
	MinifyOptions,
	Query,
	SelectorCache,
	spec,
};
use html5ever::{
	Attribute,
	expanded_name,
	ns,
	local_name,
	ExpandedName,
	interface::{
		ElementFlags,
		NodeOrText,
		QuirksMode,
		TreeSink,
	},
	ParseOpts,
	QualName,
	tendril::{
		StrTendril,
		TendrilSink,
	},
	tree_builder::TreeBuilderOpts,
};
use node::{
	Attributes,
	Handle,
	Node,
	NodeInner,
};
use regex::Regex;
use std::{
	borrow::Cow,
	cell::RefCell,
	rc::Rc,
	sync::LazyLock,
};



/// # Invalid Expanded Name.
///
/// This is used to avoid unfriendly panics in inapplicable `TreeSink` member
/// methods.
static NOOP_NAME: ExpandedName = expanded_name!("", "abbr");

/// # Literal `<html>`.
static RE_HTML: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r"(?i)<html(?:[\s/>]|$)").expect("Invalid regex.")
);

/// # Literal `<head>`.
static RE_HEAD: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r"(?i)<head(?:[\s/>]|$)").expect("Invalid regex.")
);

/// # Literal `<body>`.
static RE_BODY: LazyLock<Regex> = LazyLock::new(||
	Regex::new(r"(?i)<body(?:[\s/>]|$)").expect("Invalid regex.")
);



macro_rules! structure {
	( $( $k:ident $get:ident $v:literal, )+ ) => (
		impl Structure {
			$(
				#[doc = concat!("# Flag: ", stringify!($k), ".")]
				const $k: u8 = $v;
			)+

			$(
				#[must_use]
				#[inline]
				#[doc = concat!("# ", stringify!($k), "?")]
				pub const fn $get(self) -> bool { Self::$k == self.0 & Self::$k }
			)+
		}
	);
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Source Structure.
///
/// These flags describe the raw markup that was parsed, before the tree
/// builder had a chance to fill in missing wrappers.
pub struct Structure(u8);

structure! {
	HTML    has_html    0b0000_0001,
	HEAD    has_head    0b0000_0010,
	BODY    has_body    0b0000_0100,
	DOCTYPE has_doctype 0b0000_1000,
}

impl Structure {
	#[must_use]
	/// # From Source.
	pub fn new(src: &str) -> Self {
		let src = src.trim_start();
		let mut flags = 0;
		if RE_HTML.is_match(src) { flags |= Self::HTML; }
		if RE_HEAD.is_match(src) { flags |= Self::HEAD; }
		if RE_BODY.is_match(src) { flags |= Self::BODY; }
		if src.get(..9).is_some_and(|s| s.eq_ignore_ascii_case("<!doctype")) {
			flags |= Self::DOCTYPE;
		}
		Self(flags)
	}

	#[must_use]
	/// # Literal Wrapper?
	///
	/// Returns `true` if `tag` is `html`, `head`, or `body` and actually
	/// appeared in the source, `false` if it is one of those but was
	/// synthesized by the parser, and `true` for everything else.
	pub(crate) fn is_literal(self, tag: &str) -> bool {
		match tag {
			"html" => self.has_html(),
			"head" => self.has_head(),
			"body" => self.has_body(),
			_ => true,
		}
	}
}



/// # HTML DOM Tree.
///
/// This struct mostly only exists as a place to chuck the ugly `TreeSink`
/// trait on. `Node` (or `Handle`) is self-referential, so is more or less
/// its own tree. Haha.
#[derive(Debug)]
struct Tree {
	/// # Document Root.
	root: Handle,
}

impl Default for Tree {
	#[inline]
	/// # Default: Empty Root Document.
	fn default() -> Self {
		Self { root: Node::new(NodeInner::Document) }
	}
}

impl TreeSink for Tree {
	type Handle = Handle;
	type Output = Self;
	type ElemName<'a> = ExpandedName<'a>
	where Self: 'a;

	/// # Add Attributes if Missing.
	///
	/// If `target` is an element, attach the new attributes to it, except
	/// when they'd collide with existing entries.
	fn add_attrs_if_missing(&self, target: &Handle, new: Vec<Attribute>) {
		if let NodeInner::Element { ref attrs, .. } = target.inner {
			let attrs: &mut Attributes = &mut attrs.borrow_mut();
			for Attribute { name, value } in new {
				attrs.insert_missing(node::attr_key(&name), value);
			}
		}
	}

	/// # Append Node.
	///
	/// Attach a child node to an existing (parent) node.
	fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
		match child {
			NodeOrText::AppendText(v) =>
				// If the last node was text, merge them.
				if
					let Some(last) = parent.children.borrow().last() &&
					let NodeInner::Text { ref contents } = last.inner
				{
					contents.borrow_mut().push_tendril(&v);
				}
				// Otherwise add it anew.
				else { parent.append(Node::new_text(v)); },

			NodeOrText::AppendNode(v) => if ! matches!(v.inner, NodeInner::Ignored) {
				v.detach();
				parent.append(v);
			},
		}
	}

	/// # Append Based on Parent Node.
	///
	/// Insert `child` before `sibling` if `sibling` has a parent, otherwise
	/// append it to `last_parent`.
	fn append_based_on_parent_node(
		&self,
		sibling: &Handle,
		last_parent: &Handle,
		child: NodeOrText<Self::Handle>,
	) {
		if sibling.parent().is_some() { self.append_before_sibling(sibling, child); }
		else { self.append(last_parent, child); }
	}

	/// # Append Before Sibling.
	fn append_before_sibling(&self, sibling: &Handle, child: NodeOrText<Handle>) {
		let Some((parent, pos)) = sibling.parent_and_index() else { return; };

		match child {
			NodeOrText::AppendText(v) => {
				// If the previous node was text, merge them.
				if pos != 0 {
					let children = parent.children.borrow();
					if let NodeInner::Text { ref contents } = children[pos - 1].inner {
						contents.borrow_mut().push_tendril(&v);
						return;
					}
				}

				// Otherwise add it anew.
				let new = Node::new_text(v);
				new.set_parent(Some(&parent));
				parent.children.borrow_mut().insert(pos, new);
			},

			NodeOrText::AppendNode(v) => if ! matches!(v.inner, NodeInner::Ignored) {
				v.detach();

				// The sibling may have shifted if the new node was already
				// one of its older siblings.
				let pos = parent.children.borrow().iter()
					.position(|c| Rc::ptr_eq(c, sibling))
					.unwrap_or(pos);
				v.set_parent(Some(&parent));
				parent.children.borrow_mut().insert(pos, v);
			},
		}
	}

	/// # Create Comment.
	fn create_comment(&self, text: StrTendril) -> Handle {
		Node::new(NodeInner::Comment { contents: text })
	}

	/// # Create Element.
	///
	/// Create and return a new element node.
	fn create_element(&self, name: QualName, attrs: Vec<Attribute>, flags: ElementFlags)
	-> Handle {
		let attrs = attrs.into_iter()
			.map(|Attribute { name, value }| (node::attr_key(&name), value))
			.collect();
		let out = Node::new(NodeInner::Element {
			name,
			attrs: RefCell::new(attrs),
		});

		// Fucking templates. Haha.
		if flags.template { out.append(Node::new(NodeInner::Document)); }

		out
	}

	/// # Create Processing Instruction.
	///
	/// Return a generic placeholder node that will be ignored if appended.
	fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
		Node::new(NodeInner::Ignored)
	}

	/// # Element Name.
	///
	/// Return an element node's fully qualified name.
	fn elem_name<'a>(&self, target: &'a Handle) -> ExpandedName<'a> {
		if let NodeInner::Element { ref name, .. } = target.inner { name.expanded() }
		else { NOOP_NAME }
	}

	#[inline]
	/// # Finish Parsing.
	fn finish(self) -> Self { self }

	/// # Get Document Root.
	///
	/// Clone and return the root document.
	fn get_document(&self) -> Handle { Rc::clone(&self.root) }

	/// # Get Template Contents.
	///
	/// For whatever reason, `<template>` child nodes are treated as a new
	/// document instead of being attached as children.
	///
	/// This method returns a handle for them.
	fn get_template_contents(&self, target: &Handle) -> Handle {
		if
			let NodeInner::Element { ref name, .. } = target.inner &&
			matches!(name.ns, ns!(html)) &&
			matches!(name.local, local_name!("template")) &&
			let Some(out) = target.children.borrow().first()
		{
			return Rc::clone(out);
		}

		Node::new(NodeInner::Ignored)
	}

	/// # Remove From Parent.
	fn remove_from_parent(&self, target: &Handle) { target.detach(); }

	/// # Reparent Children.
	///
	/// Drain and append all children from `old_parent` onto `new_parent`.
	fn reparent_children(&self, old_parent: &Handle, new_parent: &Handle) {
		let old: Vec<Handle> = std::mem::take(&mut *old_parent.children.borrow_mut());
		for child in old { new_parent.append(child); }
	}

	/// # Same Node?
	fn same_node(&self, x: &Handle, y: &Handle) -> bool { Rc::ptr_eq(x, y) }

	/// # Append Doctype to Document.
	fn append_doctype_to_document(
		&self,
		name: StrTendril,
		public_id: StrTendril,
		system_id: StrTendril,
	) {
		self.root.append(Node::new(NodeInner::Doctype { name, public_id, system_id }));
	}

	/// # Is Mathml?
	///
	/// We don't support mathml, so always return false.
	fn is_mathml_annotation_xml_integration_point(&self, _node: &Handle) -> bool {
		false
	}

	/// # Set Parsing Error.
	///
	/// Malformed markup is recovered, not reported.
	fn parse_error(&self, _msg: Cow<'static, str>) {}

	/// # Set Quirks Mode.
	fn set_quirks_mode(&self, _mode: QuirksMode) {}
}

impl Tree {
	/// # Post Processing.
	///
	/// (Lightly) clean the tree before returning it.
	///
	/// Specifically, this ensures that void HTML elements really have no
	/// children, and fixes `<template>` child element associations.
	fn post_process(&self) {
		/// # Patch Tree.
		fn walk(handle: &Handle) {
			if let NodeInner::Element { ref name, .. } = handle.inner {
				if matches!(name.ns, ns!(html)) {
					// Ensure void HTML elements are actually childless.
					if spec::is_void_tag(name.local.as_ref()) {
						handle.replace_children(Vec::new());
						return; // No children, no recursion. Bail early!
					}

					// The tree builder parses <template> content as a separate
					// document instead of regular children. Let's remove that
					// indirection as it isn't relevant or helpful for our
					// purposes.
					if matches!(name.local, local_name!("template")) {
						let first = handle.children.borrow().first().cloned();
						let new =
							if let Some(first) = first && matches!(first.inner, NodeInner::Document) {
								std::mem::take(&mut *first.children.borrow_mut())
							}
							else { Vec::new() };
						handle.replace_children(new);
					}
				}
			}

			// Do the same for the children of the children.
			let children = handle.children.borrow().clone();
			for child in &children { walk(child); }
		}

		walk(&self.root);
	}
}



#[derive(Debug)]
/// # Parsed Document.
///
/// This holds the parsed node tree along with a few notes about the source
/// markup. Parsing never fails; the tree builder recovers from just about
/// anything, however broken.
///
/// ```
/// use htmin::{Document, SelectorCache};
///
/// let doc = Document::parse("<ul><li>One<li>Two</ul>");
/// let cache = SelectorCache::default();
/// let items = doc.find("ul > li", &cache).unwrap();
/// assert_eq!(items.len(), 2);
/// assert_eq!(items[1].text_content(), "Two");
/// ```
pub struct Document {
	/// # Document Root.
	root: Handle,

	/// # Source Structure.
	structure: Structure,
}

impl Document {
	#[must_use]
	/// # Parse.
	pub fn parse(src: &str) -> Self {
		let opts = ParseOpts {
			tree_builder: TreeBuilderOpts {
				drop_doctype: false,
				..TreeBuilderOpts::default()
			},
			..ParseOpts::default()
		};

		let tree = html5ever::parse_document(Tree::default(), opts)
			.one(StrTendril::from(src));
		tree.post_process();

		Self {
			root: tree.root,
			structure: Structure::new(src),
		}
	}

	#[must_use]
	/// # Root Node.
	pub const fn root(&self) -> &Handle { &self.root }

	#[must_use]
	/// # Source Structure.
	pub const fn structure(&self) -> Structure { self.structure }

	/// # Find by Selector.
	///
	/// Return all nodes matching the selector, in document order.
	///
	/// ## Errors
	///
	/// Returns an error if the selector cannot be compiled.
	pub fn find(&self, selector: &str, cache: &SelectorCache)
	-> Result<Vec<Handle>, HtminError> {
		let query = cache.resolve(selector)?;
		Ok(self.select(&query))
	}

	#[must_use]
	/// # Select.
	///
	/// Return all nodes matching the (compiled) query, in document order.
	pub fn select(&self, query: &Query) -> Vec<Handle> {
		self.root.descendants()
			.into_iter()
			.filter(|n| query.matches(n))
			.collect()
	}

	#[must_use]
	/// # Serialize.
	///
	/// Convert the tree back into (minified) HTML.
	pub fn serialize(&self, opts: &MinifyOptions) -> String {
		crate::ser::serialize(self, opts)
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	/// # Predictable Test Tree.
	const HTML: &str = "\
	<html>\
		<head></head>\
		<body>\
			<div>\
				<span></span>\
			</div>\
		</body>\
	</html>";

	/// # Find the Span.
	fn span(doc: &Document) -> Handle {
		let target = Rc::clone(
			&doc.root.children.borrow()[0]
				.children.borrow()[1]
				.children.borrow()[0]
				.children.borrow()[0]
		);
		assert_eq!(target.tag(), Some("span"));
		target
	}

	#[test]
	fn t_remove_from_parent() {
		let doc = Document::parse(HTML);
		let target = span(&doc);
		let tree = Tree { root: Rc::clone(&doc.root) };

		// Remove the span from the tree.
		tree.remove_from_parent(&target);
		assert!(target.parent().is_none());

		// The div should have no children now.
		assert!(
			doc.root.children.borrow()[0]
				.children.borrow()[1]
				.children.borrow()[0]
				.children.borrow().is_empty()
		);
	}

	#[test]
	fn t_append_before_sibling() {
		let doc = Document::parse(HTML);
		let target = span(&doc);
		let tree = Tree { root: Rc::clone(&doc.root) };

		// Let's add a text element before it.
		let new = NodeOrText::AppendText(StrTendril::from("Hello World"));
		tree.append_before_sibling(&target, new);

		// And an element before that.
		let new = tree.create_element(
			QualName::new(None, ns!(html), local_name!("b")),
			Vec::new(),
			ElementFlags::default(),
		);
		tree.append_before_sibling(&target, NodeOrText::AppendNode(new));

		let div = target.parent().expect("Missing parent.");
		let children = div.children.borrow();
		assert_eq!(children.len(), 3);
		assert!(children[0].is_text());
		assert_eq!(children[1].tag(), Some("b"));
		assert!(Rc::ptr_eq(&children[2], &target));
		assert!(Rc::ptr_eq(&children[1].parent().expect("Missing parent."), &div));
	}

	#[test]
	fn t_structure() {
		for (raw, html, head, body, doctype) in [
			("<p>Hi</p>", false, false, false, false),
			("<!DOCTYPE html><html><head></head><body></body></html>", true, true, true, true),
			("  <!doctype html>\n<title>x</title>", false, false, false, true),
			("<header>x</header><bodyguard>", false, false, false, false),
			("<HTML lang=en><BODY>", true, false, true, false),
		] {
			let s = Structure::new(raw);
			assert_eq!(s.has_html(), html, "{raw}");
			assert_eq!(s.has_head(), head, "{raw}");
			assert_eq!(s.has_body(), body, "{raw}");
			assert_eq!(s.has_doctype(), doctype, "{raw}");
		}

		// Plain text has no literal wrappers at all.
		let s = Structure::new("just text");
		assert_eq!(s, Structure::default());
		for tag in ["html", "head", "body"] { assert!(! s.is_literal(tag), "{tag}"); }
		assert!(s.is_literal("p"));
	}

	#[test]
	fn t_parse() {
		let doc = Document::parse("<!DOCTYPE html><p>One<!-- two --><template><i>x</i></template><br>");
		let nodes = doc.root.descendants();

		assert!(matches!(nodes[0].inner, NodeInner::Doctype { .. }));
		assert!(nodes.iter().any(|n| n.is_comment()));

		// Template contents are regular children.
		let template = nodes.iter()
			.find(|n| n.is_html_tag("template"))
			.expect("Missing template.");
		assert_eq!(template.children.borrow().len(), 1);
		assert!(template.children.borrow()[0].is_html_tag("i"));
		assert!(Rc::ptr_eq(
			&template.children.borrow()[0].parent().expect("Missing parent."),
			template,
		));

		// Every node's parent should agree with its position.
		for n in &nodes {
			let parent = n.parent().expect("Missing parent.");
			assert!(parent.children.borrow().iter().any(|c| Rc::ptr_eq(c, n)));
		}
	}

	#[test]
	fn t_text_merge() {
		// Misnested tables shuffle text around, but adjacent text should
		// always wind up merged.
		let doc = Document::parse("<table>a<tr><td>b</td></tr>c</table>");
		for n in doc.root.descendants() {
			let children = n.children.borrow();
			for pair in children.windows(2) {
				assert!(! (pair[0].is_text() && pair[1].is_text()));
			}
		}
	}
}
