/*!
# HTMin: DOM Node.
*/

use html5ever::{
	local_name,
	ns,
	QualName,
	tendril::StrTendril,
};
use indexmap::IndexMap;
use std::{
	cell::{
		Ref,
		RefCell,
	},
	rc::{
		Rc,
		Weak,
	},
};



/// # Reference-Counted Node.
///
/// Nodes are self-referential, so generally need to be wrapped in `Rc`.
pub type Handle = Rc<Node>;



#[derive(Debug)]
/// # DOM Node.
///
/// This struct holds tag/attribute/content details for a node, its children,
/// and a weak pointer back to its parent. At the root level, it's the whole
/// damn tree.
///
/// In practice, most references hold `Handle` instead, which is an `Rc`-
/// wrapped version of `Node`.
pub struct Node {
	/// # Node Kind/Data.
	pub(crate) inner: NodeInner,

	/// # Parent Node.
	pub(crate) parent: RefCell<Option<Weak<Self>>>,

	/// # Child Node(s).
	pub(crate) children: RefCell<Vec<Handle>>,
}

impl Node {
	#[must_use]
	/// # New Node.
	pub(crate) fn new(inner: NodeInner) -> Handle {
		Rc::new(Self {
			inner,
			parent: RefCell::new(None),
			children: RefCell::new(Vec::new()),
		})
	}

	#[must_use]
	/// # New Text Node.
	pub(crate) fn new_text<S: Into<StrTendril>>(txt: S) -> Handle {
		Self::new(NodeInner::Text { contents: RefCell::new(txt.into()) })
	}

	#[must_use]
	/// # New HTML Element.
	pub(crate) fn new_element(tag: &str, attrs: Attributes) -> Handle {
		Self::new(NodeInner::Element {
			name: QualName::new(None, ns!(html), tag.into()),
			attrs: RefCell::new(attrs),
		})
	}
}

impl Node {
	#[must_use]
	/// # Element Name.
	///
	/// Return the local tag name if this is an element.
	pub fn tag(&self) -> Option<&str> {
		if let NodeInner::Element { ref name, .. } = self.inner { Some(name.local.as_ref()) }
		else { None }
	}

	#[must_use]
	/// # Is HTML Element?
	///
	/// Returns `true` if this is an HTML-namespaced element named `tag`.
	pub fn is_html_tag(&self, tag: &str) -> bool {
		matches!(
			self.inner,
			NodeInner::Element { ref name, .. }
			if matches!(name.ns, ns!(html)) && name.local.as_ref() == tag
		)
	}

	#[must_use]
	/// # Is HTML Namespace?
	pub(crate) fn is_html(&self) -> bool {
		matches!(
			self.inner,
			NodeInner::Element { ref name, .. } if matches!(name.ns, ns!(html))
		)
	}

	#[must_use]
	/// # Is Element?
	pub const fn is_element(&self) -> bool { matches!(self.inner, NodeInner::Element { .. }) }

	#[must_use]
	/// # Is Text?
	pub const fn is_text(&self) -> bool { matches!(self.inner, NodeInner::Text { .. }) }

	#[must_use]
	/// # Is Comment?
	pub const fn is_comment(&self) -> bool { matches!(self.inner, NodeInner::Comment { .. }) }

	#[must_use]
	/// # Text Contents (Text Nodes Only).
	pub fn text(&self) -> Option<Ref<'_, StrTendril>> {
		if let NodeInner::Text { ref contents } = self.inner { Some(contents.borrow()) }
		else { None }
	}

	/// # Replace Text Contents.
	///
	/// This is a no-op for anything other than text nodes.
	pub(crate) fn set_text<S: Into<StrTendril>>(&self, txt: S) {
		if let NodeInner::Text { ref contents } = self.inner {
			*contents.borrow_mut() = txt.into();
		}
	}

	#[must_use]
	/// # Attributes (Elements Only).
	pub fn attrs(&self) -> Option<Ref<'_, Attributes>> {
		if let NodeInner::Element { ref attrs, .. } = self.inner { Some(attrs.borrow()) }
		else { None }
	}

	#[must_use]
	/// # Attribute Value.
	///
	/// Return an owned copy of an element attribute value, if present.
	pub fn attr(&self, key: &str) -> Option<String> {
		self.attrs().and_then(|a| a.get(key).map(String::from))
	}

	#[must_use]
	/// # Text Content.
	///
	/// Return the concatenated text of all descendant text nodes.
	pub fn text_content(&self) -> String {
		/// # Collect.
		fn walk(node: &Node, out: &mut String) {
			if let NodeInner::Text { ref contents } = node.inner {
				out.push_str(&contents.borrow());
			}
			for child in node.children.borrow().iter() { walk(child, out); }
		}

		let mut out = String::new();
		walk(self, &mut out);
		out
	}
}

impl Node {
	#[must_use]
	/// # Parent Node.
	pub fn parent(&self) -> Option<Handle> {
		self.parent.borrow().as_ref().and_then(Weak::upgrade)
	}

	/// # Set Parent.
	pub(crate) fn set_parent(&self, parent: Option<&Handle>) {
		*self.parent.borrow_mut() = parent.map(Rc::downgrade);
	}

	#[must_use]
	/// # Parent and Index.
	///
	/// Return the parent and this node's position within its children.
	pub(crate) fn parent_and_index(self: &Rc<Self>) -> Option<(Handle, usize)> {
		let parent = self.parent()?;
		let pos = parent.children.borrow().iter().position(|v| Rc::ptr_eq(v, self))?;
		Some((parent, pos))
	}

	#[must_use]
	/// # Previous Sibling.
	pub fn prev_sibling(self: &Rc<Self>) -> Option<Handle> {
		let (parent, pos) = self.parent_and_index()?;
		let pos = pos.checked_sub(1)?;
		parent.children.borrow().get(pos).cloned()
	}

	#[must_use]
	/// # Next Sibling.
	pub fn next_sibling(self: &Rc<Self>) -> Option<Handle> {
		let (parent, pos) = self.parent_and_index()?;
		parent.children.borrow().get(pos + 1).cloned()
	}

	#[must_use]
	/// # First Child.
	pub fn first_child(&self) -> Option<Handle> { self.children.borrow().first().cloned() }

	#[must_use]
	/// # Last Child.
	pub fn last_child(&self) -> Option<Handle> { self.children.borrow().last().cloned() }

	#[must_use]
	/// # Has Children?
	pub fn has_children(&self) -> bool { ! self.children.borrow().is_empty() }

	#[must_use]
	/// # Has Matching Ancestor?
	pub(crate) fn has_ancestor<F>(&self, cb: F) -> bool
	where F: Fn(&Self) -> bool {
		let mut next = self.parent();
		while let Some(node) = next {
			if cb(&node) { return true; }
			next = node.parent();
		}
		false
	}

	/// # Append Child.
	///
	/// The child is assumed to be detached.
	pub(crate) fn append(self: &Rc<Self>, child: Handle) {
		child.set_parent(Some(self));
		self.children.borrow_mut().push(child);
	}

	/// # Detach.
	///
	/// Remove this node from its parent, if any.
	pub(crate) fn detach(self: &Rc<Self>) {
		if let Some((parent, pos)) = self.parent_and_index() {
			parent.children.borrow_mut().remove(pos);
		}
		self.set_parent(None);
	}

	/// # Replace With.
	///
	/// Swap this node out for `new` within its parent. If this node has no
	/// parent, nothing happens.
	pub(crate) fn replace_with(self: &Rc<Self>, new: Handle) {
		if let Some((parent, pos)) = self.parent_and_index() {
			new.set_parent(Some(&parent));
			parent.children.borrow_mut()[pos] = new;
			self.set_parent(None);
		}
	}

	/// # Replace Children.
	///
	/// Drop all existing children, replacing them with `new`.
	pub(crate) fn replace_children(self: &Rc<Self>, new: Vec<Handle>) {
		for child in self.children.borrow().iter() { child.set_parent(None); }
		for child in &new { child.set_parent(Some(self)); }
		*self.children.borrow_mut() = new;
	}

	#[must_use]
	/// # Descendants.
	///
	/// Return a snapshot of every node beneath this one, in document order.
	pub fn descendants(&self) -> Vec<Handle> {
		let mut out = Vec::new();
		let mut stack: Vec<Handle> = self.children.borrow().iter().rev().cloned().collect();
		while let Some(next) = stack.pop() {
			stack.extend(next.children.borrow().iter().rev().cloned());
			out.push(next);
		}
		out
	}

	/// # Normalize.
	///
	/// Merge adjacent text nodes at every level beneath this one, the same
	/// way the parser does when it appends text. Removing a node (like a
	/// comment) can otherwise leave two text siblings side-by-side, which
	/// would not survive a reparse of the output.
	pub(crate) fn normalize(&self) {
		self.merge_text();
		for node in self.descendants() { node.merge_text(); }
	}

	/// # Merge Adjacent Text Children.
	fn merge_text(&self) {
		let mut children = self.children.borrow_mut();
		if children.len() < 2 { return; }

		let mut out: Vec<Handle> = Vec::with_capacity(children.len());
		for child in children.drain(..) {
			if
				let NodeInner::Text { ref contents } = child.inner &&
				let Some(last) = out.last() &&
				let NodeInner::Text { contents: ref prev } = last.inner
			{
				prev.borrow_mut().push_tendril(&contents.borrow());
				child.set_parent(None);
				continue;
			}
			out.push(child);
		}
		*children = out;
	}
}



#[derive(Debug)]
/// # Node Kind/Data.
///
/// This enum holds the details for a given node, differentiated by kind.
pub(crate) enum NodeInner {
	/// # The Root Node.
	Document,

	/// # Doctype.
	Doctype {
		/// # Name.
		name: StrTendril,

		/// # Public ID.
		public_id: StrTendril,

		/// # System ID.
		system_id: StrTendril,
	},

	/// # Element.
	Element {
		/// # Tag Name.
		name: QualName,

		/// # Tag Attributes.
		attrs: RefCell<Attributes>,
	},

	/// # Text.
	Text {
		/// # Content.
		contents: RefCell<StrTendril>,
	},

	/// # Comment.
	Comment {
		/// # Content.
		contents: StrTendril,
	},

	/// # Processing Instructions.
	///
	/// We don't support these, but the `TreeSink` API requires we "create"
	/// them anyway.
	Ignored,
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Element Attributes.
///
/// An insertion-ordered map of attribute names to values. Names are stored
/// in their serialized form, namespace prefix and all (e.g. `xlink:href`).
pub struct Attributes(IndexMap<String, StrTendril>);

impl Attributes {
	#[must_use]
	/// # Get Value.
	pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(AsRef::as_ref) }

	#[must_use]
	/// # Has Key?
	pub fn has(&self, key: &str) -> bool { self.0.contains_key(key) }

	/// # Set Value.
	///
	/// Existing keys keep their position; new ones are added to the end.
	pub fn set<S: Into<StrTendril>>(&mut self, key: &str, value: S) {
		if let Some(v) = self.0.get_mut(key) { *v = value.into(); }
		else { self.0.insert(key.to_owned(), value.into()); }
	}

	/// # Remove Key.
	///
	/// The relative order of the remaining attributes is preserved.
	pub fn remove(&mut self, key: &str) -> Option<StrTendril> { self.0.shift_remove(key) }

	/// # Iterate.
	pub fn iter(&self) -> impl Iterator<Item=(&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
	}

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.0.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	/// # Sort by Name.
	pub fn sort(&mut self) { self.0.sort_unstable_keys(); }

	/// # Insert If Missing.
	pub(crate) fn insert_missing(&mut self, key: String, value: StrTendril) {
		self.0.entry(key).or_insert(value);
	}
}

impl FromIterator<(String, StrTendril)> for Attributes {
	fn from_iter<I: IntoIterator<Item=(String, StrTendril)>>(iter: I) -> Self {
		let mut out = IndexMap::new();
		for (k, v) in iter { out.entry(k).or_insert(v); }
		Self(out)
	}
}

#[must_use]
/// # Attribute Key.
///
/// Flatten an attribute's qualified name into the prefixed form it will be
/// written as.
pub(crate) fn attr_key(name: &QualName) -> String {
	match name.ns {
		ns!(xml) => format!("xml:{}", name.local),
		ns!(xmlns) =>
			if matches!(name.local, local_name!("xmlns")) { String::from("xmlns") }
			else { format!("xmlns:{}", name.local) },
		ns!(xlink) => format!("xlink:{}", name.local),
		_ => name.local.to_string(),
	}
}
