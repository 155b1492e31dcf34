/*!
# `HTMin`

`HTMin` is a DOM-based HTML minifier for rendered templates and static files.
It prioritizes safety over _ULTIMATE COMPRESSION_: documents and fragments are
parsed into a complete tree before anything is touched, and if for whatever
reason the "minified" result is not actually smaller than the source, the
source is returned as-was.

Minification is achieved through:
* Collapsing whitespace in text nodes (except inside `<pre>`, `<textarea>`, etc.);
* Dropping whitespace that can never render, like that between `<tr>` tags;
* Removing regular comments (conditional comments are left alone);
* Removing redundant or deprecated attributes, like an empty `id`, `charset` on inline scripts, or `type="text/css"` on stylesheets;
* Sorting attributes and class names (better for gzip!);
* Shortening boolean attributes and dropping needless attribute quotes;
* Omitting optional closing tags like `</li>` or `</p>`.

Script and style bodies are passed through byte-for-byte, as are character
references (`&amp;` stays `&amp;`) unless numeric decoding is specifically
requested.



## Use

```
use htmin::{Minifier, MinifyOptions};

let minifier = Minifier::new(MinifyOptions::default());
assert_eq!(
    minifier.minify(r#"<div class="b  a" id="">Hello   <b>World</b></div>"#),
    r#"<div class="a b">Hello <b>World</b></div>"#,
);
```

A single `Minifier` can (and should) be shared, including across threads.



## Crate Features

| Feature | Description |
| ------- | ----------- |
| `remote` | Enable fetching of `http(s)://` sources in `load` and `Minifier::minify_source`. |
*/

#![deny(unsafe_code)]

#![warn(clippy::filetype_is_file)]
#![warn(clippy::integer_division)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::unneeded_field_pattern)]
#![warn(macro_use_extern_crate)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]

#![allow(clippy::module_name_repetitions)]



mod attribute;
mod dom;
pub mod entity;
mod error;
mod load;
mod minify;
mod options;
mod protect;
mod selector;
mod ser;
pub mod spec;
mod whitespace;

pub use dom::{
	Document,
	node::{
		Attributes,
		Handle,
		Node,
	},
	Structure,
};
pub use error::HtminError;
pub use load::{
	load,
	load_path,
};
pub use minify::Minifier;
pub use options::MinifyOptions;
pub use selector::{
	Combinator,
	Compound,
	Path,
	Query,
	SelectorCache,
};
