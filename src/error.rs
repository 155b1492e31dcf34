/*!
# HTMin: Errors
*/

use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Copy, Clone, Eq, PartialEq)]
/// # Library Error.
///
/// Minification itself never fails (bad markup is recovered, and anything
/// that would grow the document falls back to the original), so these mostly
/// concern selectors and document loading.
pub enum HtminError {
	/// # Selector Could Not Be Compiled.
	///
	/// This is a configuration problem, not a markup problem.
	Selector,

	/// # Source Not Found.
	NotFound,

	/// # Unreadable Source.
	Read,

	/// # Remote Source Unavailable.
	///
	/// Either the request failed or the crate was built without the `remote`
	/// feature.
	Remote,
}

impl AsRef<str> for HtminError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for HtminError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Error for HtminError {}

impl HtminError {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Selector => "Unable to compile the selector.",
			Self::NotFound => "The file does not exist.",
			Self::Read => "Unable to read the file.",
			Self::Remote => "Unable to fetch the remote document.",
		}
	}
}
