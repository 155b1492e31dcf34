/*!
# HTMin: Loading.
*/

use crate::HtminError;
use std::path::Path;



#[cfg(feature = "remote")]
/// # Request Timeout (Seconds).
const TIMEOUT: u64 = 30;



/// # Load Source.
///
/// Fetch the HTML from a URL (`http://` or `https://`) or read it from a
/// local file path.
///
/// Remote fetching requires the `remote` crate feature.
///
/// ## Errors
///
/// Returns `HtminError::Remote` if a URL cannot be fetched (or fetching is
/// disabled), `HtminError::NotFound` for missing files, and
/// `HtminError::Read` for files that cannot be read as UTF-8 text.
pub fn load(src: &str) -> Result<String, HtminError> {
	if is_url(src) { fetch(src.trim()) }
	else { load_path(src) }
}

/// # Load Path.
///
/// Read a local file as UTF-8.
///
/// ## Errors
///
/// Returns `HtminError::NotFound` if the path does not exist or is not a
/// file, or `HtminError::Read` if the contents cannot be read.
pub fn load_path<P: AsRef<Path>>(src: P) -> Result<String, HtminError> {
	let src = src.as_ref();
	if ! src.is_file() { return Err(HtminError::NotFound); }
	std::fs::read_to_string(src).map_err(|_| HtminError::Read)
}

#[must_use]
/// # Is URL?
fn is_url(src: &str) -> bool {
	let src = src.trim_start().as_bytes();
	(src.len() > 7 && src[..7].eq_ignore_ascii_case(b"http://")) ||
	(src.len() > 8 && src[..8].eq_ignore_ascii_case(b"https://"))
}

#[cfg(feature = "remote")]
/// # Fetch URL.
fn fetch(url: &str) -> Result<String, HtminError> {
	reqwest::blocking::Client::builder()
		.timeout(std::time::Duration::from_secs(TIMEOUT))
		.build()
		.and_then(|client| client.get(url).send())
		.and_then(reqwest::blocking::Response::error_for_status)
		.and_then(reqwest::blocking::Response::text)
		.map_err(|_| HtminError::Remote)
}

#[cfg(not(feature = "remote"))]
/// # Fetch URL (Disabled).
const fn fetch(_url: &str) -> Result<String, HtminError> { Err(HtminError::Remote) }
