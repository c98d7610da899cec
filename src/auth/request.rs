//! Request abstraction used by the authenticator to read and rewrite credential headers.

// self
use crate::_prelude::*;

/// Outgoing request type the authenticator can inspect and rebuild.
///
/// Implementations expose the headers the failed request was sent with and produce an
/// independent copy for the retry. Types whose bodies cannot be replayed (streams) return
/// `None` from [`duplicate`](SessionRequest::duplicate).
pub trait SessionRequest
where
	Self: Sized,
{
	/// Headers the request was sent with.
	fn headers(&self) -> &HeaderMap;

	/// Mutable access to the request headers.
	fn headers_mut(&mut self) -> &mut HeaderMap;

	/// Clones the request for a retry, if its body can be replayed.
	fn duplicate(&self) -> Option<Self>;
}
impl<B> SessionRequest for http::Request<B>
where
	B: Clone,
{
	fn headers(&self) -> &HeaderMap {
		http::Request::headers(self)
	}

	fn headers_mut(&mut self) -> &mut HeaderMap {
		http::Request::headers_mut(self)
	}

	fn duplicate(&self) -> Option<Self> {
		Some(self.clone())
	}
}
#[cfg(feature = "reqwest")]
impl SessionRequest for reqwest::Request {
	fn headers(&self) -> &HeaderMap {
		reqwest::Request::headers(self)
	}

	fn headers_mut(&mut self) -> &mut HeaderMap {
		reqwest::Request::headers_mut(self)
	}

	fn duplicate(&self) -> Option<Self> {
		self.try_clone()
	}
}
