use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
pub type BoxFunction<I, O> = Box<dyn Fn(I) -> O + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct RouteParams(pub Vec<(String, String)>);

#[derive(Debug, Clone)]
pub(crate) struct RouteInfo {
	pub route: usize,
	pub pre_middleware: Vec<usize>,
	pub post_middleware: Vec<usize>,
	pub error_handler: Option<usize>,
}

pub struct ErrorHandler<O, E>(pub(crate) BoxFunction<(hyper::Request<()>, E), BoxFuture<hyper::Response<O>>>);

impl<O, E> Debug for ErrorHandler<O, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ErrorHandler(..)")
	}
}
