use std::fmt::{Debug, Formatter};

use error::RouterError;
use route::RouteHandler;

use self::builder::RouterBuilder;
use self::middleware::{PostMiddlewareHandler, PreMiddlewareHandler};
use self::types::{ErrorHandler, RouteInfo, RouteParams};

pub mod builder;
pub mod error;
pub mod ext;
pub mod middleware;
pub mod route;
pub mod types;

pub struct Router<I, O, E> {
	routes: Vec<RouteHandler<I, O, E>>,
	pre_middlewares: Vec<PreMiddlewareHandler<E>>,
	post_middlewares: Vec<PostMiddlewareHandler<O, E>>,
	error_handlers: Vec<ErrorHandler<O, E>>,
	not_found: Option<RouteInfo>,
	tree: path_tree::PathTree<RouteInfo>,
}

impl<I: 'static, O: 'static, E: 'static> Router<I, O, E> {
	pub fn builder() -> RouterBuilder<I, O, E> {
		RouterBuilder::new()
	}

	pub async fn handle(&self, mut req: hyper::Request<I>) -> Result<hyper::Response<O>, RouterError<E>> {
		let path = format!("/{}{}", req.method().as_str(), req.uri().path());

		let (info, params) = match self.tree.find(&path) {
			Some((info, path)) => (
				info,
				RouteParams(path.params_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect()),
			),
			None => (self.not_found.as_ref().ok_or(RouterError::NotFound)?, RouteParams::default()),
		};

		req.extensions_mut().insert(params);

		let error_handler = info.error_handler.map(|idx| self.error_handlers[idx].0.as_ref());

		// A failing pre middleware skips the route, its error response still
		// goes through the post middlewares.
		let mut pre_error = None;

		for idx in info.pre_middleware.iter().copied() {
			let (parts, body) = req.into_parts();
			match self.pre_middlewares[idx].0(hyper::Request::from_parts(parts.clone(), ())).await {
				Ok(next) => {
					let (parts, _) = next.into_parts();
					req = hyper::Request::from_parts(parts, body);
				}
				Err(err) => {
					req = hyper::Request::from_parts(parts, body);
					pre_error = Some(err);
					break;
				}
			}
		}

		let (head, body) = req.into_parts();

		let result = match pre_error {
			Some(err) => Err(err),
			None => self.routes[info.route].0(hyper::Request::from_parts(head.clone(), body)).await,
		};

		let mut res = match result {
			Ok(res) => res,
			Err(err) => {
				if let Some(error_handler) = error_handler {
					error_handler((hyper::Request::from_parts(head.clone(), ()), err)).await
				} else {
					return Err(RouterError::Unhandled(err));
				}
			}
		};

		for idx in info.post_middleware.iter().copied() {
			res = match self.post_middlewares[idx].0((res, hyper::Request::from_parts(head.clone(), ()))).await {
				Ok(res) => res,
				Err(err) => {
					if let Some(error_handler) = error_handler {
						return Ok(error_handler((hyper::Request::from_parts(head, ()), err)).await);
					} else {
						return Err(RouterError::Unhandled(err));
					}
				}
			};
		}

		Ok(res)
	}
}

impl<I, O, E> Debug for Router<I, O, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.routes)
			.field("pre_middlewares", &self.pre_middlewares)
			.field("post_middlewares", &self.post_middlewares)
			.field("error_handlers", &self.error_handlers)
			.field("not_found", &self.not_found)
			.field("tree", &self.tree)
			.finish()
	}
}
