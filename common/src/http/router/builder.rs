use std::fmt::{Debug, Formatter};
use std::future::Future;

use super::middleware::{Middleware, PostMiddlewareHandler, PreMiddlewareHandler};
use super::route::{Route, RouteHandler, RouterItem};
use super::types::{ErrorHandler, RouteInfo};
use super::Router;

pub struct RouterBuilder<I, O, E> {
	tree: Vec<(&'static str, RouterItem<I, O, E>)>,
	pre_middleware: Vec<PreMiddlewareHandler<E>>,
	post_middleware: Vec<PostMiddlewareHandler<O, E>>,
	error_handler: Option<ErrorHandler<O, E>>,
	not_found: Option<RouteHandler<I, O, E>>,
}

impl<I, O, E> Debug for RouterBuilder<I, O, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouterBuilder")
			.field("tree", &self.tree)
			.field("pre_middleware", &self.pre_middleware)
			.field("post_middleware", &self.post_middleware)
			.field("error_handler", &self.error_handler)
			.field("not_found", &self.not_found)
			.finish()
	}
}

impl<I: 'static, O: 'static, E: 'static> Default for RouterBuilder<I, O, E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I: 'static, O: 'static, E: 'static> RouterBuilder<I, O, E> {
	pub fn new() -> Self {
		Self {
			tree: Vec::new(),
			pre_middleware: Vec::new(),
			post_middleware: Vec::new(),
			error_handler: None,
			not_found: None,
		}
	}

	pub fn middleware(mut self, middleware: Middleware<O, E>) -> Self {
		match middleware {
			Middleware::Pre(handler) => self.pre_middleware.push(handler),
			Middleware::Post(handler) => self.post_middleware.push(handler),
		}

		self
	}

	/// Makes `data` available to every handler in this scope through the
	/// request extensions.
	pub fn data<T: Clone + Send + Sync + 'static>(self, data: T) -> Self {
		self.middleware(Middleware::pre(move |mut req| {
			req.extensions_mut().insert(data.clone());
			async move { Ok(req) }
		}))
	}

	pub fn error_handler<F: Future<Output = hyper::Response<O>> + Send + 'static>(
		mut self,
		handler: impl Fn(hyper::Request<()>, E) -> F + Send + Sync + 'static,
	) -> Self {
		self.error_handler = Some(ErrorHandler(Box::new(move |(req, err)| Box::pin(handler(req, err)))));
		self
	}

	pub fn get<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(Some(vec![hyper::Method::GET]), path, handler)
	}

	pub fn post<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(Some(vec![hyper::Method::POST]), path, handler)
	}

	/// Registers one handler for both GET and POST, the usual shape of an html
	/// form endpoint.
	pub fn form<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(Some(vec![hyper::Method::GET, hyper::Method::POST]), path, handler)
	}

	pub fn any<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(None, path, handler)
	}

	pub fn add_route<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		mut self,
		methods: Option<Vec<hyper::Method>>,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.tree.push((
			path,
			RouterItem::Route(Route {
				methods,
				handler: RouteHandler(Box::new(move |req| Box::pin(handler(req)))),
			}),
		));
		self
	}

	pub fn scope(mut self, path: &'static str, router: RouterBuilder<I, O, E>) -> Self {
		self.tree.push((path, RouterItem::Scope(router)));
		self
	}

	/// Handles every request that no route matched. Only honoured on the root
	/// builder.
	pub fn not_found<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		mut self,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.not_found = Some(RouteHandler(Box::new(move |req| Box::pin(handler(req)))));
		self
	}

	fn build_scoped(
		mut self,
		parent_path: &str,
		target: &mut Router<I, O, E>,
		pre_middlewares: &[usize],
		post_middlewares: &[usize],
		error_handler: Option<usize>,
	) {
		let error_handler = if let Some(error_handler) = self.error_handler.take() {
			target.error_handlers.push(error_handler);
			Some(target.error_handlers.len() - 1)
		} else {
			error_handler
		};

		let pre_middleware_idxs = pre_middlewares
			.iter()
			.copied()
			.chain(self.pre_middleware.into_iter().map(|handler| {
				target.pre_middlewares.push(handler);
				target.pre_middlewares.len() - 1
			}))
			.collect::<Vec<_>>();

		let post_middleware_idxs = post_middlewares
			.iter()
			.copied()
			.chain(self.post_middleware.into_iter().map(|handler| {
				target.post_middlewares.push(handler);
				target.post_middlewares.len() - 1
			}))
			.collect::<Vec<_>>();

		let route_info = |route: usize| RouteInfo {
			route,
			pre_middleware: pre_middleware_idxs.clone(),
			post_middleware: post_middleware_idxs.clone(),
			error_handler,
		};

		if let Some(handler) = self.not_found.take() {
			target.routes.push(handler);
			target.not_found = Some(route_info(target.routes.len() - 1));
		}

		let parent_path = parent_path.trim_matches('/');

		for (path, item) in self.tree.drain(..) {
			let path = path.trim_matches('/');
			let joined = format!("{parent_path}{}{path}", if parent_path.is_empty() || path.is_empty() { "" } else { "/" });

			match item {
				RouterItem::Route(route) => {
					target.routes.push(route.handler);
					let info = route_info(target.routes.len() - 1);

					let methods = route.methods.unwrap_or_else(|| {
						vec![
							hyper::Method::GET,
							hyper::Method::POST,
							hyper::Method::PUT,
							hyper::Method::PATCH,
							hyper::Method::DELETE,
							hyper::Method::HEAD,
							hyper::Method::OPTIONS,
						]
					});

					for method in methods {
						let full_path = format!("/{}/{joined}", method.as_str());

						tracing::debug!(parent_path, path, full_path, "adding route");

						let _ = target.tree.insert(&full_path, info.clone());
					}
				}
				RouterItem::Scope(router) => {
					router.build_scoped(&joined, target, &pre_middleware_idxs, &post_middleware_idxs, error_handler);
				}
			}
		}
	}

	pub fn build(self) -> Router<I, O, E> {
		let mut router = Router {
			routes: Vec::new(),
			pre_middlewares: Vec::new(),
			post_middlewares: Vec::new(),
			error_handlers: Vec::new(),
			not_found: None,
			tree: path_tree::PathTree::new(),
		};

		self.build_scoped("", &mut router, &[], &[], None);

		router
	}
}
