//! Navigation guards and post-navigation hooks.
//!
//! Every pending navigation passes through one [`GuardPipeline`]:
//!
//! 1. global guards, in registration order
//! 2. route guards of each matched record, outermost record first
//! 3. view readiness (driven by the router)
//! 4. resolve guards, in registration order
//!
//! The first guard that does not return [`GuardDecision::Proceed`] decides the
//! navigation. After a navigation is committed the `after_each` hooks run;
//! their failures are logged and otherwise ignored.
//!
//! # Example
//!
//! ```
//! use waymark_router::guard::{GuardDecision, guard_fn};
//!
//! let signed_in = false;
//! let guard = guard_fn(move |ctx| {
//! 	if signed_in || ctx.to.name() == Some("Signin") {
//! 		GuardDecision::Proceed
//! 	} else {
//! 		GuardDecision::redirect("/signin")
//! 	}
//! });
//! # let _ = guard;
//! ```

use crate::error::HookError;
use crate::location::RouteLocation;
use crate::resolved::ResolvedRoute;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// What a guard decided about a pending navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
	/// Let the navigation continue.
	Proceed,
	/// Abort the navigation, keeping the current route.
	Cancel,
	/// Abort and navigate to another location instead.
	Redirect(RouteLocation),
}

impl GuardDecision {
	/// Shorthand for [`GuardDecision::Redirect`].
	pub fn redirect(target: impl Into<RouteLocation>) -> Self {
		Self::Redirect(target.into())
	}

	/// Returns whether the decision lets the navigation continue.
	pub fn is_proceed(&self) -> bool {
		matches!(self, Self::Proceed)
	}
}

/// How a navigation was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKind {
	/// A new history entry is pushed.
	Push,
	/// The current history entry is replaced.
	Replace,
	/// The history cursor moved (back, forward, `go`).
	Pop,
}

/// Everything a guard can inspect about a pending navigation.
#[derive(Debug, Clone)]
pub struct NavigationContext {
	/// The committed route, if any.
	pub from: Option<ResolvedRoute>,
	/// The resolved target.
	pub to: ResolvedRoute,
	/// Sequence number of the navigation.
	pub sequence: u64,
	/// How the navigation was started.
	pub kind: NavigationKind,
}

/// A pre-navigation check.
#[async_trait(?Send)]
pub trait NavigationGuard {
	/// Decides whether the navigation described by `ctx` may continue.
	async fn check(&self, ctx: &NavigationContext) -> GuardDecision;
}

/// Guard wrapping a synchronous `Fn(&NavigationContext) -> GuardDecision` closure.
pub(crate) struct SyncGuard<F> {
	guard: F,
}

#[async_trait(?Send)]
impl<F> NavigationGuard for SyncGuard<F>
where
	F: Fn(&NavigationContext) -> GuardDecision,
{
	async fn check(&self, ctx: &NavigationContext) -> GuardDecision {
		(self.guard)(ctx)
	}
}

/// Guard wrapping an async closure.
///
/// The closure receives an owned context so the returned future can hold it
/// across suspension points.
pub(crate) struct AsyncGuard<F> {
	guard: F,
}

#[async_trait(?Send)]
impl<F, Fut> NavigationGuard for AsyncGuard<F>
where
	F: Fn(NavigationContext) -> Fut,
	Fut: Future<Output = GuardDecision>,
{
	async fn check(&self, ctx: &NavigationContext) -> GuardDecision {
		(self.guard)(ctx.clone()).await
	}
}

/// Helper function to create a guard from a synchronous closure.
pub fn guard_fn<F>(guard: F) -> Rc<dyn NavigationGuard>
where
	F: Fn(&NavigationContext) -> GuardDecision + 'static,
{
	Rc::new(SyncGuard { guard })
}

/// Helper function to create a guard from an async closure.
pub fn async_guard_fn<F, Fut>(guard: F) -> Rc<dyn NavigationGuard>
where
	F: Fn(NavigationContext) -> Fut + 'static,
	Fut: Future<Output = GuardDecision> + 'static,
{
	Rc::new(AsyncGuard { guard })
}

/// Hook run after a navigation has been committed, with `(to, from)`.
pub type AfterHook = Rc<dyn Fn(&ResolvedRoute, Option<&ResolvedRoute>) -> Result<(), HookError>>;

/// A registered guard.
#[derive(Clone)]
pub enum Guard {
	/// Runs for every navigation.
	Global(Rc<dyn NavigationGuard>),
	/// Runs when the named record is part of the matched chain.
	Route {
		/// Name of the guarded record.
		route: String,
		/// The guard.
		guard: Rc<dyn NavigationGuard>,
	},
	/// Runs after the target views are ready.
	Resolve(Rc<dyn NavigationGuard>),
}

impl Guard {
	fn guard(&self) -> &Rc<dyn NavigationGuard> {
		match self {
			Self::Global(guard) | Self::Resolve(guard) => guard,
			Self::Route { guard, .. } => guard,
		}
	}
}

impl fmt::Debug for Guard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Global(_) => f.write_str("Guard::Global"),
			Self::Route { route, .. } => f.debug_struct("Guard::Route").field("route", route).finish(),
			Self::Resolve(_) => f.write_str("Guard::Resolve"),
		}
	}
}

/// Handle for removing a registered guard or hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuardHandle(u64);

/// Ordered set of guards and hooks.
#[derive(Default)]
pub struct GuardPipeline {
	guards: RefCell<Vec<(GuardHandle, Guard)>>,
	after: RefCell<Vec<(GuardHandle, AfterHook)>>,
	next_handle: Cell<u64>,
}

impl GuardPipeline {
	/// Creates an empty pipeline.
	pub fn new() -> Self {
		Self::default()
	}

	fn next_handle(&self) -> GuardHandle {
		let id = self.next_handle.get();
		self.next_handle.set(id + 1);
		GuardHandle(id)
	}

	/// Registers a guard.
	pub fn add(&self, guard: Guard) -> GuardHandle {
		let handle = self.next_handle();
		tracing::debug!(?guard, "registering navigation guard");
		self.guards.borrow_mut().push((handle, guard));
		handle
	}

	/// Registers a post-navigation hook.
	pub fn add_after<F>(&self, hook: F) -> GuardHandle
	where
		F: Fn(&ResolvedRoute, Option<&ResolvedRoute>) -> Result<(), HookError> + 'static,
	{
		let handle = self.next_handle();
		self.after.borrow_mut().push((handle, Rc::new(hook)));
		handle
	}

	/// Removes a guard or hook. Returns whether anything was removed.
	pub fn remove(&self, handle: GuardHandle) -> bool {
		let mut guards = self.guards.borrow_mut();
		let before = guards.len();
		guards.retain(|(h, _)| *h != handle);
		if guards.len() != before {
			return true;
		}
		drop(guards);

		let mut after = self.after.borrow_mut();
		let before = after.len();
		after.retain(|(h, _)| *h != handle);
		after.len() != before
	}

	/// Returns the number of registered guards, hooks excluded.
	pub fn len(&self) -> usize {
		self.guards.borrow().len()
	}

	/// Returns whether no guards are registered.
	pub fn is_empty(&self) -> bool {
		self.guards.borrow().is_empty()
	}

	/// Snapshot of the global and route guards that apply to `ctx.to`, in run order.
	fn before_guards(&self, ctx: &NavigationContext) -> Vec<Rc<dyn NavigationGuard>> {
		let guards = self.guards.borrow();
		let mut ordered: Vec<Rc<dyn NavigationGuard>> = guards
			.iter()
			.filter(|(_, g)| matches!(g, Guard::Global(_)))
			.map(|(_, g)| Rc::clone(g.guard()))
			.collect();

		for record in ctx.to.matched() {
			let Some(name) = record.name() else {
				continue;
			};
			ordered.extend(guards.iter().filter_map(|(_, g)| match g {
				Guard::Route { route, guard } if route == name => Some(Rc::clone(guard)),
				_ => None,
			}));
		}
		ordered
	}

	fn resolve_guards(&self) -> Vec<Rc<dyn NavigationGuard>> {
		self.guards
			.borrow()
			.iter()
			.filter(|(_, g)| matches!(g, Guard::Resolve(_)))
			.map(|(_, g)| Rc::clone(g.guard()))
			.collect()
	}

	/// Runs the global and route guards.
	pub async fn run_before(&self, ctx: &NavigationContext) -> GuardDecision {
		let guards = self.before_guards(ctx);
		Self::run(guards, ctx, "before").await
	}

	/// Runs the resolve guards.
	pub async fn run_resolve(&self, ctx: &NavigationContext) -> GuardDecision {
		let guards = self.resolve_guards();
		Self::run(guards, ctx, "resolve").await
	}

	async fn run(
		guards: Vec<Rc<dyn NavigationGuard>>,
		ctx: &NavigationContext,
		stage: &'static str,
	) -> GuardDecision {
		for (index, guard) in guards.into_iter().enumerate() {
			let decision = guard.check(ctx).await;
			if !decision.is_proceed() {
				tracing::debug!(
					stage,
					index,
					sequence = ctx.sequence,
					to = %ctx.to.full_path(),
					?decision,
					"guard interrupted navigation"
				);
				return decision;
			}
		}
		GuardDecision::Proceed
	}

	/// Runs every post-navigation hook. Failures are logged.
	pub fn run_after(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) {
		let hooks: Vec<AfterHook> = self.after.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
		for hook in hooks {
			if let Err(e) = hook(to, from) {
				tracing::warn!(to = %to.full_path(), error = %e, "post-navigation hook failed");
			}
		}
	}
}

impl fmt::Debug for GuardPipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GuardPipeline")
			.field("guards", &self.guards.borrow().len())
			.field("after", &self.after.borrow().len())
			.finish()
	}
}
