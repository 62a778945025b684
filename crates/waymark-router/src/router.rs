//! The router façade.
//!
//! [`Router`] ties the route table, the guard pipeline and a history backend
//! together. Every navigation follows the same protocol:
//!
//! 1. resolve the target, following table redirects
//! 2. run global and route guards
//! 3. make the target views ready
//! 4. run resolve guards
//! 5. commit to history and publish the new [`NavigationState`]
//! 6. run `after_each` hooks
//!
//! The initial location takes the same path once [`Router::start`] is called.
//!
//! A guard redirect restarts the protocol at step 1 and shares the redirect
//! budget with table redirects. Each navigation gets a sequence number; only
//! the most recent one may commit, older ones finish as
//! [`NavigationOutcome::Superseded`] once their pending guards return.
//!
//! The router is single-threaded: state lives in `Cell`/`RefCell`, guards are
//! `!Send` futures, and no borrow is held across an `.await`.

use crate::error::{
	HookError, NavigationError, NavigationResult, RegistrationError, RegistrationResult, SettingsError,
};
use crate::guard::{
	Guard, GuardDecision, GuardHandle, GuardPipeline, NavigationContext, NavigationGuard, NavigationKind,
};
use crate::history::{BasePath, CommitMode, HistoryAdapter, HistoryEntry, ListenerId};
use crate::location::{ParsedPath, RouteLocation};
use crate::resolved::ResolvedRoute;
use crate::resolver::Resolver;
use crate::settings::RouterSettings;
use crate::state::{NavigationState, RouterPhase, Signal};
use crate::table::{RouteDescriptor, RouteId, RouteTable};
use crate::view::{ReadyViews, ViewLoader};
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// How a navigation ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
	/// The route was committed and is now current.
	Committed(ResolvedRoute),
	/// A guard cancelled the navigation.
	Cancelled,
	/// A newer navigation started before this one could commit.
	Superseded,
	/// The target is already the current route; history is only touched to undo a superseded pop.
	Duplicated,
	/// A history traversal was requested but the cursor did not move.
	NotMoved,
}

impl NavigationOutcome {
	/// Returns whether a route was committed.
	pub fn is_committed(&self) -> bool {
		matches!(self, Self::Committed(_))
	}

	/// Returns the committed route.
	pub fn route(&self) -> Option<&ResolvedRoute> {
		match self {
			Self::Committed(route) => Some(route),
			_ => None,
		}
	}
}

/// What started a navigation.
#[derive(Debug, Clone)]
enum Trigger {
	Push,
	Replace,
	/// The history cursor moved to this entry.
	Pop(HistoryEntry),
}

impl Trigger {
	fn kind(&self) -> NavigationKind {
		match self {
			Self::Push => NavigationKind::Push,
			Self::Replace => NavigationKind::Replace,
			Self::Pop(_) => NavigationKind::Pop,
		}
	}
}

/// Client-side router.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use waymark_router::prelude::*;
///
/// # futures::executor::block_on(async {
/// let table = RouteTable::from_descriptors([
/// 	RouteDescriptor::new("/").with_name("/").redirect_to("/dashboard-default"),
/// 	RouteDescriptor::new("/dashboard-default").with_name("Dashboard").with_view("dashboard"),
/// 	RouteDescriptor::new("/billing").with_name("Billing").with_view("billing"),
/// ])
/// .unwrap();
/// let history = Rc::new(MemoryHistory::new("/billing"));
/// let router = Router::new(table, history.clone());
/// // No deep links into billing.
/// router.add_global_guard(guard_fn(|ctx| {
/// 	if ctx.to.name() == Some("Billing") && ctx.from.is_none() {
/// 		GuardDecision::redirect("/")
/// 	} else {
/// 		GuardDecision::Proceed
/// 	}
/// }));
/// router.start().await.unwrap();
/// assert_eq!(router.current_route().unwrap().name(), Some("Dashboard"));
///
/// let outcome = router.navigate("/billing").await.unwrap();
/// assert!(outcome.is_committed());
/// assert_eq!(history.paths(), vec!["/dashboard-default", "/billing"]);
/// # });
/// ```
pub struct Router {
	table: RefCell<RouteTable>,
	history: Rc<dyn HistoryAdapter>,
	guards: GuardPipeline,
	views: RefCell<Rc<dyn ViewLoader>>,
	settings: RouterSettings,
	base: BasePath,
	state: Signal<NavigationState>,
	phase: Cell<RouterPhase>,
	/// Sequence number of the most recently started navigation.
	latest: Cell<u64>,
	listener: Cell<Option<ListenerId>>,
}

impl Router {
	/// Creates a router with default settings.
	///
	/// The router has no current route until [`Router::start`] runs the
	/// initial navigation.
	pub fn new(table: RouteTable, history: Rc<dyn HistoryAdapter>) -> Self {
		Self::build(table, history, RouterSettings::default())
	}

	/// Creates a router with the given settings.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Invalid`] if the settings are unusable.
	pub fn with_settings(
		table: RouteTable,
		history: Rc<dyn HistoryAdapter>,
		settings: RouterSettings,
	) -> Result<Self, SettingsError> {
		settings.validate()?;
		Ok(Self::build(table, history, settings))
	}

	fn build(table: RouteTable, history: Rc<dyn HistoryAdapter>, settings: RouterSettings) -> Self {
		let base = BasePath::new(&settings.base);
		Self {
			table: RefCell::new(table),
			history,
			guards: GuardPipeline::new(),
			views: RefCell::new(Rc::new(ReadyViews)),
			settings,
			base,
			state: Signal::new(NavigationState::default()),
			phase: Cell::new(RouterPhase::Idle),
			latest: Cell::new(0),
			listener: Cell::new(None),
		}
	}

	/// Runs the initial navigation to the location history currently shows.
	///
	/// Call this once guards are registered: the initial location goes through
	/// the full protocol, so a guard may cancel or redirect it. The committed
	/// route replaces the current history entry. When nothing matches, the
	/// router has no current route and the state is marked unmatched.
	///
	/// # Errors
	///
	/// See [`Router::navigate`].
	pub async fn start(&self) -> NavigationResult<NavigationOutcome> {
		let location = self.history.location();
		tracing::debug!(%location, "starting router");
		self.run(RouteLocation::Path(location), Trigger::Replace).await
	}

	fn resolver<'a>(&self, table: &'a RouteTable) -> Resolver<'a> {
		Resolver::new(table).with_max_redirects(self.settings.max_redirects)
	}

	// ----- Navigation -----

	/// Navigates to `target`, pushing a history entry. Alias of [`Router::push`].
	///
	/// # Errors
	///
	/// Returns a [`NavigationError`] when the target cannot be resolved, a
	/// redirect loop is detected, a view fails to load, or history rejects the
	/// entry. The current route is kept in every case.
	pub async fn navigate(&self, target: impl Into<RouteLocation>) -> NavigationResult<NavigationOutcome> {
		self.run(target.into(), Trigger::Push).await
	}

	/// Navigates to `target`, pushing a history entry.
	pub async fn push(&self, target: impl Into<RouteLocation>) -> NavigationResult<NavigationOutcome> {
		self.run(target.into(), Trigger::Push).await
	}

	/// Navigates to `target`, replacing the current history entry.
	pub async fn replace(&self, target: impl Into<RouteLocation>) -> NavigationResult<NavigationOutcome> {
		self.run(target.into(), Trigger::Replace).await
	}

	/// Goes one entry back in history.
	pub async fn back(&self) -> NavigationResult<NavigationOutcome> {
		self.go(-1).await
	}

	/// Goes one entry forward in history.
	pub async fn forward(&self) -> NavigationResult<NavigationOutcome> {
		self.go(1).await
	}

	/// Moves `delta` entries through history and navigates to the entry reached.
	///
	/// Returns [`NavigationOutcome::NotMoved`] when the backend did not move
	/// synchronously, either because `delta` is out of range or because the
	/// backend reports the move later through its pop listeners.
	pub async fn go(&self, delta: isize) -> NavigationResult<NavigationOutcome> {
		match self.history.go(delta) {
			Some(entry) => self.handle_pop_state(entry).await,
			None => Ok(NavigationOutcome::NotMoved),
		}
	}

	/// Runs the navigation protocol for an entry the history cursor moved to.
	///
	/// Guards run as for any other navigation. When they cancel, redirect, or
	/// the navigation fails, an entry for the route that is actually current is
	/// pushed so the visible history matches the router state.
	pub async fn handle_pop_state(&self, entry: HistoryEntry) -> NavigationResult<NavigationOutcome> {
		let target = RouteLocation::Path(entry.full_path.clone());
		self.run(target, Trigger::Pop(entry)).await
	}

	/// Starts listening to pop events reported by the history backend.
	///
	/// Each event is handled on a task created by `spawn`. Calling this again
	/// replaces the previous listener.
	pub fn listen_with<S>(self: &Rc<Self>, spawn: S)
	where
		S: Fn(LocalBoxFuture<'static, ()>) + 'static,
	{
		let router = Rc::downgrade(self);
		let id = self.history.on_pop_state(Rc::new(move |entry: HistoryEntry| {
			let Some(router) = router.upgrade() else {
				return;
			};
			let task: LocalBoxFuture<'static, ()> = Box::pin(async move {
				if let Err(e) = router.handle_pop_state(entry).await {
					tracing::warn!(error = %e, "pop navigation failed");
				}
			});
			spawn(task);
		}));

		if let Some(previous) = self.listener.replace(Some(id)) {
			self.history.remove_listener(previous);
		}
	}

	/// Starts listening to browser `popstate` events.
	#[cfg(all(target_arch = "wasm32", feature = "browser"))]
	pub fn listen(self: &Rc<Self>) {
		self.listen_with(|task| wasm_bindgen_futures::spawn_local(task));
	}

	fn begin(&self) -> u64 {
		let sequence = self.latest.get() + 1;
		self.latest.set(sequence);
		self.phase.set(RouterPhase::Navigating(sequence));
		sequence
	}

	fn is_latest(&self, sequence: u64) -> bool {
		self.latest.get() == sequence
	}

	async fn run(&self, target: RouteLocation, trigger: Trigger) -> NavigationResult<NavigationOutcome> {
		let sequence = self.begin();
		tracing::debug!(sequence, %target, kind = ?trigger.kind(), "navigation started");

		let result = self.run_protocol(target, &trigger, sequence).await;

		if self.is_latest(sequence) {
			self.phase.set(RouterPhase::Idle);

			match &result {
				Err(NavigationError::NoMatch(path)) => {
					tracing::warn!(sequence, %path, "navigation failed: no matching route");
					let path = path.clone();
					self.state.update(|state| state.unmatched = Some(path));
				}
				Err(e) => tracing::warn!(sequence, error = %e, "navigation failed"),
				Ok(NavigationOutcome::Cancelled) => tracing::warn!(sequence, "navigation cancelled"),
				Ok(_) => {}
			}

			if !matches!(result, Ok(NavigationOutcome::Committed(_))) {
				self.sync_history();
			}
		}
		result
	}

	/// Pushes an entry for the current route when the history cursor sits elsewhere.
	///
	/// A pop moves the cursor before its guards run. When that pop, or a newer
	/// navigation that superseded it, ends without committing, the cursor is
	/// left on an entry that is not the current route.
	fn sync_history(&self) {
		let Some(current) = self.current_route() else {
			return;
		};
		let location = ParsedPath::parse(&self.history.location()).full_path();
		if location == current.full_path() {
			return;
		}
		match self.history.commit(&current, CommitMode::Push) {
			Ok(entry) => {
				tracing::debug!(from = %location, path = %entry.full_path, "restored history to current route");
				self.state.update(|state| state.entry = Some(entry));
			}
			Err(e) => tracing::warn!(error = %e, "failed to restore history to current route"),
		}
	}

	async fn run_protocol(
		&self,
		target: RouteLocation,
		trigger: &Trigger,
		sequence: u64,
	) -> NavigationResult<NavigationOutcome> {
		let from = self.current_route();
		let mut location = target;
		let mut hops = 0;
		let mut redirected_from: Option<String> = None;

		loop {
			let (to, spent) = {
				let table = self.table.borrow();
				self.resolver(&table)
					.resolve_counted(&location, hops, redirected_from.clone())?
			};
			hops = spent;

			if !matches!(trigger, Trigger::Pop(_))
				&& from.as_ref().is_some_and(|f| f.full_path() == to.full_path())
			{
				tracing::debug!(sequence, path = %to.full_path(), "navigation duplicated");
				return Ok(NavigationOutcome::Duplicated);
			}

			let ctx = NavigationContext {
				from: from.clone(),
				to,
				sequence,
				kind: trigger.kind(),
			};

			let decision = self.guards.run_before(&ctx).await;
			if !self.is_latest(sequence) {
				return Ok(NavigationOutcome::Superseded);
			}
			if let Some(outcome) = self.interrupted(decision, &ctx, &mut location, &mut hops, &mut redirected_from)? {
				match outcome {
					Interrupt::Cancel => return Ok(NavigationOutcome::Cancelled),
					Interrupt::Redirect => continue,
				}
			}

			let loader = Rc::clone(&*self.views.borrow());
			let loaded = loader.load(&ctx.to).await;
			if !self.is_latest(sequence) {
				return Ok(NavigationOutcome::Superseded);
			}
			loaded.map_err(|reason| NavigationError::ViewLoad {
				path: ctx.to.full_path().to_string(),
				reason,
			})?;

			let decision = self.guards.run_resolve(&ctx).await;
			if !self.is_latest(sequence) {
				return Ok(NavigationOutcome::Superseded);
			}
			if let Some(outcome) = self.interrupted(decision, &ctx, &mut location, &mut hops, &mut redirected_from)? {
				match outcome {
					Interrupt::Cancel => return Ok(NavigationOutcome::Cancelled),
					Interrupt::Redirect => continue,
				}
			}

			return self.commit(ctx, trigger).map(NavigationOutcome::Committed);
		}
	}

	/// Applies a guard decision. Returns `None` to continue the protocol.
	fn interrupted(
		&self,
		decision: GuardDecision,
		ctx: &NavigationContext,
		location: &mut RouteLocation,
		hops: &mut usize,
		redirected_from: &mut Option<String>,
	) -> NavigationResult<Option<Interrupt>> {
		match decision {
			GuardDecision::Proceed => Ok(None),
			GuardDecision::Cancel => Ok(Some(Interrupt::Cancel)),
			GuardDecision::Redirect(next) => {
				*hops += 1;
				if *hops > self.settings.max_redirects {
					return Err(NavigationError::RedirectLoop {
						hops: self.settings.max_redirects,
						path: next.to_string(),
					});
				}
				tracing::debug!(sequence = ctx.sequence, from = %ctx.to.full_path(), to = %next, "guard redirected navigation");
				let origin = ctx.to.redirected_from().unwrap_or(ctx.to.full_path());
				*redirected_from = Some(origin.to_string());
				*location = next;
				Ok(Some(Interrupt::Redirect))
			}
		}
	}

	fn commit(&self, ctx: NavigationContext, trigger: &Trigger) -> NavigationResult<ResolvedRoute> {
		let NavigationContext { from, to, sequence, .. } = ctx;

		let entry = match trigger {
			Trigger::Push => self.history.commit(&to, CommitMode::Push)?,
			Trigger::Replace => self.history.commit(&to, CommitMode::Replace)?,
			Trigger::Pop(entry) if entry.full_path == to.full_path() => entry.clone(),
			Trigger::Pop(_) => self.history.commit(&to, CommitMode::Push)?,
		};

		tracing::info!(
			sequence,
			path = %to.full_path(),
			route = ?to.name(),
			redirected_from = ?to.redirected_from(),
			"navigation committed"
		);
		self.state.set(NavigationState {
			current: Some(to.clone()),
			sequence,
			unmatched: None,
			entry: Some(entry),
		});
		self.guards.run_after(&to, from.as_ref());
		Ok(to)
	}

	// ----- State -----

	/// Returns the committed route.
	pub fn current_route(&self) -> Option<ResolvedRoute> {
		self.state.with(|state| state.current.clone())
	}

	/// Returns a handle to the observable navigation state.
	pub fn state(&self) -> Signal<NavigationState> {
		self.state.clone()
	}

	/// Returns the navigation phase.
	pub fn phase(&self) -> RouterPhase {
		self.phase.get()
	}

	/// Returns the router settings.
	pub fn settings(&self) -> &RouterSettings {
		&self.settings
	}

	/// Returns the history backend.
	pub fn history(&self) -> &Rc<dyn HistoryAdapter> {
		&self.history
	}

	// ----- Resolution -----

	/// Resolves a location without navigating.
	///
	/// # Errors
	///
	/// See [`Resolver::resolve`].
	pub fn resolve(&self, target: impl Into<RouteLocation>) -> NavigationResult<ResolvedRoute> {
		let table = self.table.borrow();
		self.resolver(&table).resolve(&target.into())
	}

	/// Builds the path of a named route.
	///
	/// # Errors
	///
	/// Returns [`NavigationError::UnknownRouteName`] or
	/// [`NavigationError::MissingParameter`].
	pub fn reverse(&self, name: &str, params: &BTreeMap<String, String>) -> NavigationResult<String> {
		self.table.borrow().reverse(name, params)
	}

	/// Returns the platform URL for a location, base path included.
	///
	/// # Errors
	///
	/// See [`Router::resolve`].
	pub fn href(&self, target: impl Into<RouteLocation>) -> NavigationResult<String> {
		Ok(self.base.apply(self.resolve(target)?.full_path()))
	}

	/// Returns whether `target` is part of the current route.
	///
	/// The target is active when its record is in the current matched chain and
	/// every parameter it binds has the same value in the current route.
	pub fn is_active(&self, target: impl Into<RouteLocation>) -> bool {
		let (Ok(target), Some(current)) = (self.resolve(target), self.current_route()) else {
			return false;
		};
		current.contains(target.route_id())
			&& target
				.params()
				.iter()
				.all(|(k, v)| current.param(k) == Some(v.as_str()))
	}

	/// Returns whether `target` is exactly the current route, query and hash ignored.
	pub fn is_exact_active(&self, target: impl Into<RouteLocation>) -> bool {
		let (Ok(target), Some(current)) = (self.resolve(target), self.current_route()) else {
			return false;
		};
		target.route_id() == current.route_id() && target.params() == current.params()
	}

	/// Returns the CSS classes a link to `target` should carry.
	pub fn link_class(&self, target: impl Into<RouteLocation>) -> String {
		let target = target.into();
		let mut classes = Vec::new();
		if self.is_active(target.clone()) {
			classes.push(self.settings.link_active_class.as_str());
			if self.is_exact_active(target) {
				classes.push(self.settings.link_exact_active_class.as_str());
			}
		}
		classes.join(" ")
	}

	// ----- Registration -----

	/// Registers a top-level route.
	///
	/// # Errors
	///
	/// See [`RouteTable::register`].
	pub fn add_route(&self, descriptor: RouteDescriptor) -> RegistrationResult<RouteId> {
		self.table.borrow_mut().register(descriptor)
	}

	/// Registers a route nested under a named parent.
	///
	/// # Errors
	///
	/// See [`RouteTable::register_child`].
	pub fn add_child_route(&self, parent: &str, descriptor: RouteDescriptor) -> RegistrationResult<RouteId> {
		self.table.borrow_mut().register_child(parent, descriptor)
	}

	/// Removes a named route and its descendants. The current route is kept.
	pub fn remove_route(&self, name: &str) -> bool {
		self.table.borrow_mut().remove_route(name)
	}

	/// Checks if a route name exists.
	pub fn has_route(&self, name: &str) -> bool {
		self.table.borrow().has_route(name)
	}

	/// Replaces the view loader.
	pub fn set_view_loader(&self, loader: Rc<dyn ViewLoader>) {
		*self.views.borrow_mut() = loader;
	}

	// ----- Guards -----

	/// Registers a guard run before every navigation.
	pub fn add_global_guard(&self, guard: Rc<dyn NavigationGuard>) -> GuardHandle {
		self.guards.add(Guard::Global(guard))
	}

	/// Registers a guard run when the named route is part of the target.
	///
	/// # Errors
	///
	/// Returns [`RegistrationError::UnknownRoute`] if no route has that name.
	pub fn add_route_guard(&self, route: &str, guard: Rc<dyn NavigationGuard>) -> RegistrationResult<GuardHandle> {
		if !self.has_route(route) {
			return Err(RegistrationError::UnknownRoute(route.to_string()));
		}
		Ok(self.guards.add(Guard::Route {
			route: route.to_string(),
			guard,
		}))
	}

	/// Registers a guard run once the target views are ready.
	pub fn add_resolve_guard(&self, guard: Rc<dyn NavigationGuard>) -> GuardHandle {
		self.guards.add(Guard::Resolve(guard))
	}

	/// Registers a hook run after every committed navigation with `(to, from)`.
	pub fn after_each<F>(&self, hook: F) -> GuardHandle
	where
		F: Fn(&ResolvedRoute, Option<&ResolvedRoute>) -> Result<(), HookError> + 'static,
	{
		self.guards.add_after(hook)
	}

	/// Removes a guard or hook. Returns whether it was registered.
	pub fn remove_guard(&self, handle: GuardHandle) -> bool {
		self.guards.remove(handle)
	}
}

/// How a guard interrupted the protocol.
enum Interrupt {
	Cancel,
	Redirect,
}

impl Drop for Router {
	fn drop(&mut self) {
		if let Some(id) = self.listener.take() {
			self.history.remove_listener(id);
		}
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.table.borrow().len())
			.field("guards", &self.guards)
			.field("settings", &self.settings)
			.field("phase", &self.phase.get())
			.field("current", &self.current_route().map(|r| r.full_path().to_string()))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::guard::guard_fn;
	use crate::history::MemoryHistory;
	use crate::view::ViewId;
	use rstest::rstest;

	fn routes() -> RouteTable {
		RouteTable::from_descriptors([
			RouteDescriptor::new("/").with_name("/").redirect_to("/dashboard-default"),
			RouteDescriptor::new("/dashboard-default")
				.with_name("Dashboard")
				.with_view(ViewId::new("dashboard")),
			RouteDescriptor::new("/users/{id}")
				.with_name("User")
				.with_view(ViewId::new("user"))
				.with_child(RouteDescriptor::new("posts").with_name("UserPosts").with_view(ViewId::new("posts"))),
		])
		.unwrap()
	}

	async fn router_at(path: &str) -> (Router, Rc<MemoryHistory>) {
		let history = Rc::new(MemoryHistory::new(path));
		let router = Router::new(routes(), history.clone());
		router.start().await.unwrap();
		(router, history)
	}

	#[rstest]
	#[tokio::test]
	async fn test_start_resolves_and_replaces_initial_location() {
		// Arrange
		let history = Rc::new(MemoryHistory::new("/"));
		let router = Router::new(routes(), history.clone());
		assert!(router.current_route().is_none());

		// Act
		let outcome = router.start().await.unwrap();

		// Assert
		assert_eq!(outcome.route().unwrap().name(), Some("Dashboard"));
		assert_eq!(router.current_route().unwrap().name(), Some("Dashboard"));
		assert_eq!(history.paths(), vec!["/dashboard-default"]);
		assert_eq!(router.phase(), RouterPhase::Idle);
		assert_eq!(router.state().get().entry, history.current());
	}

	#[rstest]
	#[tokio::test]
	async fn test_start_runs_guards() {
		// Arrange
		let history = Rc::new(MemoryHistory::new("/users/9"));
		let router = Router::new(routes(), history.clone());
		router.add_route_guard("User", guard_fn(|ctx| {
			if ctx.from.is_none() && ctx.kind == NavigationKind::Replace {
				GuardDecision::Cancel
			} else {
				GuardDecision::Proceed
			}
		}))
		.unwrap();

		// Act
		let outcome = router.start().await.unwrap();

		// Assert
		assert_eq!(outcome, NavigationOutcome::Cancelled);
		assert!(router.current_route().is_none());
		assert_eq!(history.paths(), vec!["/users/9"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_unmatched_initial_location() {
		let history = Rc::new(MemoryHistory::new("/nowhere"));
		let router = Router::new(routes(), history);

		let result = router.start().await;

		assert_eq!(result, Err(NavigationError::NoMatch("/nowhere".to_string())));
		let state = router.state().get();
		assert!(state.current.is_none());
		assert_eq!(state.unmatched.as_deref(), Some("/nowhere"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_duplicate_navigation_leaves_history_alone() {
		let (router, history) = router_at("/dashboard-default").await;

		let outcome = router.navigate("/dashboard-default/").await.unwrap();

		assert_eq!(outcome, NavigationOutcome::Duplicated);
		assert_eq!(history.len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_no_match_marks_state_unmatched_and_keeps_route() {
		// Arrange
		let (router, history) = router_at("/dashboard-default").await;

		// Act
		let result = router.navigate("/missing").await;

		// Assert
		assert_eq!(result, Err(NavigationError::NoMatch("/missing".to_string())));
		let state = router.state().get();
		assert_eq!(state.unmatched.as_deref(), Some("/missing"));
		assert_eq!(state.current.unwrap().name(), Some("Dashboard"));
		assert_eq!(history.len(), 1);

		router.navigate("/users/1").await.unwrap();
		assert!(!router.state().get().is_unmatched());
	}

	#[rstest]
	#[tokio::test]
	async fn test_replace_does_not_grow_history() {
		let (router, history) = router_at("/dashboard-default").await;

		router.replace("/users/4").await.unwrap();

		assert_eq!(history.paths(), vec!["/users/4"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_active_links() {
		// Arrange
		let history = Rc::new(MemoryHistory::new("/users/7/posts"));
		let settings = RouterSettings::default().with_link_active_class("active");

		// Act
		let router = Router::with_settings(routes(), history, settings).unwrap();
		router.start().await.unwrap();

		// Assert
		assert!(router.is_active(RouteLocation::named("User").with_param("id", "7")));
		assert!(!router.is_exact_active(RouteLocation::named("User").with_param("id", "7")));
		assert!(!router.is_active("/users/8"));
		assert!(router.is_exact_active("/users/7/posts?tab=recent"));
		assert_eq!(router.link_class("/users/7"), "active");
		assert_eq!(router.link_class("/users/7/posts"), "active router-link-exact-active");
		assert_eq!(router.link_class("/dashboard-default"), "");
		assert_eq!(router.link_class("/missing"), "");
	}

	#[rstest]
	fn test_route_guard_requires_known_route() {
		let router = Router::new(routes(), Rc::new(MemoryHistory::new("/")));
		let result = router.add_route_guard("Ghost", guard_fn(|_| GuardDecision::Proceed));
		assert_eq!(result.err(), Some(RegistrationError::UnknownRoute("Ghost".to_string())));
	}

	#[rstest]
	fn test_href_applies_base() {
		let history = Rc::new(MemoryHistory::with_base("/admin", "/"));
		let router =
			Router::with_settings(routes(), history, RouterSettings::default().with_base("/admin/")).unwrap();

		assert_eq!(router.href(RouteLocation::named("User").with_param("id", "3")).unwrap(), "/admin/users/3");
		assert_eq!(router.href("/").unwrap(), "/admin/dashboard-default");
	}

	#[rstest]
	fn test_invalid_settings_are_rejected() {
		let history = Rc::new(MemoryHistory::new("/"));
		let result = Router::with_settings(routes(), history, RouterSettings::default().with_max_redirects(0));
		assert!(matches!(result, Err(SettingsError::Invalid { key: "max_redirects", .. })));
	}
}
