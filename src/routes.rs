use axum::{
    middleware::{from_fn_with_state, map_response},
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS};
use crate::context::AppContext;
use crate::handlers::{drinks, login, system};
use crate::middleware::{require_permission, PermissionGuard};

/// Build the full application router
pub fn app(ctx: AppContext) -> Router {
    let mut routes = Routes::new(ctx.clone())
        // Public
        .public("/health", get(system::health))
        .public("/drinks", get(drinks::list))
        // Protected
        .protected("/drinks-detail", GET_DRINKS_DETAIL, get(drinks::detail))
        .protected("/drinks", POST_DRINKS, post(drinks::create))
        .protected("/drinks/:id", PATCH_DRINKS, patch(drinks::update))
        .protected("/drinks/:id", DELETE_DRINKS, delete(drinks::delete));

    if ctx.login.is_some() {
        routes = routes
            .public("/login", get(login::login))
            .public("/logout", get(login::login))
            .public("/login-results", get(login::results));
    }

    routes.into_router()
}

/// Route table where every protected entry names its permission next to its path
struct Routes {
    ctx: AppContext,
    router: Router<AppContext>,
}

impl Routes {
    fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            router: Router::new(),
        }
    }

    fn public(mut self, path: &str, route: MethodRouter<AppContext>) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Methods registered on the same path merge, so one path may carry
    /// a public GET and a guarded POST
    fn protected(
        mut self,
        path: &str,
        permission: &'static str,
        route: MethodRouter<AppContext>,
    ) -> Self {
        let guard = PermissionGuard::new(self.ctx.verifier.clone(), permission);
        let route = route.route_layer(from_fn_with_state(guard, require_permission));
        self.router = self.router.route(path, route);
        self
    }

    fn into_router(self) -> Router {
        self.router
            .fallback(system::not_found)
            .layer(map_response(system::method_not_allowed))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
            .with_state(self.ctx)
    }
}
