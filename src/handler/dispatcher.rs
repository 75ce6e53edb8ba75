//! Request dispatch module
//!
//! match -> handle-or-fault -> fallback-if-unmatched. Every call produces
//! exactly one `Reply`; handler errors and panics are both converted here.

use hyper::Method;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::ApiError;
use crate::http::Reply;
use crate::logger;
use crate::routing::{RequestContext, RouteTable};

use super::routes::api_routes;

pub struct Dispatcher {
    routes: RouteTable,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, clock: Arc<dyn Clock>) -> Self {
        Self { routes, clock }
    }

    /// Dispatcher serving the application routes with the system clock
    pub fn with_api_routes(clock: SystemClock) -> Self {
        Self::new(api_routes(), Arc::new(clock))
    }

    /// Dispatch a request to its handler
    ///
    /// HEAD is matched against GET routes; the HTTP layer drops the body.
    pub fn dispatch(&self, method: &Method, path: &str) -> Reply {
        let lookup_method = if *method == Method::HEAD {
            &Method::GET
        } else {
            method
        };

        let Some((route, params)) = self.routes.find(lookup_method, path) else {
            return Reply::from(ApiError::NotFound);
        };

        let ctx = RequestContext {
            method,
            path,
            params: &params,
            clock: self.clock.as_ref(),
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| (route.handler)(&ctx)))
            .unwrap_or_else(|payload| Err(ApiError::internal(panic_message(payload.as_ref()))));

        match outcome {
            Ok(reply) => reply,
            Err(err) => {
                if let ApiError::Internal { .. } = err {
                    logger::log_fault(method.as_str(), path, err.status().as_u16(), &err.to_string());
                }
                Reply::from(err)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Internal Server Error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::handler::routes::Health;
    use chrono::{DateTime, TimeZone, Utc};

    /// Clock whose readings are set by the test
    struct ManualClock {
        now: DateTime<Utc>,
        uptime: Mutex<Duration>,
    }

    impl ManualClock {
        fn new(uptime: Duration) -> Self {
            Self {
                now: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
                uptime: Mutex::new(uptime),
            }
        }

        fn advance(&self, by: Duration) {
            *self.uptime.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.now
        }

        fn uptime(&self) -> Duration {
            *self.uptime.lock().unwrap()
        }
    }

    fn api_dispatcher() -> (Dispatcher, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Duration::from_millis(1500)));
        let dispatcher = Dispatcher::new(api_routes(), clock.clone());
        (dispatcher, clock)
    }

    fn failing(_ctx: &RequestContext<'_>) -> Result<Reply, ApiError> {
        Err(ApiError::internal("database exploded"))
    }

    fn failing_with_status(_ctx: &RequestContext<'_>) -> Result<Reply, ApiError> {
        Err(ApiError::with_status(StatusCode::BAD_GATEWAY, "upstream gone"))
    }

    fn panicking(_ctx: &RequestContext<'_>) -> Result<Reply, ApiError> {
        panic!("handler panicked")
    }

    #[test]
    fn test_welcome() {
        let (dispatcher, _) = api_dispatcher();
        let reply = dispatcher.dispatch(&Method::GET, "/");
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body.to_string(), r#"{"message":"Welcome to our API!"}"#);
    }

    #[test]
    fn test_known_user() {
        let (dispatcher, _) = api_dispatcher();
        let reply = dispatcher.dispatch(&Method::GET, "/api/users/123");
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            reply.body.to_string(),
            r#"{"id":"123","name":"John Doe","email":"john@example.com"}"#
        );
    }

    #[test]
    fn test_unknown_users() {
        let (dispatcher, _) = api_dispatcher();
        for id in ["999", "1", "abc", "123abc", "0123"] {
            let reply = dispatcher.dispatch(&Method::GET, &format!("/api/users/{id}"));
            assert_eq!(reply.status, StatusCode::NOT_FOUND, "id {id}");
            assert_eq!(reply.body, json!({"error": {"message": "User not found"}}));
        }
    }

    #[test]
    fn test_unmatched_routes() {
        let (dispatcher, _) = api_dispatcher();
        let cases = [
            (Method::GET, "/nonexistent"),
            (Method::GET, "//"),
            (Method::GET, "/api"),
            (Method::GET, "/api/users"),
            (Method::GET, "/api/users/123/posts"),
            (Method::POST, "/"),
            (Method::POST, "/api/users/123"),
            (Method::PUT, "/api/health"),
            (Method::DELETE, "/api/users/123"),
            (Method::OPTIONS, "/"),
        ];
        for (method, path) in cases {
            let reply = dispatcher.dispatch(&method, path);
            assert_eq!(reply.status, StatusCode::NOT_FOUND, "{method} {path}");
            assert_eq!(reply.body.to_string(), r#"{"error":{"message":"Not Found"}}"#);
        }
    }

    #[test]
    fn test_health() {
        let (dispatcher, _) = api_dispatcher();
        let reply = dispatcher.dispatch(&Method::GET, "/api/health");
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            reply.body.to_string(),
            r#"{"status":"ok","timestamp":"2024-05-01T12:30:00.000Z","uptime":1.5}"#
        );
    }

    #[test]
    fn test_health_uptime_non_decreasing() {
        let (dispatcher, clock) = api_dispatcher();
        let mut last = 0.0;
        for _ in 0..5 {
            let reply = dispatcher.dispatch(&Method::GET, "/api/health");
            let health: Health = serde_json::from_value(reply.body).unwrap();
            assert_eq!(health.status, "ok");
            assert!(health.uptime >= 0.0);
            assert!(health.uptime >= last);
            last = health.uptime;
            clock.advance(Duration::from_millis(250));
        }
        assert!((last - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_health_with_system_clock() {
        let dispatcher = Dispatcher::with_api_routes(SystemClock::start());
        let first: Health =
            serde_json::from_value(dispatcher.dispatch(&Method::GET, "/api/health").body).unwrap();
        let second: Health =
            serde_json::from_value(dispatcher.dispatch(&Method::GET, "/api/health").body).unwrap();
        assert!(first.uptime >= 0.0);
        assert!(second.uptime >= first.uptime);
        assert!(DateTime::parse_from_rfc3339(&second.timestamp).is_ok());
    }

    #[test]
    fn test_idempotent_apart_from_time() {
        let (dispatcher, _) = api_dispatcher();
        for path in ["/", "/api/users/123", "/api/users/7", "/missing"] {
            let a = dispatcher.dispatch(&Method::GET, path);
            let b = dispatcher.dispatch(&Method::GET, path);
            assert_eq!(a, b, "{path}");
        }
    }

    #[test]
    fn test_head_matches_get_routes() {
        let (dispatcher, _) = api_dispatcher();
        let reply = dispatcher.dispatch(&Method::HEAD, "/api/users/123");
        assert_eq!(reply.status, StatusCode::OK);
        let reply = dispatcher.dispatch(&Method::HEAD, "/nope");
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_fault_defaults_to_500() {
        let table = RouteTable::new().route(Method::GET, "/boom", failing);
        let dispatcher = Dispatcher::new(table, Arc::new(SystemClock::start()));
        let reply = dispatcher.dispatch(&Method::GET, "/boom");
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body, json!({"error": {"message": "database exploded"}}));
    }

    #[test]
    fn test_fault_declared_status() {
        let table = RouteTable::new().route(Method::GET, "/boom", failing_with_status);
        let dispatcher = Dispatcher::new(table, Arc::new(SystemClock::start()));
        let reply = dispatcher.dispatch(&Method::GET, "/boom");
        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
        assert_eq!(reply.body, json!({"error": {"message": "upstream gone"}}));
    }

    #[test]
    fn test_panic_is_caught() {
        let table = RouteTable::new().route(Method::GET, "/panic", panicking);
        let dispatcher = Dispatcher::new(table, Arc::new(SystemClock::start()));
        let reply = dispatcher.dispatch(&Method::GET, "/panic");
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body, json!({"error": {"message": "handler panicked"}}));

        // The dispatcher keeps serving after a panic
        let reply = dispatcher.dispatch(&Method::GET, "/elsewhere");
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_concurrent_dispatch() {
        let dispatcher = Arc::new(Dispatcher::with_api_routes(SystemClock::start()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                std::thread::spawn(move || {
                    let path = if i % 2 == 0 { "/api/users/123" } else { "/api/users/9" };
                    dispatcher.dispatch(&Method::GET, path).status
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
