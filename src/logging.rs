use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::StatusClass,
    Data, Orbit, Request, Response, Rocket,
};

use crate::model::{
    api::CALLER_HEADER,
    common::{ElectionId, RegistryId},
};

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// The engine instance a request path addresses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Target {
    Registry(RegistryId),
    Election(ElectionId),
    Ledger,
    Unknown,
}

impl Target {
    /// Classify a request by its path segments, e.g. `["elections", "0", "vote"]`.
    pub fn of<'a>(mut segments: impl Iterator<Item = &'a str>) -> Self {
        let family = segments.next();
        let id = segments.next().and_then(|id| id.parse().ok());
        match (family, id) {
            (Some("registries"), Some(id)) => Self::Registry(id),
            (Some("elections"), Some(id)) => Self::Election(id),
            (Some("ledger"), _) => Self::Ledger,
            _ => Self::Unknown,
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(id) => write!(f, "registry {id}"),
            Self::Election(id) => write!(f, "election {id}"),
            Self::Ledger => f.write_str("ledger"),
            Self::Unknown => f.write_str("-"),
        }
    }
}

/// What the logger remembers about a request until its response.
#[derive(Debug)]
struct RequestTrace {
    id: RequestId,
    target: Target,
    started: Instant,
}

impl RequestTrace {
    fn new(req: &Request<'_>) -> Self {
        Self {
            id: RequestId::next(),
            target: Target::of(req.uri().path().segments()),
            started: Instant::now(),
        }
    }
}

/// A rocket fairing that logs every request with the instance it targets and
/// the account it acts as, and every response with its route and latency.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let ip = &rocket.config().address;
        let port = &rocket.config().port;
        info!("Campus stake server launched on http://{ip}:{port}");
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let req: &Request<'_> = req;
        let trace = req.local_cache(|| RequestTrace::new(req));
        let (id, target) = (trace.id, trace.target);
        let method = req.method();
        let uri = req.uri();
        match req.headers().get_one(CALLER_HEADER) {
            Some(caller) => info!("->req{id} {method} {uri} [{target}] as {caller}"),
            None => info!("->req{id} {method} {uri} [{target}] anonymous"),
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let trace = req.local_cache(|| RequestTrace::new(req));
        let code = res.status();
        let operation = req
            .route()
            .and_then(|route| route.name.as_deref())
            .unwrap_or("no route");
        let elapsed = trace.started.elapsed().as_millis();
        let log_msg = format!(
            "<-rsp{} {code} {operation} [{}] in {elapsed}ms",
            trace.id, trace.target
        );
        match code.class() {
            StatusClass::ServerError => error!("{log_msg}"),
            StatusClass::ClientError => warn!("{log_msg}"),
            _ => info!("{log_msg}"),
        }
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutdown requested, stopping gracefully...");
    }
}
