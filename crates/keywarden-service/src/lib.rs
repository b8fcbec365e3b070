mod blocking;
mod catalog;
mod http;
mod local;
mod traits;

pub use blocking::BlockingHttpService;
pub use catalog::{ModelCatalog, OllamaCatalog, StaticCatalog, UnavailableCatalog};
pub use http::HttpService;
pub use local::{generate_secret, LocalService};
pub use traits::{KeyService, ServiceError};
