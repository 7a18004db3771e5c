// ibmtf-api: Async Rust clients for IBM Cloud REST APIs (CBR, VPC, Schematics)

pub mod auth;
pub mod cbr;
pub mod error;
pub mod pagination;
pub mod request;
pub mod schematics;
pub mod service;
pub mod transport;
pub mod vpc;

pub use auth::{Authenticator, BearerToken, IamAuthenticator, NoAuth};
pub use cbr::CbrClient;
pub use error::Error;
pub use pagination::{PageLink, Paged, collect_all};
pub use request::{ApiRequest, CallHeaders, RequestBuilder};
pub use schematics::SchematicsClient;
pub use service::{BaseService, DetailedResponse};
pub use transport::{RetryPolicy, TlsMode, TransportConfig};
pub use vpc::VpcClient;
