//! # Academix Client
//!
//! A typed client for the academy endpoints plus [`OptimisticStore`], which
//! applies create, update and delete locally before the server confirms and
//! rolls back when the server rejects the change.
//!
//! ```ignore
//! use academix_client::{ApiClient, OptimisticStore, resource::Athletes};
//!
//! let mut api = ApiClient::new("http://localhost:3000");
//! api.login("admin@academy.test", "secret").await?;
//!
//! let mut athletes = OptimisticStore::<Athletes, _>::new(api);
//! athletes.load().await?;
//! if let Err(e) = athletes.create(dto).await {
//!     // the placeholder row is already gone again
//!     show_error(e.field(), &e.to_string());
//! }
//! ```

pub mod api;
pub mod error;
pub mod resource;
pub mod store;

pub use api::ApiClient;
pub use error::ActionError;
pub use resource::Resource;
pub use store::{OptimisticStore, Remote};
