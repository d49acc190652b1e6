//! Puzzle backend client
//!
//! Talks to the puzzle REST backend (catalog, engine analysis, stats) and
//! drives a [`puzzle::PuzzleController`] from the responses. Can be used by
//! the terminal trainer or any other front end.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use puzzle_client::{DriverSettings, HttpPuzzleClient, PuzzleDriver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpPuzzleClient::new("http://localhost:3001/api", Duration::from_secs(10))?;
//!     let mut driver = PuzzleDriver::new(Arc::new(client), DriverSettings::default());
//!     driver.request_puzzle(Default::default());
//!     let update = driver.next_update().await;
//!     println!("{update:?}");
//!     Ok(())
//! }
//! ```

mod client;
mod driver;
mod error;
mod traits;
pub mod wire;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::HttpPuzzleClient;
pub use driver::{DriverSettings, DriverUpdate, PuzzleDriver};
pub use error::{ClientError, ClientResult};
pub use traits::PuzzleService;
pub use wire::CatalogStats;
