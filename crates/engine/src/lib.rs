//! tf2bdd engine library.
//!
//! Moderation list service: a Discord bot curates the player registry and
//! an HTTP endpoint publishes it as a player list.
//!
//! ## Structure
//!
//! - `use_cases/` - Registry commands, id resolution, export, master list
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP and chat entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
