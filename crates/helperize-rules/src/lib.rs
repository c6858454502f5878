//! helperize-rules: the member-chain to helper rewrite and its PHP front-end
//!
//! - `config`: names the rewrite matches on and produces
//! - `matcher` / `engine`: eligibility check and in-place substitution
//! - `php`: mago AST to rewrite tree, declarations, re-emission
//! - `faker_helper`: `$this->faker` to `fake()` in Laravel factories

pub mod config;
pub mod engine;
pub mod faker_helper;
pub mod matcher;
pub mod php;
pub mod registry;

pub use config::{ConfigurationError, RewriteConfig};
pub use engine::{Outcome, RewriteEngine};
pub use faker_helper::{check_faker_helper, check_faker_helper_with_engine, FakerHelperRule};
pub use php::collect_declarations;
pub use registry::{Rule, RuleRegistry};
