//! Integration tests for the folioscan engines
//!
//! Tests are organized by topic:
//! - `search` - Subset search convergence, exhaustion, and stop conditions
//! - `frontier` - Monte Carlo weight sweep and maximum-Sharpe selection
//! - `pipeline` - Prices through returns into both engines

mod search;
