//! Shared test harness modules for the fleetroute CLI.

use super::*;

mod helpers;
mod unit;
